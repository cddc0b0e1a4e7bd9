//! Utilities shared across the workspace: logging setup and rayon helpers.

pub mod log_setup;
pub mod parallel;
