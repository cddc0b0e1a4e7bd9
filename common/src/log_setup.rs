//! Process-wide `tracing` subscriber: a console layer plus a rolling file.
//!
//! ```rust,ignore
//! common::log_setup::setup_logging("info");
//! // or
//! LogOptions::new("debug").with_dir("target/logs").install();
//! ```

use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use tracing::Level;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{Builder, Rotation};
use tracing_subscriber::fmt::writer::MakeWriterExt;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

static FILE_GUARD: OnceLock<WorkerGuard> = OnceLock::new();

/// Where and how verbosely to log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogOptions {
    /// Filter used when `RUST_LOG` is unset, e.g. `"info"` or `"lkflow=debug"`.
    pub base_level: String,
    pub dir: PathBuf,
    pub file_prefix: String,
    /// Daily files kept before the oldest is deleted.
    pub max_files: usize,
    /// Level from which console output is copied to stderr.
    pub stderr_level: Level,
}

impl Default for LogOptions {
    fn default() -> Self {
        Self {
            base_level: "info".to_string(),
            dir: PathBuf::from("logs"),
            file_prefix: "lkflow".to_string(),
            max_files: 5,
            stderr_level: Level::WARN,
        }
    }
}

impl LogOptions {
    pub fn new(base_level: &str) -> Self {
        Self {
            base_level: base_level.to_string(),
            ..Default::default()
        }
    }

    pub fn with_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.dir = dir.as_ref().to_path_buf();
        self
    }

    pub fn with_file_prefix(mut self, prefix: &str) -> Self {
        self.file_prefix = prefix.to_string();
        self
    }

    /// `RUST_LOG` when set and valid, otherwise `base_level`.
    fn filter(&self) -> EnvFilter {
        EnvFilter::try_from_default_env()
            .or_else(|_| EnvFilter::try_new(&self.base_level))
            .unwrap_or_else(|e| panic!("Invalid log filter '{}': {}", self.base_level, e))
    }

    /// Installs the global subscriber.
    ///
    /// # Panics
    /// If the filter is invalid, the log directory cannot be created, or a
    /// subscriber is already installed.
    pub fn install(&self) {
        let filter = self.filter();

        std::fs::create_dir_all(&self.dir)
            .unwrap_or_else(|e| panic!("Failed to create {}: {}", self.dir.display(), e));
        let appender = Builder::new()
            .rotation(Rotation::DAILY)
            .filename_prefix(self.file_prefix.as_str())
            .filename_suffix("log")
            .max_log_files(self.max_files)
            .build(&self.dir)
            .unwrap_or_else(|e| panic!("Failed to open log file in {}: {}", self.dir.display(), e));

        let (file_writer, guard) = tracing_appender::non_blocking(appender);
        if FILE_GUARD.set(guard).is_err() {
            panic!("Logging already initialized");
        }

        let console_writer =
            std::io::stdout.and(std::io::stderr.with_min_level(self.stderr_level));
        let console = tracing_subscriber::fmt::layer()
            .with_target(true)
            .with_line_number(true)
            .with_writer(console_writer);
        let file = tracing_subscriber::fmt::layer()
            .with_file(true)
            .with_line_number(true)
            .with_ansi(false)
            .with_writer(file_writer);

        tracing_subscriber::registry()
            .with(filter)
            .with(console)
            .with(file)
            .try_init()
            .unwrap_or_else(|e| panic!("Logger initialization failed: {}", e));
    }
}

/// Installs the default subscriber at `base_level`, logging to `./logs`.
pub fn setup_logging(base_level: &str) {
    LogOptions::new(base_level).install();
}
