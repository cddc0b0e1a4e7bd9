use super::*;
use crate::testing::{init_tracing, sample_plane, texture};

fn translated(dims: Dims, dx: f64, dy: f64) -> Vec<f32> {
    sample_plane(dims, |x, y| 20.0 * texture(x - dx, y - dy))
}

fn interior_mean(field: &FlowField<f32>, margin: usize) -> (f32, f32) {
    let dims = field.dims();
    let (mut sx, mut sy, mut n) = (0.0f32, 0.0f32, 0.0f32);
    for y in margin..dims.rows - margin {
        for x in margin..dims.cols - margin {
            let (vx, vy) = field.get(x, y);
            sx += vx;
            sy += vy;
            n += 1.0;
        }
    }
    (sx / n, sy / n)
}

// ============================================================================
// FlowField
// ============================================================================

#[test]
fn test_flow_field_magnitude_and_orientation() {
    let dims = Dims::new(1, 3);
    let field = FlowField::new(
        Plane::new(dims, vec![3.0f64, 0.0, -1.0]),
        Plane::new(dims, vec![4.0f64, 2.0, 0.0]),
        SolveStats::default(),
        0.0,
    );
    assert_eq!(field.magnitude().pixels(), &[5.0, 2.0, 1.0]);
    let orientation = field.orientation();
    assert!((orientation[0] - (4.0f64).atan2(3.0)).abs() < 1e-12);
    assert!((orientation[1] - std::f64::consts::FRAC_PI_2).abs() < 1e-12);
    assert!((orientation[2] - std::f64::consts::PI).abs() < 1e-12);
    assert_eq!(field.get(2, 0), (-1.0, 0.0));
}

#[test]
#[should_panic(expected = "Velocity planes must have equal dimensions")]
fn test_flow_field_mismatched_planes_panics() {
    let _ = FlowField::new(
        Plane::new(Dims::new(1, 2), vec![0.0f32; 2]),
        Plane::new(Dims::new(2, 1), vec![0.0f32; 2]),
        SolveStats::default(),
        0.0,
    );
}

// ============================================================================
// LucasKanade
// ============================================================================

#[test]
fn test_lk_first_frame_is_zero_flow() {
    init_tracing();
    let dims = Dims::new(24, 24);
    let mut estimator = LucasKanade::<f32>::new(dims, LkConfig::default()).unwrap();
    let field = estimator.estimate(&translated(dims, 0.0, 0.0)).unwrap();
    assert!(field.vx().iter().all(|&v| v == 0.0));
    assert!(field.vy().iter().all(|&v| v == 0.0));
    assert_eq!(field.latency(), 0.0);
}

#[test]
fn test_lk_tracks_translation() {
    let dims = Dims::new(40, 40);
    let mut estimator = LucasKanade::<f32>::new(dims, LkConfig::default()).unwrap();
    estimator.estimate(&translated(dims, 0.0, 0.0)).unwrap();
    let field = estimator.estimate(&translated(dims, 0.25, 0.0)).unwrap();

    let (mx, my) = interior_mean(&field, 8);
    assert!((mx - 0.25).abs() < 0.05, "mean vx = {}", mx);
    assert!(my.abs() < 0.05, "mean vy = {}", my);
    assert!(field.stats().full > field.stats().total() / 2);
}

#[test]
fn test_lk_reset_forgets_previous_frame() {
    let dims = Dims::new(16, 16);
    let mut estimator = LucasKanade::<f32>::new(dims, LkConfig::default()).unwrap();
    estimator.estimate(&translated(dims, 0.0, 0.0)).unwrap();
    estimator.reset();
    let field = estimator.estimate(&translated(dims, 0.5, 0.0)).unwrap();
    assert!(field.vx().iter().all(|&v| v == 0.0));
}

#[test]
fn test_lk_wrong_frame_size_is_error() {
    let dims = Dims::new(4, 4);
    let mut estimator = LucasKanade::<u8>::new(dims, LkConfig::default()).unwrap();
    let err = estimator.estimate(&[0u8; 15]).unwrap_err();
    assert_eq!(
        err,
        Error::DimensionMismatch {
            dims,
            expected: 16,
            actual: 15
        }
    );
}

#[test]
fn test_lk_rejects_empty_dims_and_bad_config() {
    assert_eq!(
        LucasKanade::<f64>::new(Dims::new(0, 4), LkConfig::default()).unwrap_err(),
        Error::EmptyDims(Dims::new(0, 4))
    );
    let config = LkConfig {
        noise_threshold: -1.0,
        ..Default::default()
    };
    assert!(LucasKanade::<f64>::new(Dims::new(4, 4), config).is_err());
}

// ============================================================================
// LucasKanadeDog
// ============================================================================

#[test]
fn test_dog_history_fills_up() {
    let dims = Dims::new(12, 12);
    let mut estimator = LucasKanadeDog::<f32>::new(dims, DogConfig::default()).unwrap();
    assert_eq!(estimator.history_len(), 0);

    let first = estimator.estimate(&translated(dims, 0.0, 0.0)).unwrap();
    assert!(first.vx().iter().all(|&v| v == 0.0));
    assert_eq!(first.latency(), 1.0);
    assert_eq!(estimator.history_len(), 1);

    for t in 1..5 {
        estimator.estimate(&translated(dims, t as f64, 0.0)).unwrap();
    }
    assert_eq!(estimator.history_len(), 2);

    estimator.reset();
    assert_eq!(estimator.history_len(), 0);
}

#[test]
fn test_dog_tracks_translation() {
    init_tracing();
    let dims = Dims::new(48, 48);
    let mut estimator = LucasKanadeDog::<f32>::new(dims, DogConfig::default()).unwrap();
    let (vx, vy) = (0.4, 0.3);
    let mut field = None;
    for t in 0..4 {
        let t = t as f64;
        field = Some(estimator.estimate(&translated(dims, vx * t, vy * t)).unwrap());
    }
    let field = field.unwrap();

    let (mx, my) = interior_mean(&field, 12);
    assert!((mx - vx as f32).abs() < 0.05, "mean vx = {}", mx);
    assert!((my - vy as f32).abs() < 0.05, "mean vy = {}", my);
}

#[test]
fn test_dog_static_scene_is_zero_flow() {
    let dims = Dims::new(20, 20);
    let config = DogConfig {
        include_normal_flow: true,
        ..Default::default()
    };
    let mut estimator = LucasKanadeDog::<f64>::new(dims, config).unwrap();
    let frame: Vec<f64> = sample_plane(dims, |x, y| 20.0 * texture(x, y));
    for _ in 0..4 {
        let field = estimator.estimate(&frame).unwrap();
        assert!(field.vx().iter().all(|&v| v == 0.0));
        assert!(field.vy().iter().all(|&v| v == 0.0));
    }
}

#[test]
fn test_dog_invalid_config_is_error() {
    let config = DogConfig {
        num_frames: 1,
        ..Default::default()
    };
    assert_eq!(
        LucasKanadeDog::<u8>::new(Dims::new(4, 4), config).unwrap_err(),
        Error::TooFewFrames(1)
    );
}

#[test]
fn test_dog_wrong_frame_size_is_error() {
    let dims = Dims::new(3, 3);
    let mut estimator = LucasKanadeDog::<f64>::new(dims, DogConfig::default()).unwrap();
    assert!(matches!(
        estimator.estimate(&[0.0; 10]),
        Err(Error::DimensionMismatch { actual: 10, .. })
    ));
    assert_eq!(estimator.history_len(), 0);
}
