//! Properties that hold for every input, checked through the public API.

mod helpers;

use helpers::{init_tracing, random_frame_u8, sample_plane, shifted_texture, to_f32};
use lkflow::convolution::{convolve_2d, convolve_separable, outer_product};
use lkflow::{
    dog_flow_f32, dog_flow_f64, dog_flow_u8, gaussian_derivative_kernel_1d, gaussian_kernel_1d,
    lk_flow_f32, lk_flow_f64, lk_flow_u8, DelayLine, Dims, DogConfig, DogKernels, DogParams,
    FlowOutput, LkParams,
};

fn dog_kernels_f64() -> DogKernels<f64> {
    DogConfig::default().kernels().unwrap()
}

// ============================================================================
// Zero motion
// ============================================================================

#[test]
fn test_identical_frames_give_zero_flow() {
    init_tracing();
    let dims = Dims::new(32, 40);
    let frame: Vec<f64> = shifted_texture(dims, 0.0, 0.0);

    let mut out = FlowOutput::new(dims);
    lk_flow_f64(&frame, &frame, dims, &LkParams::new(0.0, true), &mut out);
    assert!(out.vel_c.iter().all(|&v| v == 0.0));
    assert!(out.vel_r.iter().all(|&v| v == 0.0));

    let delay_line = [frame.clone(), frame.clone()].concat();
    let mut out = FlowOutput::new(dims);
    dog_flow_f64(
        &frame,
        &delay_line,
        &[0, 1],
        &dog_kernels_f64(),
        dims,
        &DogParams::new(0.0, true),
        &mut out,
    );
    assert!(out.vel_c.iter().all(|&v| v == 0.0));
    assert!(out.vel_r.iter().all(|&v| v == 0.0));
}

// ============================================================================
// Threshold
// ============================================================================

#[test]
fn test_raising_threshold_only_removes_full_estimates() {
    let dims = Dims::new(32, 32);
    let a = random_frame_u8(dims, 7);
    let b = random_frame_u8(dims, 8);

    let mut low = FlowOutput::new(dims);
    let mut high = FlowOutput::new(dims);
    let low_stats = lk_flow_u8(&a, &b, dims, &LkParams::new(10.0, false), &mut low);
    let high_stats = lk_flow_u8(&a, &b, dims, &LkParams::new(5000.0, false), &mut high);

    assert!(high_stats.full <= low_stats.full);
    for i in 0..dims.len() {
        if high.vel_c[i] != 0.0 || high.vel_r[i] != 0.0 {
            assert_eq!(high.vel_c[i], low.vel_c[i]);
            assert_eq!(high.vel_r[i], low.vel_r[i]);
        }
    }
}

// ============================================================================
// Sample promotion
// ============================================================================

#[test]
fn test_u8_input_matches_f32_input() {
    let dims = Dims::new(24, 20);
    let frames: Vec<Vec<u8>> = (0..3).map(|seed| random_frame_u8(dims, seed)).collect();
    let frames_f32: Vec<Vec<f32>> = frames.iter().map(|f| to_f32(f)).collect();
    let params = LkParams::new(1.0, true);

    let mut out_u8 = FlowOutput::new(dims);
    let mut out_f32 = FlowOutput::new(dims);
    lk_flow_u8(&frames[0], &frames[1], dims, &params, &mut out_u8);
    lk_flow_f32(&frames_f32[0], &frames_f32[1], dims, &params, &mut out_f32);
    assert_eq!(out_u8, out_f32);

    let kernels: DogKernels<f32> = DogConfig::default().kernels().unwrap();
    let delay_u8 = [frames[0].clone(), frames[1].clone()].concat();
    let delay_f32 = [frames_f32[0].clone(), frames_f32[1].clone()].concat();
    dog_flow_u8(&frames[2], &delay_u8, &[1, 0], &kernels, dims, &params, &mut out_u8);
    dog_flow_f32(&frames_f32[2], &delay_f32, &[1, 0], &kernels, dims, &params, &mut out_f32);
    assert_eq!(out_u8, out_f32);
}

// ============================================================================
// Filters
// ============================================================================

#[test]
fn test_separable_filter_matches_direct_filter() {
    let dims = Dims::new(17, 23);
    let input: Vec<f64> = sample_plane(dims, |x, y| (x * 0.7).sin() * 10.0 + y * y * 0.1);
    let kx: Vec<f64> = gaussian_derivative_kernel_1d(1.2);
    let ky: Vec<f64> = gaussian_kernel_1d(0.8);

    let mut separable = vec![0.0; dims.len()];
    let mut scratch = vec![0.0; dims.len()];
    convolve_separable(&input, &mut separable, &mut scratch, dims, &kx, &ky);

    let (kernel, kernel_dims) = outer_product(&kx, &ky);
    let mut direct = vec![0.0; dims.len()];
    convolve_2d(&input, &mut direct, dims, &kernel, kernel_dims);

    for (s, d) in separable.iter().zip(&direct) {
        assert!((s - d).abs() < 1e-9, "{} vs {}", s, d);
    }
}

#[test]
fn test_constant_image_has_no_boundary_gradient() {
    let dims = Dims::new(9, 6);
    let frame = vec![42.0f64; dims.len()];
    let mut out = FlowOutput::new(dims);
    lk_flow_f64(&frame, &frame, dims, &LkParams::new(0.0, true), &mut out);

    // Replicated borders keep the gradients of a flat image at zero everywhere.
    assert!(out.moments.xx.iter().all(|&v| v == 0.0));
    assert!(out.moments.yy.iter().all(|&v| v == 0.0));
}

// ============================================================================
// Frame history
// ============================================================================

#[test]
fn test_delay_line_table_matches_hand_ordered_history() {
    let dims = Dims::new(16, 16);
    let frames: Vec<Vec<f64>> = (0..6).map(|t| shifted_texture(dims, 0.3 * t as f64, 0.0)).collect();
    let kernels = dog_kernels_f64();
    let params = DogParams::new(0.0039, false);

    // Stream through a two-slot ring so the slots wrap around.
    let mut history = DelayLine::new(dims, 2);
    for frame in &frames[..5] {
        history.push(frame);
    }
    let mut from_ring = FlowOutput::new(dims);
    let table = history.index_table();
    dog_flow_f64(&frames[5], history.buffer(), &table, &kernels, dims, &params, &mut from_ring);

    let ordered = [frames[3].clone(), frames[4].clone()].concat();
    let mut from_ordered = FlowOutput::new(dims);
    dog_flow_f64(&frames[5], &ordered, &[0, 1], &kernels, dims, &params, &mut from_ordered);

    assert_eq!(from_ring, from_ordered);
}

// ============================================================================
// Parallelism
// ============================================================================

#[test]
fn test_result_independent_of_thread_count() {
    let dims = Dims::new(37, 29);
    let a = random_frame_u8(dims, 21);
    let b = random_frame_u8(dims, 22);
    let c = random_frame_u8(dims, 23);
    let delay_line = [a.clone(), b.clone()].concat();
    let kernels: DogKernels<f32> = DogConfig::default().kernels().unwrap();
    let params = LkParams::new(1.0, true);

    let run = |threads: usize| {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build()
            .unwrap();
        pool.install(|| {
            let mut lk = FlowOutput::new(dims);
            let mut dog = FlowOutput::new(dims);
            lk_flow_u8(&a, &b, dims, &params, &mut lk);
            dog_flow_u8(&c, &delay_line, &[0, 1], &kernels, dims, &params, &mut dog);
            (lk, dog)
        })
    };

    assert_eq!(run(1), run(4));
}
