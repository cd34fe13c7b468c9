//! Benchmarks for motion estimation

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use image::{Rgba, RgbaImage};
use superres::{MotionConfig, MotionEstimator, SamplerKind};

fn create_test_frame(width: u32, height: u32, sx: i32, sy: i32) -> RgbaImage {
    RgbaImage::from_fn(width, height, |x, y| {
        let x = (x as i32 - sx) as f32;
        let y = (y as i32 - sy) as f32;
        let r = 128.0 + 100.0 * (0.13 * x + 0.07 * y).sin();
        let g = 128.0 + 100.0 * (0.05 * x - 0.11 * y).cos();
        let b = 128.0 + 100.0 * (0.09 * (x + y)).sin();
        Rgba([r as u8, g as u8, b as u8, 255])
    })
}

fn bench_motion_estimation(c: &mut Criterion) {
    let mut group = c.benchmark_group("motion_estimation");
    group.sample_size(10);

    let reference = create_test_frame(640, 480, 0, 0);
    let candidate = create_test_frame(640, 480, 6, -4);

    for kind in [
        SamplerKind::Uniform,
        SamplerKind::Gauss,
        SamplerKind::Edge,
        SamplerKind::Combined,
    ] {
        let estimator = MotionEstimator::new(MotionConfig {
            sampler: kind,
            seed: Some(1),
            ..Default::default()
        });

        group.bench_with_input(BenchmarkId::new("sampler", kind), &kind, |b, _| {
            b.iter(|| estimator.estimate(black_box(&reference), black_box(&candidate)))
        });
    }

    group.finish();
}

criterion_group!(benches, bench_motion_estimation);
criterion_main!(benches);
