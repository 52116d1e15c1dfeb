//! Fan generation throughput over a mid-latitude thermocline.

use bathyray_profile::{build_profile, SoundSpeedProfile};
use bathyray_trace::{generate_fan, trace_ray};
use criterion::{black_box, criterion_group, criterion_main, Criterion};

fn thermocline() -> SoundSpeedProfile {
    build_profile(
        &[0.0, 25.0, 50.0, 75.0, 100.0, 150.0, 200.0, 300.0, 500.0, 1000.0, 2000.0, 3000.0],
        &[24.0, 23.8, 23.1, 20.5, 17.0, 14.2, 12.5, 10.1, 7.8, 4.9, 3.1, 2.4],
        None,
        None,
    )
    .expect("benchmark profile")
}

fn bench_profile(c: &mut Criterion) {
    c.bench_function("build_profile_3000m", |b| b.iter(|| black_box(thermocline())));
}

fn bench_single_ray(c: &mut Criterion) {
    let profile = thermocline();
    c.bench_function("trace_ray_5deg_20km", |b| {
        b.iter(|| trace_ray(black_box(&profile), 5.0, Some(50.0), Some(20_000.0)))
    });
}

fn bench_fan(c: &mut Criterion) {
    let profile = thermocline();
    c.bench_function("fan_41_rays_20km", |b| {
        b.iter(|| generate_fan(black_box(&profile), 0.0, 41, 0.5, Some(50.0), Some(20_000.0)))
    });
}

criterion_group!(benches, bench_profile, bench_single_ray, bench_fan);
criterion_main!(benches);
