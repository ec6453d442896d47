//! Profile Codec Benchmarks
//!
//! Decode and encode cost for a small greyscale profile and a profile with
//! full-size tone curves and a vcgt table.

use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use iccp_core::{CurveSpec, D50, Profile, TagSignature, blackshift};

fn greyscale_profile() -> Profile {
    let mut profile = Profile::new();
    profile.greyscale_input();
    profile
        .add_tags([(TagSignature::GRAY_TRC, CurveSpec::sampled(blackshift(0.07)))])
        .unwrap();
    profile
}

fn rgb_profile(samples: usize) -> Profile {
    let srgb = |x: f64| {
        if x <= 0.04045 {
            x / 12.92
        } else {
            ((x + 0.055) / 1.055).powf(2.4)
        }
    };
    let mut profile = Profile::new();
    profile.add_tags([(TagSignature::MEDIA_WHITE, D50)]).unwrap();
    for sig in [TagSignature::RED_TRC, TagSignature::GREEN_TRC, TagSignature::BLUE_TRC] {
        profile
            .add_tags([(
                sig,
                CurveSpec::Sampled {
                    f: std::sync::Arc::new(srgb),
                    n: samples,
                },
            )])
            .unwrap();
    }
    profile
}

// ============================================================================
// Decode
// ============================================================================

fn bench_decode(c: &mut Criterion) {
    let mut group = c.benchmark_group("decode");

    let grey = greyscale_profile().to_bytes().unwrap();
    group.throughput(Throughput::Bytes(grey.len() as u64));
    group.bench_function("greyscale", |b| {
        b.iter(|| Profile::from_bytes(black_box(&grey)).unwrap())
    });

    for samples in [256, 1024, 4096] {
        let bytes = rgb_profile(samples).to_bytes().unwrap();
        group.throughput(Throughput::Bytes(bytes.len() as u64));
        group.bench_with_input(BenchmarkId::new("rgb_trc", samples), &bytes, |b, bytes| {
            b.iter(|| Profile::from_bytes(black_box(bytes)).unwrap())
        });
    }

    group.finish();
}

// ============================================================================
// Encode
// ============================================================================

fn bench_encode(c: &mut Criterion) {
    let mut group = c.benchmark_group("encode");

    let grey = greyscale_profile();
    group.bench_function("greyscale", |b| b.iter(|| black_box(&grey).to_bytes().unwrap()));

    for samples in [256, 1024, 4096] {
        let profile = rgb_profile(samples);
        group.bench_with_input(BenchmarkId::new("rgb_trc", samples), &profile, |b, profile| {
            b.iter(|| black_box(profile).to_bytes().unwrap())
        });
    }

    group.bench_function("sample_blackshift_curve", |b| {
        b.iter(|| {
            let mut profile = Profile::new();
            profile
                .add_tags([(
                    TagSignature::GRAY_TRC,
                    CurveSpec::sampled(blackshift(black_box(0.07))),
                )])
                .unwrap();
            profile
        })
    });

    group.finish();
}

criterion_group!(benches, bench_decode, bench_encode);
criterion_main!(benches);
