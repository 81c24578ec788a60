//! Landmark Extraction Benchmarks
//!
//! Run with: cargo bench -p landmark-engine --bench extract

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use landmark_engine::{ExtractorConfig, LandmarkExtractor};

fn apg_wave(len: usize) -> Vec<f64> {
    (0..len)
        .map(|i| {
            let t = i as f64 / len as f64;
            let noise = 0.03 * (i as f64 * 2.9).sin();
            (-(t * 12.0)).exp() * (t * 40.0).cos() + noise
        })
        .collect()
}

fn bench_extract(c: &mut Criterion) {
    let mut group = c.benchmark_group("extract");
    let naive = LandmarkExtractor::naive();
    let robust = match LandmarkExtractor::new(ExtractorConfig::noise_robust()) {
        Ok(extractor) => extractor,
        Err(e) => panic!("default robust config rejected: {e}"),
    };

    for len in [200usize, 1_000, 5_000] {
        let wave = apg_wave(len);
        group.throughput(Throughput::Elements(len as u64));

        group.bench_with_input(BenchmarkId::new("naive", len), &wave, |b, w| {
            b.iter(|| naive.extract(black_box(w)))
        });
        group.bench_with_input(BenchmarkId::new("noise_robust", len), &wave, |b, w| {
            b.iter(|| robust.extract(black_box(w)))
        });
    }

    group.finish();
}

criterion_group!(benches, bench_extract);
criterion_main!(benches);
