//! Performance benchmarks for the recovery engine
//!
//! Measures execution time for the hot paths: embedding, spectral
//! transforms, triangulation and curve arithmetic.

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use rand::rngs::StdRng;
use rand::SeedableRng;

use georecover::anchors::AnchorStore;
use georecover::embedding::Embedder;
use georecover::math::bigint::BigInt256;
use georecover::math::curve::Curve;
use georecover::oscillation::{dft, fft, Complex};
use georecover::triangulate;

fn bench_scalar_multiplication(c: &mut Criterion) {
    let curve = Curve::secp128r1();
    let scalar = BigInt256::from_u64(0x123456789ABCDEF);

    c.bench_function("scalar_mul_base", |b| {
        b.iter(|| curve.scalar_mul_base(&scalar));
    });
}

fn bench_embed_scalar(c: &mut Criterion) {
    let embedder = Embedder::new(13, 16);
    let k = BigInt256::from_u64(0xDEADBEEF);

    c.bench_function("embed_scalar_d13", |b| {
        b.iter(|| embedder.embed_scalar(&k));
    });
}

fn bench_transforms(c: &mut Criterion) {
    let mut group = c.benchmark_group("transforms");
    for &n in &[64usize, 256, 1024, 4096] {
        let signal: Vec<Complex> = (0..n)
            .map(|i| Complex::from_real((i as f64 * 0.1).sin()))
            .collect();
        group.bench_with_input(BenchmarkId::new("fft", n), &signal, |b, s| {
            b.iter(|| fft(s).unwrap());
        });
        if n <= 256 {
            group.bench_with_input(BenchmarkId::new("dft", n), &signal, |b, s| {
                b.iter(|| dft(s));
            });
        }
    }
    group.finish();
}

fn bench_triangulation(c: &mut Criterion) {
    let curve = Curve::secp128r1();
    let embedder = Embedder::new(13, curve.coord_bytes());
    let mut rng = StdRng::seed_from_u64(42);
    let mut anchors = AnchorStore::new();
    for _ in 0..100 {
        let k = curve.rand_scalar(&mut rng);
        let q = curve.scalar_mul_base(&k);
        anchors.add(k, q, &embedder);
    }
    let target = embedder.embed_scalar(&BigInt256::from_u64(777));

    c.bench_function("triangulate_100_anchors", |b| {
        b.iter(|| triangulate::triangulate(&target, &anchors, &curve.n));
    });
    c.bench_function("triangulate_truncation_100_anchors", |b| {
        b.iter(|| triangulate::triangulate_k_with_truncation(&target, &anchors, &curve.n));
    });
}

criterion_group!(
    benches,
    bench_scalar_multiplication,
    bench_embed_scalar,
    bench_transforms,
    bench_triangulation
);
criterion_main!(benches);
