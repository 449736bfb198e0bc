use criterion::{black_box, criterion_group, criterion_main, Criterion};

use ndint::benchmark::integrands::{GenzGaussian, SumOfSquares};
use ndint::midpoint::Midpoint;
use ndint::montecarlo::MonteCarlo;

fn midpoint_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("Midpoint 3D SumOfSquares");
    let boundaries3d = &[(0.0, 1.0), (0.0, 1.0), (0.0, 1.0)];
    let integrand = SumOfSquares::new(boundaries3d);
    let midpoint = Midpoint::new(50, boundaries3d).unwrap();

    group.bench_function("Scalar", |b| {
        b.iter(|| midpoint.integrate(black_box(&integrand)).unwrap())
    });

    group.bench_function("Rayon", |b| {
        b.iter(|| midpoint.integrate_par(black_box(&integrand)).unwrap())
    });

    group.bench_function("SIMD", |b| {
        b.iter(|| midpoint.integrate_simd(black_box(&integrand)).unwrap())
    });
    group.finish();
}

fn monte_carlo_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("MonteCarlo 5D GenzGaussian");
    let boundaries5d = &[(0.0, 1.0); 5];
    let integrand = GenzGaussian::new(5);
    let n_samples = 100_000;

    group.bench_function("Scalar", |b| {
        b.iter(|| {
            let mut mc = MonteCarlo::new(n_samples, boundaries5d).unwrap();
            mc.set_seed(1234);
            mc.integrate(black_box(&integrand)).unwrap()
        })
    });

    group.bench_function("Rayon", |b| {
        b.iter(|| {
            let mut mc = MonteCarlo::new(n_samples, boundaries5d).unwrap();
            mc.set_seed(1234);
            mc.integrate_par(black_box(&integrand)).unwrap()
        })
    });

    group.bench_function("SIMD", |b| {
        b.iter(|| {
            let mut mc = MonteCarlo::new(n_samples, boundaries5d).unwrap();
            mc.set_seed(1234);
            mc.integrate_simd(black_box(&integrand)).unwrap()
        })
    });
    group.finish();
}

criterion_group!(benches, midpoint_benchmark, monte_carlo_benchmark);
criterion_main!(benches);
