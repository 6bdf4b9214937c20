use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use pnn_viz::RbfInterpolator;
use std::hint::black_box;

fn scattered(n: usize) -> Vec<[f64; 3]> {
    // Deterministic low-discrepancy points over the default heat-map window.
    (0..n)
        .map(|i| {
            let u = (i as f64 * 0.618_033_988_75).fract();
            let v = (i as f64 * 0.754_877_666_25).fract();
            let x = 3000.0 * u;
            let y = 500.0 * v;
            [x, y, 1.0 / (1.0 + (-(x - 1500.0) / 300.0).exp())]
        })
        .collect()
}

fn bench_rbf(c: &mut Criterion) {
    let mut group = c.benchmark_group("rbf");
    group.sample_size(10);

    for n in [100usize, 250, 500, 1000] {
        let pts = scattered(n);
        group.bench_with_input(BenchmarkId::new("fit", n), &pts, |b, pts| {
            b.iter(|| black_box(RbfInterpolator::fit(black_box(pts)).unwrap()))
        });

        let rbf = RbfInterpolator::fit(&pts).unwrap();
        group.bench_with_input(BenchmarkId::new("eval_grid_100", n), &rbf, |b, rbf| {
            b.iter(|| {
                let mut acc = 0.0;
                for iy in 0..100 {
                    for ix in 0..100 {
                        acc += rbf.eval(30.0 * ix as f64, 5.0 * iy as f64);
                    }
                }
                black_box(acc)
            })
        });
    }
    group.finish();
}

criterion_group!(benches, bench_rbf);
criterion_main!(benches);
