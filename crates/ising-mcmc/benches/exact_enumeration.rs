use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use ising_core::IsingHamiltonian1D;

use ising_mcmc::compute_average_values;

fn bench_exact(c: &mut Criterion) {
    let ham = IsingHamiltonian1D::uniform(-1.0, 1.0, 0.1, true);
    let mut group = c.benchmark_group("exact_enumeration");
    for sites in [10usize, 14, 18] {
        group.bench_with_input(BenchmarkId::from_parameter(sites), &sites, |b, &sites| {
            b.iter(|| compute_average_values(sites, &ham, 2.0).unwrap())
        });
    }
    group.finish();
}

criterion_group!(benches, bench_exact);
criterion_main!(benches);
