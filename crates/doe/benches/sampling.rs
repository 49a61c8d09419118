use criterion::{criterion_group, criterion_main, Criterion};
use optiseed_doe::{
    build_search_space, evaluate, generate, Dimension, SearchSpace, SeedOptions, StrategyKind,
};

fn unit_space(nx: usize) -> SearchSpace {
    let dims: Vec<Dimension> = (0..nx)
        .map(|i| Dimension::continuous(format!("x{i}"), 0., 1.))
        .collect();
    build_search_space(&dims).expect("valid space")
}

fn criterion_strategies(c: &mut Criterion) {
    let mut group = c.benchmark_group("seeding");
    group.sample_size(10);
    let space = unit_space(10);
    let options = SeedOptions::default();
    for kind in StrategyKind::ALL {
        group.bench_function(format!("{kind}-10-dim-128-size"), |b| {
            b.iter(|| std::hint::black_box(generate(&space, kind.name(), 128, 42, &options)));
        });
    }
    group.finish();
}

fn criterion_metrics(c: &mut Criterion) {
    let mut group = c.benchmark_group("metrics");
    group.sample_size(10);
    for size in [100, 1000] {
        let pop = generate(&unit_space(10), "sobol", size, 42, &SeedOptions::default())
            .expect("valid generation");
        group.bench_function(format!("evaluate-10-dim-{size}-size"), |b| {
            b.iter(|| std::hint::black_box(evaluate(&pop)));
        });
    }
    group.finish();
}

criterion_group!(benches, criterion_strategies, criterion_metrics);
criterion_main!(benches);
