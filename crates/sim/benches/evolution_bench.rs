use clonal_sim::evolution::Dfe;
use clonal_sim::simulation::{
    evolve, ModelParams, ModelParamsBuilder, Population, RecordNothing, ReproductionMode,
};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use rand::SeedableRng;
use rand_xoshiro::Xoshiro256PlusPlus;

fn params(size: u32, generations: usize, theta: f64) -> ModelParams {
    let four_n = 4.0 * f64::from(size);
    ModelParamsBuilder::new()
        .constant_size(size, generations)
        .neutral_region(0.0, 1.0, 1.0)
        .selected_region(0.0, 1.0, 1.0, Dfe::Gamma { mean: -0.05, shape: 0.3 }, 0.5)
        .recombination_region(0.0, 1.0, 1.0)
        .mutation_rates(theta / four_n, theta / (11.0 * four_n))
        .recombination_rate(theta / four_n)
        .build()
        .unwrap()
}

/// A population after `4N` generations of outcrossing.
fn burned_in(size: u32, theta: f64) -> Population {
    let mut rng = Xoshiro256PlusPlus::seed_from_u64(1);
    let mut pop = Population::new(size as usize);
    let burnin = params(size, 4 * size as usize, theta);
    evolve(&mut rng, &mut pop, &burnin, ReproductionMode::Outcrossing, &mut RecordNothing)
        .unwrap();
    pop
}

fn bench_generations(c: &mut Criterion) {
    let mut group = c.benchmark_group("ten_generations");
    group.sample_size(20);

    for &size in &[100u32, 500] {
        let start = burned_in(size, 50.0);
        let step = params(size, 10, 50.0);
        for mode in [ReproductionMode::Outcrossing, ReproductionMode::Clonal] {
            group.bench_with_input(
                BenchmarkId::new(mode.to_string(), size),
                &size,
                |b, _| {
                    let mut rng = Xoshiro256PlusPlus::seed_from_u64(2);
                    b.iter_batched(
                        || start.clone(),
                        |mut pop| {
                            evolve(&mut rng, &mut pop, &step, mode, &mut RecordNothing).unwrap();
                            black_box(pop.segregating())
                        },
                        criterion::BatchSize::LargeInput,
                    )
                },
            );
        }
    }
    group.finish();
}

criterion_group!(benches, bench_generations);
criterion_main!(benches);
