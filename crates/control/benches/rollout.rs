use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use control::{ControllerConfig, ExecutionTarget, ObservationBuilder, PathIntegralController};

fn bench_first_step(c: &mut Criterion) {
    let obs = ObservationBuilder::new()
        .position(3.0, 3.0)
        .obstacle(-2.0, -2.0)
        .build();

    let mut group = c.benchmark_group("controller_first_step");
    group.sample_size(10);
    for target in [ExecutionTarget::Cpu, ExecutionTarget::Parallel] {
        let config = ControllerConfig {
            sample_count: 2_000,
            target,
            ..ControllerConfig::navigation_scenario()
        };
        let Ok(mut controller) = PathIntegralController::new(config) else {
            continue;
        };
        group.bench_with_input(BenchmarkId::from_parameter(target), &obs, |b, obs| {
            b.iter(|| {
                controller.reset(obs).unwrap();
                controller.step(obs).unwrap().control
            });
        });
    }
    group.finish();
}

criterion_group!(benches, bench_first_step);
criterion_main!(benches);
