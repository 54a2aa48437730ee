use cim_domain_vsm::generator::{ProcessStep, WizardId};
use cim_domain_vsm::{
    templates, GraphGenerator, MetricsEngine, Simulation, ValueStreamMap, WizardInput,
};
use criterion::{black_box, criterion_group, criterion_main, Criterion};

fn long_line(steps: usize) -> WizardInput {
    WizardInput {
        processes: (1..=steps)
            .map(|i| ProcessStep {
                id: WizardId::new(i.to_string()),
                name: format!("Process {i}"),
                ct: 20.0 + (i % 7) as f64 * 5.0,
                ..Default::default()
            })
            .collect(),
        ..Default::default()
    }
}

fn to_map(payload: cim_domain_vsm::GraphPayload) -> ValueStreamMap {
    ValueStreamMap::from_parts(payload.nodes, payload.edges)
}

fn bench_metrics(c: &mut Criterion) {
    let engine = MetricsEngine::default();

    if let Ok(template) = templates::load("expert") {
        let map = to_map(template.payload());
        c.bench_function("metrics_expert_template", |b| {
            b.iter(|| engine.compute(black_box(&map), 60.0))
        });
    }

    let map = to_map(GraphGenerator::new(60.0).generate(&long_line(30)));
    c.bench_function("metrics_generated_30_steps", |b| {
        b.iter(|| engine.compute(black_box(&map), 60.0))
    });
}

fn bench_generator(c: &mut Criterion) {
    let input = long_line(30);
    let generator = GraphGenerator::new(60.0);
    c.bench_function("generate_30_steps", |b| {
        b.iter(|| generator.generate(black_box(&input)))
    });
}

fn bench_simulation(c: &mut Criterion) {
    let mut map = to_map(GraphGenerator::new(60.0).generate(&long_line(30)));
    let mut simulation = Simulation::default();
    simulation.start(&mut map);
    let mut now = 0.0;
    c.bench_function("simulation_tick_30_steps", |b| {
        b.iter(|| {
            now += 100.0;
            simulation.tick(&mut map, black_box(now))
        })
    });
}

criterion_group!(benches, bench_metrics, bench_generator, bench_simulation);
criterion_main!(benches);
