//! Benchmarks for layout objectives and the particle step.

use std::sync::Arc;

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use graph_swarm_core::prelude::*;

/// `count` singleton swarms scattered over the default view, plus one agent
fn neighbourhood(count: usize) -> (Vec<Arc<Particle>>, Arc<Particle>) {
    let config = ParticleSwarmConfig::default().with_rng_seed(7);
    let anchor = PlanarGraphLayout::new(LayoutObjective::ViewCenter, Vec::new());
    let nodes: Vec<_> = (0..count)
        .map(|_| {
            let p = Particle::with_problem(&anchor, config.clone());
            let _ = p.randomize(&[0.0, 0.0], &[800.0, 600.0]);
            p
        })
        .collect();
    let agent = Particle::with_problem(&anchor, config);
    let _ = agent.randomize(&[0.0, 0.0], &[800.0, 600.0]);
    (nodes, agent)
}

fn bench_objectives(c: &mut Criterion) {
    let mut group = c.benchmark_group("objective");

    for count in [2usize, 8, 32] {
        let (nodes, agent) = neighbourhood(count);
        let adjacent: Vec<_> = nodes.iter().filter_map(|p| p.swarm_group()).collect();

        for kind in [
            LayoutObjective::Equidistant,
            LayoutObjective::Center,
            LayoutObjective::EquiViewCenter,
            LayoutObjective::Adjacent,
        ] {
            let objective = kind.build(&adjacent);
            group.bench_with_input(
                BenchmarkId::new(format!("{kind:?}"), count),
                &count,
                |b, _| b.iter(|| objective.compute_fitness(black_box(&agent))),
            );
        }
    }

    group.finish();
}

fn bench_step(c: &mut Criterion) {
    let (nodes, _) = neighbourhood(4);
    let space = PlanarGraphLayout::from_representatives(LayoutObjective::Equidistant, &nodes);
    let swarm = Particle::swarm(&space, 8, ParticleSwarmConfig::default().with_rng_seed(11));
    for p in &swarm {
        let _ = p.randomize(&[0.0, 0.0], &[800.0, 600.0]);
    }

    c.bench_function("particle_step", |b| {
        b.iter(|| {
            for p in &swarm {
                let _ = black_box(p.step());
            }
        })
    });
}

criterion_group!(benches, bench_objectives, bench_step);
criterion_main!(benches);
