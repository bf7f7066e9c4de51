use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use fauna_sim::steering::NeighborState;
use fauna_sim::{compute_forces, Ecosystem, EcosystemConfig, GroupConfig, GroupKind};
use glam::Vec3;

fn ring(n: usize) -> Vec<NeighborState> {
    (0..n)
        .map(|i| {
            let angle = i as f32 / n as f32 * std::f32::consts::TAU;
            NeighborState {
                position: Vec3::new(angle.cos() * 8.0, 50.0 + (i % 3) as f32, angle.sin() * 8.0),
                velocity: Vec3::new(-angle.sin(), 0.0, angle.cos()) * 4.0,
            }
        })
        .collect()
}

fn bench_forces(c: &mut Criterion) {
    let params = GroupConfig::bird().steering_params();
    let mut group = c.benchmark_group("flocking_forces");
    for size in [10usize, 30, 100] {
        let flock = ring(size);
        group.bench_with_input(BenchmarkId::from_parameter(size), &flock, |b, flock| {
            b.iter(|| compute_forces(black_box(flock), &params))
        });
    }
    group.finish();
}

fn bench_tick(c: &mut Criterion) {
    let mut group = c.benchmark_group("ecosystem_tick");
    for size in [10usize, 30, 100] {
        let mut eco = Ecosystem::new(EcosystemConfig::empty(7)).expect("config");
        eco.spawn_group(
            GroupKind::Flock,
            &GroupConfig::bird().with_member_count(size),
            Vec3::new(0.0, 50.0, 0.0),
        )
        .expect("spawn");
        group.bench_function(BenchmarkId::from_parameter(size), |b| {
            b.iter(|| eco.step(black_box(1.0 / 60.0)).expect("step"))
        });
    }
    group.finish();
}

criterion_group!(benches, bench_forces, bench_tick);
criterion_main!(benches);
