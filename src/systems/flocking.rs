//! Flocking system - separation, alignment and cohesion for flocks and schools.
//!
//! Each group is processed in two phases:
//!
//! 1. **Gather**: copy every member's position and velocity into a snapshot.
//! 2. **Compute/apply**: derive each member's steering from the snapshot only,
//!    cap it at the member's `max_force`, and write it into `acceleration`.
//!
//! Since no member reads state written in the same tick, member order does
//! not change the result. With `--features parallel` the compute phase fans
//! out over rayon; output is identical to the sequential build.

use crate::components::*;
use crate::config::GroupToggles;
use crate::resources::GroupRegistry;
use crate::steering::{flocking_forces, limit, NeighborState, SteeringForces};
use bevy_ecs::prelude::*;
use glam::Vec3;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Steering for every member of `flock`, in member order.
pub fn compute_forces(flock: &[NeighborState], params: &SteeringParams) -> Vec<SteeringForces> {
    #[cfg(feature = "parallel")]
    {
        (0..flock.len())
            .into_par_iter()
            .map(|i| flocking_forces(i, flock, params))
            .collect()
    }

    #[cfg(not(feature = "parallel"))]
    {
        (0..flock.len())
            .map(|i| flocking_forces(i, flock, params))
            .collect()
    }
}

/// Reset each flocking member's acceleration to its capped steering force.
pub fn flocking_system(
    toggles: Res<GroupToggles>,
    registry: Res<GroupRegistry>,
    groups: Query<(&Group, &SteeringParams)>,
    mut agents: Query<&mut Agent>,
) {
    for entity in registry.iter() {
        let Ok((group, params)) = groups.get(entity) else {
            continue;
        };
        if !group.kind.is_flocking() || !toggles.is_enabled(group.kind) {
            continue;
        }

        // GATHER
        let (members, flock): (Vec<Entity>, Vec<NeighborState>) = group
            .members
            .iter()
            .filter_map(|&member| {
                agents
                    .get(member)
                    .ok()
                    .map(|agent| (member, NeighborState::from(agent)))
            })
            .unzip();

        // COMPUTE
        let forces = compute_forces(&flock, params);

        // APPLY
        for (member, steering) in members.into_iter().zip(forces) {
            if let Ok(mut agent) = agents.get_mut(member) {
                let cap = agent.max_force;
                agent.acceleration = Vec3::ZERO;
                agent.apply_force(limit(steering.combined(), cap));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bird_params() -> SteeringParams {
        SteeringParams {
            separation_weight: 0.3,
            alignment_weight: 0.2,
            cohesion_weight: 0.1,
            perception_radius: 15.0,
        }
    }

    fn setup(kind: GroupKind, agents: &[Agent]) -> (World, Vec<Entity>) {
        let mut world = World::new();
        world.insert_resource(GroupToggles::default());
        let mut registry = GroupRegistry::default();

        let members: Vec<Entity> = agents.iter().map(|&a| world.spawn(a).id()).collect();
        let group = world
            .spawn((
                Group {
                    id: GroupId(0),
                    kind,
                    members: members.clone(),
                },
                bird_params(),
            ))
            .id();
        registry.register(group);
        world.insert_resource(registry);
        (world, members)
    }

    fn run(world: &mut World) {
        let mut schedule = Schedule::default();
        schedule.add_systems(flocking_system);
        schedule.run(world);
    }

    #[test]
    fn test_pair_pushes_apart() {
        let (mut world, members) = setup(
            GroupKind::Flock,
            &[
                Agent::new(Vec3::new(0.0, 50.0, 0.0), Vec3::ZERO, 10.0, 0.5),
                Agent::new(Vec3::new(1.0, 50.0, 0.0), Vec3::ZERO, 10.0, 0.5),
            ],
        );
        run(&mut world);

        let a = world.get::<Agent>(members[0]).unwrap().acceleration;
        let b = world.get::<Agent>(members[1]).unwrap().acceleration;
        // separation 0.3 away, cohesion 0.1 toward, no alignment
        assert!((a - Vec3::new(-0.2, 0.0, 0.0)).length() < 1e-6);
        assert!((b - Vec3::new(0.2, 0.0, 0.0)).length() < 1e-6);
    }

    #[test]
    fn test_combined_force_is_capped() {
        let mut moving = Agent::new(Vec3::new(2.0, 50.0, 0.0), Vec3::new(0.0, 0.0, 5.0), 10.0, 0.5);
        moving.max_force = 10.0;
        let (mut world, members) = setup(
            GroupKind::Flock,
            &[
                Agent::new(Vec3::new(0.0, 50.0, 0.0), Vec3::ZERO, 10.0, 0.25),
                moving,
            ],
        );
        run(&mut world);

        let capped = world.get::<Agent>(members[0]).unwrap().acceleration;
        assert!(capped.length() <= 0.25 + 1e-6);
        assert!(capped.length() > 0.0);
    }

    #[test]
    fn test_stale_acceleration_is_cleared() {
        let mut lonely = Agent::new(Vec3::new(0.0, 50.0, 0.0), Vec3::ZERO, 10.0, 0.5);
        lonely.acceleration = Vec3::splat(3.0);
        let (mut world, members) = setup(GroupKind::School, &[lonely]);
        run(&mut world);

        assert_eq!(world.get::<Agent>(members[0]).unwrap().acceleration, Vec3::ZERO);
    }

    #[test]
    fn test_herds_do_not_flock() {
        let (mut world, members) = setup(
            GroupKind::Herd,
            &[
                Agent::new(Vec3::new(0.0, 0.0, 0.0), Vec3::ZERO, 2.0, 0.0),
                Agent::new(Vec3::new(1.0, 0.0, 0.0), Vec3::ZERO, 2.0, 0.0),
            ],
        );
        run(&mut world);

        assert_eq!(world.get::<Agent>(members[0]).unwrap().acceleration, Vec3::ZERO);
    }

    #[test]
    fn test_member_order_does_not_matter() {
        let agents = [
            Agent::new(Vec3::new(0.0, 50.0, 0.0), Vec3::new(1.0, 0.0, 0.0), 10.0, 0.5),
            Agent::new(Vec3::new(3.0, 52.0, 1.0), Vec3::new(0.0, 1.0, 0.0), 10.0, 0.5),
            Agent::new(Vec3::new(-2.0, 49.0, 4.0), Vec3::new(0.0, 0.0, 1.0), 10.0, 0.5),
        ];
        let reversed = [agents[2], agents[1], agents[0]];

        let (mut forward, fwd) = setup(GroupKind::Flock, &agents);
        let (mut backward, bwd) = setup(GroupKind::Flock, &reversed);
        run(&mut forward);
        run(&mut backward);

        for i in 0..3 {
            let a = forward.get::<Agent>(fwd[i]).unwrap().acceleration;
            let b = backward.get::<Agent>(bwd[2 - i]).unwrap().acceleration;
            assert!((a - b).length() < 1e-6);
        }
    }

    #[test]
    fn test_compute_forces_matches_sequential_scan() {
        let flock: Vec<NeighborState> = (0..12)
            .map(|i| {
                let t = i as f32;
                NeighborState {
                    position: Vec3::new(
                        (t * 1.7).sin() * 8.0,
                        50.0 + t * 0.5,
                        (t * 0.9).cos() * 8.0,
                    ),
                    velocity: Vec3::new(1.0, (t * 0.3).sin(), t * 0.1),
                }
            })
            .collect();
        let params = bird_params();

        let batched = compute_forces(&flock, &params);
        let sequential: Vec<SteeringForces> = (0..flock.len())
            .map(|i| flocking_forces(i, &flock, &params))
            .collect();

        assert_eq!(batched, sequential);
        assert!(batched.iter().any(|f| f.neighbors > 0));
        assert!(compute_forces(&[], &params).is_empty());
    }
}
