//! Containment system - pushes flocks and schools back inside their bounds.

use crate::components::*;
use crate::config::GroupToggles;
use crate::resources::GroupRegistry;
use crate::steering::containment_force;
use bevy_ecs::prelude::*;

/// Add the soft-bounds push to every member of an enabled group.
///
/// Runs after steering and is not subject to `max_force`. Reflecting bounds
/// contribute nothing here; the wander system handles them.
pub fn containment_system(
    toggles: Res<GroupToggles>,
    registry: Res<GroupRegistry>,
    groups: Query<(&Group, &Containment)>,
    mut agents: Query<&mut Agent>,
) {
    for entity in registry.iter() {
        let Ok((group, containment)) = groups.get(entity) else {
            continue;
        };
        if !toggles.is_enabled(group.kind) {
            continue;
        }

        for &member in &group.members {
            if let Ok(mut agent) = agents.get_mut(member) {
                let push = containment_force(agent.position, containment);
                agent.apply_force(push);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    fn run_with(kind: GroupKind, containment: Containment, position: Vec3) -> Vec3 {
        let mut world = World::new();
        world.insert_resource(GroupToggles::default());
        let member = world.spawn(Agent::new(position, Vec3::ZERO, 10.0, 0.5)).id();
        let group = world
            .spawn((
                Group {
                    id: GroupId(0),
                    kind,
                    members: vec![member],
                },
                containment,
            ))
            .id();
        let mut registry = GroupRegistry::default();
        registry.register(group);
        world.insert_resource(registry);

        let mut schedule = Schedule::default();
        schedule.add_systems(containment_system);
        schedule.run(&mut world);

        world.get::<Agent>(member).unwrap().acceleration
    }

    fn sky() -> Containment {
        Containment::Soft {
            horizontal: 400.0,
            band: AltitudeBand::new(20.0, 100.0),
            turn_factor: 0.5,
        }
    }

    #[test]
    fn test_push_opposes_each_face() {
        assert!(run_with(GroupKind::Flock, sky(), Vec3::new(401.0, 50.0, 0.0)).x < 0.0);
        assert!(run_with(GroupKind::Flock, sky(), Vec3::new(-401.0, 50.0, 0.0)).x > 0.0);
        assert!(run_with(GroupKind::Flock, sky(), Vec3::new(0.0, 50.0, 401.0)).z < 0.0);
        assert!(run_with(GroupKind::Flock, sky(), Vec3::new(0.0, 50.0, -401.0)).z > 0.0);
        assert!(run_with(GroupKind::Flock, sky(), Vec3::new(0.0, 101.0, 0.0)).y < 0.0);
        assert!(run_with(GroupKind::Flock, sky(), Vec3::new(0.0, 19.0, 0.0)).y > 0.0);
    }

    #[test]
    fn test_corner_pushes_on_every_axis() {
        let push = run_with(GroupKind::Flock, sky(), Vec3::new(500.0, 150.0, -500.0));
        assert_eq!(push, Vec3::new(-0.5, -0.5, 0.5));
    }

    #[test]
    fn test_school_pushed_below_surface() {
        let water = Containment::Soft {
            horizontal: 400.0,
            band: AltitudeBand::new(-20.0, -2.0),
            turn_factor: 0.3,
        };
        assert_eq!(run_with(GroupKind::School, water, Vec3::new(0.0, -1.0, 0.0)).y, -0.3);
    }

    #[test]
    fn test_herd_bounds_do_not_push() {
        let land = Containment::Reflect { horizontal: 300.0 };
        assert_eq!(run_with(GroupKind::Herd, land, Vec3::new(350.0, 0.0, 0.0)), Vec3::ZERO);
    }
}
