//! Movement system - integrates flocking agents and advances their animation.

use crate::components::*;
use crate::config::GroupToggles;
use crate::resources::GroupRegistry;
use bevy_ecs::prelude::*;

/// Resource containing the delta time for the current tick.
#[derive(Resource, Default)]
pub struct DeltaTime(pub f32);

/// Consume the accumulated acceleration of every flock and school member.
pub fn integration_system(
    dt: Res<DeltaTime>,
    toggles: Res<GroupToggles>,
    registry: Res<GroupRegistry>,
    groups: Query<&Group>,
    mut agents: Query<(&mut Agent, &mut AnimationPhase)>,
) {
    let delta = dt.0;
    for entity in registry.iter() {
        let Ok(group) = groups.get(entity) else {
            continue;
        };
        if !group.kind.is_flocking() || !toggles.is_enabled(group.kind) {
            continue;
        }

        for &member in &group.members {
            if let Ok((mut agent, mut phase)) = agents.get_mut(member) {
                agent.integrate(delta);
                phase.advance(delta);
            }
        }
    }
}
