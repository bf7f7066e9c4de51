//! Wander system - random-walk movement for ground-locked herd animals.

use crate::components::*;
use crate::config::GroupToggles;
use crate::resources::{GroupRegistry, SimRng, TerrainFault};
use crate::systems::movement::DeltaTime;
use crate::terrain::TerrainHeight;
use bevy_ecs::prelude::*;
use rand::Rng;
use std::f32::consts::PI;
use tracing::error;

/// Drift heading, move at fixed speed, snap to the ground, reflect at bounds.
///
/// A non-finite ground height leaves the member's `y` untouched and records a
/// [`TerrainFault`]; the caller decides what to do with it after the tick.
pub fn wander_system(
    dt: Res<DeltaTime>,
    toggles: Res<GroupToggles>,
    registry: Res<GroupRegistry>,
    terrain: Res<TerrainHeight>,
    mut rng: ResMut<SimRng>,
    mut fault: ResMut<TerrainFault>,
    groups: Query<(&Group, &Containment)>,
    mut herd: Query<(&mut Agent, &mut WanderState, &mut AnimationPhase)>,
) {
    let delta = dt.0;
    for entity in registry.iter() {
        let Ok((group, containment)) = groups.get(entity) else {
            continue;
        };
        if group.kind != GroupKind::Herd || !toggles.is_enabled(group.kind) {
            continue;
        }

        for &member in &group.members {
            let Ok((mut agent, mut wander, mut phase)) = herd.get_mut(member) else {
                continue;
            };

            let jitter = rng.0.gen_range(-0.5..0.5);
            wander.heading = wander.next_heading(jitter, delta);
            agent.velocity = wander.velocity();
            agent.integrate(delta);

            match terrain.ground(agent.position.x, agent.position.z) {
                Ok(height) => agent.position.y = height,
                Err(bad) => {
                    if fault.record(bad) {
                        error!(
                            group = group.id.0,
                            x = bad.x,
                            z = bad.z,
                            value = bad.value,
                            "terrain oracle returned a non-finite height"
                        );
                    }
                }
            }

            if containment.should_reflect(agent.position) {
                wander.heading += PI;
            }

            phase.advance(delta);
        }
    }
}
