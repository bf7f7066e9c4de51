//! Centroid system - refreshes each enabled group's mean member position.

use crate::components::*;
use crate::config::GroupToggles;
use crate::resources::GroupRegistry;
use crate::steering;
use bevy_ecs::prelude::*;

/// Recompute `Centroid` for every enabled group. Empty groups keep their
/// previous value.
pub fn centroid_system(
    toggles: Res<GroupToggles>,
    registry: Res<GroupRegistry>,
    mut groups: Query<(&Group, &mut Centroid)>,
    agents: Query<&Agent>,
) {
    for entity in registry.iter() {
        let Ok((group, mut centroid)) = groups.get_mut(entity) else {
            continue;
        };
        if !toggles.is_enabled(group.kind) {
            continue;
        }

        let positions = group
            .members
            .iter()
            .filter_map(|&member| agents.get(member).ok())
            .map(|agent| agent.position);

        if let Some(mean) = steering::centroid(positions) {
            centroid.0 = mean;
        }
    }
}
