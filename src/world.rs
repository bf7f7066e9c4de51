//! Snapshot types.
//!
//! The `Snapshot` struct provides a serializable view of the simulation state
//! that a renderer or any other consumer can read once per tick.

use crate::components::*;
use crate::config::GroupToggles;
use crate::error::Result;
use crate::resources::GroupRegistry;
use bevy_ecs::prelude::*;
use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Snapshot of a single agent's state for serialization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentSnapshot {
    pub group: GroupId,
    /// Position in the group's member order.
    pub slot: u32,
    pub kind: GroupKind,
    pub species: Species,
    /// Body color as 0xRRGGBB.
    pub color: u32,
    pub position: Vec3,
    pub velocity: Vec3,
    /// Secondary animation phase in radians.
    pub phase: f32,
}

/// Snapshot of a group's summary state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupSnapshot {
    pub id: GroupId,
    pub kind: GroupKind,
    pub members: usize,
    pub centroid: Vec3,
    pub enabled: bool,
}

/// Agent totals per kind.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PopulationCounts {
    pub birds: usize,
    pub fish: usize,
    pub animals: usize,
}

impl PopulationCounts {
    pub fn add(&mut self, kind: GroupKind, members: usize) {
        match kind {
            GroupKind::Flock => self.birds += members,
            GroupKind::School => self.fish += members,
            GroupKind::Herd => self.animals += members,
        }
    }

    pub fn get(&self, kind: GroupKind) -> usize {
        match kind {
            GroupKind::Flock => self.birds,
            GroupKind::School => self.fish,
            GroupKind::Herd => self.animals,
        }
    }

    pub fn total(&self) -> usize {
        self.birds + self.fish + self.animals
    }
}

/// Complete simulation state snapshot.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Current simulation tick.
    pub tick: u64,
    /// Elapsed simulation time in seconds.
    pub time: f32,
    /// All agents, grouped and in member order.
    pub agents: Vec<AgentSnapshot>,
    /// All groups in creation order.
    pub groups: Vec<GroupSnapshot>,
    pub counts: PopulationCounts,
}

impl Snapshot {
    /// Create a snapshot from the ECS world.
    pub fn from_world(world: &World, tick: u64, time: f32) -> Self {
        let toggles = world.get_resource::<GroupToggles>().copied().unwrap_or_default();
        let mut snapshot = Self {
            tick,
            time,
            ..Default::default()
        };

        let Some(registry) = world.get_resource::<GroupRegistry>() else {
            return snapshot;
        };

        for entity in registry.iter() {
            let Some(group) = world.get::<Group>(entity) else {
                continue;
            };

            for &member in &group.members {
                let (Some(agent), Some(species), Some(membership)) = (
                    world.get::<Agent>(member),
                    world.get::<Species>(member),
                    world.get::<GroupMember>(member),
                ) else {
                    continue;
                };
                snapshot.agents.push(AgentSnapshot {
                    group: membership.group,
                    slot: membership.slot,
                    kind: group.kind,
                    species: *species,
                    color: species.color(),
                    position: agent.position,
                    velocity: agent.velocity,
                    phase: world
                        .get::<AnimationPhase>(member)
                        .map(|p| p.phase)
                        .unwrap_or(0.0),
                });
            }

            snapshot.groups.push(GroupSnapshot {
                id: group.id,
                kind: group.kind,
                members: group.member_count(),
                centroid: world.get::<Centroid>(entity).map(|c| c.0).unwrap_or_default(),
                enabled: toggles.is_enabled(group.kind),
            });
            snapshot.counts.add(group.kind, group.member_count());
        }

        snapshot
    }

    /// Serialize snapshot to JSON string.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Serialize snapshot to pretty JSON string.
    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Serialize snapshot to JSON bytes.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        Ok(serde_json::from_slice(bytes)?)
    }
}
