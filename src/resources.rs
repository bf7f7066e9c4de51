//! World-level resources shared by the tick systems.

use bevy_ecs::prelude::*;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::components::GroupId;
use crate::terrain::HeightFault;

/// Seeded random source. All randomness in the simulation draws from here.
#[derive(Resource, Debug, Clone)]
pub struct SimRng(pub ChaCha8Rng);

impl SimRng {
    pub fn seeded(seed: u64) -> Self {
        Self(ChaCha8Rng::seed_from_u64(seed))
    }
}

/// Group entities in creation order. `GroupId(n)` is the `n`th entry.
#[derive(Resource, Debug, Clone, Default)]
pub struct GroupRegistry {
    groups: Vec<Entity>,
}

impl GroupRegistry {
    /// The id the next registered group will receive.
    pub fn next_id(&self) -> GroupId {
        GroupId(self.groups.len() as u32)
    }

    pub fn register(&mut self, entity: Entity) -> GroupId {
        let id = self.next_id();
        self.groups.push(entity);
        id
    }

    pub fn entity(&self, id: GroupId) -> Option<Entity> {
        self.groups.get(id.0 as usize).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = Entity> + '_ {
        self.groups.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}

/// First terrain fault seen during the current tick, if any.
#[derive(Resource, Debug, Clone, Copy, Default)]
pub struct TerrainFault(pub Option<HeightFault>);

impl TerrainFault {
    /// Keep the first fault of the tick; later ones are dropped.
    pub fn record(&mut self, fault: HeightFault) -> bool {
        if self.0.is_some() {
            return false;
        }
        self.0 = Some(fault);
        true
    }
}
