//! Public API for the simulation.
//!
//! [`Ecosystem`] is the main interface for a renderer (or any other client):
//! it builds the populations, advances them one tick per frame, and exposes
//! counts, per-group queries, the settings gate and snapshots.
//!
//! ## Timestep
//!
//! The caller owns the frame clock. Each `step(dt)` runs exactly one tick with
//! the given `dt`; the ecosystem never accumulates or subdivides time.
//!
//! ## Terrain Faults
//!
//! A non-finite height from the terrain oracle is fatal. The tick that hits
//! it reports `SimError::NonFiniteHeight`, and every later `step` reports
//! `SimError::Halted` without touching the world.

use crate::components::*;
use crate::config::{EcosystemConfig, GroupConfig, GroupToggles, SpawnRegion};
use crate::error::{Result, SimError};
use crate::resources::{GroupRegistry, SimRng, TerrainFault};
use crate::systems::{tick_schedule, DeltaTime};
use crate::terrain::{FlatTerrain, HeightFault, HeightOracle, TerrainHeight};
use crate::world::{PopulationCounts, Snapshot};
use bevy_ecs::prelude::*;
use glam::Vec3;
use rand::Rng;
use std::f32::consts::TAU;
use tracing::{debug, info, warn};

const KINDS: [GroupKind; 3] = [GroupKind::Flock, GroupKind::School, GroupKind::Herd];

/// The main simulation container.
///
/// Holds the ECS world and schedule, providing a clean API for:
/// - Building bird, fish and land animal populations
/// - Stepping the simulation forward
/// - Switching groups on and off by kind
/// - Extracting state snapshots
pub struct Ecosystem {
    world: World,
    schedule: Schedule,
    tick: u64,
    time: f32,
    /// Set once the terrain oracle has faulted.
    halted: Option<HeightFault>,
}

impl Ecosystem {
    /// Build an ecosystem over flat ground at height zero.
    pub fn new(config: EcosystemConfig) -> Result<Self> {
        Self::with_terrain(config, FlatTerrain(0.0))
    }

    /// Build an ecosystem whose herds follow `terrain`.
    pub fn with_terrain(
        config: EcosystemConfig,
        terrain: impl HeightOracle + 'static,
    ) -> Result<Self> {
        config.validate()?;

        let seed = config.seed.unwrap_or_else(rand::random);
        let mut world = World::new();
        world.insert_resource(DeltaTime(0.0));
        world.insert_resource(SimRng::seeded(seed));
        world.insert_resource(GroupRegistry::default());
        world.insert_resource(TerrainFault::default());
        world.insert_resource(TerrainHeight::new(terrain));
        world.insert_resource(config.toggles);

        let mut ecosystem = Self {
            world,
            schedule: tick_schedule(),
            tick: 0,
            time: 0.0,
            halted: None,
        };

        for kind in KINDS {
            let plan = config.plan(kind);
            for _ in 0..plan.groups {
                let start = ecosystem.random_start(kind, &plan.region);
                ecosystem.spawn_group(kind, &plan.template, start)?;
            }
        }

        let counts = ecosystem.population();
        info!(
            seed,
            groups = ecosystem.group_count(),
            birds = counts.birds,
            fish = counts.fish,
            animals = counts.animals,
            "ecosystem populated"
        );

        Ok(ecosystem)
    }

    fn random_start(&mut self, kind: GroupKind, region: &SpawnRegion) -> Vec3 {
        let mut rng = self.world.resource_mut::<SimRng>();
        let h = region.horizontal;
        let x = rng.0.gen_range(-h..h);
        let z = rng.0.gen_range(-h..h);
        let y = match kind {
            // Herd members take their height from the terrain at spawn.
            GroupKind::Herd => 0.0,
            GroupKind::Flock | GroupKind::School => rng.0.gen_range(region.min_y..=region.max_y),
        };
        Vec3::new(x, y, z)
    }

    /// Spawn a group of `kind` around `start` and register it.
    ///
    /// Members get a random offset inside `spawn_spread`, a random velocity
    /// inside `initial_velocity_spread`, a random species from the kind's
    /// roster and a random animation phase. Herd members are placed on the
    /// ground; a non-finite ground height aborts the spawn with nothing added.
    pub fn spawn_group(
        &mut self,
        kind: GroupKind,
        config: &GroupConfig,
        start: Vec3,
    ) -> Result<GroupId> {
        config.validate(kind)?;

        let id = self.world.resource::<GroupRegistry>().next_id();
        let terrain = self.world.resource::<TerrainHeight>().clone();

        let mut pending = Vec::with_capacity(config.member_count);
        {
            let mut rng = self.world.resource_mut::<SimRng>();
            for slot in 0..config.member_count {
                let mut position = start + random_in_box(&mut rng.0, config.spawn_spread);
                let velocity = random_in_box(&mut rng.0, config.initial_velocity_spread);
                let species = Species::random(kind, &mut rng.0);
                let phase =
                    AnimationPhase::new(rng.0.gen_range(0.0..TAU), species.animation_rate());

                let wander = if kind == GroupKind::Herd {
                    position.y = terrain.ground(position.x, position.z)?;
                    Some(WanderState {
                        heading: rng.0.gen_range(0.0..TAU),
                        change_rate: config.wander_change_rate,
                        speed: config.wander_speed,
                        clock: config.wander_clock,
                    })
                } else {
                    None
                };

                let bundle = AgentBundle {
                    agent: Agent::new(position, velocity, config.max_speed, config.max_force),
                    species,
                    phase,
                    member: GroupMember {
                        group: id,
                        slot: slot as u32,
                    },
                };
                pending.push((bundle, wander));
            }
        }

        let members = pending
            .into_iter()
            .map(|(bundle, wander)| {
                let mut entity = self.world.spawn(bundle);
                if let Some(wander) = wander {
                    entity.insert(wander);
                }
                entity.id()
            })
            .collect::<Vec<_>>();

        let member_count = members.len();
        let entity = self
            .world
            .spawn(GroupBundle {
                group: Group { id, kind, members },
                params: config.steering_params(),
                containment: config.containment,
                centroid: Centroid(start),
            })
            .id();
        self.world.resource_mut::<GroupRegistry>().register(entity);

        debug!(group = id.0, kind = kind.label(), members = member_count, "spawned group");
        Ok(id)
    }

    /// Run one tick with the caller-supplied `dt` in seconds.
    pub fn step(&mut self, dt: f32) -> Result<()> {
        if let Some(fault) = self.halted {
            return Err(SimError::Halted {
                x: fault.x,
                z: fault.z,
                value: fault.value,
            });
        }
        if !dt.is_finite() || dt < 0.0 {
            return Err(SimError::InvalidDeltaTime(dt));
        }

        self.world.resource_mut::<DeltaTime>().0 = dt;
        self.schedule.run(&mut self.world);
        self.tick += 1;
        self.time += dt;

        if let Some(fault) = self.world.resource_mut::<TerrainFault>().0.take() {
            self.halted = Some(fault);
            return Err(fault.into());
        }

        debug!(tick = self.tick, time = self.time, "tick complete");
        Ok(())
    }

    /// Whether a terrain fault has stopped the simulation.
    pub fn is_halted(&self) -> bool {
        self.halted.is_some()
    }

    // ========================================================================
    // SETTINGS GATE
    // ========================================================================

    pub fn is_enabled(&self, kind: GroupKind) -> bool {
        self.world.resource::<GroupToggles>().is_enabled(kind)
    }

    /// Switch ticking on or off for every group of `kind`. Agent state is kept.
    pub fn set_enabled(&mut self, kind: GroupKind, enabled: bool) {
        let mut toggles = self.world.resource_mut::<GroupToggles>();
        if toggles.is_enabled(kind) == enabled {
            warn!(kind = kind.label(), enabled, "group kind already in requested state");
        }
        toggles.set(kind, enabled);
    }

    /// Flip the switch for `kind` and return the new state.
    pub fn toggle(&mut self, kind: GroupKind) -> bool {
        let enabled = !self.is_enabled(kind);
        self.set_enabled(kind, enabled);
        enabled
    }

    pub fn toggles(&self) -> GroupToggles {
        *self.world.resource::<GroupToggles>()
    }

    // ========================================================================
    // QUERIES
    // ========================================================================

    fn group(&self, id: GroupId) -> Result<&Group> {
        self.world
            .resource::<GroupRegistry>()
            .entity(id)
            .and_then(|entity| self.world.get::<Group>(entity))
            .ok_or(SimError::UnknownGroup(id))
    }

    /// All group ids in creation order.
    pub fn group_ids(&self) -> Vec<GroupId> {
        (0..self.group_count() as u32).map(GroupId).collect()
    }

    pub fn group_count(&self) -> usize {
        self.world.resource::<GroupRegistry>().len()
    }

    pub fn group_kind(&self, id: GroupId) -> Result<GroupKind> {
        Ok(self.group(id)?.kind)
    }

    pub fn member_count(&self, id: GroupId) -> Result<usize> {
        Ok(self.group(id)?.member_count())
    }

    /// Mean member position as of the last tick the group was enabled.
    pub fn centroid(&self, id: GroupId) -> Result<Vec3> {
        let entity = self
            .world
            .resource::<GroupRegistry>()
            .entity(id)
            .ok_or(SimError::UnknownGroup(id))?;
        self.world
            .get::<Centroid>(entity)
            .map(|c| c.0)
            .ok_or(SimError::UnknownGroup(id))
    }

    /// Kinematic state of each member, in member order.
    pub fn agents(&self, id: GroupId) -> Result<Vec<Agent>> {
        Ok(self
            .group(id)?
            .members
            .iter()
            .filter_map(|&member| self.world.get::<Agent>(member).copied())
            .collect())
    }

    /// Species of each member, in member order.
    pub fn species(&self, id: GroupId) -> Result<Vec<Species>> {
        Ok(self
            .group(id)?
            .members
            .iter()
            .filter_map(|&member| self.world.get::<Species>(member).copied())
            .collect())
    }

    /// Total agents across groups of `kind`, enabled or not.
    pub fn count_by_kind(&self, kind: GroupKind) -> usize {
        self.population().get(kind)
    }

    pub fn bird_count(&self) -> usize {
        self.count_by_kind(GroupKind::Flock)
    }

    pub fn fish_count(&self) -> usize {
        self.count_by_kind(GroupKind::School)
    }

    pub fn animal_count(&self) -> usize {
        self.count_by_kind(GroupKind::Herd)
    }

    pub fn population(&self) -> PopulationCounts {
        let mut counts = PopulationCounts::default();
        for entity in self.world.resource::<GroupRegistry>().iter() {
            if let Some(group) = self.world.get::<Group>(entity) {
                counts.add(group.kind, group.member_count());
            }
        }
        counts
    }

    // ========================================================================
    // SNAPSHOTS
    // ========================================================================

    /// Get a snapshot of the current simulation state.
    pub fn snapshot(&self) -> Snapshot {
        Snapshot::from_world(&self.world, self.tick, self.time)
    }

    /// Get the snapshot as a JSON string.
    pub fn snapshot_json(&self) -> String {
        self.snapshot().to_json().unwrap_or_else(|_| "{}".to_string())
    }

    /// Get the current tick number.
    pub fn current_tick(&self) -> u64 {
        self.tick
    }

    /// Get the elapsed simulation time.
    pub fn current_time(&self) -> f32 {
        self.time
    }

    /// Get direct access to the ECS world (for advanced usage).
    pub fn world(&self) -> &World {
        &self.world
    }

    /// Get mutable access to the ECS world (for advanced usage).
    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }
}

/// Uniform sample from the box of full extent `spread` centered on zero.
fn random_in_box<R: Rng + ?Sized>(rng: &mut R, spread: Vec3) -> Vec3 {
    Vec3::new(
        (rng.gen::<f32>() - 0.5) * spread.x,
        (rng.gen::<f32>() - 0.5) * spread.y,
        (rng.gen::<f32>() - 0.5) * spread.z,
    )
}
