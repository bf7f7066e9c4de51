//! Fauna Sim - Simulation Core
//!
//! A deterministic, tick-driven ECS simulation of ambient wildlife: bird
//! flocks, fish schools and ground-locked land animal herds.
//! Uses `bevy_ecs` for the entity-component-system architecture.

pub mod api;
pub mod components;
pub mod config;
pub mod error;
pub mod resources;
pub mod steering;
pub mod systems;
pub mod terrain;
pub mod world;

pub use api::Ecosystem;
pub use components::*;
pub use config::{EcosystemConfig, GroupConfig, GroupToggles, PopulationPlan, SpawnRegion};
pub use error::{Result, SimError};
pub use resources::{GroupRegistry, SimRng, TerrainFault};
pub use systems::*;
pub use terrain::{FlatTerrain, HeightFault, HeightField, HeightOracle, TerrainHeight};
pub use world::{AgentSnapshot, GroupSnapshot, PopulationCounts, Snapshot};
