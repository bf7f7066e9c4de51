//! Configuration for groups and for the whole ecosystem.
//!
//! Every tunable lives here with its default. `EcosystemConfig` can be loaded
//! from TOML; values absent from the file keep their defaults.
//!
//! ## Example
//!
//! ```toml
//! seed = 42
//!
//! [toggles]
//! birds = true
//! fish = false
//! animals = true
//! ```

use crate::components::{AltitudeBand, Containment, GroupKind, SteeringParams, WanderClock};
use crate::error::{Result, SimError};
use bevy_ecs::prelude::*;
use glam::Vec3;
use serde::{Deserialize, Serialize};

// ============================================================================
// GROUP CONFIGURATION
// ============================================================================

/// Construction parameters for one group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupConfig {
    pub member_count: usize,
    /// Neighbor threshold for flocking. Unused by herds.
    pub perception_radius: f32,
    pub max_speed: f32,
    /// Cap on the combined separation/alignment/cohesion force.
    pub max_force: f32,
    pub separation_weight: f32,
    pub alignment_weight: f32,
    pub cohesion_weight: f32,
    /// Herd heading drift per tick (or per reference tick). Unused by flocks.
    pub wander_change_rate: f32,
    /// Herd ground speed. Unused by flocks.
    pub wander_speed: f32,
    pub wander_clock: WanderClock,
    /// Full extent of the random spawn offset box around the start point.
    pub spawn_spread: Vec3,
    /// Full extent of the random initial velocity box around zero.
    pub initial_velocity_spread: Vec3,
    pub containment: Containment,
}

impl GroupConfig {
    /// Bird flock defaults.
    pub fn bird() -> Self {
        Self {
            member_count: 20,
            perception_radius: 15.0,
            max_speed: 10.0,
            max_force: 0.5,
            separation_weight: 0.3,
            alignment_weight: 0.2,
            cohesion_weight: 0.1,
            wander_change_rate: 0.0,
            wander_speed: 0.0,
            wander_clock: WanderClock::PerTick,
            spawn_spread: Vec3::new(20.0, 10.0, 20.0),
            initial_velocity_spread: Vec3::new(2.0, 0.5, 2.0),
            containment: Containment::Soft {
                horizontal: 400.0,
                band: AltitudeBand::new(20.0, 100.0),
                turn_factor: 0.5,
            },
        }
    }

    /// Fish school defaults.
    pub fn fish() -> Self {
        Self {
            member_count: 30,
            perception_radius: 10.0,
            max_speed: 5.0,
            max_force: 0.3,
            separation_weight: 0.4,
            alignment_weight: 0.3,
            cohesion_weight: 0.15,
            wander_change_rate: 0.0,
            wander_speed: 0.0,
            wander_clock: WanderClock::PerTick,
            spawn_spread: Vec3::new(15.0, 5.0, 15.0),
            initial_velocity_spread: Vec3::new(1.5, 0.3, 1.5),
            containment: Containment::Soft {
                horizontal: 400.0,
                band: AltitudeBand::new(-20.0, -2.0),
                turn_factor: 0.3,
            },
        }
    }

    /// Land animal herd defaults.
    pub fn herd() -> Self {
        Self {
            member_count: 10,
            perception_radius: 0.0,
            max_speed: 2.0,
            max_force: 0.0,
            separation_weight: 0.0,
            alignment_weight: 0.0,
            cohesion_weight: 0.0,
            wander_change_rate: 0.1,
            wander_speed: 2.0,
            wander_clock: WanderClock::PerTick,
            spawn_spread: Vec3::new(10.0, 0.0, 10.0),
            initial_velocity_spread: Vec3::new(0.5, 0.0, 0.5),
            containment: Containment::Reflect { horizontal: 300.0 },
        }
    }

    /// Defaults for the given kind.
    pub fn preset(kind: GroupKind) -> Self {
        match kind {
            GroupKind::Flock => Self::bird(),
            GroupKind::School => Self::fish(),
            GroupKind::Herd => Self::herd(),
        }
    }

    pub fn with_member_count(mut self, member_count: usize) -> Self {
        self.member_count = member_count;
        self
    }

    pub fn steering_params(&self) -> SteeringParams {
        SteeringParams {
            separation_weight: self.separation_weight,
            alignment_weight: self.alignment_weight,
            cohesion_weight: self.cohesion_weight,
            perception_radius: self.perception_radius,
        }
    }

    /// Check that this config can drive a group of `kind`.
    pub fn validate(&self, kind: GroupKind) -> Result<()> {
        non_negative("perception_radius", self.perception_radius)?;
        non_negative("max_speed", self.max_speed)?;
        non_negative("max_force", self.max_force)?;
        non_negative("separation_weight", self.separation_weight)?;
        non_negative("alignment_weight", self.alignment_weight)?;
        non_negative("cohesion_weight", self.cohesion_weight)?;
        non_negative("wander_change_rate", self.wander_change_rate)?;
        non_negative("wander_speed", self.wander_speed)?;
        for (name, v) in [
            ("spawn_spread", self.spawn_spread),
            ("initial_velocity_spread", self.initial_velocity_spread),
        ] {
            ensure(
                v.is_finite() && v.min_element() >= 0.0,
                format!("{name} must be finite and non-negative, got {v}"),
            )?;
        }

        if let WanderClock::PerSecond { reference_hz } = self.wander_clock {
            ensure(
                reference_hz.is_finite() && reference_hz > 0.0,
                format!("wander reference_hz must be positive, got {reference_hz}"),
            )?;
        }

        match (kind, self.containment) {
            (
                GroupKind::Flock | GroupKind::School,
                Containment::Soft {
                    horizontal,
                    band,
                    turn_factor,
                },
            ) => {
                positive("containment.horizontal", horizontal)?;
                non_negative("containment.turn_factor", turn_factor)?;
                ensure(
                    band.min.is_finite() && band.max.is_finite() && band.min < band.max,
                    format!(
                        "altitude band must satisfy min < max, got [{}, {}]",
                        band.min, band.max
                    ),
                )?;
            }
            (GroupKind::Herd, Containment::Reflect { horizontal }) => {
                positive("containment.horizontal", horizontal)?;
                ensure(
                    self.wander_speed <= self.max_speed,
                    format!(
                        "wander_speed {} exceeds max_speed {}",
                        self.wander_speed, self.max_speed
                    ),
                )?;
            }
            (kind, containment) => {
                return Err(SimError::InvalidConfig(format!(
                    "{} groups cannot use {:?} containment",
                    kind.label(),
                    containment
                )));
            }
        }

        Ok(())
    }
}

fn ensure(condition: bool, message: String) -> Result<()> {
    if condition {
        Ok(())
    } else {
        Err(SimError::InvalidConfig(message))
    }
}

fn non_negative(name: &str, value: f32) -> Result<()> {
    ensure(
        value.is_finite() && value >= 0.0,
        format!("{name} must be finite and non-negative, got {value}"),
    )
}

fn positive(name: &str, value: f32) -> Result<()> {
    ensure(
        value.is_finite() && value > 0.0,
        format!("{name} must be finite and positive, got {value}"),
    )
}

// ============================================================================
// SETTINGS GATE
// ============================================================================

/// Per-kind switches deciding which groups are ticked.
///
/// Toggling never resets agent state; a disabled group is simply skipped.
#[derive(Resource, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GroupToggles {
    pub birds: bool,
    pub fish: bool,
    pub animals: bool,
}

impl Default for GroupToggles {
    fn default() -> Self {
        Self {
            birds: true,
            fish: true,
            animals: true,
        }
    }
}

impl GroupToggles {
    pub fn is_enabled(&self, kind: GroupKind) -> bool {
        match kind {
            GroupKind::Flock => self.birds,
            GroupKind::School => self.fish,
            GroupKind::Herd => self.animals,
        }
    }

    pub fn set(&mut self, kind: GroupKind, enabled: bool) {
        match kind {
            GroupKind::Flock => self.birds = enabled,
            GroupKind::School => self.fish = enabled,
            GroupKind::Herd => self.animals = enabled,
        }
    }
}

// ============================================================================
// ECOSYSTEM CONFIGURATION
// ============================================================================

/// Area in which group start points are drawn.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpawnRegion {
    /// Start x and z are drawn from `[-horizontal, horizontal)`.
    pub horizontal: f32,
    /// Start y range. Ignored for herds, which start on the ground.
    pub min_y: f32,
    pub max_y: f32,
}

/// How many groups of one kind to create, and from which template.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PopulationPlan {
    pub groups: usize,
    pub template: GroupConfig,
    pub region: SpawnRegion,
}

impl PopulationPlan {
    pub fn birds() -> Self {
        Self {
            groups: 5,
            template: GroupConfig::bird(),
            region: SpawnRegion {
                horizontal: 250.0,
                min_y: 30.0,
                max_y: 70.0,
            },
        }
    }

    pub fn fish() -> Self {
        Self {
            groups: 3,
            template: GroupConfig::fish(),
            region: SpawnRegion {
                horizontal: 200.0,
                min_y: -15.0,
                max_y: -5.0,
            },
        }
    }

    pub fn animals() -> Self {
        Self {
            groups: 3,
            template: GroupConfig::herd(),
            region: SpawnRegion {
                horizontal: 200.0,
                min_y: 0.0,
                max_y: 0.0,
            },
        }
    }

    pub fn none(kind: GroupKind) -> Self {
        let mut plan = match kind {
            GroupKind::Flock => Self::birds(),
            GroupKind::School => Self::fish(),
            GroupKind::Herd => Self::animals(),
        };
        plan.groups = 0;
        plan
    }

    fn validate(&self, kind: GroupKind) -> Result<()> {
        positive("region.horizontal", self.region.horizontal)?;
        if kind != GroupKind::Herd {
            ensure(
                self.region.min_y.is_finite()
                    && self.region.max_y.is_finite()
                    && self.region.min_y <= self.region.max_y,
                format!(
                    "spawn region y range must satisfy min_y <= max_y, got [{}, {}]",
                    self.region.min_y, self.region.max_y
                ),
            )?;
        }
        self.template.validate(kind)
    }
}

/// Top-level configuration for an [`crate::Ecosystem`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EcosystemConfig {
    /// RNG seed. `None` draws one from entropy.
    #[serde(default)]
    pub seed: Option<u64>,
    #[serde(default = "PopulationPlan::birds")]
    pub birds: PopulationPlan,
    #[serde(default = "PopulationPlan::fish")]
    pub fish: PopulationPlan,
    #[serde(default = "PopulationPlan::animals")]
    pub animals: PopulationPlan,
    #[serde(default)]
    pub toggles: GroupToggles,
}

impl Default for EcosystemConfig {
    fn default() -> Self {
        Self {
            seed: None,
            birds: PopulationPlan::birds(),
            fish: PopulationPlan::fish(),
            animals: PopulationPlan::animals(),
            toggles: GroupToggles::default(),
        }
    }
}

impl EcosystemConfig {
    /// A config that spawns no groups; populate with `Ecosystem::spawn_group`.
    pub fn empty(seed: u64) -> Self {
        Self {
            seed: Some(seed),
            birds: PopulationPlan::none(GroupKind::Flock),
            fish: PopulationPlan::none(GroupKind::School),
            animals: PopulationPlan::none(GroupKind::Herd),
            toggles: GroupToggles::default(),
        }
    }

    pub fn plan(&self, kind: GroupKind) -> &PopulationPlan {
        match kind {
            GroupKind::Flock => &self.birds,
            GroupKind::School => &self.fish,
            GroupKind::Herd => &self.animals,
        }
    }

    pub fn validate(&self) -> Result<()> {
        for kind in [GroupKind::Flock, GroupKind::School, GroupKind::Herd] {
            self.plan(kind).validate(kind)?;
        }
        Ok(())
    }

    /// Parse and validate a TOML document.
    pub fn from_toml(content: &str) -> Result<Self> {
        let config = toml::from_str::<Self>(content)?;
        config.validate()?;
        Ok(config)
    }
}
