//! ECS Components for the fauna simulation.
//!
//! Components are pure data containers attached to entities.
//! Agents (birds, fish, land animals) and the groups that own them are both
//! entities; all behavior logic lives in systems that query these components.

use bevy_ecs::prelude::*;
use glam::Vec3;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::f32::consts::TAU;

// ============================================================================
// KINEMATIC COMPONENTS
// ============================================================================

/// Kinematic state of one simulated animal.
///
/// `acceleration` is a per-tick accumulator: steering, containment and wander
/// add into it, and [`Agent::integrate`] consumes it.
#[derive(Component, Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Agent {
    pub position: Vec3,
    pub velocity: Vec3,
    pub acceleration: Vec3,
    pub max_speed: f32,
    pub max_force: f32,
}

impl Agent {
    pub fn new(position: Vec3, velocity: Vec3, max_speed: f32, max_force: f32) -> Self {
        Self {
            position,
            velocity,
            acceleration: Vec3::ZERO,
            max_speed,
            max_force,
        }
    }

    /// Add a force to this tick's accumulator.
    pub fn apply_force(&mut self, force: Vec3) {
        self.acceleration += force;
    }

    /// Advance one tick.
    ///
    /// The accumulated acceleration is applied to velocity as-is, velocity is
    /// clamped to `max_speed`, position moves by `velocity * dt`, and the
    /// accumulator is cleared.
    pub fn integrate(&mut self, dt: f32) {
        self.velocity += self.acceleration;

        if self.velocity.length() > self.max_speed {
            self.velocity = self.velocity.normalize() * self.max_speed;
        }

        self.position += self.velocity * dt;
        self.acceleration = Vec3::ZERO;
    }

    pub fn speed(&self) -> f32 {
        self.velocity.length()
    }
}

/// Secondary animation phase (wing beat, tail swing, leg cycle).
///
/// Advanced by simulation time only, so a fixed `dt` sequence replays the
/// same animation.
#[derive(Component, Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AnimationPhase {
    /// Current phase in radians, kept in `[0, 2π)`.
    pub phase: f32,
    /// Radians per second.
    pub rate: f32,
}

impl AnimationPhase {
    pub fn new(offset: f32, rate: f32) -> Self {
        Self {
            phase: offset.rem_euclid(TAU),
            rate,
        }
    }

    pub fn advance(&mut self, dt: f32) {
        self.phase = (self.phase + self.rate * dt).rem_euclid(TAU);
    }
}

// ============================================================================
// WANDER COMPONENTS
// ============================================================================

/// How the herd heading drift relates to elapsed time.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum WanderClock {
    /// One random heading increment per tick, independent of `dt`.
    #[default]
    PerTick,
    /// Increment scaled by `dt * reference_hz`, matching `PerTick` at that
    /// frame rate.
    PerSecond { reference_hz: f32 },
}

/// Correlated random-walk state for a ground-following animal.
#[derive(Component, Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WanderState {
    /// Heading in radians, measured in the x/z plane.
    pub heading: f32,
    pub change_rate: f32,
    /// Fixed ground speed.
    pub speed: f32,
    pub clock: WanderClock,
}

impl WanderState {
    /// Heading after one tick given a uniform sample `jitter` in `[-0.5, 0.5)`.
    pub fn next_heading(&self, jitter: f32, dt: f32) -> f32 {
        let step = jitter * self.change_rate;
        match self.clock {
            WanderClock::PerTick => self.heading + step,
            WanderClock::PerSecond { reference_hz } => self.heading + step * dt * reference_hz,
        }
    }

    /// Ground-plane velocity for the current heading.
    pub fn velocity(&self) -> Vec3 {
        Vec3::new(self.heading.cos(), 0.0, self.heading.sin()) * self.speed
    }
}

// ============================================================================
// IDENTITY COMPONENTS
// ============================================================================

/// Unique identifier for a group, assigned in creation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GroupId(pub u32);

/// Which behavior rule set a group runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GroupKind {
    /// Bird flock: separation/alignment/cohesion in an altitude band.
    Flock,
    /// Fish school: separation/alignment/cohesion in a depth band.
    School,
    /// Land animal herd: independent wander locked to the ground.
    Herd,
}

impl GroupKind {
    /// Whether members steer with separation/alignment/cohesion.
    pub fn is_flocking(&self) -> bool {
        matches!(self, GroupKind::Flock | GroupKind::School)
    }

    pub fn label(&self) -> &'static str {
        match self {
            GroupKind::Flock => "flock",
            GroupKind::School => "school",
            GroupKind::Herd => "herd",
        }
    }
}

/// Back-reference from an agent to its owning group.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupMember {
    pub group: GroupId,
    /// Position in the group's member order.
    pub slot: u32,
}

/// Species descriptor. Carries only cosmetic and tuning data; behavior is
/// decided by the owning group's kind.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Species {
    Eagle,
    Seagull,
    Crow,
    Cardinal,
    BlueJay,
    Tropical,
    Goldfish,
    BlueFish,
    GreenFish,
    PurpleFish,
    Deer,
    Rabbit,
    Fox,
}

impl Species {
    pub const BIRDS: [Species; 5] = [
        Species::Eagle,
        Species::Seagull,
        Species::Crow,
        Species::Cardinal,
        Species::BlueJay,
    ];

    pub const FISH: [Species; 5] = [
        Species::Tropical,
        Species::Goldfish,
        Species::BlueFish,
        Species::GreenFish,
        Species::PurpleFish,
    ];

    pub const LAND: [Species; 3] = [Species::Deer, Species::Rabbit, Species::Fox];

    /// Species that can belong to a group of the given kind.
    pub fn roster(kind: GroupKind) -> &'static [Species] {
        match kind {
            GroupKind::Flock => &Self::BIRDS,
            GroupKind::School => &Self::FISH,
            GroupKind::Herd => &Self::LAND,
        }
    }

    /// Uniform pick from the roster for `kind`.
    pub fn random<R: Rng + ?Sized>(kind: GroupKind, rng: &mut R) -> Self {
        let roster = Self::roster(kind);
        roster[rng.gen_range(0..roster.len())]
    }

    pub fn kind(&self) -> GroupKind {
        match self {
            Species::Eagle
            | Species::Seagull
            | Species::Crow
            | Species::Cardinal
            | Species::BlueJay => GroupKind::Flock,
            Species::Tropical
            | Species::Goldfish
            | Species::BlueFish
            | Species::GreenFish
            | Species::PurpleFish => GroupKind::School,
            Species::Deer | Species::Rabbit | Species::Fox => GroupKind::Herd,
        }
    }

    /// Body color as 0xRRGGBB.
    pub fn color(&self) -> u32 {
        match self {
            Species::Eagle => 0x4a3c28,
            Species::Seagull => 0xf5f5f5,
            Species::Crow => 0x1a1a1a,
            Species::Cardinal => 0xc41e3a,
            Species::BlueJay => 0x4169e1,
            Species::Tropical => 0xff6b35,
            Species::Goldfish => 0xffa500,
            Species::BlueFish => 0x4169e1,
            Species::GreenFish => 0x2ecc71,
            Species::PurpleFish => 0x9b59b6,
            Species::Deer => 0x8b4513,
            Species::Rabbit => 0xd2b48c,
            Species::Fox => 0xd2691e,
        }
    }

    /// Secondary animation rate in radians per second.
    pub fn animation_rate(&self) -> f32 {
        match self.kind() {
            GroupKind::Flock => 8.0,
            GroupKind::School | GroupKind::Herd => 5.0,
        }
    }
}

// ============================================================================
// GROUP COMPONENTS
// ============================================================================

/// A fixed, ordered set of agents sharing one rule set.
#[derive(Component, Debug, Clone)]
pub struct Group {
    pub id: GroupId,
    pub kind: GroupKind,
    /// Member entities in iteration order. Never changes after spawn.
    pub members: Vec<Entity>,
}

impl Group {
    pub fn member_count(&self) -> usize {
        self.members.len()
    }
}

/// Flocking weights and neighbor threshold. Immutable after spawn.
#[derive(Component, Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SteeringParams {
    pub separation_weight: f32,
    pub alignment_weight: f32,
    pub cohesion_weight: f32,
    pub perception_radius: f32,
}

/// Vertical band an agent is pushed back into.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AltitudeBand {
    pub min: f32,
    pub max: f32,
}

impl AltitudeBand {
    pub fn new(min: f32, max: f32) -> Self {
        Self { min, max }
    }

    pub fn contains(&self, y: f32) -> bool {
        y >= self.min && y <= self.max
    }
}

/// World-bounds rule for a group.
#[derive(Component, Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum Containment {
    /// Constant `turn_factor` push once an agent leaves `±horizontal` on x/z
    /// or the altitude band on y.
    Soft {
        horizontal: f32,
        band: AltitudeBand,
        turn_factor: f32,
    },
    /// Reverse the wander heading once an agent leaves `±horizontal`.
    Reflect { horizontal: f32 },
}

impl Containment {
    /// Whether a reflecting bound is exceeded at `position`.
    pub fn should_reflect(&self, position: Vec3) -> bool {
        match self {
            Containment::Reflect { horizontal } => {
                position.x.abs() > *horizontal || position.z.abs() > *horizontal
            }
            Containment::Soft { .. } => false,
        }
    }
}

/// Mean member position, refreshed every enabled tick. Informational only.
#[derive(Component, Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Centroid(pub Vec3);

// ============================================================================
// BUNDLE HELPERS
// ============================================================================

/// Bundle for spawning one group member.
#[derive(Bundle)]
pub struct AgentBundle {
    pub agent: Agent,
    pub species: Species,
    pub phase: AnimationPhase,
    pub member: GroupMember,
}

/// Bundle for spawning the group entity itself.
#[derive(Bundle)]
pub struct GroupBundle {
    pub group: Group,
    pub params: SteeringParams,
    pub containment: Containment,
    pub centroid: Centroid,
}
