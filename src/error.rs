//! Error types for the simulation core.

use crate::components::GroupId;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SimError {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("delta time must be finite and non-negative, got {0}")]
    InvalidDeltaTime(f32),

    #[error("terrain height oracle returned {value} at ({x}, {z})")]
    NonFiniteHeight { x: f32, z: f32, value: f32 },

    #[error("unknown group: {0:?}")]
    UnknownGroup(GroupId),

    #[error("simulation halted after terrain fault at ({x}, {z}): height {value}")]
    Halted { x: f32, z: f32, value: f32 },

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, SimError>;
