//! Terrain height queries.
//!
//! The simulation never generates terrain; it only asks an external oracle
//! for ground elevation at a horizontal coordinate. Anything implementing
//! [`HeightOracle`] can be plugged in, including plain closures.
//! [`HeightField`] is a grid-based heightmap for callers that already have
//! sampled elevation data.

use bevy_ecs::prelude::*;
use serde::{de, Deserialize, Deserializer, Serialize};
use std::sync::Arc;

use crate::error::SimError;

/// Side-effect-free ground elevation query.
pub trait HeightOracle: Send + Sync {
    /// Ground height at world position (`x`, `z`).
    fn height(&self, x: f32, z: f32) -> f32;
}

impl<F> HeightOracle for F
where
    F: Fn(f32, f32) -> f32 + Send + Sync,
{
    fn height(&self, x: f32, z: f32) -> f32 {
        self(x, z)
    }
}

/// Level ground at a fixed height.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct FlatTerrain(pub f32);

impl HeightOracle for FlatTerrain {
    fn height(&self, _x: f32, _z: f32) -> f32 {
        self.0
    }
}

/// Resource wrapper for the terrain oracle, allowing shared access in ECS systems.
#[derive(Resource, Clone)]
pub struct TerrainHeight(pub Arc<dyn HeightOracle>);

impl TerrainHeight {
    pub fn new(oracle: impl HeightOracle + 'static) -> Self {
        Self(Arc::new(oracle))
    }

    /// Checked ground height at (`x`, `z`).
    pub fn ground(&self, x: f32, z: f32) -> Result<f32, HeightFault> {
        sample_ground(self.0.as_ref(), x, z)
    }
}

impl Default for TerrainHeight {
    fn default() -> Self {
        Self::new(FlatTerrain(0.0))
    }
}

/// A non-finite answer from the height oracle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HeightFault {
    pub x: f32,
    pub z: f32,
    pub value: f32,
}

impl From<HeightFault> for SimError {
    fn from(fault: HeightFault) -> Self {
        SimError::NonFiniteHeight {
            x: fault.x,
            z: fault.z,
            value: fault.value,
        }
    }
}

/// Query `oracle`, rejecting NaN and infinite heights.
pub fn sample_ground(oracle: &dyn HeightOracle, x: f32, z: f32) -> Result<f32, HeightFault> {
    let value = oracle.height(x, z);
    if value.is_finite() {
        Ok(value)
    } else {
        Err(HeightFault { x, z, value })
    }
}

/// Grid-based heightmap sampled at cell centers.
///
/// Queries between samples are bilinearly interpolated; queries outside the
/// grid clamp to the nearest edge sample. Deserialization goes through
/// [`HeightField::from_samples`], so a loaded field is checked like a built one.
#[derive(Debug, Clone, Serialize)]
pub struct HeightField {
    /// Samples along x.
    width: usize,
    /// Samples along z.
    depth: usize,
    /// Spacing between samples in world units.
    cell_size: f32,
    /// World position of the grid corner.
    origin_x: f32,
    origin_z: f32,
    /// Heights in row-major order (z rows of x samples).
    heights: Vec<f32>,
}

/// Unchecked wire form of [`HeightField`].
#[derive(Deserialize)]
struct HeightFieldData {
    width: usize,
    depth: usize,
    cell_size: f32,
    origin_x: f32,
    origin_z: f32,
    heights: Vec<f32>,
}

impl<'de> Deserialize<'de> for HeightField {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let data = HeightFieldData::deserialize(deserializer)?;
        Self::from_samples(data.width, data.depth, data.cell_size, data.heights)
            .and_then(|field| field.with_origin(data.origin_x, data.origin_z))
            .map_err(de::Error::custom)
    }
}

impl HeightField {
    /// A level grid centered on the world origin.
    pub fn new(width: usize, depth: usize, cell_size: f32) -> Result<Self, SimError> {
        if width == 0 || depth == 0 {
            return Err(SimError::InvalidConfig(format!(
                "height field needs at least one sample per axis, got {width}x{depth}"
            )));
        }
        if !(cell_size.is_finite() && cell_size > 0.0) {
            return Err(SimError::InvalidConfig(format!(
                "height field cell_size must be positive, got {cell_size}"
            )));
        }
        let cells = width.checked_mul(depth).ok_or_else(|| {
            SimError::InvalidConfig(format!("height field {width}x{depth} is too large"))
        })?;
        Ok(Self {
            width,
            depth,
            cell_size,
            origin_x: -(width as f32 * cell_size) / 2.0,
            origin_z: -(depth as f32 * cell_size) / 2.0,
            heights: vec![0.0; cells],
        })
    }

    /// A grid whose samples are taken from `f` at each cell center.
    pub fn from_fn(
        width: usize,
        depth: usize,
        cell_size: f32,
        f: impl Fn(f32, f32) -> f32,
    ) -> Result<Self, SimError> {
        let mut field = Self::new(width, depth, cell_size)?;
        for gz in 0..field.depth {
            for gx in 0..field.width {
                let (x, z) = field.grid_to_world(gx, gz);
                field.heights[gz * field.width + gx] = f(x, z);
            }
        }
        Ok(field)
    }

    /// A grid built from raw samples.
    pub fn from_samples(
        width: usize,
        depth: usize,
        cell_size: f32,
        heights: Vec<f32>,
    ) -> Result<Self, SimError> {
        let mut field = Self::new(width, depth, cell_size)?;
        if heights.len() != field.heights.len() {
            return Err(SimError::InvalidConfig(format!(
                "height field {}x{} needs {} samples, got {}",
                width,
                depth,
                field.heights.len(),
                heights.len()
            )));
        }
        field.heights = heights;
        Ok(field)
    }

    /// Move the grid corner to (`origin_x`, `origin_z`).
    pub fn with_origin(mut self, origin_x: f32, origin_z: f32) -> Result<Self, SimError> {
        if !(origin_x.is_finite() && origin_z.is_finite()) {
            return Err(SimError::InvalidConfig(format!(
                "height field origin must be finite, got ({origin_x}, {origin_z})"
            )));
        }
        self.origin_x = origin_x;
        self.origin_z = origin_z;
        Ok(self)
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn cell_size(&self) -> f32 {
        self.cell_size
    }

    fn cell_index(&self, gx: usize, gz: usize) -> Option<usize> {
        if gx < self.width && gz < self.depth {
            Some(gz * self.width + gx)
        } else {
            None
        }
    }

    /// Stored sample at grid coordinates.
    pub fn get(&self, gx: usize, gz: usize) -> Option<f32> {
        self.cell_index(gx, gz).map(|i| self.heights[i])
    }

    /// Overwrite the sample at grid coordinates. Returns `false` if out of range.
    pub fn set(&mut self, gx: usize, gz: usize, height: f32) -> bool {
        match self.cell_index(gx, gz) {
            Some(i) => {
                self.heights[i] = height;
                true
            }
            None => false,
        }
    }

    /// Convert grid coordinates to world coordinates (center of cell).
    pub fn grid_to_world(&self, gx: usize, gz: usize) -> (f32, f32) {
        (
            self.origin_x + (gx as f32 + 0.5) * self.cell_size,
            self.origin_z + (gz as f32 + 0.5) * self.cell_size,
        )
    }

    /// World extent as (min_x, min_z, max_x, max_z).
    pub fn bounds(&self) -> (f32, f32, f32, f32) {
        (
            self.origin_x,
            self.origin_z,
            self.origin_x + self.width as f32 * self.cell_size,
            self.origin_z + self.depth as f32 * self.cell_size,
        )
    }

    /// Bilinear height at a world position.
    pub fn sample(&self, x: f32, z: f32) -> f32 {
        let max_x = (self.width - 1) as f32;
        let max_z = (self.depth - 1) as f32;
        let fx = ((x - self.origin_x) / self.cell_size - 0.5).clamp(0.0, max_x);
        let fz = ((z - self.origin_z) / self.cell_size - 0.5).clamp(0.0, max_z);

        let x0 = fx.floor() as usize;
        let z0 = fz.floor() as usize;
        let x1 = (x0 + 1).min(self.width - 1);
        let z1 = (z0 + 1).min(self.depth - 1);
        let tx = fx - x0 as f32;
        let tz = fz - z0 as f32;

        let h = |gx: usize, gz: usize| self.heights[gz * self.width + gx];
        let near = h(x0, z0) * (1.0 - tx) + h(x1, z0) * tx;
        let far = h(x0, z1) * (1.0 - tx) + h(x1, z1) * tx;
        near * (1.0 - tz) + far * tz
    }
}

impl HeightOracle for HeightField {
    fn height(&self, x: f32, z: f32) -> f32 {
        self.sample(x, z)
    }
}
