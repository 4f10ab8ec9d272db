//! Runtime level configuration.
//!
//! Defaults mirror [`crate::constants`]. A config can be loaded from RON so hosts can
//! override world bounds, tile size, structure count and catalog without rebuilding.

use serde::{Deserialize, Serialize};

use crate::{
    DEFAULT_STATIC_COUNT, DEFAULT_WORLD_DEPTH, DEFAULT_WORLD_WIDTH, GROUND_TILE_SIZE,
    LevelError, LevelResult, STRUCTURE_CATALOG,
};

/// Rectangular world extent `[0, width) x [0, depth)` on the XZ plane (meters).
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct WorldBounds {
    pub width: f32,
    pub depth: f32,
}

impl WorldBounds {
    pub const fn new(width: f32, depth: f32) -> Self {
        Self { width, depth }
    }

    pub fn validate(&self) -> LevelResult<()> {
        for (axis, v) in [("width", self.width), ("depth", self.depth)] {
            if !v.is_finite() || v < 0.0 {
                return Err(LevelError::InvalidConfig(format!(
                    "world {axis} must be finite and >= 0, got {v}"
                )));
            }
        }
        Ok(())
    }
}

impl Default for WorldBounds {
    fn default() -> Self {
        Self::new(DEFAULT_WORLD_WIDTH, DEFAULT_WORLD_DEPTH)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LevelConfig {
    pub bounds: WorldBounds,
    /// Ground tile side length (meters).
    pub tile_size: f32,
    /// Number of structures the authoritative role places.
    pub static_count: u32,
    /// Asset ids eligible for random placement.
    pub catalog: Vec<String>,
    /// Seed for the authoritative placement RNG.
    pub seed: Option<u64>,
}

impl Default for LevelConfig {
    fn default() -> Self {
        Self {
            bounds: WorldBounds::default(),
            tile_size: GROUND_TILE_SIZE,
            static_count: DEFAULT_STATIC_COUNT,
            catalog: STRUCTURE_CATALOG.iter().map(|s| s.to_string()).collect(),
            seed: None,
        }
    }
}

impl LevelConfig {
    pub fn from_ron_str(text: &str) -> LevelResult<Self> {
        let config: Self = ron::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> LevelResult<()> {
        crate::ground::validate_tiling(&self.bounds, self.tile_size)?;
        if self.static_count > 0 && self.catalog.is_empty() {
            return Err(LevelError::InvalidConfig(
                "catalog is empty but static_count > 0".into(),
            ));
        }
        Ok(())
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }
}
