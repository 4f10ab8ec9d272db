use shared::{LevelConfig, WorldBounds};
use spacetimedb::*;

/// Level generation settings shared by server and clients.
///
/// This is intended to be a single-row table (`id = 1`) that both:
/// - the server reads when (re)building the level, and
/// - clients subscribe to so they can size the ground the same way.
///
/// Values are in meters.
#[table(name = level_settings, public)]
pub struct LevelSettings {
    /// Unique id (primary key). Use a single row with `id = 1`.
    #[primary_key]
    pub id: u32,

    /// World extent along X and Z.
    pub world_width: f32,
    pub world_depth: f32,

    /// Ground tile side length. Rendering only; physics uses one plane.
    pub tile_size: f32,

    /// Number of structures placed per build.
    pub static_count: u32,

    /// Asset ids eligible for placement.
    pub catalog: Vec<String>,

    /// Seed used for the current level. `None` draws one from the reducer RNG.
    pub seed: Option<u64>,
}

impl LevelSettings {
    pub const ID: u32 = 1;

    pub fn from_config(config: &LevelConfig) -> Self {
        Self {
            id: Self::ID,
            world_width: config.bounds.width,
            world_depth: config.bounds.depth,
            tile_size: config.tile_size,
            static_count: config.static_count,
            catalog: config.catalog.clone(),
            seed: config.seed,
        }
    }

    pub fn to_config(&self) -> LevelConfig {
        LevelConfig {
            bounds: WorldBounds::new(self.world_width, self.world_depth),
            tile_size: self.tile_size,
            static_count: self.static_count,
            catalog: self.catalog.clone(),
            seed: self.seed,
        }
    }
}
