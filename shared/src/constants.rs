/// Side length of one ground tile in world units (meters).
///
/// Tiling is a rendering/texturing concern only. Physics sees the ground as a
/// single infinite plane regardless of this value.
pub const GROUND_TILE_SIZE: f32 = 100.0;

/// UV range of one ground tile is `[0, tile_size / GROUND_TEXEL_DIVISOR]`.
///
/// Convention: a 100m tile gets a UV range of `[0, 20]`, so the texture repeats every 5m.
pub const GROUND_TEXEL_DIVISOR: f32 = 5.0;

/// World units covered by one subdivision of the ground patch.
///
/// A 100m tile is split into `100 / 4 = 25` divisions per side.
pub const GROUND_SUBDIVISION_SIZE: f32 = 4.0;

/// Height of the ground plane.
pub const GROUND_HEIGHT: f32 = 0.0;

/// Corrective rotation applied to every mesh-derived collider, about local +X (degrees).
///
/// Structure meshes are authored Z-up while the physics world is Y-up. Rotating by
/// -90 degrees about X maps authored +Z onto world +Y. Applied once per insertion, to
/// rotation only. Never applied to the ground plane.
pub const COLLISION_MESH_CORRECTION_DEG: f32 = -90.0;

/// Structure identifiers eligible for random placement.
pub const STRUCTURE_CATALOG: [&str; 2] = ["gate", "strange-ramp2"];

/// Number of static structures the authoritative role places per level.
pub const DEFAULT_STATIC_COUNT: u32 = 1;

/// Default world extent along X (meters), used when no world-bounds provider overrides it.
pub const DEFAULT_WORLD_WIDTH: f32 = 400.0;

/// Default world extent along Z (meters).
pub const DEFAULT_WORLD_DEPTH: f32 = 400.0;

/// Tolerance used when checking that a 4x4 transform is a pure rotation + translation.
pub const TRANSFORM_EPS: f32 = 1.0e-4;

/// Triangles with twice-area below this are treated as degenerate (m^2).
pub const DEGENERATE_AREA_EPS: f32 = 1.0e-10;

/// Upper bound on rendered ground tiles per level. Larger grids are a config error.
pub const MAX_GROUND_TILES: u64 = 1 << 20;

/// Upper bound on subdivisions per side of the shared tile mesh.
pub const MAX_TILE_DIVISIONS: u32 = 1024;
