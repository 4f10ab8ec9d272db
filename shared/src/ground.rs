//! Ground builder.
//!
//! Rendering and physics see the ground at different granularity:
//! - Rendering: one shared subdivided tile mesh, instanced once per grid cell over the
//!   world bounds. Tiling exists for texturing only.
//! - Physics: a single infinite plane at y = 0, normal +Y.

use nalgebra::{Isometry3, UnitQuaternion, Vector3};
use rapier3d::prelude::ColliderHandle;

use crate::{
    GROUND_SUBDIVISION_SIZE, GROUND_TEXEL_DIVISOR, LevelError, LevelResult, MAX_GROUND_TILES,
    MAX_TILE_DIVISIONS, WorldBounds,
    collision::ground_plane_collider,
    physics::StaticPhysicsWorld,
    render::{MaterialKind, RenderContext, RenderMesh},
    resources::LevelResources,
};

/// One rendering cell of the ground.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GroundTile {
    pub grid_x: u32,
    pub grid_z: u32,
}

impl GroundTile {
    pub fn world_origin(&self, tile_size: f32) -> Vector3<f32> {
        Vector3::new(
            self.grid_x as f32 * tile_size,
            0.0,
            self.grid_z as f32 * tile_size,
        )
    }
}

/// Result of [`build_ground`].
#[derive(Clone, Debug)]
pub struct GroundLayer {
    /// Rendered tiles, x-major. Empty when built without a render context.
    pub tiles: Vec<GroundTile>,
    pub tile_size: f32,
    /// The single ground plane collider.
    pub plane: ColliderHandle,
}

impl GroundLayer {
    pub fn tile_origins(&self) -> impl Iterator<Item = Vector3<f32>> + '_ {
        self.tiles.iter().map(|t| t.world_origin(self.tile_size))
    }
}

/// Validate bounds and tile size, and return the grid size `(nx, nz)`.
pub(crate) fn validate_tiling(bounds: &WorldBounds, tile_size: f32) -> LevelResult<(u32, u32)> {
    bounds.validate()?;
    if !tile_size.is_finite() || tile_size <= 0.0 {
        return Err(LevelError::InvalidConfig(format!(
            "tile size must be finite and > 0, got {tile_size}"
        )));
    }
    tile_divisions(tile_size)?;

    let nx = cells_along(bounds.width, tile_size);
    let nz = cells_along(bounds.depth, tile_size);
    match nx.checked_mul(nz) {
        Some(total) if total <= MAX_GROUND_TILES && nx.max(nz) <= MAX_GROUND_TILES => {
            Ok((nx as u32, nz as u32))
        }
        _ => Err(LevelError::InvalidConfig(format!(
            "world {}x{} needs {nx}x{nz} tiles of size {tile_size}, limit is {MAX_GROUND_TILES}",
            bounds.width, bounds.depth
        ))),
    }
}

/// Number of tiles needed along one axis: cells start at `0, s, 2s, ...` while `< extent`.
fn cells_along(extent: f32, tile_size: f32) -> u64 {
    // Saturates for huge ratios, which the tile limit then rejects.
    (f64::from(extent) / f64::from(tile_size)).ceil() as u64
}

fn tile_divisions(tile_size: f32) -> LevelResult<u32> {
    let divisions = (f64::from(tile_size) / f64::from(GROUND_SUBDIVISION_SIZE)).max(1.0);
    if divisions > f64::from(MAX_TILE_DIVISIONS) {
        return Err(LevelError::InvalidConfig(format!(
            "tile size {tile_size} needs {divisions:.0} subdivisions, limit is {MAX_TILE_DIVISIONS}"
        )));
    }
    Ok(divisions as u32)
}

/// Grid cells covering `[0, width) x [0, depth)`, x-major then z.
pub fn ground_tiles(bounds: &WorldBounds, tile_size: f32) -> LevelResult<Vec<GroundTile>> {
    let (nx, nz) = validate_tiling(bounds, tile_size)?;

    if bounds.width % tile_size != 0.0 || bounds.depth % tile_size != 0.0 {
        log::warn!(
            "world {}x{} is not a multiple of tile size {tile_size}; edge tiles overhang",
            bounds.width,
            bounds.depth
        );
    }

    let mut tiles = Vec::with_capacity(nx as usize * nz as usize);
    for grid_x in 0..nx {
        for grid_z in 0..nz {
            tiles.push(GroundTile { grid_x, grid_z });
        }
    }
    Ok(tiles)
}

/// The shared tile mesh: a flat `tile_size` square at y = 0, spanning `+X`/`+Z` from the
/// origin, split into `tile_size / 4` divisions per side, normal `+Y`, with UVs over
/// `[0, tile_size / 5]` so a repeating texture tiles every 5 world units.
pub fn tile_mesh(tile_size: f32) -> LevelResult<RenderMesh> {
    if !tile_size.is_finite() || tile_size <= 0.0 {
        return Err(LevelError::InvalidConfig(format!(
            "tile size must be finite and > 0, got {tile_size}"
        )));
    }
    let divisions = tile_divisions(tile_size)?;
    let uv_max = tile_size / GROUND_TEXEL_DIVISOR;
    let row = divisions + 1;

    let mut mesh = RenderMesh::default();
    for i in 0..=divisions {
        for j in 0..=divisions {
            let tx = i as f32 / divisions as f32;
            let tz = j as f32 / divisions as f32;
            mesh.positions.push([tx * tile_size, 0.0, tz * tile_size]);
            mesh.normals.push([0.0, 1.0, 0.0]);
            mesh.uvs.push([tx * uv_max, tz * uv_max]);
        }
    }
    for i in 0..divisions {
        for j in 0..divisions {
            let a = i * row + j;
            let b = (i + 1) * row + j;
            let c = (i + 1) * row + j + 1;
            let d = i * row + j + 1;
            // Counter-clockwise seen from +Y.
            mesh.indices.extend_from_slice(&[a, d, c, a, c, b]);
        }
    }
    Ok(mesh)
}

/// Build the ground.
///
/// The physics half always runs and inserts exactly one plane collider. The render half
/// (one shared tile model plus one instance per cell, tracked in `resources`) runs only
/// when a render context is supplied.
pub fn build_ground<R: RenderContext>(
    bounds: &WorldBounds,
    tile_size: f32,
    physics: &mut StaticPhysicsWorld,
    resources: &mut LevelResources<R::Model, R::Instance>,
    render: Option<&mut R>,
) -> LevelResult<GroundLayer> {
    log::debug!("create ground {}x{}", bounds.width, bounds.depth);
    validate_tiling(bounds, tile_size)?;

    let tiles = match render {
        Some(render) => {
            let tiles = ground_tiles(bounds, tile_size)?;
            let mesh = tile_mesh(tile_size)?;
            let model = render.upload("ground", &mesh, MaterialKind::Ground);
            for tile in &tiles {
                let pose = Isometry3::from_parts(
                    tile.world_origin(tile_size).into(),
                    UnitQuaternion::identity(),
                );
                let name = format!("ground:{}:{}", tile.grid_x, tile.grid_z);
                let instance = render.instantiate(&model, &name, &pose);
                resources.track_ground_tile(*tile, instance);
            }
            resources.track_model(model);
            log::debug!("created {} ground tiles", tiles.len());
            tiles
        }
        None => Vec::new(),
    };

    let plane = physics.insert_static(ground_plane_collider());

    Ok(GroundLayer {
        tiles,
        tile_size,
        plane,
    })
}
