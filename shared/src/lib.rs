pub mod assemble;
pub mod assets;
pub mod collision;
pub mod config;
pub mod constants;
pub mod error;
pub mod ground;
pub mod level;
pub mod physics;
pub mod placement;
pub mod render;
pub mod resources;
pub mod sync;

pub use assemble::{AssembledStatics, assemble, layout_of, render_statics};
pub use assets::{AssetLibrary, AssetResolver, MeshAsset, MeshTriangles};
pub use collision::{
    ShapeKind, StaticCollider, build_mesh_collider, corrected_pose, ground_plane_collider,
    mesh_correction, plane_collider,
};
pub use config::{LevelConfig, WorldBounds};
pub use constants::{
    COLLISION_MESH_CORRECTION_DEG, DEFAULT_STATIC_COUNT, DEFAULT_WORLD_DEPTH,
    DEFAULT_WORLD_WIDTH, DEGENERATE_AREA_EPS, GROUND_HEIGHT, GROUND_SUBDIVISION_SIZE,
    GROUND_TEXEL_DIVISOR, GROUND_TILE_SIZE, MAX_GROUND_TILES, MAX_TILE_DIVISIONS, STRUCTURE_CATALOG,
    TRANSFORM_EPS,
};
pub use error::{LevelError, LevelResult};
pub use ground::{GroundLayer, GroundTile, build_ground, ground_tiles, tile_mesh};
pub use level::{AuthorityLevel, HeadlessSession, LevelSession, ObserverLevel, Role};
pub use physics::StaticPhysicsWorld;
pub use placement::{PlacementRecord, euler_rotation, generate_placements, rotation_gap};
pub use render::{Headless, LayoutPart, MaterialKind, RenderContext, RenderMesh, StaticLayout};
pub use resources::LevelResources;
pub use sync::{PlacementEntry, SyncPayload};
