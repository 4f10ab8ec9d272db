//! Structure mesh data and the asset resolver.
//!
//! Structure meshes are pre-authored and referenced by id. Vertex data is stored in the
//! authoring convention (Z-up); the collision factory and the render mesh builder both
//! convert to the world's Y-up convention.
//!
//! The built-in catalog ships as RON files embedded in the binary, so the headless
//! authoritative role needs no filesystem.

use std::collections::BTreeMap;

use nalgebra::Point3;
use serde::{Deserialize, Serialize};

use crate::{LevelError, LevelResult};

/// Raw triangle data of one structure mesh.
#[derive(Clone, Debug, PartialEq)]
pub struct MeshTriangles {
    pub vertices: Vec<Point3<f32>>,
    pub indices: Vec<[u32; 3]>,
}

impl MeshTriangles {
    pub fn new(vertices: Vec<Point3<f32>>, indices: Vec<[u32; 3]>) -> Self {
        Self { vertices, indices }
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty() || self.indices.is_empty()
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len()
    }
}

/// Resolves an asset id to its loaded triangle data.
pub trait AssetResolver {
    fn triangles(&self, asset_id: &str) -> LevelResult<&MeshTriangles>;
}

/// On-disk form of a structure mesh.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MeshAsset {
    pub name: String,
    pub vertices: Vec<[f32; 3]>,
    pub triangles: Vec<[u32; 3]>,
}

impl From<MeshAsset> for MeshTriangles {
    fn from(asset: MeshAsset) -> Self {
        Self {
            vertices: asset
                .vertices
                .into_iter()
                .map(|[x, y, z]| Point3::new(x, y, z))
                .collect(),
            indices: asset.triangles,
        }
    }
}

const GATE_RON: &str = include_str!("../assets/gate.ron");
const STRANGE_RAMP2_RON: &str = include_str!("../assets/strange-ramp2.ron");

/// In-memory asset catalog keyed by asset id.
#[derive(Clone, Debug, Default)]
pub struct AssetLibrary {
    meshes: BTreeMap<String, MeshTriangles>,
}

impl AssetLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    /// The library holding every structure in [`crate::STRUCTURE_CATALOG`].
    pub fn builtin() -> LevelResult<Self> {
        let mut library = Self::new();
        for text in [GATE_RON, STRANGE_RAMP2_RON] {
            library.load_ron(text)?;
        }
        log::debug!("loaded {} built-in structure meshes", library.len());
        Ok(library)
    }

    /// Parse a [`MeshAsset`] and register it under its `name`.
    pub fn load_ron(&mut self, text: &str) -> LevelResult<String> {
        let asset: MeshAsset = ron::from_str(text)?;
        let name = asset.name.clone();
        self.insert(name.clone(), asset.into());
        Ok(name)
    }

    /// Register (or replace) an asset's triangles.
    pub fn insert(&mut self, asset_id: impl Into<String>, triangles: MeshTriangles) {
        self.meshes.insert(asset_id.into(), triangles);
    }

    pub fn contains(&self, asset_id: &str) -> bool {
        self.meshes.contains_key(asset_id)
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.meshes.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.meshes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.meshes.is_empty()
    }
}

impl AssetResolver for AssetLibrary {
    fn triangles(&self, asset_id: &str) -> LevelResult<&MeshTriangles> {
        self.meshes
            .get(asset_id)
            .ok_or_else(|| LevelError::missing(asset_id))
    }
}
