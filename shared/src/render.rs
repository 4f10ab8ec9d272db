//! Optional rendering capability.
//!
//! The core never talks to a graphics API. It describes geometry as [`RenderMesh`] and
//! hands it to a [`RenderContext`] implementation (Bevy on the client). A host without a
//! display passes `None` wherever a render context is accepted; only the ground builder's
//! visual half and the assembler's model creation look at it.

use nalgebra::{Isometry3, Point3, Vector3};

use crate::{
    AssetResolver, LevelResult,
    collision::{mesh_correction, validate_triangles},
};

/// Which material a model is drawn with.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MaterialKind {
    /// Repeating ground texture.
    Ground,
    /// Flat-shaded structure material.
    Structure,
}

/// Indexed triangle list with per-vertex normals and UVs.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RenderMesh {
    pub positions: Vec<[f32; 3]>,
    pub normals: Vec<[f32; 3]>,
    pub uvs: Vec<[f32; 2]>,
    pub indices: Vec<u32>,
}

impl RenderMesh {
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Append `triangles` transformed by `pose`, flat shaded (three unshared vertices per
    /// triangle so each face keeps its own normal).
    fn append_flat(&mut self, triangles: &[[Point3<f32>; 3]], pose: &Isometry3<f32>) {
        for tri in triangles {
            let [a, b, c] = tri.map(|p| pose * p);
            let n = (b - a).cross(&(c - a));
            let n = n.try_normalize(f32::EPSILON).unwrap_or_else(Vector3::y);
            for p in [a, b, c] {
                self.indices.push(self.positions.len() as u32);
                self.positions.push([p.x, p.y, p.z]);
                self.normals.push([n.x, n.y, n.z]);
                self.uvs.push([0.0, 0.0]);
            }
        }
    }
}

/// One named part of the combined static model.
#[derive(Clone, Debug, PartialEq)]
pub struct LayoutPart {
    pub name: String,
    pub asset_id: String,
    /// Logical placement (uncorrected).
    pub pose: Isometry3<f32>,
}

/// Ordered description of the combined static model. Part order is input order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct StaticLayout {
    pub parts: Vec<LayoutPart>,
}

impl StaticLayout {
    pub fn push(&mut self, asset_id: &str, pose: Isometry3<f32>) {
        let name = format!("{}:{}", self.parts.len(), asset_id);
        self.parts.push(LayoutPart {
            name,
            asset_id: asset_id.to_owned(),
            pose,
        });
    }

    pub fn len(&self) -> usize {
        self.parts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }

    /// Merge every part into one mesh in world space.
    ///
    /// Structure meshes are authored Z-up, so each part's node carries the same up-axis
    /// conversion the collision factory applies; visuals and colliders line up. Triangles
    /// are validated exactly as the collision factory validates them.
    pub fn combined_mesh(&self, assets: &impl AssetResolver) -> LevelResult<RenderMesh> {
        let mut mesh = RenderMesh::default();
        for part in &self.parts {
            let source = assets.triangles(&part.asset_id)?;
            validate_triangles(&part.asset_id, source)?;
            let node = Isometry3::from_parts(part.pose.translation, part.pose.rotation * mesh_correction());
            let triangles: Vec<[Point3<f32>; 3]> = source
                .indices
                .iter()
                .map(|tri| tri.map(|i| source.vertices[i as usize]))
                .collect();
            mesh.append_flat(&triangles, &node);
        }
        Ok(mesh)
    }
}

/// A rendering backend able to upload meshes and place instances of them.
///
/// `Model` is GPU-resident geometry that must be released explicitly; `Instance` is one
/// placement of a model.
pub trait RenderContext {
    type Model;
    type Instance;

    /// Whether render data (mesh + material) for `asset_id` is loaded.
    fn has_render_data(&self, asset_id: &str) -> bool;

    fn upload(&mut self, name: &str, mesh: &RenderMesh, material: MaterialKind) -> Self::Model;

    fn instantiate(&mut self, model: &Self::Model, name: &str, pose: &Isometry3<f32>)
    -> Self::Instance;

    fn release_instance(&mut self, instance: Self::Instance);

    fn release_model(&mut self, model: Self::Model);
}

/// Stand-in render context type for hosts without a display. Never constructed; it
/// only names the `()` model/instance types for `None::<&mut Headless>`.
pub enum Headless {}

impl RenderContext for Headless {
    type Model = ();
    type Instance = ();

    fn has_render_data(&self, _asset_id: &str) -> bool {
        match *self {}
    }

    fn upload(&mut self, _name: &str, _mesh: &RenderMesh, _material: MaterialKind) {
        match *self {}
    }

    fn instantiate(&mut self, _model: &(), _name: &str, _pose: &Isometry3<f32>) {
        match *self {}
    }

    fn release_instance(&mut self, _instance: ()) {
        match *self {}
    }

    fn release_model(&mut self, _model: ()) {
        match *self {}
    }
}
