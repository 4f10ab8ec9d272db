#![allow(dead_code)]

use std::collections::BTreeSet;

use nalgebra::Isometry3;
use shared::physics::rapier3d::parry::bounding_volume::Aabb;
use shared::{MaterialKind, RenderContext, RenderMesh};

/// Render context double that records every call.
#[derive(Debug, Default)]
pub struct RecordingRender {
    /// Asset ids without render data.
    pub missing: BTreeSet<String>,
    pub uploads: Vec<(String, MaterialKind, usize)>,
    pub instances: Vec<(String, Isometry3<f32>)>,
    pub live_models: usize,
    pub live_instances: usize,
    next_id: u32,
}

impl RecordingRender {
    pub fn without(asset_ids: &[&str]) -> Self {
        Self {
            missing: asset_ids.iter().map(|s| s.to_string()).collect(),
            ..Self::default()
        }
    }

    fn id(&mut self) -> u32 {
        self.next_id += 1;
        self.next_id
    }
}

impl RenderContext for RecordingRender {
    type Model = u32;
    type Instance = u32;

    fn has_render_data(&self, asset_id: &str) -> bool {
        !self.missing.contains(asset_id)
    }

    fn upload(&mut self, name: &str, mesh: &RenderMesh, material: MaterialKind) -> u32 {
        self.uploads.push((name.to_owned(), material, mesh.triangle_count()));
        self.live_models += 1;
        self.id()
    }

    fn instantiate(&mut self, _model: &u32, name: &str, pose: &Isometry3<f32>) -> u32 {
        self.instances.push((name.to_owned(), *pose));
        self.live_instances += 1;
        self.id()
    }

    fn release_instance(&mut self, _instance: u32) {
        self.live_instances -= 1;
    }

    fn release_model(&mut self, _model: u32) {
        self.live_models -= 1;
    }
}

pub fn approx_aabb(a: &Aabb, b: &Aabb, eps: f32) -> bool {
    (a.mins - b.mins).norm() <= eps && (a.maxs - b.maxs).norm() <= eps
}
