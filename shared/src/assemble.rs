//! Geometry assembler: rebuild structures from a received placement list.
//!
//! Every record is resolved before anything is built. A missing mesh or missing render
//! data aborts the whole assembly with nothing inserted, so a level is either complete or
//! absent. Colliders go through the same factory and poses as on the authoritative side.

use nalgebra::Isometry3;
use rapier3d::prelude::ColliderHandle;

use crate::{
    AssetResolver, LevelError, LevelResult, PlacementRecord,
    collision::{StaticCollider, build_mesh_collider},
    physics::StaticPhysicsWorld,
    render::{MaterialKind, RenderContext, RenderMesh, StaticLayout},
    resources::LevelResources,
};

/// What [`assemble`] built.
#[derive(Clone, Debug, Default)]
pub struct AssembledStatics {
    /// One named part per record, in record order.
    pub layout: StaticLayout,
    /// One mesh collider per record, in record order.
    pub colliders: Vec<ColliderHandle>,
}

/// Build the combined static model (when rendering) and the local colliders for `records`.
pub fn assemble<R: RenderContext>(
    records: &[PlacementRecord],
    assets: &impl AssetResolver,
    physics: &mut StaticPhysicsWorld,
    resources: &mut LevelResources<R::Model, R::Instance>,
    render: Option<&mut R>,
) -> LevelResult<AssembledStatics> {
    log::debug!("assemble {} statics", records.len());

    let mut layout = StaticLayout::default();
    let mut pending: Vec<StaticCollider> = Vec::with_capacity(records.len());
    for record in records {
        let asset_id = record.asset_id();
        if let Some(render) = render.as_deref()
            && !render.has_render_data(asset_id)
        {
            return Err(LevelError::missing(asset_id));
        }
        pending.push(build_mesh_collider(asset_id, assets.triangles(asset_id)?, record.pose())?);
        layout.push(asset_id, *record.pose());
    }

    let mesh = match render.as_deref() {
        Some(_) if !layout.is_empty() => Some(layout.combined_mesh(assets)?),
        _ => None,
    };

    let colliders = pending
        .into_iter()
        .map(|collider| physics.insert_static(collider))
        .collect();

    if let (Some(render), Some(mesh)) = (render, mesh) {
        upload_statics(&mesh, resources, render);
    }

    Ok(AssembledStatics { layout, colliders })
}

/// Layout for `records` without touching physics.
pub fn layout_of(records: &[PlacementRecord]) -> StaticLayout {
    let mut layout = StaticLayout::default();
    for record in records {
        layout.push(record.asset_id(), *record.pose());
    }
    layout
}

/// Build and register the combined static model for records whose colliders already
/// exist. Used by a process that is both authority and renderer.
pub fn render_statics<R: RenderContext>(
    records: &[PlacementRecord],
    assets: &impl AssetResolver,
    resources: &mut LevelResources<R::Model, R::Instance>,
    render: &mut R,
) -> LevelResult<StaticLayout> {
    if let Some(record) = records.iter().find(|r| !render.has_render_data(r.asset_id())) {
        return Err(LevelError::missing(record.asset_id()));
    }
    let layout = layout_of(records);
    if !layout.is_empty() {
        let mesh = layout.combined_mesh(assets)?;
        upload_statics(&mesh, resources, render);
    }
    Ok(layout)
}

fn upload_statics<R: RenderContext>(
    mesh: &RenderMesh,
    resources: &mut LevelResources<R::Model, R::Instance>,
    render: &mut R,
) {
    let model = render.upload("statics", mesh, MaterialKind::Structure);
    let instance = render.instantiate(&model, "statics", &Isometry3::identity());
    resources.track_static_instance(instance);
    resources.track_model(model);
    log::debug!("uploaded combined static model ({} triangles)", mesh.triangle_count());
}
