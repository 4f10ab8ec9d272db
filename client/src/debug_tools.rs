//! Debug/performance tooling for native dev builds.
//!
//! This plugin is compiled/used only when the caller gates it behind `dev_native`
//! (`#[cfg(feature = "dev_native")] mod debug_tools;` in `main.rs`).
//!
//! Besides the perf overlay it draws the bounding box of every local static collider,
//! which makes a visual/physics mismatch (e.g. a missing up-axis correction) obvious.

use crate::level::ObservedLevel;
use bevy::diagnostic::{
    EntityCountDiagnosticsPlugin, FrameTimeDiagnosticsPlugin, SystemInformationDiagnosticsPlugin,
};
use bevy::prelude::*;
use bevy::render::diagnostic::RenderDiagnosticsPlugin;
use iyes_perf_ui::prelude::*;
use shared::ShapeKind;

/// Add debug/perf tooling (intended for `dev_native` builds only).
pub(super) fn plugin(app: &mut App) {
    app.add_plugins((
        FrameTimeDiagnosticsPlugin::default(),
        EntityCountDiagnosticsPlugin::default(),
        SystemInformationDiagnosticsPlugin::default(),
        RenderDiagnosticsPlugin,
        PerfUiPlugin,
    ));

    app.add_systems(Startup, spawn_perf_ui);
    app.add_systems(Update, draw_collider_bounds);
}

fn spawn_perf_ui(mut commands: Commands) {
    commands.spawn(PerfUiAllEntries::default());
}

fn draw_collider_bounds(level: Option<Res<ObservedLevel>>, mut gizmos: Gizmos) {
    let Some(level) = level else {
        return;
    };
    let physics = level.session.physics();
    for (handle, kind) in physics.inserted() {
        // Planes are unbounded.
        if matches!(kind, ShapeKind::Plane { .. }) {
            continue;
        }
        let Some(collider) = physics.colliders.get(*handle) else {
            continue;
        };
        let aabb = collider.compute_aabb();
        let center = aabb.center();
        let size = aabb.extents();
        gizmos.cuboid(
            Transform::from_xyz(center.x, center.y, center.z)
                .with_scale(Vec3::new(size.x, size.y, size.z)),
            Color::srgb(1.0, 0.6, 0.1),
        );
    }
}
