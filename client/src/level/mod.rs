//! Observed level: ground tiles, the combined static model and local colliders.
//!
//! The client always plays the observing role. It builds the ground at startup, then
//! rebuilds the whole level whenever a placement list arrives through
//! [`PlacementsReceived`].

mod render;

pub use render::{BevyModel, BevyRender, LevelMaterials, StaticGeometry};

use crate::transport::PlacementsReceived;
use bevy::prelude::*;
use shared::{AssetLibrary, LevelConfig, LevelSession, Role};

/// Observer session plus the structure meshes it resolves against.
#[derive(Resource)]
pub struct ObservedLevel {
    pub session: LevelSession<BevyModel, Entity>,
    pub assets: AssetLibrary,
}

pub(super) fn plugin(app: &mut App) {
    app.add_systems(Startup, (render::setup_materials, create_level).chain());
    app.add_systems(Update, apply_placements);
    app.add_systems(Last, dispose_on_exit);
}

fn create_level(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    materials: Res<LevelMaterials>,
) {
    let assets = match AssetLibrary::builtin() {
        Ok(assets) => assets,
        Err(err) => {
            error!("failed to load structure meshes: {err}");
            return;
        }
    };
    let mut session = match LevelSession::new(Role::Observing, LevelConfig::default()) {
        Ok(session) => session,
        Err(err) => {
            error!("invalid level config: {err}");
            return;
        }
    };

    let mut render = BevyRender {
        commands: &mut commands,
        meshes: &mut meshes,
        materials: &materials,
        assets: &assets,
    };
    if let Err(err) = session.create_level(&assets, Some(&mut render)) {
        error!("failed to create level: {err}");
        return;
    }
    info!(
        "ground ready: {} tiles",
        session.resources().ground_tile_count()
    );
    commands.insert_resource(ObservedLevel { session, assets });
}

fn apply_placements(
    mut commands: Commands,
    mut messages: MessageReader<PlacementsReceived>,
    mut meshes: ResMut<Assets<Mesh>>,
    materials: Res<LevelMaterials>,
    level: Option<ResMut<ObservedLevel>>,
) {
    let Some(mut level) = level else {
        return;
    };
    // Only the newest list matters; each one replaces the level wholesale.
    let Some(PlacementsReceived(payload)) = messages.read().last() else {
        return;
    };

    let ObservedLevel { session, assets } = &mut *level;
    let assets = &*assets;
    let mut render = BevyRender {
        commands: &mut commands,
        meshes: &mut meshes,
        materials: &materials,
        assets,
    };
    match session.apply_sync(payload, assets, Some(&mut render)) {
        Ok(()) => info!(
            "level rebuilt from {} placements ({} colliders)",
            payload.len(),
            session.physics().len()
        ),
        Err(err) => error!("failed to apply placements: {err}"),
    }
}

fn dispose_on_exit(
    mut commands: Commands,
    mut exits: MessageReader<AppExit>,
    mut meshes: ResMut<Assets<Mesh>>,
    materials: Option<Res<LevelMaterials>>,
    level: Option<ResMut<ObservedLevel>>,
) {
    if exits.read().next().is_none() {
        return;
    }
    let (Some(mut level), Some(materials)) = (level, materials) else {
        return;
    };

    let ObservedLevel { session, assets } = &mut *level;
    let assets = &*assets;
    let mut render = BevyRender {
        commands: &mut commands,
        meshes: &mut meshes,
        materials: &materials,
        assets,
    };
    session.dispose(Some(&mut render));
    info!("level disposed");
}
