//! Authoritative level build and publication.
//!
//! This module is responsible for:
//! - Reading the level settings row (or seeding it with defaults).
//! - Running an authoritative, headless level session: ground plane plus randomly placed
//!   structures with their colliders.
//! - Publishing the resulting placement list to the `static_placement` table.
//! - Rebuilding the level from the published rows as an observer and checking that the
//!   colliders match, so a lossy row encoding fails the reducer instead of desyncing clients.
//!
//! The module never renders, so every session here is a [`HeadlessSession`].

use crate::schema::*;
use shared::physics::rapier3d::prelude::ColliderHandle;
use shared::{
    AssetLibrary, Headless, HeadlessSession, LevelConfig, LevelResult, Role, StaticPhysicsWorld,
    SyncPayload,
};
use spacetimedb::{log_stopwatch::LogStopwatch, ReducerContext, Table};

/// Largest allowed difference between published and rebuilt collider bounds (meters).
const REBUILD_TOLERANCE: f32 = 1.0e-3;

/// Current level settings, seeding the defaults row on first use.
pub fn level_config(ctx: &ReducerContext) -> LevelConfig {
    if let Some(row) = ctx.db.level_settings().id().find(LevelSettings::ID) {
        return row.to_config();
    }
    let config = LevelConfig::default();
    ctx.db
        .level_settings()
        .insert(LevelSettings::from_config(&config));
    config
}

/// Published placements, in placement order.
pub fn published_payload(ctx: &ReducerContext) -> SyncPayload {
    let mut rows: Vec<StaticPlacement> = ctx.db.static_placement().iter().collect();
    rows.sort_by_key(|row| row.id);
    SyncPayload {
        placements: rows.iter().map(StaticPlacement::to_entry).collect(),
    }
}

/// Clear and repopulate `static_placement` from a fresh authoritative build.
///
/// Returns the number of placements published.
pub fn recreate_static_world(ctx: &ReducerContext, seed: Option<u64>) -> Result<usize, String> {
    let sw = LogStopwatch::new("recreate_static_world");

    let mut config = level_config(ctx);
    config.seed = Some(seed.or(config.seed).unwrap_or_else(|| ctx.random::<u64>()));
    config.validate().map_err(|e| e.to_string())?;

    let assets = AssetLibrary::builtin().map_err(|e| e.to_string())?;
    let authority = build_authority(&config, &assets).map_err(|e| e.to_string())?;

    StaticPlacement::clear(ctx);
    for record in authority.placements() {
        ctx.db
            .static_placement()
            .insert(StaticPlacement::from_record(record));
    }
    ctx.db
        .level_settings()
        .id()
        .update(LevelSettings::from_config(&config));

    verify_published(ctx, &config, &assets, &authority)?;
    sw.end();

    let count = authority.placements().len();
    log::info!(
        "published {count} static placements (seed {:?})",
        config.seed
    );
    Ok(count)
}

fn build_authority(config: &LevelConfig, assets: &AssetLibrary) -> LevelResult<HeadlessSession> {
    let mut session = HeadlessSession::new(Role::Authoritative, config.clone())?;
    session.create_level::<Headless>(assets, None)?;
    Ok(session)
}

/// Rebuild from the rows just written and compare collider bounds pairwise.
fn verify_published(
    ctx: &ReducerContext,
    config: &LevelConfig,
    assets: &AssetLibrary,
    authority: &HeadlessSession,
) -> Result<(), String> {
    let mut observer =
        HeadlessSession::new(Role::Observing, config.clone()).map_err(|e| e.to_string())?;
    observer
        .apply_sync::<Headless>(&published_payload(ctx), assets, None)
        .map_err(|e| e.to_string())?;

    let (Some(ours), Some(theirs)) = (authority.statics(), observer.statics()) else {
        return Err("level has no statics after build".into());
    };
    if ours.colliders.len() != theirs.colliders.len() {
        return Err(format!(
            "published {} placements but rebuilt {}",
            ours.colliders.len(),
            theirs.colliders.len()
        ));
    }
    for (i, (a, b)) in ours.colliders.iter().zip(&theirs.colliders).enumerate() {
        let gap = aabb_gap(authority.physics(), *a, observer.physics(), *b);
        if gap > REBUILD_TOLERANCE {
            log::error!("placement #{i} rebuilt {gap} m away from the authoritative collider");
            return Err(format!("placement #{i} does not survive publication"));
        }
    }
    Ok(())
}

fn aabb_gap(
    world_a: &StaticPhysicsWorld,
    a: ColliderHandle,
    world_b: &StaticPhysicsWorld,
    b: ColliderHandle,
) -> f32 {
    match (world_a.colliders.get(a), world_b.colliders.get(b)) {
        (Some(a), Some(b)) => {
            let (a, b) = (a.compute_aabb(), b.compute_aabb());
            (a.mins - b.mins).norm().max((a.maxs - b.maxs).norm())
        }
        _ => f32::INFINITY,
    }
}
