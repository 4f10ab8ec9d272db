//! Where the placement list comes from.
//!
//! Two sources:
//! - A RON payload file written by the authority (`--placements <file>`).
//! - Loopback: this process also plays the authoritative role. It generates a level
//!   headless, encodes the payload, decodes it again and hands the result to the
//!   observer, exactly as a remote client would receive it. `R` regenerates with the
//!   next seed.
//!
//! The server publishes the same list as the public `static_placement` table; a
//! SpacetimeDB subscription to it would write [`PlacementsReceived`] the same way.

use crate::input::InputAction;
use bevy::prelude::*;
use leafwing_input_manager::prelude::*;
use shared::{
    AssetLibrary, Headless, HeadlessSession, LevelConfig, LevelResult, Role, SyncPayload,
};
use std::path::{Path, PathBuf};

/// A complete placement list, already decoded.
#[derive(Message, Debug, Clone)]
pub struct PlacementsReceived(pub SyncPayload);

#[derive(Resource, Debug, Clone, PartialEq)]
pub enum LevelSource {
    File(PathBuf),
    Loopback { seed: u64 },
}

pub(super) fn plugin(app: &mut App) {
    let source = read_source_from_cli_env();
    match &source {
        LevelSource::File(path) => info!("Observing placements from {}", path.display()),
        LevelSource::Loopback { seed } => info!("No placements file; loopback with seed {seed}"),
    }

    app.add_message::<PlacementsReceived>();
    app.insert_resource(source);
    app.add_systems(Startup, receive_initial);
    app.add_systems(Update, regenerate_loopback);
}

fn receive_initial(source: Res<LevelSource>, mut writer: MessageWriter<PlacementsReceived>) {
    let payload = match &*source {
        LevelSource::File(path) => read_payload_file(path),
        LevelSource::Loopback { seed } => loopback_payload(*seed),
    };
    match payload {
        Ok(payload) => {
            writer.write(PlacementsReceived(payload));
        }
        Err(err) => error!("no placements to observe: {err}"),
    }
}

fn regenerate_loopback(
    action_state: Res<ActionState<InputAction>>,
    mut source: ResMut<LevelSource>,
    mut writer: MessageWriter<PlacementsReceived>,
) {
    if !action_state.just_pressed(&InputAction::Regenerate) {
        return;
    }
    let LevelSource::Loopback { seed } = &mut *source else {
        warn!("Regenerate ignored: placements come from a file");
        return;
    };
    *seed = seed.wrapping_add(1);
    match loopback_payload(*seed) {
        Ok(payload) => {
            writer.write(PlacementsReceived(payload));
        }
        Err(err) => error!("loopback regeneration failed: {err}"),
    }
}

fn read_payload_file(path: &Path) -> Result<SyncPayload, String> {
    let text = std::fs::read_to_string(path).map_err(|e| format!("{}: {e}", path.display()))?;
    SyncPayload::decode(&text).map_err(|e| e.to_string())
}

/// Generate a level as the authority and return the payload a subscriber would see.
fn loopback_payload(seed: u64) -> Result<SyncPayload, String> {
    let wire = authority_payload_text(seed).map_err(|e| e.to_string())?;
    SyncPayload::decode(&wire).map_err(|e| e.to_string())
}

fn authority_payload_text(seed: u64) -> LevelResult<String> {
    let assets = AssetLibrary::builtin()?;
    let mut authority = HeadlessSession::new(
        Role::Authoritative,
        LevelConfig::default().with_seed(seed),
    )?;
    authority.create_level::<Headless>(&assets, None)?;
    authority.sync_payload()?.encode()
}

/// Returns the level source from CLI args or environment.
///
/// Supported:
///   --placements <path>
///   --placements=<path>
///   --seed <u64>
///   --seed=<u64>
///   LEVEL_PLACEMENTS environment variable
fn read_source_from_cli_env() -> LevelSource {
    let mut placements: Option<PathBuf> = None;
    let mut seed: Option<u64> = None;

    let mut args = std::env::args().skip(1);
    let mut pending_key: Option<&'static str> = None;
    while let Some(arg) = args.next() {
        if let Some(key) = pending_key.take() {
            if key == "placements" {
                placements = Some(PathBuf::from(arg));
            } else if key == "seed" {
                seed = parse_seed(&arg);
            }
        } else if arg == "--placements" || arg == "-p" {
            pending_key = Some("placements");
        } else if let Some(val) = arg.strip_prefix("--placements=") {
            placements = Some(PathBuf::from(val));
        } else if arg == "--seed" {
            pending_key = Some("seed");
        } else if let Some(val) = arg.strip_prefix("--seed=") {
            seed = parse_seed(val);
        }
    }

    // ENV fallback for the file only; the seed is a loopback concern.
    if let Some(path) = placements.or_else(|| std::env::var_os("LEVEL_PLACEMENTS").map(PathBuf::from)) {
        return LevelSource::File(path);
    }
    LevelSource::Loopback {
        seed: seed.unwrap_or(0),
    }
}

fn parse_seed(text: &str) -> Option<u64> {
    match text.parse() {
        Ok(seed) => Some(seed),
        Err(_) => {
            warn!("Ignoring invalid --seed value `{text}`");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loopback_survives_the_wire() {
        let payload = loopback_payload(9).unwrap();
        assert_eq!(payload.len(), 1);
        let records = payload.to_records().unwrap();
        assert!(shared::STRUCTURE_CATALOG.contains(&records[0].asset_id()));
    }

    #[test]
    fn loopback_is_reproducible_per_seed() {
        assert_eq!(loopback_payload(4).unwrap(), loopback_payload(4).unwrap());
    }
}
