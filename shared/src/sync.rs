//! Wire form of a level's placement list.
//!
//! The authoritative role publishes a [`SyncPayload`]; observers decode it and rebuild
//! the same colliders from it. A received payload replaces any prior state. There is no
//! version field.

use serde::{Deserialize, Serialize};

use crate::{LevelResult, PlacementRecord};

/// One placement on the wire. `rotation` is a unit quaternion as `(x, y, z, w)`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PlacementEntry {
    pub asset_id: String,
    pub translation: [f32; 3],
    pub rotation: [f32; 4],
}

impl From<&PlacementRecord> for PlacementEntry {
    fn from(record: &PlacementRecord) -> Self {
        let t = record.translation();
        let q = record.rotation().coords;
        Self {
            asset_id: record.asset_id().to_owned(),
            translation: [t.x, t.y, t.z],
            rotation: [q.x, q.y, q.z, q.w],
        }
    }
}

impl PlacementEntry {
    pub fn to_record(&self) -> LevelResult<PlacementRecord> {
        PlacementRecord::from_components(self.asset_id.clone(), self.translation, self.rotation)
    }
}

/// Ordered placement list, in generation order.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SyncPayload {
    pub placements: Vec<PlacementEntry>,
}

impl SyncPayload {
    pub fn from_records(records: &[PlacementRecord]) -> Self {
        Self {
            placements: records.iter().map(PlacementEntry::from).collect(),
        }
    }

    /// Validate and convert every entry, preserving order.
    pub fn to_records(&self) -> LevelResult<Vec<PlacementRecord>> {
        self.placements.iter().map(PlacementEntry::to_record).collect()
    }

    pub fn len(&self) -> usize {
        self.placements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.placements.is_empty()
    }

    pub fn encode(&self) -> LevelResult<String> {
        Ok(ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())?)
    }

    pub fn decode(text: &str) -> LevelResult<Self> {
        Ok(ron::from_str(text)?)
    }
}
