use crate::types::*;
use shared::{PlacementEntry, PlacementRecord};
use spacetimedb::*;

/// One static structure placed by the authoritative level build.
///
/// This public table is the synchronization transport: clients subscribe to it and
/// rebuild identical colliders from the rows, ordered by `id`. Rows are replaced
/// wholesale whenever the level is recreated; they are never edited in place.
#[table(name = static_placement, public)]
pub struct StaticPlacement {
    /// Unique id (primary key). Insertion order is placement order.
    #[primary_key]
    #[auto_inc]
    pub id: u64,

    /// Key into the structure catalog (e.g. "gate").
    pub asset_id: String,

    /// Logical world transform, before the collision mesh correction.
    pub translation: DbVec3,
    pub rotation: DbQuat,
}

impl StaticPlacement {
    pub fn from_record(record: &PlacementRecord) -> Self {
        Self {
            id: 0,
            asset_id: record.asset_id().to_owned(),
            translation: record.translation().into(),
            rotation: (*record.rotation()).into(),
        }
    }

    pub fn to_entry(&self) -> PlacementEntry {
        PlacementEntry {
            asset_id: self.asset_id.clone(),
            translation: self.translation.into(),
            rotation: self.rotation.into(),
        }
    }

    pub fn clear(ctx: &ReducerContext) {
        for row in ctx.db.static_placement().iter() {
            ctx.db.static_placement().delete(row);
        }
    }
}
