use crate::world::recreate_static_world;
use spacetimedb::ReducerContext;

/// Throw the current level away and build a new one.
///
/// Only the module owner may call this. Subscribed clients see every row deleted and
/// the new rows inserted in one transaction.
#[spacetimedb::reducer]
pub fn recreate_level(ctx: &ReducerContext, seed: Option<u64>) -> Result<(), String> {
    if ctx.sender != ctx.identity() {
        return Err("recreate_level is restricted to the module owner".into());
    }
    recreate_static_world(ctx, seed).map(|_| ())
}
