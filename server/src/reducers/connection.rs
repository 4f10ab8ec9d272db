//! Connection lifecycle reducers.
//!
//! Clients receive the level through their `static_placement` subscription, so
//! connecting needs no per-client state. These reducers only log.

use crate::schema::*;
use spacetimedb::{ReducerContext, Table};

#[spacetimedb::reducer(client_connected)]
pub fn identity_connected(ctx: &ReducerContext) {
    log::info!(
        "Client connected: {:?} ({} static placements to sync)",
        ctx.sender,
        ctx.db.static_placement().count()
    );
}

#[spacetimedb::reducer(client_disconnected)]
pub fn identity_disconnected(ctx: &ReducerContext) {
    log::info!("Client disconnected: {:?}", ctx.sender);
}
