mod reducers {
    mod connection;
    pub mod recreate_level;
}
pub mod schema;
pub mod types;
mod world;

use spacetimedb::*;

#[reducer(init)]
pub fn init(ctx: &ReducerContext) -> Result<(), String> {
    let count = world::recreate_static_world(ctx, None)?;
    log::info!("level initialized with {count} static placements");
    Ok(())
}
