mod level_settings_table;
mod static_placement_table;

pub use level_settings_table::*;
pub use static_placement_table::*;
