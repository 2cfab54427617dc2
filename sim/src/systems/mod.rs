//! ECS Systems for the map-part simulation.
//!
//! Systems are thin: each one borrows the `Battlescape` resource and calls
//! into the structural core. They run chained, once per fixed update:
//!
//! 1. `projectile_impact_system` - resolves queued impacts, may destroy parts
//! 2. `map_part_update_system` - countdowns, falling, rubble and animation
//! 3. `collect_map_part_events_system` - moves core events into the buffer
//! 4. `loose_item_system` - flags items whose supporting part went away

pub mod collision;
pub mod events;
pub mod structure;

pub use collision::*;
pub use events::*;
pub use structure::*;
