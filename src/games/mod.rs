//! Mini-game engines
//!
//! Each engine is a synchronous state machine driven by key presses,
//! a once-per-second tick and modal answers. Nothing here does I/O.

pub mod badges;
pub mod catalog;
pub mod chore_adventure;
pub mod placement;
pub mod treasure_hunt;

pub use badges::{BadgeBook, BadgeRule};
pub use catalog::{generate_options, ChallengeOption, ShopItem};
pub use chore_adventure::{ChoreAdventure, ChoreEvent, ChorePhase};
pub use placement::{place_entities, PlacementArea};
pub use treasure_hunt::{HuntConfig, HuntPhase, TreasureHunt, WallLayout};
