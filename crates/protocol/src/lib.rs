//! Shared types for SaveLink.
//!
//! Holds the configuration record for one game, the typed operation
//! records produced by the link reconciler and shortcut synchronizer,
//! and the per-game event stream consumed by the reporting layer.

mod events;
mod types;

pub use events::{GameEvent, GameResult, Operation, Reason};
pub use types::{GameEntry, GameList, Settings, ShortcutInfo};
