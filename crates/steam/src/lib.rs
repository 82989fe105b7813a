//! Steam integration for SaveLink.
//!
//! Decodes and re-encodes the binary `shortcuts.vdf` container,
//! merges SaveLink-owned shortcut entries into it without disturbing
//! foreign entries, and maintains exactly one owned collection in a
//! separate collection index store.

pub mod collections;
pub mod paths;
pub mod shortcuts;
pub mod users;
pub mod vdf;

// Re-export primary types.
pub use collections::{Collection, CollectionStore};
pub use paths::Paths;
pub use shortcuts::{SyncConfig, SyncOutcome, shortcut_app_id, sync_shortcuts};
pub use users::{User, first_user_with_shortcuts, get_users};

/// Errors for Steam operations.
#[derive(Debug, thiserror::Error)]
pub enum SteamError {
    #[error("steam installation not found")]
    NotFound,

    #[error("no steam user with shortcuts found")]
    UserNotFound,

    #[error("VDF parse error: {0}")]
    Vdf(String),

    #[error("I/O error: {0}")]
    Io(String),

    #[error("collection store error: {0}")]
    Collections(String),
}
