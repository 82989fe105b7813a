//! Save directory reconciliation.
//!
//! For each configured game, converges two filesystem locations to a
//! single canonical state: the authoritative save directory lives
//! under the cloud save root, and the game-save path is a symbolic
//! link resolving to it. Decisions are made from fresh lstat state per
//! game; no state is cached across games or runs.

mod reconcile;
mod resolve;

pub use reconcile::{Linker, reconcile};
pub use resolve::{cloud_dir, resolve_save_dir};

use std::path::{Path, PathBuf};

/// Errors for save reconciliation.
///
/// Absent paths and wrong-type paths are state branches handled by the
/// decision procedure, never errors. Only mutating operations that
/// fail outside the model surface here, and they are fatal for the
/// current game only.
#[derive(Debug, thiserror::Error)]
pub enum SavesError {
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl SavesError {
    pub(crate) fn io(path: &Path, source: std::io::Error) -> Self {
        SavesError::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}
