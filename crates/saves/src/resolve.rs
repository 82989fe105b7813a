//! Save path resolution.

use std::path::{Component, Path, PathBuf};

use savelink_protocol::{GameEntry, Settings};

/// Returns the canonical cloud directory for a game.
pub fn cloud_dir(settings: &Settings, game: &str) -> PathBuf {
    settings.saves_dir.join(game)
}

/// Resolves a game's save directory from its configuration.
///
/// `~/`-prefixed paths expand against the home directory; relative
/// paths resolve under `<games_dir>/<game>`. The result is lexically
/// normalized (`.` and `..` components folded, without touching the
/// filesystem). Returns `None` when the game has no save path
/// configured.
pub fn resolve_save_dir(settings: &Settings, game: &str, entry: &GameEntry) -> Option<PathBuf> {
    let raw = entry.saves.as_deref()?;

    let path = if let Some(rest) = raw.strip_prefix("~/") {
        settings.home_dir.join(rest)
    } else if raw == "~" {
        settings.home_dir.clone()
    } else {
        let p = Path::new(raw);
        if p.is_absolute() {
            p.to_path_buf()
        } else {
            settings.games_dir.join(game).join(p)
        }
    };

    Some(normalize(&path))
}

/// Folds `.` and `..` components lexically. Symlinks are deliberately
/// not resolved; the reconciler decides on lstat state.
fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                // ".." above the root stays at the root; a leading
                // ".." on a relative path is kept as-is.
                if !out.pop() && !out.has_root() {
                    out.push(component.as_os_str());
                }
            }
            _ => out.push(component.as_os_str()),
        }
    }
    out
}
