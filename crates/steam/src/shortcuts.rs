//! Shortcut registry synchronization.
//!
//! Merges SaveLink-owned entries into an existing shortcuts.vdf:
//! foreign entries (no SaveLink tag) pass through untouched in their
//! original relative order, owned entries are refreshed in place or
//! created, stale owned entries are dropped, and the whole list is
//! reindexed from zero. The owned collection in the collection index
//! store is rewritten afterwards as an independent step.

use std::path::{Path, PathBuf};

use crc32fast::Hasher;
use tracing::{debug, info, warn};

use savelink_protocol::{GameList, GameResult, Operation, Reason, ShortcutInfo};

use crate::SteamError;
use crate::collections::{Collection, CollectionStore, collection_key};
use crate::vdf::{self, Object, Value};

/// Configuration for one synchronization run.
#[derive(Debug, Clone)]
pub struct SyncConfig {
    /// Root directory holding per-game install directories.
    pub games_dir: PathBuf,
    /// Path to shortcuts.vdf.
    pub shortcuts_path: PathBuf,
    /// Path to the collection index store.
    pub collections_path: PathBuf,
    /// Tag marking entries as owned by this application.
    pub app_marker: String,
    /// Display name of the owned collection.
    pub collection_name: String,
    /// Directory holding per-game `<name>.ico` files, if any.
    pub icons_dir: Option<PathBuf>,
    /// When set, the decision stream is produced but nothing is
    /// written to disk.
    pub dry_run: bool,
}

/// Outcome of a synchronization run.
#[derive(Debug)]
pub struct SyncOutcome {
    /// Per-game results, in processing order.
    pub results: Vec<GameResult>,
    /// Identifiers of the owned entries, in processing order.
    pub app_ids: Vec<u32>,
    /// Owned entries as written, for reporting.
    pub shortcuts: Vec<ShortcutInfo>,
    /// Collection index failure, if any. The container rewrite is
    /// already committed when this is set.
    pub collection_error: Option<String>,
}

/// Generates the shortcut identifier for a game-relative executable
/// path.
///
/// `CRC32(rel_exe + NUL)` with the high bit forced set, matching
/// Steam's convention for non-canonical application identifiers. The
/// identifier depends on the relative executable path alone, so
/// renames of display name or arguments never orphan an entry.
pub fn shortcut_app_id(rel_exe: &str) -> u32 {
    let mut hasher = Hasher::new();
    hasher.update(rel_exe.as_bytes());
    hasher.update(&[0]);
    hasher.finalize() | 0x8000_0000
}

/// Synchronizes the shortcut container and the owned collection.
///
/// A container that fails to decode aborts the whole run; a missing
/// container starts empty. Per-game executable problems are reported
/// in that game's result and skipped. A collection store failure is
/// reported in the outcome but never rolls back the container
/// rewrite.
pub fn sync_shortcuts(games: &GameList, cfg: &SyncConfig) -> Result<SyncOutcome, SteamError> {
    let existing = match std::fs::read(&cfg.shortcuts_path) {
        Ok(data) => vdf::parse_shortcuts(&data)?,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            info!(path = %cfg.shortcuts_path.display(), "no shortcuts file, starting empty");
            Vec::new()
        }
        Err(e) => {
            return Err(SteamError::Io(format!(
                "failed to read {}: {e}",
                cfg.shortcuts_path.display()
            )));
        }
    };

    // Foreign entries keep their relative order and go first.
    let mut merged = Vec::with_capacity(existing.len());
    let mut owned: Vec<(u32, Object)> = Vec::new();
    for entry in existing {
        if entry.has_tag(&cfg.app_marker) {
            let app_id = entry.get_int("appid").unwrap_or(0);
            owned.push((app_id, entry));
        } else {
            merged.push(entry);
        }
    }
    debug!(
        foreign = merged.len(),
        owned = owned.len(),
        "partitioned existing entries"
    );

    let mut results = Vec::with_capacity(games.len());
    let mut app_ids = Vec::new();
    let mut shortcuts = Vec::new();

    for (game, entry) in games.iter() {
        let Some(exe) = entry.exe.as_deref() else {
            results.push(GameResult::ok(
                game.clone(),
                vec![Operation::Noop {
                    reason: Reason::NoExe,
                }],
            ));
            continue;
        };

        let game_dir = cfg.games_dir.join(game);
        let exe_full = game_dir.join(exe);
        if !exe_full.exists() {
            warn!(game = %game, exe = %exe_full.display(), "executable not found");
            results.push(GameResult::failed(
                game.clone(),
                Vec::new(),
                format!("{}: {}", Reason::ExeNotFound, exe_full.display()),
            ));
            continue;
        }

        let rel_exe = Path::new(game).join(exe);
        let app_id = shortcut_app_id(&rel_exe.to_string_lossy());

        let quoted_exe = format!("\"{}\"", exe_full.display());
        let quoted_start = format!("\"{}\"", game_dir.display());
        let launch_options = entry.args.clone().unwrap_or_default();
        let icon = icon_path(cfg, game).unwrap_or_default();

        let shortcut = match take_owned(&mut owned, app_id) {
            Some(mut existing) => {
                // Only the mutable fields are refreshed; identifier
                // and externally-set tags persist.
                existing.set_str("Exe", &quoted_exe);
                existing.set_str("StartDir", &quoted_start);
                existing.set_str("LaunchOptions", &launch_options);
                existing.set_str("icon", &icon);
                existing
            }
            None => new_shortcut(app_id, game, &quoted_exe, &quoted_start, &launch_options, &icon, &cfg.app_marker),
        };

        shortcuts.push(to_info(&shortcut));
        merged.push(shortcut);
        app_ids.push(app_id);

        let mut result = GameResult::ok(
            game.clone(),
            vec![Operation::Create {
                path: exe_full.clone(),
            }],
        );
        result.app_id = Some(app_id);
        results.push(result);
    }

    if !owned.is_empty() {
        debug!(stale = owned.len(), "dropping owned entries with no game");
    }

    if !cfg.dry_run {
        vdf::save_shortcuts(&cfg.shortcuts_path, &merged)?;
    }

    // The collection holds every identifier in the container as
    // written, foreign entries included, in final order.
    let all_ids: Vec<u32> = merged
        .iter()
        .filter_map(|entry| entry.get_int("appid"))
        .collect();

    // The collection index is committed separately; a failure here is
    // reported without touching the container already written.
    let collection_error = write_collection(cfg, &all_ids).err().map(|e| e.to_string());
    if let Some(err) = &collection_error {
        warn!(error = %err, "collection index update failed");
    }

    Ok(SyncOutcome {
        results,
        app_ids,
        shortcuts,
        collection_error,
    })
}

fn take_owned(owned: &mut Vec<(u32, Object)>, app_id: u32) -> Option<Object> {
    let idx = owned.iter().position(|(id, _)| *id == app_id)?;
    Some(owned.remove(idx).1)
}

fn icon_path(cfg: &SyncConfig, game: &str) -> Option<String> {
    let dir = cfg.icons_dir.as_ref()?;
    let path = dir.join(format!("{game}.ico"));
    path.exists().then(|| path.display().to_string())
}

fn new_shortcut(
    app_id: u32,
    name: &str,
    exe: &str,
    start_dir: &str,
    launch_options: &str,
    icon: &str,
    marker: &str,
) -> Object {
    let mut tags = Object::default();
    tags.push("0", Value::Str(marker.to_string()));

    let mut obj = Object::default();
    obj.push("appid", Value::Int(app_id));
    obj.push("AppName", Value::Str(name.to_string()));
    obj.push("Exe", Value::Str(exe.to_string()));
    obj.push("StartDir", Value::Str(start_dir.to_string()));
    obj.push("icon", Value::Str(icon.to_string()));
    obj.push("LaunchOptions", Value::Str(launch_options.to_string()));
    obj.push("tags", Value::Obj(tags));
    obj
}

fn to_info(obj: &Object) -> ShortcutInfo {
    ShortcutInfo {
        app_id: obj.get_int("appid").unwrap_or(0),
        name: obj.get_str("AppName").unwrap_or_default().to_string(),
        exe: obj.get_str("Exe").unwrap_or_default().to_string(),
        start_dir: obj.get_str("StartDir").unwrap_or_default().to_string(),
        launch_options: obj.get_str("LaunchOptions").unwrap_or_default().to_string(),
        icon: obj.get_str("icon").unwrap_or_default().to_string(),
        tags: obj.tags(),
    }
}

fn write_collection(cfg: &SyncConfig, app_ids: &[u32]) -> Result<(), SteamError> {
    let key = collection_key(&cfg.app_marker);
    let mut store = CollectionStore::open(&cfg.collections_path)?;
    store.prune(&key);
    store.insert(
        key,
        Collection {
            name: cfg.collection_name.clone(),
            added: app_ids.to_vec(),
            is_deleted: false,
        },
    );
    if !cfg.dry_run {
        store.save()?;
    }
    Ok(())
}
