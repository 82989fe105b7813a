//! Link reconciliation decision procedure.
//!
//! Inspects the cloud and game-save locations without following
//! symlinks and applies delete / move / link operations until the
//! cloud directory is authoritative and the game-save path is a
//! symlink to it. Operations are decided and applied in one ordered
//! pass; under dry-run the mutations are skipped but the record
//! stream is identical.

use std::path::Path;

use tokio::fs;
use tokio::sync::mpsc;
use tracing::{debug, warn};

use savelink_protocol::{GameEvent, GameList, GameResult, Operation, Reason, Settings};

use crate::SavesError;
use crate::resolve::{cloud_dir, resolve_save_dir};

/// Observed state of one path, lstat semantics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PathState {
    Absent,
    Dir,
    Symlink,
    Other,
}

/// Runs the reconciler over a game list, one game at a time.
///
/// Events are delivered through an owned channel; call
/// [`take_events`](Linker::take_events) before [`run`](Linker::run)
/// and drain the receiver concurrently.
pub struct Linker {
    settings: Settings,
    events_tx: mpsc::Sender<GameEvent>,
    events_rx: Option<mpsc::Receiver<GameEvent>>,
}

impl Linker {
    pub fn new(settings: Settings) -> Self {
        let (events_tx, events_rx) = mpsc::channel(256);
        Self {
            settings,
            events_tx,
            events_rx: Some(events_rx),
        }
    }

    /// Takes the event receiver. Can only be called once.
    pub fn take_events(&mut self) -> Option<mpsc::Receiver<GameEvent>> {
        self.events_rx.take()
    }

    /// Processes every game in list order.
    ///
    /// An I/O failure aborts only the current game; the remaining
    /// games are still processed.
    pub async fn run(&self, games: &GameList) -> Vec<GameResult> {
        let mut results = Vec::with_capacity(games.len());

        for (game, entry) in games.iter() {
            let _ = self
                .events_tx
                .send(GameEvent::Start { game: game.clone() })
                .await;

            let result = match resolve_save_dir(&self.settings, game, entry) {
                Some(save_dir) => {
                    let cloud = cloud_dir(&self.settings, game);
                    debug!(game = %game, cloud = %cloud.display(), save = %save_dir.display(), "reconciling");

                    let mut ops = Vec::new();
                    match reconcile(&cloud, &save_dir, self.settings.dry_run, &mut ops).await {
                        Ok(()) => GameResult::ok(game.clone(), ops),
                        Err(e) => {
                            warn!(game = %game, error = %e, "reconciliation failed");
                            GameResult::failed(game.clone(), ops, e.to_string())
                        }
                    }
                }
                None => {
                    debug!(game = %game, "no save path configured, skipping");
                    GameResult::ok(game.clone(), Vec::new())
                }
            };

            for op in &result.ops {
                let _ = self
                    .events_tx
                    .send(GameEvent::Op {
                        game: game.clone(),
                        op: op.clone(),
                    })
                    .await;
            }
            if let Some(message) = &result.error {
                let _ = self
                    .events_tx
                    .send(GameEvent::Error {
                        game: game.clone(),
                        message: message.clone(),
                    })
                    .await;
            }
            let _ = self
                .events_tx
                .send(GameEvent::End { game: game.clone() })
                .await;

            results.push(result);
        }

        results
    }
}

/// Reconciles one game's cloud directory and game-save path.
///
/// Appends the ordered operation records to `ops` as they are
/// applied, so a failing run still leaves the records of everything
/// that happened before the failure.
pub async fn reconcile(
    cloud: &Path,
    save: &Path,
    dry_run: bool,
    ops: &mut Vec<Operation>,
) -> Result<(), SavesError> {
    let mut cloud_state = probe(cloud).await?;

    // A cloud path that is not a directory cannot be authoritative.
    if matches!(cloud_state, PathState::Symlink | PathState::Other) {
        remove_any(cloud, cloud_state, dry_run).await?;
        ops.push(Operation::Delete {
            path: cloud.to_path_buf(),
            reason: Reason::NotADir,
        });
        cloud_state = PathState::Absent;
    }

    // A present-but-empty cloud directory is not yet authoritative.
    let cloud_authoritative =
        cloud_state == PathState::Dir && !dir_is_empty(cloud).await?;

    let save_state = probe(save).await?;

    if cloud_authoritative {
        match save_state {
            PathState::Symlink => {
                if links_to(save, cloud).await {
                    ops.push(Operation::Noop {
                        reason: Reason::AlreadyLinked,
                    });
                    return Ok(());
                }
                remove_any(save, save_state, dry_run).await?;
                ops.push(Operation::Delete {
                    path: save.to_path_buf(),
                    reason: Reason::WrongSymlink,
                });
            }
            PathState::Dir | PathState::Other => {
                // The cloud copy wins; the non-linked local copy is
                // destroyed, not merged.
                remove_any(save, save_state, dry_run).await?;
                ops.push(Operation::Delete {
                    path: save.to_path_buf(),
                    reason: Reason::AlreadyInSaves,
                });
            }
            PathState::Absent => {}
        }

        make_link(cloud, save, dry_run).await?;
        ops.push(Operation::Link {
            from: cloud.to_path_buf(),
            to: save.to_path_buf(),
        });
    } else if save_state == PathState::Dir {
        // First migration: the real directory moves to the cloud root.
        if cloud_state == PathState::Dir {
            if !dry_run {
                fs::remove_dir(cloud)
                    .await
                    .map_err(|e| SavesError::io(cloud, e))?;
            }
            ops.push(Operation::Delete {
                path: cloud.to_path_buf(),
                reason: Reason::EmptyDir,
            });
        }

        if !dry_run {
            if let Some(parent) = cloud.parent() {
                fs::create_dir_all(parent)
                    .await
                    .map_err(|e| SavesError::io(parent, e))?;
            }
            fs::rename(save, cloud)
                .await
                .map_err(|e| SavesError::io(save, e))?;
        }
        ops.push(Operation::Move {
            from: save.to_path_buf(),
            to: cloud.to_path_buf(),
        });

        make_link(cloud, save, dry_run).await?;
        ops.push(Operation::Link {
            from: cloud.to_path_buf(),
            to: save.to_path_buf(),
        });
    } else {
        // No source of truth; never destructive here.
        ops.push(Operation::Noop {
            reason: Reason::Unknown,
        });
    }

    Ok(())
}

/// Inspects a path without following symlinks.
async fn probe(path: &Path) -> Result<PathState, SavesError> {
    match fs::symlink_metadata(path).await {
        Ok(md) => {
            let ft = md.file_type();
            if ft.is_symlink() {
                Ok(PathState::Symlink)
            } else if ft.is_dir() {
                Ok(PathState::Dir)
            } else {
                Ok(PathState::Other)
            }
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(PathState::Absent),
        Err(e) => Err(SavesError::io(path, e)),
    }
}

async fn dir_is_empty(path: &Path) -> Result<bool, SavesError> {
    let mut entries = fs::read_dir(path)
        .await
        .map_err(|e| SavesError::io(path, e))?;
    let first = entries
        .next_entry()
        .await
        .map_err(|e| SavesError::io(path, e))?;
    Ok(first.is_none())
}

/// Returns true if `link` is a symlink resolving to `target`.
async fn links_to(link: &Path, target: &Path) -> bool {
    let Ok(dest) = fs::read_link(link).await else {
        return false;
    };
    let dest = if dest.is_absolute() {
        dest
    } else {
        match link.parent() {
            Some(parent) => parent.join(&dest),
            None => dest,
        }
    };
    match (fs::canonicalize(&dest).await, fs::canonicalize(target).await) {
        (Ok(a), Ok(b)) => a == b,
        _ => dest == target,
    }
}

async fn remove_any(path: &Path, state: PathState, dry_run: bool) -> Result<(), SavesError> {
    if dry_run {
        return Ok(());
    }
    let result = match state {
        PathState::Dir => fs::remove_dir_all(path).await,
        _ => fs::remove_file(path).await,
    };
    result.map_err(|e| SavesError::io(path, e))
}

/// Creates the game-save symlink pointing at the cloud directory,
/// ensuring the parent directory exists first. On Windows this is a
/// directory symlink (junction-style semantics).
async fn make_link(cloud: &Path, save: &Path, dry_run: bool) -> Result<(), SavesError> {
    if dry_run {
        return Ok(());
    }
    if let Some(parent) = save.parent() {
        fs::create_dir_all(parent)
            .await
            .map_err(|e| SavesError::io(parent, e))?;
    }
    #[cfg(unix)]
    fs::symlink(cloud, save)
        .await
        .map_err(|e| SavesError::io(save, e))?;
    #[cfg(windows)]
    fs::symlink_dir(cloud, save)
        .await
        .map_err(|e| SavesError::io(save, e))?;
    Ok(())
}
