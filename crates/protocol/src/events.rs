use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Stable reason code attached to delete and noop records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Reason {
    /// The cloud path existed but was not a directory.
    NotADir,
    /// The game-save copy was superseded by the cloud copy.
    AlreadyInSaves,
    /// The game-save path was a symlink to somewhere else.
    WrongSymlink,
    /// The game-save path already links to the cloud directory.
    AlreadyLinked,
    /// A present-but-empty cloud directory was removed to make way
    /// for the first migration.
    EmptyDir,
    /// Neither location yielded a usable directory.
    Unknown,
    /// The game has no executable configured.
    NoExe,
    /// The configured executable does not exist on disk.
    ExeNotFound,
}

impl fmt::Display for Reason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let code = match self {
            Reason::NotADir => "not_a_dir",
            Reason::AlreadyInSaves => "already_in_saves",
            Reason::WrongSymlink => "wrong_symlink",
            Reason::AlreadyLinked => "already_linked",
            Reason::EmptyDir => "empty_dir",
            Reason::Unknown => "unknown",
            Reason::NoExe => "no_exe",
            Reason::ExeNotFound => "exe_not_found",
        };
        f.write_str(code)
    }
}

/// One applied (or, under dry-run, planned) filesystem or registry
/// operation. The ordered sequence of records for one game is the
/// audit trail of what happened.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Operation {
    Delete { path: PathBuf, reason: Reason },
    Move { from: PathBuf, to: PathBuf },
    Link { from: PathBuf, to: PathBuf },
    Create { path: PathBuf },
    Noop { reason: Reason },
}

/// Per-game notification delivered to the reporting layer.
///
/// Operation-level info (`Op`) and game-level errors (`Error`) are
/// distinct variants; errors never masquerade as operations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "camelCase")]
pub enum GameEvent {
    Start { game: String },
    Op { game: String, op: Operation },
    Error { game: String, message: String },
    End { game: String },
}

/// Outcome of processing one game in either component.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameResult {
    pub game: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub app_id: Option<u32>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub ops: Vec<Operation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl GameResult {
    /// A successful result carrying the recorded operations.
    pub fn ok(game: impl Into<String>, ops: Vec<Operation>) -> Self {
        Self {
            game: game.into(),
            app_id: None,
            ops,
            error: None,
        }
    }

    /// A failed result; any operations recorded before the failure
    /// are kept.
    pub fn failed(game: impl Into<String>, ops: Vec<Operation>, message: impl Into<String>) -> Self {
        Self {
            game: game.into(),
            app_id: None,
            ops,
            error: Some(message.into()),
        }
    }
}
