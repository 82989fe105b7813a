use std::fmt;
use std::path::PathBuf;

use serde::de::{MapAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize};

/// One game record from the configuration file.
///
/// The game name is the key of the surrounding mapping, not a field.
/// `saves` may be absolute, `~/`-prefixed, or relative to the game's
/// install directory. `exe` is always relative to the game's install
/// directory.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameEntry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub saves: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exe: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub args: Option<String>,
}

/// The full game list, in configuration-file order.
///
/// Deserialized through a map visitor so the insertion order of the
/// source document is preserved; games are always processed in this
/// order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GameList(pub Vec<(String, GameEntry)>);

impl GameList {
    pub fn iter(&self) -> std::slice::Iter<'_, (String, GameEntry)> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<'de> Deserialize<'de> for GameList {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct GameListVisitor;

        impl<'de> Visitor<'de> for GameListVisitor {
            type Value = GameList;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a mapping of game name to game entry")
            }

            fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut games = Vec::with_capacity(map.size_hint().unwrap_or(0));
                while let Some((name, entry)) = map.next_entry::<String, GameEntry>()? {
                    games.push((name, entry));
                }
                Ok(GameList(games))
            }
        }

        deserializer.deserialize_map(GameListVisitor)
    }
}

/// Resolved run configuration, passed explicitly into every component.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    /// The user's home directory, used for `~/` expansion.
    pub home_dir: PathBuf,
    /// Root directory holding per-game install directories.
    pub games_dir: PathBuf,
    /// Cloud-synchronized save root; each game owns `<saves_dir>/<name>`.
    pub saves_dir: PathBuf,
    /// When set, mutations are skipped but the full operation stream
    /// is still produced.
    pub dry_run: bool,
}

/// Typed summary of one shortcut registry entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShortcutInfo {
    pub app_id: u32,
    pub name: String,
    pub exe: String,
    pub start_dir: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub launch_options: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub icon: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
}
