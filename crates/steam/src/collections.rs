//! Collection index store.
//!
//! A small on-disk key-value store of named collections, separate
//! from shortcuts.vdf. SaveLink owns exactly one collection (keyed by
//! its application marker) and fully replaces its membership on every
//! run; every other collection is read and written back untouched.
//! The store is read fully, mutated in memory, and rewritten once —
//! the owning launcher must be quiescent during a run.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::SteamError;

/// Reserved key of the collection owned by an application marker.
pub fn collection_key(app_marker: &str) -> String {
    format!("user-collections.{app_marker}")
}

/// One named collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Collection {
    pub name: String,
    #[serde(default)]
    pub added: Vec<u32>,
    #[serde(default)]
    pub is_deleted: bool,
}

/// File-backed collection store.
pub struct CollectionStore {
    path: PathBuf,
    collections: BTreeMap<String, Collection>,
}

impl CollectionStore {
    /// Opens the store, reading all collections. A missing file is an
    /// empty store; an unreadable or unparseable file is an error so
    /// the caller can report it without blocking unrelated work.
    pub fn open(path: &Path) -> Result<Self, SteamError> {
        let collections = match fs::read_to_string(path) {
            Ok(raw) => serde_json::from_str(&raw).map_err(|e| {
                SteamError::Collections(format!("failed to parse {}: {e}", path.display()))
            })?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => {
                return Err(SteamError::Collections(format!(
                    "failed to open {}: {e}",
                    path.display()
                )));
            }
        };
        Ok(Self {
            path: path.to_path_buf(),
            collections,
        })
    }

    pub fn get(&self, key: &str) -> Option<&Collection> {
        self.collections.get(key)
    }

    pub fn len(&self) -> usize {
        self.collections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.collections.is_empty()
    }

    /// Drops the owned collection and any collection marked deleted.
    pub fn prune(&mut self, owned_key: &str) {
        self.collections
            .retain(|key, coll| key != owned_key && !coll.is_deleted);
    }

    pub fn insert(&mut self, key: String, collection: Collection) {
        self.collections.insert(key, collection);
    }

    /// Persists the store atomically (write-temp-then-rename).
    pub fn save(&self) -> Result<(), SteamError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                SteamError::Collections(format!("failed to create {}: {e}", parent.display()))
            })?;
        }
        let raw = serde_json::to_string_pretty(&self.collections)
            .map_err(|e| SteamError::Collections(format!("failed to serialize store: {e}")))?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, raw).map_err(|e| {
            SteamError::Collections(format!("failed to write {}: {e}", tmp.display()))
        })?;
        fs::rename(&tmp, &self.path).map_err(|e| {
            SteamError::Collections(format!("failed to replace {}: {e}", self.path.display()))
        })?;
        Ok(())
    }
}
