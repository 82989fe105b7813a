//! Steam user discovery.

use std::fs;

use serde::{Deserialize, Serialize};

use crate::SteamError;
use crate::paths::Paths;

/// A Steam user with shortcut information.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub has_shortcuts: bool,
}

/// Returns a list of Steam users from the userdata directory.
pub fn get_users(paths: &Paths) -> Result<Vec<User>, SteamError> {
    let user_data_dir = paths.user_data_dir();

    let entries = fs::read_dir(&user_data_dir).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            SteamError::NotFound
        } else {
            SteamError::Io(e.to_string())
        }
    })?;

    let mut users = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| SteamError::Io(e.to_string()))?;

        if !entry.file_type().map(|ft| ft.is_dir()).unwrap_or(false) {
            continue;
        }

        let name = entry.file_name();
        let name = name.to_string_lossy();

        // Verify it's a numeric user ID
        if name.parse::<u64>().is_err() {
            continue;
        }

        // Skip "0" directory — temporary Steam directory, not a real user
        if name == "0" {
            continue;
        }

        let has_shortcuts = paths.has_shortcuts(&name);
        users.push(User {
            id: name.into_owned(),
            has_shortcuts,
        });
    }

    users.sort_by(|a, b| a.id.cmp(&b.id));
    Ok(users)
}

/// Returns the first user that has shortcuts, or the first user if
/// none do.
pub fn first_user_with_shortcuts(paths: &Paths) -> Result<Option<User>, SteamError> {
    let users = get_users(paths)?;

    for u in &users {
        if u.has_shortcuts {
            return Ok(Some(u.clone()));
        }
    }

    Ok(users.into_iter().next())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_user(paths: &Paths, id: &str, with_shortcuts: bool) {
        paths.ensure_config_dir(id).unwrap();
        if with_shortcuts {
            fs::write(paths.shortcuts_path(id), b"\x00shortcuts\x00\x08\x08").unwrap();
        }
    }

    #[test]
    fn missing_userdata_is_not_found() {
        let tmp = tempfile::tempdir().unwrap();
        let paths = Paths::with_base(tmp.path().join("nope"));
        assert!(matches!(get_users(&paths), Err(SteamError::NotFound)));
    }

    #[test]
    fn skips_zero_and_non_numeric_dirs() {
        let tmp = tempfile::tempdir().unwrap();
        let paths = Paths::with_base(tmp.path());
        make_user(&paths, "1001", false);
        make_user(&paths, "0", false);
        fs::create_dir_all(paths.user_data_dir().join("ac_cache")).unwrap();

        let users = get_users(&paths).unwrap();
        assert_eq!(users.len(), 1);
        assert_eq!(users[0].id, "1001");
    }

    #[test]
    fn prefers_user_with_shortcuts() {
        let tmp = tempfile::tempdir().unwrap();
        let paths = Paths::with_base(tmp.path());
        make_user(&paths, "1001", false);
        make_user(&paths, "2002", true);

        let user = first_user_with_shortcuts(&paths).unwrap().unwrap();
        assert_eq!(user.id, "2002");
        assert!(user.has_shortcuts);
    }

    #[test]
    fn falls_back_to_first_user() {
        let tmp = tempfile::tempdir().unwrap();
        let paths = Paths::with_base(tmp.path());
        make_user(&paths, "3003", false);

        let user = first_user_with_shortcuts(&paths).unwrap().unwrap();
        assert_eq!(user.id, "3003");
        assert!(!user.has_shortcuts);
    }
}
