//! Steam directory paths.

use std::fs;
use std::path::PathBuf;

use crate::SteamError;

/// Provides access to Steam directory paths.
pub struct Paths {
    base_dir: PathBuf,
}

impl Paths {
    /// Creates a new `Paths` instance with auto-detected Steam directory.
    pub fn new() -> Result<Self, SteamError> {
        let base_dir = get_base_dir()?;
        Ok(Self { base_dir })
    }

    /// Creates a new `Paths` instance with a custom base directory.
    pub fn with_base(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }

    /// Returns the Steam base directory.
    pub fn base_dir(&self) -> &PathBuf {
        &self.base_dir
    }

    /// Returns the userdata directory.
    pub fn user_data_dir(&self) -> PathBuf {
        self.base_dir.join("userdata")
    }

    /// Returns the directory for a specific user.
    pub fn user_dir(&self, user_id: &str) -> PathBuf {
        self.user_data_dir().join(user_id)
    }

    /// Returns the config directory for a user.
    pub fn config_dir(&self, user_id: &str) -> PathBuf {
        self.user_dir(user_id).join("config")
    }

    /// Returns the path to shortcuts.vdf for a user.
    pub fn shortcuts_path(&self, user_id: &str) -> PathBuf {
        self.config_dir(user_id).join("shortcuts.vdf")
    }

    /// Returns the path of the SaveLink collection index store for a
    /// user.
    pub fn collections_path(&self, user_id: &str) -> PathBuf {
        self.config_dir(user_id).join("savelink-collections.json")
    }

    /// Returns true if the user has a shortcuts.vdf file.
    pub fn has_shortcuts(&self, user_id: &str) -> bool {
        self.shortcuts_path(user_id).exists()
    }

    /// Creates the config directory for a user if it doesn't exist.
    pub fn ensure_config_dir(&self, user_id: &str) -> Result<(), SteamError> {
        fs::create_dir_all(self.config_dir(user_id))
            .map_err(|e| SteamError::Io(format!("failed to create config dir: {e}")))
    }
}

// Platform-specific base directory detection.
#[cfg(target_os = "linux")]
fn get_base_dir() -> Result<PathBuf, SteamError> {
    let home = std::env::var_os("HOME")
        .map(PathBuf::from)
        .ok_or(SteamError::NotFound)?;

    // Primary location: ~/.steam/steam
    let steam_dir = home.join(".steam").join("steam");
    if steam_dir.exists() {
        return Ok(steam_dir);
    }

    // Fallback: ~/.local/share/Steam
    let steam_dir = home.join(".local").join("share").join("Steam");
    if steam_dir.exists() {
        return Ok(steam_dir);
    }

    // Flatpak location
    let steam_dir = home
        .join(".var")
        .join("app")
        .join("com.valvesoftware.Steam")
        .join(".steam")
        .join("steam");
    if steam_dir.exists() {
        return Ok(steam_dir);
    }

    Err(SteamError::NotFound)
}

#[cfg(target_os = "windows")]
fn get_base_dir() -> Result<PathBuf, SteamError> {
    // Try 64-bit registry first
    if let Ok(path) = read_steam_registry(r"SOFTWARE\Wow6432Node\Valve\Steam") {
        return Ok(path);
    }

    // Fall back to 32-bit registry
    if let Ok(path) = read_steam_registry(r"SOFTWARE\Valve\Steam") {
        return Ok(path);
    }

    Err(SteamError::NotFound)
}

#[cfg(target_os = "windows")]
fn read_steam_registry(subkey: &str) -> Result<PathBuf, SteamError> {
    use winreg::RegKey;
    use winreg::enums::HKEY_LOCAL_MACHINE;

    let hklm = RegKey::predef(HKEY_LOCAL_MACHINE);
    let key = hklm.open_subkey(subkey).map_err(|_| SteamError::NotFound)?;
    let install_path: String = key
        .get_value("InstallPath")
        .map_err(|_| SteamError::NotFound)?;
    Ok(PathBuf::from(install_path))
}

#[cfg(not(any(target_os = "linux", target_os = "windows")))]
fn get_base_dir() -> Result<PathBuf, SteamError> {
    Err(SteamError::NotFound)
}
