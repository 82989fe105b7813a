//! Settings assembly and game list loading.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};

use savelink_protocol::{GameList, Settings};

use crate::Cli;

/// Builds the run settings from CLI flags and the environment.
///
/// All configuration flows through the returned value; components
/// never read ambient process state themselves.
pub fn settings(cli: &Cli) -> Result<Settings> {
    let home_dir = match &cli.home_dir {
        Some(dir) => dir.clone(),
        None => std::env::var_os("HOME")
            .map(PathBuf::from)
            .context("HOME is not set; pass --home-dir")?,
    };
    let games_dir = cli
        .games_dir
        .clone()
        .unwrap_or_else(|| home_dir.join("Games"));
    let saves_dir = cli
        .saves_dir
        .clone()
        .unwrap_or_else(|| home_dir.join("Dropbox").join("Saves"));

    Ok(Settings {
        home_dir,
        games_dir,
        saves_dir,
        dry_run: cli.dry_run,
    })
}

/// Loads the YAML game list, preserving document order.
///
/// Game names double as path segments under the save and games roots,
/// so separators are rejected up front.
pub fn load_games(path: &Path) -> Result<GameList> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read game list {}", path.display()))?;
    let games: GameList = serde_yaml::from_str(&raw)
        .with_context(|| format!("failed to parse game list {}", path.display()))?;

    for (name, _) in games.iter() {
        if name.is_empty() || name.contains('/') || name.contains('\\') {
            bail!("invalid game name {name:?}: names are used as path segments");
        }
    }

    Ok(games)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_games_preserves_order_and_fields() {
        let tmp = tempfile::tempdir().unwrap();
        let conf = tmp.path().join("games.yml");
        fs::write(
            &conf,
            "Witcher:\n  saves: \"~/Documents/The Witcher 3\"\n  exe: bin/x64/witcher3.exe\nFactory:\n  saves: saves\n  exe: factory.exe\n  args: \"--skip-intro\"\n",
        )
        .unwrap();

        let games = load_games(&conf).unwrap();
        let names: Vec<&str> = games.iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(names, vec!["Witcher", "Factory"]);
        assert_eq!(games.0[1].1.args.as_deref(), Some("--skip-intro"));
    }

    #[test]
    fn load_games_rejects_path_separators() {
        let tmp = tempfile::tempdir().unwrap();
        let conf = tmp.path().join("games.yml");
        fs::write(&conf, "\"evil/name\":\n  saves: \"~/x\"\n").unwrap();
        assert!(load_games(&conf).is_err());
    }

    #[test]
    fn load_games_missing_file_errors() {
        assert!(load_games(Path::new("/nonexistent/games.yml")).is_err());
    }
}
