//! End-to-end tests for the savelink binary.

use std::fs;
use std::path::Path;
use std::process::Command;

use assert_cmd::prelude::*;
use predicates::prelude::*;

fn savelink() -> Command {
    Command::cargo_bin("savelink").unwrap()
}

fn write_conf(root: &Path, contents: &str) -> std::path::PathBuf {
    let conf = root.join("games.yml");
    fs::write(&conf, contents).unwrap();
    conf
}

fn base_args(cmd: &mut Command, root: &Path, conf: &Path) {
    cmd.arg("--home-dir")
        .arg(root.join("home"))
        .arg("--games-dir")
        .arg(root.join("games"))
        .arg("--saves-dir")
        .arg(root.join("cloud"))
        .arg("--conf")
        .arg(conf)
        .arg("--no-shortcuts");
}

#[test]
fn help_lists_flags() {
    savelink()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--dry-run"))
        .stdout(predicate::str::contains("--saves-dir"));
}

#[test]
fn missing_config_fails() {
    let tmp = tempfile::tempdir().unwrap();
    let mut cmd = savelink();
    base_args(&mut cmd, tmp.path(), &tmp.path().join("absent.yml"));
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("failed to read game list"));
}

#[cfg(unix)]
#[test]
fn dry_run_reports_without_touching_disk() {
    let tmp = tempfile::tempdir().unwrap();
    let root = tmp.path();
    let save = root.join("home/Documents/Foo");
    fs::create_dir_all(&save).unwrap();
    fs::write(save.join("save.dat"), "progress").unwrap();
    let conf = write_conf(root, "Foo:\n  saves: \"~/Documents/Foo\"\n");

    let mut cmd = savelink();
    base_args(&mut cmd, root, &conf);
    cmd.arg("--dry-run")
        .assert()
        .success()
        .stdout(predicate::str::contains("Foo"))
        .stdout(predicate::str::contains("move"));

    // Nothing changed on disk.
    assert!(save.is_dir());
    assert!(save.join("save.dat").is_file());
    assert!(!root.join("cloud/Foo").exists());
}

#[cfg(unix)]
#[test]
fn run_migrates_then_reports_noop() {
    let tmp = tempfile::tempdir().unwrap();
    let root = tmp.path();
    let save = root.join("home/Documents/Foo");
    fs::create_dir_all(&save).unwrap();
    fs::write(save.join("save.dat"), "progress").unwrap();
    let conf = write_conf(root, "Foo:\n  saves: \"~/Documents/Foo\"\n");

    let mut cmd = savelink();
    base_args(&mut cmd, root, &conf);
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("move"))
        .stdout(predicate::str::contains("link"));

    let cloud = root.join("cloud/Foo");
    assert!(cloud.join("save.dat").is_file());
    assert!(save.symlink_metadata().unwrap().file_type().is_symlink());

    let mut cmd = savelink();
    base_args(&mut cmd, root, &conf);
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("already_linked"));
}

#[cfg(unix)]
#[test]
fn shortcut_sync_against_fake_steam_dir() {
    let tmp = tempfile::tempdir().unwrap();
    let root = tmp.path();

    let exe = root.join("games/Foo/foo.sh");
    fs::create_dir_all(exe.parent().unwrap()).unwrap();
    fs::write(&exe, "#!/bin/sh\n").unwrap();

    let steam = root.join("steam");
    let config_dir = steam.join("userdata/1001/config");
    fs::create_dir_all(&config_dir).unwrap();
    fs::write(config_dir.join("shortcuts.vdf"), b"\x00shortcuts\x00\x08\x08").unwrap();

    let conf = write_conf(root, "Foo:\n  exe: foo.sh\n");

    let mut cmd = savelink();
    cmd.arg("--home-dir")
        .arg(root.join("home"))
        .arg("--games-dir")
        .arg(root.join("games"))
        .arg("--saves-dir")
        .arg(root.join("cloud"))
        .arg("--conf")
        .arg(&conf)
        .arg("--steam-dir")
        .arg(&steam)
        .arg("--steam-user")
        .arg("1001");
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("synced"));

    let vdf = fs::read(config_dir.join("shortcuts.vdf")).unwrap();
    assert!(vdf.windows(4).any(|w| w == b"Foo\x00"));
    assert!(config_dir.join("savelink-collections.json").is_file());
}
