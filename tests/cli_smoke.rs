#![allow(clippy::unwrap_used)]
//! CLI smoke tests to verify basic command functionality.
//!
//! Every test points `XDG_CONFIG_HOME` at an empty temp directory so the user's
//! real configuration is never read.

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

#[allow(deprecated)]
fn polychat(config_home: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("polychat").unwrap();
    cmd.env("XDG_CONFIG_HOME", config_home.path())
        .env("NO_COLOR", "1")
        .env_remove("RUST_LOG");
    cmd
}

#[test]
fn test_help_displays_usage() {
    let home = TempDir::new().unwrap();
    polychat(&home)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Chat with strangers in your own language"))
        .stdout(predicate::str::contains("chat"))
        .stdout(predicate::str::contains("languages"))
        .stdout(predicate::str::contains("configure"));
}

#[test]
fn test_version_displays_version() {
    let home = TempDir::new().unwrap();
    polychat(&home)
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_chat_help() {
    let home = TempDir::new().unwrap();
    polychat(&home)
        .args(["chat", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--to"))
        .stdout(predicate::str::contains("--server"))
        .stdout(predicate::str::contains("--api"));
}

#[test]
fn test_invalid_language_code() {
    let home = TempDir::new().unwrap();
    polychat(&home)
        .args(["chat", "--to", "not a language"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid language code"));
}

#[test]
fn test_chat_without_config_names_missing_setting() {
    let home = TempDir::new().unwrap();
    polychat(&home)
        .args(["chat", "--to", "fr"])
        .write_stdin("")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Missing required configuration: 'server'"));
}

#[test]
fn test_configure_show_without_config() {
    let home = TempDir::new().unwrap();
    polychat(&home)
        .args(["configure", "--show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Current settings"))
        .stdout(predicate::str::contains("(not set)"));
}

#[test]
fn test_languages_reports_unreachable_catalog() {
    let home = TempDir::new().unwrap();
    let dir = home.path().join("polychat");
    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(
        dir.join("config.toml"),
        "[translation]\ncatalog = \"http://127.0.0.1:9/languages\"\ntimeout_secs = 2\n",
    )
    .unwrap();

    polychat(&home)
        .arg("languages")
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to fetch supported languages"));
}
