//! CLI smoke tests

use assert_cmd::Command;
use predicates::prelude::*;

fn cmd() -> Command {
    let mut cmd = Command::cargo_bin("steam-notion").expect("binary builds");
    // Credentials from the developer's shell must not leak into assertions.
    for var in [
        "STEAM_TOKEN",
        "STEAM_USER",
        "NOTION_TOKEN",
        "NOTION_PAGE_ID",
        "NOTION_DATABASE_ID",
        "UPDATE_MODE",
        "SKIP_FREE_STEAM",
        "SKIP_NON_STEAM",
        "USE_ONLY_LIBRARY",
        "STORE_BG_COVER",
        "TEST_LIMIT",
    ] {
        cmd.env_remove(var);
    }
    cmd
}

#[test]
fn test_help_shows_subcommands() {
    cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("sync"))
        .stdout(predicate::str::contains("library"))
        .stdout(predicate::str::contains("database"));
}

#[test]
fn test_version_flag() {
    cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("steam-notion"));
}

#[test]
fn test_sync_requires_credentials() {
    cmd()
        .arg("sync")
        .assert()
        .failure()
        .stderr(predicate::str::contains("--steam-token"));
}

#[test]
fn test_sync_rejects_conflicting_flags() {
    cmd()
        .args([
            "sync",
            "--steam-token",
            "key",
            "--steam-user",
            "kali",
            "--notion-token",
            "secret",
            "--database-id",
            "db-1",
            "--skip-delisted",
            "--library-only",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("mutually exclusive"));
}

#[test]
fn test_library_list_help() {
    cmd()
        .args(["library", "list", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--by-playtime"));
}

#[test]
fn test_database_create_help() {
    cmd()
        .args(["database", "create", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--page-id"));
}
