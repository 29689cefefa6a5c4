//! Integration tests for the `diskutil` binary.
//!
//! These run the binary via `assert_cmd` against topology snapshot files in a
//! temporary directory, with an explicit (absent) config file so the user's
//! own config never leaks in.

use std::path::{Path, PathBuf};

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;

const SNAPSHOT: &str = r#"{
    "scheme": "hc",
    "root": {
        "name": "chassis",
        "children": [
            {
                "name": "bay",
                "properties": { "protocol": { "label": "Bay 1" } },
                "children": [
                    { "name": "disk", "properties": { "storage": { "logical-disk": "c0t0d0" } } },
                    { "name": "fail", "facility": true,
                      "properties": { "facility": { "type": 0, "mode": 0 } } },
                    { "name": "ident", "facility": true,
                      "properties": { "facility": { "type": 1, "mode": 0 } } }
                ]
            },
            {
                "name": "bay", "instance": 1,
                "children": [
                    { "name": "disk", "properties": { "storage": { "logical-disk": "c0t1d0" } } }
                ]
            }
        ]
    }
}"#;

fn cli() -> assert_cmd::Command {
    cargo_bin_cmd!("diskutil")
}

/// Command preloaded with `--config` and `--topology` for `dir`.
fn cli_in(dir: &Path, topology: &Path) -> assert_cmd::Command {
    let mut cmd = cli();
    cmd.arg("--config")
        .arg(dir.join("none.toml"))
        .arg("--topology")
        .arg(topology);
    cmd
}

fn write_topology(dir: &Path, contents: &str) -> PathBuf {
    let path = dir.join("topology.json");
    std::fs::write(&path, contents).unwrap();
    path
}

/// Whitespace-separated columns of each stdout line.
fn rows(stdout: &[u8]) -> Vec<Vec<String>> {
    String::from_utf8_lossy(stdout)
        .lines()
        .map(|l| l.split_whitespace().map(str::to_string).collect())
        .collect()
}

// ── Usage ──

#[test]
fn cli_help_succeeds() {
    cli()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("diskutil"));
}

#[test]
fn cli_version_prints_version() {
    cli()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn cli_no_args_prints_usage_and_fails() {
    cli()
        .assert()
        .code(1)
        .stdout(predicate::str::starts_with("usage:"))
        .stdout(predicate::str::contains("DISK_DEVICE <locate|service> <on|off>"));
}

#[test]
fn cli_bad_mode_fails() {
    cli()
        .args(["c0t0d0", "locate", "blink"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("unknown LED mode 'blink'"));
}

#[test]
fn cli_bad_led_name_fails() {
    cli()
        .args(["c0t0d0", "power", "on"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("unknown LED name 'power'"));
}

#[test]
fn cli_wrong_arg_count_fails() {
    cli()
        .args(["c0t0d0", "locate"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("unknown args"))
        .stderr(predicate::str::contains("usage:"));
}

#[test]
fn cli_unknown_flag_fails_with_usage() {
    cli()
        .args(["--bogus", "list"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("--bogus"))
        .stderr(predicate::str::contains("usage:"));
}

#[test]
fn cli_flag_shaped_word_fails() {
    cli()
        .args(["c0t0d0", "locate", "-x"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("usage:"));
}

#[test]
fn cli_bad_args_do_not_touch_topology() {
    let dir = tempfile::tempdir().unwrap();
    cli_in(dir.path(), &dir.path().join("missing.json"))
        .args(["c0t0d0", "locate", "blink"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("could not open topology").not());
}

// ── list ──

#[test]
fn cli_list_prints_table() {
    let dir = tempfile::tempdir().unwrap();
    let topo = write_topology(dir.path(), SNAPSHOT);
    let out = cli_in(dir.path(), &topo)
        .arg("list")
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let rows = rows(&out);
    assert_eq!(rows.len(), 3);
    assert_eq!(rows[0], ["DISK", "BAY", "SERVICE?", "LOCATE?"]);
    assert_eq!(rows[1], ["c0t0d0", "Bay", "1", "OFF", "OFF"]);
    assert_eq!(rows[2], ["c0t1d0", "-", "-", "-"]);
}

#[test]
fn cli_list_empty_chassis_prints_header_only() {
    let dir = tempfile::tempdir().unwrap();
    let topo = write_topology(dir.path(), r#"{ "root": { "name": "chassis" } }"#);
    let out = cli_in(dir.path(), &topo)
        .arg("list")
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    assert_eq!(rows(&out).len(), 1);
}

#[test]
fn cli_list_missing_topology_fails() {
    let dir = tempfile::tempdir().unwrap();
    cli_in(dir.path(), &dir.path().join("missing.json"))
        .arg("list")
        .assert()
        .code(1)
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("could not open topology"));
}

#[test]
fn cli_list_empty_tree_fails() {
    let dir = tempfile::tempdir().unwrap();
    let topo = write_topology(dir.path(), r#"{ "scheme": "hc" }"#);
    cli_in(dir.path(), &topo)
        .arg("list")
        .assert()
        .code(1)
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("tree is empty"));
}

#[test]
fn cli_list_unknown_scheme_fails() {
    let dir = tempfile::tempdir().unwrap();
    let topo = write_topology(dir.path(), SNAPSHOT);
    cli_in(dir.path(), &topo)
        .args(["--scheme", "dev", "list"])
        .assert()
        .code(1)
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("scheme 'dev' not found"));
}

#[test]
fn cli_topology_path_from_config() {
    let dir = tempfile::tempdir().unwrap();
    let topo = write_topology(dir.path(), SNAPSHOT);
    let config = dir.path().join("config.toml");
    std::fs::write(
        &config,
        format!("topology_path = {:?}\n", topo.to_string_lossy()),
    )
    .unwrap();
    cli()
        .arg("--config")
        .arg(&config)
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("c0t0d0"));
}

// ── control ──

#[test]
fn cli_locate_on_then_list_shows_on() {
    let dir = tempfile::tempdir().unwrap();
    let topo = write_topology(dir.path(), SNAPSHOT);

    let out = cli_in(dir.path(), &topo)
        .args(["c0t0d0", "locate", "on"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let control_rows = rows(&out);
    assert_eq!(control_rows.len(), 2);
    assert_eq!(control_rows[1], ["c0t0d0", "Bay", "1", "OFF", "ON"]);

    let out = cli_in(dir.path(), &topo)
        .arg("list")
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    assert_eq!(rows(&out)[1], ["c0t0d0", "Bay", "1", "OFF", "ON"]);

    cli_in(dir.path(), &topo)
        .args(["c0t0d0", "locate", "off"])
        .assert()
        .success();
    let out = cli_in(dir.path(), &topo)
        .arg("list")
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    assert_eq!(rows(&out)[1], ["c0t0d0", "Bay", "1", "OFF", "OFF"]);
}

#[test]
fn cli_control_unknown_disk_fails() {
    let dir = tempfile::tempdir().unwrap();
    let topo = write_topology(dir.path(), SNAPSHOT);
    cli_in(dir.path(), &topo)
        .args(["c9t9d9", "locate", "on"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains(
            "could not find locate LED on disk c9t9d9",
        ));
}

#[test]
fn cli_control_disk_without_indicator_fails() {
    let dir = tempfile::tempdir().unwrap();
    let topo = write_topology(dir.path(), SNAPSHOT);
    cli_in(dir.path(), &topo)
        .args(["c0t1d0", "service", "on"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains(
            "could not find service LED on disk c0t1d0",
        ));
}

#[test]
fn cli_verbose_flag_accepted() {
    let dir = tempfile::tempdir().unwrap();
    let topo = write_topology(dir.path(), SNAPSHOT);
    cli_in(dir.path(), &topo)
        .args(["-v", "list"])
        .assert()
        .success();
}
