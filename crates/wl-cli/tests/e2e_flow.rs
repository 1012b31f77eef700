//! End-to-end integration tests for the complete workout log flow.
//!
//! Tests the full pipeline: log → list → evaluate → awards → export → import
//! by driving the `wl` binary against a database in a temp directory.

use std::io::Write;
use std::path::Path;
use std::process::{Command, Output, Stdio};

use tempfile::TempDir;

fn wl_binary() -> String {
    env!("CARGO_BIN_EXE_wl").to_string()
}

/// Builds a `wl` command isolated from the user's config and data.
fn wl(home: &Path, db: &Path) -> Command {
    let mut cmd = Command::new(wl_binary());
    cmd.env("HOME", home)
        .env_remove("XDG_CONFIG_HOME")
        .env_remove("XDG_DATA_HOME")
        .env("WL_DATABASE_PATH", db);
    cmd
}

fn run_ok(cmd: &mut Command) -> String {
    let output = cmd.output().expect("failed to run wl");
    assert!(
        output.status.success(),
        "wl should succeed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8(output.stdout).unwrap()
}

fn log_set(home: &Path, db: &Path, exercise: &str, weight: &str, days_ago: u32) -> String {
    run_ok(
        wl(home, db)
            .args(["log", exercise, "--weight", weight, "--reps", "5", "-g", "Chest"])
            .args(["--date", &format!("{days_ago} days ago")]),
    )
}

/// Logging, listing and evaluating an exercise over several sessions.
#[test]
fn test_log_list_evaluate() {
    let temp = TempDir::new().unwrap();
    let db = temp.path().join("data/wl.db");

    let first = log_set(temp.path(), &db, "Bench Press", "135", 6);
    assert!(first.starts_with("Logged Bench Press: 135 lbs x 5"));
    assert!(db.exists(), "database should be created in a nested directory");

    log_set(temp.path(), &db, "Bench Press", "160", 4);
    let third = log_set(temp.path(), &db, "Bench Press", "185", 2);
    assert!(
        third.contains("Award unlocked: 💪 Bench +50 lbs (tier 1)"),
        "bench gain should unlock: {third}"
    );

    let listed = run_ok(wl(temp.path(), &db).args(["list", "--exercise", "bench press"]));
    let weights: Vec<&str> = listed
        .lines()
        .map(|line| line.split_whitespace().nth(3).unwrap())
        .collect();
    assert_eq!(weights, vec!["185", "160", "135"]);

    let report = run_ok(wl(temp.path(), &db).args(["evaluate", "Bench Press"]));
    assert!(report.starts_with("Bench Press: strength and endurance are both up"));
    assert!(report.contains("- Predicted next session: 160 lbs x 5 reps."));
    assert!(report.contains("- Weight up 25 lbs from last session (185 vs 160)."));

    let json = run_ok(wl(temp.path(), &db).args(["evaluate", "--json"]));
    let groups: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(groups[0]["category"], "Chest");
    assert_eq!(groups[0]["reports"][0]["sessions"], 3);
}

/// Award state persists between runs and unlocks are reported once.
#[test]
fn test_awards_persist() {
    let temp = TempDir::new().unwrap();
    let db = temp.path().join("wl.db");

    for exercise in ["Squat", "Bench Press", "Deadlift", "Row", "Curl"] {
        log_set(temp.path(), &db, exercise, "100", 1);
    }

    let awards = run_ok(wl(temp.path(), &db).args(["awards", "--json"]));
    let awards: serde_json::Value = serde_json::from_str(&awards).unwrap();
    let all_rounder = awards
        .as_array()
        .unwrap()
        .iter()
        .find(|a| a["title"] == "All-Rounder")
        .unwrap();
    assert_eq!(all_rounder["achieved"], true);
    assert!(all_rounder["date_earned"].is_string());

    let text = run_ok(wl(temp.path(), &db).arg("awards"));
    assert!(!text.contains("Award unlocked"), "no repeat unlocks: {text}");
    assert!(text.contains("🎯 All-Rounder: achieved"));
}

/// Export from one database and import into another.
#[test]
fn test_export_import_round_trip() {
    let temp = TempDir::new().unwrap();
    let source = temp.path().join("source.db");
    let target = temp.path().join("target.db");

    log_set(temp.path(), &source, "Squat", "225", 3);
    log_set(temp.path(), &source, "Squat", "235", 1);

    let exported = run_ok(wl(temp.path(), &source).arg("export"));
    let export_file = temp.path().join("entries.json");
    std::fs::write(&export_file, &exported).unwrap();

    let imported = run_ok(wl(temp.path(), &target).arg("import").arg(&export_file));
    assert_eq!(imported.trim(), "Imported 2 entries (0 already present)");

    let reexported = run_ok(wl(temp.path(), &target).arg("export"));
    assert_eq!(reexported, exported);

    // Import from stdin skips what is already there
    let mut child = wl(temp.path(), &target)
        .arg("import")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .spawn()
        .unwrap();
    child
        .stdin
        .as_mut()
        .unwrap()
        .write_all(exported.as_bytes())
        .unwrap();
    let output = child.wait_with_output().unwrap();
    assert!(output.status.success());
    assert_eq!(
        String::from_utf8_lossy(&output.stdout).trim(),
        "Imported 0 entries (2 already present)"
    );
}

/// User errors exit non-zero with a message on stderr.
#[test]
fn test_errors_are_reported() {
    let temp = TempDir::new().unwrap();
    let db = temp.path().join("wl.db");

    let output: Output = wl(temp.path(), &db)
        .args(["delete", "no-such-entry"])
        .output()
        .unwrap();
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("entry not found: no-such-entry"));

    let output = wl(temp.path(), &db)
        .args(["log", "Squat", "--weight", "-5", "--reps", "5"])
        .output()
        .unwrap();
    assert!(!output.status.success());

    let output = wl(temp.path(), &db)
        .arg("import")
        .stdin(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .and_then(|mut child| {
            child.stdin.as_mut().unwrap().write_all(b"not json")?;
            child.wait_with_output()
        })
        .unwrap();
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("invalid JSON"));
}

/// Deleting an entry removes it from the list.
#[test]
fn test_delete_entry() {
    let temp = TempDir::new().unwrap();
    let db = temp.path().join("wl.db");

    let logged = log_set(temp.path(), &db, "Squat", "225", 0);
    let id = logged
        .lines()
        .next()
        .and_then(|line| line.rsplit_once('('))
        .map(|(_, rest)| rest.trim_end_matches(')'))
        .unwrap()
        .to_string();

    let deleted = run_ok(wl(temp.path(), &db).args(["delete", &id]));
    assert_eq!(deleted.trim(), format!("Deleted entry {id} (Squat)"));

    let listed = run_ok(wl(temp.path(), &db).arg("list"));
    assert_eq!(listed.trim(), "No entries logged.");
}
