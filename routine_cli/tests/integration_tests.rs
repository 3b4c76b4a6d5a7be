//! Integration tests for the routinely binary.
//!
//! These tests verify end-to-end behavior including:
//! - Routine creation and persistence
//! - Grouping and regrouping through the CLI
//! - Typed engine errors surfacing as one-line messages

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

/// Helper to create a test data directory
fn setup_test_dir() -> TempDir {
    tempfile::tempdir().expect("Failed to create temp dir")
}

/// Helper to get the path to the CLI binary
fn cli() -> Command {
    Command::new(assert_cmd::cargo::cargo_bin!("routinely"))
}

/// Create a routine and return its id, parsed from stdout
fn create_routine(data_dir: &std::path::Path, name: &str, exercises: &[&str]) -> String {
    let mut cmd = cli();
    cmd.arg("new").arg(name);
    for exercise in exercises {
        cmd.arg(exercise);
    }
    let output = cmd
        .arg("--data-dir")
        .arg(data_dir)
        .assert()
        .success()
        .get_output()
        .clone();

    let stdout = String::from_utf8(output.stdout).unwrap();
    // "Created routine '<name>' (<uuid>)"
    stdout
        .rsplit('(')
        .next()
        .unwrap()
        .trim()
        .trim_end_matches(')')
        .to_string()
}

#[test]
fn test_cli_help() {
    cli()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Workout routine composition system",
        ));
}

#[test]
fn test_new_routine_persists_to_disk() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path().to_path_buf();

    let id = create_routine(&data_dir, "push day", &["bench_press", "overhead_press"]);

    // One JSON file per routine in the data dir
    let routine_path = data_dir.join("routines").join(format!("{}.json", id));
    assert!(routine_path.exists());
    let contents = fs::read_to_string(&routine_path).unwrap();
    assert!(contents.contains("bench_press"));
}

#[test]
fn test_new_empty_routine_is_refused() {
    let temp_dir = setup_test_dir();

    cli()
        .arg("new")
        .arg("empty day")
        .arg("--data-dir")
        .arg(temp_dir.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("no exercises"));
}

#[test]
fn test_new_rest_day_may_be_empty() {
    let temp_dir = setup_test_dir();

    cli()
        .arg("new")
        .arg("deload")
        .arg("--rest-day")
        .arg("--data-dir")
        .arg(temp_dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Created routine 'deload'"));
}

#[test]
fn test_list_shows_saved_routines() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path().to_path_buf();
    create_routine(&data_dir, "push day", &["bench_press"]);

    cli()
        .arg("list")
        .arg("--data-dir")
        .arg(&data_dir)
        .assert()
        .success()
        .stdout(predicate::str::contains("push day"))
        .stdout(predicate::str::contains("1 exercises"));
}

#[test]
fn test_group_forms_superset() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path().to_path_buf();
    let id = create_routine(&data_dir, "upper A", &["bench_press", "barbell_row"]);

    cli()
        .arg("group")
        .arg(&id)
        .arg("0")
        .arg("1")
        .arg("--rounds")
        .arg("3")
        .arg("--data-dir")
        .arg(&data_dir)
        .assert()
        .success()
        .stdout(predicate::str::contains("[superset #1]"))
        .stdout(predicate::str::contains("[superset #2]"));

    // Both persisted entries share one group id with order 0 and 1
    let routine_path = data_dir.join("routines").join(format!("{}.json", id));
    let json: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&routine_path).unwrap()).unwrap();
    let entries = json["entries"].as_array().unwrap();
    assert_eq!(
        entries[0]["group"]["group_id"],
        entries[1]["group"]["group_id"]
    );
    assert_eq!(entries[0]["group"]["order"], 0);
    assert_eq!(entries[1]["group"]["order"], 1);
}

#[test]
fn test_group_non_contiguous_fails_cleanly() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path().to_path_buf();
    let id = create_routine(
        &data_dir,
        "upper A",
        &["bench_press", "pullup", "barbell_row"],
    );

    cli()
        .arg("group")
        .arg(&id)
        .arg("0")
        .arg("2")
        .arg("--data-dir")
        .arg(&data_dir)
        .assert()
        .failure()
        .stderr(predicate::str::contains("not a contiguous run"));
}

#[test]
fn test_move_breaking_group_ungroups() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path().to_path_buf();
    let id = create_routine(
        &data_dir,
        "upper A",
        &["bench_press", "barbell_row", "pullup"],
    );

    cli()
        .arg("group")
        .arg(&id)
        .arg("0")
        .arg("1")
        .arg("--data-dir")
        .arg(&data_dir)
        .assert()
        .success();

    // Moving the outsider between the members splits the superset
    let output = cli()
        .arg("move")
        .arg(&id)
        .arg("2")
        .arg("1")
        .arg("--data-dir")
        .arg(&data_dir)
        .assert()
        .success()
        .get_output()
        .clone();

    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(!stdout.contains("superset"));
}

#[test]
fn test_circuit_estimate_uses_cadence() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path().to_path_buf();
    let id = create_routine(&data_dir, "conditioning", &["kettlebell_swing", "pushup"]);

    cli()
        .arg("group")
        .arg(&id)
        .arg("0")
        .arg("1")
        .arg("--circuit")
        .arg("--cadence")
        .arg("30")
        .arg("--rounds")
        .arg("4")
        .arg("--data-dir")
        .arg(&data_dir)
        .assert()
        .success();

    // 4 rounds x 2 members x 30 s
    cli()
        .arg("estimate")
        .arg(&id)
        .arg("--data-dir")
        .arg(&data_dir)
        .assert()
        .success()
        .stdout(predicate::str::contains("240 seconds"));
}

#[test]
fn test_rounds_remove_orphan_is_refused() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path().to_path_buf();
    let id = create_routine(&data_dir, "upper A", &["bench_press", "barbell_row"]);

    cli()
        .arg("group")
        .arg(&id)
        .arg("0")
        .arg("1")
        .arg("--rounds")
        .arg("1")
        .arg("--data-dir")
        .arg(&data_dir)
        .assert()
        .success();

    cli()
        .arg("rounds")
        .arg(&id)
        .arg("0")
        .arg("--remove")
        .arg("--data-dir")
        .arg(&data_dir)
        .assert()
        .failure()
        .stderr(predicate::str::contains("no sets"));
}

#[test]
fn test_set_metric_with_pound_normalization() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path().to_path_buf();
    let id = create_routine(&data_dir, "upper A", &["bench_press"]);

    // 100 lb is ~45.36 kg canonical
    cli()
        .arg("set-metric")
        .arg(&id)
        .arg("0")
        .arg("weight")
        .arg("100")
        .arg("--unit")
        .arg("lb")
        .arg("--data-dir")
        .arg(&data_dir)
        .assert()
        .success()
        .stdout(predicate::str::contains("45.35"));
}

#[test]
fn test_unknown_exercise_fails() {
    let temp_dir = setup_test_dir();

    cli()
        .arg("new")
        .arg("leg day")
        .arg("hamster_wheel")
        .arg("--data-dir")
        .arg(temp_dir.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown exercise"));
}

#[test]
fn test_catalog_lists_exercises() {
    cli()
        .arg("catalog")
        .assert()
        .success()
        .stdout(predicate::str::contains("back_squat"))
        .stdout(predicate::str::contains("rowing_erg"));
}
