//! Integration tests for the flowtwin CLI
//!
//! These tests exercise the CLI commands end-to-end using assert_cmd.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

/// Helper to get a flowtwin command
fn flowtwin() -> Command {
    Command::cargo_bin("flowtwin").unwrap()
}

#[test]
fn test_help_displays() {
    flowtwin()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("digital twin"));
}

#[test]
fn test_version_displays() {
    flowtwin()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("flowtwin"));
}

#[test]
fn test_unknown_command_fails() {
    flowtwin().arg("unknown-command").assert().failure();
}

#[test]
fn test_catalog_lists_operations() {
    flowtwin()
        .arg("catalog")
        .assert()
        .success()
        .stdout(predicate::str::contains("Heat Treatment"))
        .stdout(predicate::str::contains("Theoretical minimum lead time"));
}

#[test]
fn test_simulate_prints_summary() {
    flowtwin()
        .args(["simulate", "--cases", "20", "--seed", "7"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Generated"))
        .stdout(predicate::str::contains("Mean lead time"));
}

#[test]
fn test_simulate_exports_csv() {
    let tmp = TempDir::new().unwrap();
    let out = tmp.path().join("event_log.csv");

    flowtwin()
        .args(["simulate", "--cases", "15", "--seed", "3", "-o"])
        .arg(&out)
        .assert()
        .success();

    let contents = fs::read_to_string(&out).unwrap();
    let header = contents.lines().next().unwrap();
    assert!(header.starts_with("case_id,activity,activity_fr,operation_id"));
    assert!(header.ends_with("defect_detected,duration_minutes"));
    // header plus at least one event per stage per case
    assert!(contents.lines().count() > 15 * 6);
}

#[test]
fn test_simulate_is_reproducible_across_invocations() {
    let tmp = TempDir::new().unwrap();
    let first = tmp.path().join("a.csv");
    let second = tmp.path().join("b.csv");

    for out in [&first, &second] {
        flowtwin()
            .args(["simulate", "--cases", "25", "--seed", "42", "-o"])
            .arg(out)
            .assert()
            .success();
    }

    assert_eq!(fs::read(&first).unwrap(), fs::read(&second).unwrap());
}

#[test]
fn test_simulate_rejects_zero_cases() {
    flowtwin()
        .args(["simulate", "--cases", "0"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("positive"));
}

#[test]
fn test_simulate_rejects_missing_catalog_file() {
    flowtwin()
        .args(["simulate", "--cases", "5", "--catalog", "/nonexistent.yaml"])
        .assert()
        .failure();
}

#[test]
fn test_custom_catalog_file_is_honored() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("catalog.yaml");
    fs::write(
        &path,
        r#"
stages:
  - id: CUT
    name: Cutting
    avg_duration_minutes: 10.0
    std_deviation_minutes: 2.0
    setup_time_minutes: 1.0
    defect_rate: 0.1
    workstation_count: 1
  - id: QC
    name: Inspection
    avg_duration_minutes: 5.0
    std_deviation_minutes: 1.0
    workstation_count: 1
sequence: [CUT, QC]
rework_routes:
  CUT: CUT
inspection_stage: QC
"#,
    )
    .unwrap();

    flowtwin()
        .args(["catalog", "--catalog"])
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("Cutting"));

    flowtwin()
        .args(["simulate", "--cases", "10", "--catalog"])
        .arg(&path)
        .assert()
        .success();
}

#[test]
fn test_invalid_catalog_is_rejected_up_front() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("broken.yaml");
    fs::write(
        &path,
        r#"
stages:
  - id: CUT
    name: Cutting
    avg_duration_minutes: 10.0
    std_deviation_minutes: 2.0
    workstation_count: 1
sequence: [CUT, MISSING]
inspection_stage: CUT
"#,
    )
    .unwrap();

    flowtwin()
        .args(["simulate", "--cases", "5", "--catalog"])
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown operation"));
}

#[test]
fn test_analyze_prints_tables() {
    flowtwin()
        .args(["analyze", "--cases", "40", "--seed", "42"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Bottleneck analysis"))
        .stdout(predicate::str::contains("Rework sources"))
        .stdout(predicate::str::contains("Standard flow conformance"));
}

#[test]
fn test_report_prints_kpis_and_actions() {
    flowtwin()
        .args(["report", "--cases", "60", "--seed", "42"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Success KPIs"))
        .stdout(predicate::str::contains("Optimization recommendations"))
        .stdout(predicate::str::contains("Top 3 priority actions"));
}

#[test]
fn test_quiet_suppresses_status_lines() {
    flowtwin()
        .args(["simulate", "--cases", "10", "--quiet"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Generated").not());
}
