//! CLI Integration Tests
//!
//! Runs the `funnel` binary with assert_cmd against workbook fixtures.

// Binaries are not exercised during coverage builds
#![cfg(not(coverage))]
#![allow(deprecated)] // Command::cargo_bin deprecation - no stable replacement yet

mod common;

use assert_cmd::Command;
use common::dashboard_workbook;
use predicates::prelude::*;
use tempfile::TempDir;

const GOOGLE_VARS: &[&str] = &[
    "GOOGLE_SHEETS_SPREADSHEET_ID",
    "GOOGLE_SHEETS_CLIENT_EMAIL",
    "GOOGLE_SHEETS_PRIVATE_KEY",
    "GOOGLE_SHEETS_ACCESS_TOKEN",
];

fn funnel() -> Command {
    let mut cmd = Command::cargo_bin("funnel").unwrap();
    cmd.env("NO_COLOR", "1")
        .env_remove("FUNNEL_XLSX")
        .env_remove("FUNNEL_CONFIG");
    for var in GOOGLE_VARS {
        cmd.env_remove(var);
    }
    cmd
}

// ═══════════════════════════════════════════════════════════════════════════
// HELP AND VERSION TESTS
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn test_cli_help() {
    funnel()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("funnel"))
        .stdout(predicate::str::contains("COMMANDS"));
}

#[test]
fn test_cli_version() {
    funnel()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_metrics_requires_period() {
    funnel().arg("metrics").assert().failure();
}

// ═══════════════════════════════════════════════════════════════════════════
// METRICS COMMAND
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn test_metrics_json() {
    let (_dir, path) = dashboard_workbook();
    let output = funnel()
        .arg("--xlsx")
        .arg(&path)
        .args(["metrics", "febrero", "--json"])
        .output()
        .unwrap();

    assert!(output.status.success());
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["period"], "febrero");
    assert_eq!(json["metricas"]["agencias"][1]["agencia"], "GWM Cuernavaca");
    assert_eq!(json["metricas"]["totalGrupo"]["visitas"], 150.0);
    assert!(json["metricas"]["totalGrupo"]["agencia"].is_null());
}

#[test]
fn test_metrics_table() {
    let (_dir, path) = dashboard_workbook();
    funnel()
        .arg("--xlsx")
        .arg(&path)
        .args(["metrics", "febrero"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Febrero 2026"))
        .stdout(predicate::str::contains("Acura"))
        .stdout(predicate::str::contains("Grupo Daytona"))
        .stdout(predicate::str::contains("10.0%"));
}

#[test]
fn test_metrics_xlsx_from_env() {
    let (_dir, path) = dashboard_workbook();
    funnel()
        .env("FUNNEL_XLSX", &path)
        .args(["metrics", "febrero", "--json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("totalGrupo"));
}

#[test]
fn test_metrics_unknown_period_fails() {
    let (_dir, path) = dashboard_workbook();
    funnel()
        .arg("--xlsx")
        .arg(&path)
        .args(["metrics", "marzo"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown period: marzo"));
}

#[test]
fn test_metrics_without_credentials_fails() {
    funnel()
        .args(["metrics", "febrero"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Configuration error"))
        .stderr(predicate::str::contains("GOOGLE_SHEETS_SPREADSHEET_ID"));
}

// ═══════════════════════════════════════════════════════════════════════════
// FORECAST AND PERIODS
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn test_forecast_json() {
    let (_dir, path) = dashboard_workbook();
    let output = funnel()
        .arg("--xlsx")
        .arg(&path)
        .args(["forecast", "--json"])
        .output()
        .unwrap();

    assert!(output.status.success());
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["agency"], "Total Grupo");
    assert_eq!(json["data"][1]["metric"], "Ventas Seminuevos");
    assert_eq!(json["data"][1]["febReal"], 11.0);
}

#[test]
fn test_forecast_unknown_agency_fails() {
    let (_dir, path) = dashboard_workbook();
    funnel()
        .arg("--xlsx")
        .arg(&path)
        .args(["forecast", "--agency", "Nissan Polanco"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown agency"));
}

#[test]
fn test_periods_defaults() {
    funnel()
        .arg("periods")
        .assert()
        .success()
        .stdout(predicate::str::contains("diciembre"))
        .stdout(predicate::str::contains("Res Ene26!A1:Z200"))
        .stdout(predicate::str::contains("12 agencies"));
}

#[test]
fn test_periods_from_settings_file() {
    let dir = TempDir::new().unwrap();
    let settings = dir.path().join("funnel.yaml");
    std::fs::write(
        &settings,
        r#"
periods:
  - key: marzo
    label: Marzo 2026
    range: "Res Mar 26!A1:Z200"
"#,
    )
    .unwrap();

    funnel()
        .arg("--config")
        .arg(&settings)
        .arg("periods")
        .assert()
        .success()
        .stdout(predicate::str::contains("marzo"))
        .stdout(predicate::str::contains("diciembre").not());
}

#[test]
fn test_invalid_settings_file_fails() {
    let dir = TempDir::new().unwrap();
    let settings = dir.path().join("funnel.yaml");
    std::fs::write(&settings, "periods:\n  - key: x\n    label: X\n    range: \"no-bang\"\n").unwrap();

    funnel()
        .arg("--config")
        .arg(&settings)
        .arg("periods")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Configuration error"));
}
