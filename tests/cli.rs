//! Integration tests for the `ledger` binary
//!
//! Every test runs against its own data directory.

use std::fs;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn ledger(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("ledger").unwrap();
    cmd.env("BUDGET_LEDGER_DATA_DIR", dir.path())
        .env("RUST_LOG", "warn");
    cmd
}

#[test]
fn test_first_run_creates_default_version() {
    let dir = TempDir::new().unwrap();

    ledger(&dir)
        .args(["version", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Budget v1"))
        .stdout(predicate::str::contains("*"));

    assert!(dir.path().join("data").join("versions.json").exists());
}

#[test]
fn test_create_version_selects_it() {
    let dir = TempDir::new().unwrap();

    ledger(&dir)
        .args(["version", "create", "Shooting Budget"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Created version: Shooting Budget"));

    ledger(&dir)
        .args(["version", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Shooting Budget"));

    ledger(&dir)
        .args(["version", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Budget v1"))
        .stdout(predicate::str::contains("Shooting Budget"));
}

#[test]
fn test_create_version_rejects_empty_name() {
    let dir = TempDir::new().unwrap();

    ledger(&dir)
        .args(["version", "create", "   "])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Name cannot be empty"));
}

#[test]
fn test_locked_version_rejects_changes() {
    let dir = TempDir::new().unwrap();

    ledger(&dir)
        .args(["version", "lock"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Locked version: Budget v1"));

    ledger(&dir)
        .args(["item", "add", "Director", "-c", "Above the Line", "-u", "5000"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("locked"));

    ledger(&dir).args(["version", "unlock"]).assert().success();

    ledger(&dir)
        .args(["item", "add", "Director", "-c", "Above the Line", "-u", "5000"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Total: 5000.00"));
}

#[test]
fn test_delete_last_version_keeps_one() {
    let dir = TempDir::new().unwrap();

    ledger(&dir)
        .args(["version", "delete", "Budget v1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Deleted version: Budget v1"))
        .stdout(predicate::str::contains("Selected version:"));

    ledger(&dir)
        .args(["version", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No budget versions found.").not());
}

#[test]
fn test_transaction_over_remaining_budget_is_rejected() {
    let dir = TempDir::new().unwrap();

    ledger(&dir)
        .args(["item", "add", "Catering", "-c", "Below the Line", "-q", "1", "-d", "2", "-u", "100"])
        .assert()
        .success();

    ledger(&dir)
        .args(["txn", "add", "150", "-c", "Catering", "-d", "2024-03-01", "-i", "Catering"])
        .assert()
        .success()
        .stdout(predicate::str::contains("150.00"));

    ledger(&dir)
        .args(["txn", "add", "60", "-c", "Catering", "-d", "2024-03-02", "-i", "Catering"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("exceeds the remaining budget"));
}

#[test]
fn test_summary_shows_totals() {
    let dir = TempDir::new().unwrap();

    ledger(&dir)
        .args(["item", "add", "Camera Package", "-c", "Below the Line", "-d", "10", "-u", "1200"])
        .assert()
        .success();

    ledger(&dir)
        .args(["summary", "--days-elapsed", "5", "--total-days", "10"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Budget Summary (USD)"))
        .stdout(predicate::str::contains("12000.00"))
        .stdout(predicate::str::contains("Projection"));
}

#[test]
fn test_rate_card_apply_updates_linked_items() {
    let dir = TempDir::new().unwrap();

    ledger(&dir)
        .args(["rate-card", "add", "Key Grip", "650", "-c", "Grip"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Created rate card: Key Grip"));

    ledger(&dir)
        .args(["item", "add", "Key Grip", "-c", "Below the Line", "-d", "5", "--rate-card", "Key Grip"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Total: 3250.00"));

    ledger(&dir)
        .args(["rate-card", "apply", "Key Grip"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No linked line items needed updating."));

    ledger(&dir)
        .args(["rate-card", "set-rate", "Key Grip", "700"])
        .assert()
        .success();

    ledger(&dir)
        .args(["rate-card", "apply", "Key Grip"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Updated 1 line item(s)"));

    ledger(&dir)
        .args(["item", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("3500.00"));
}

#[test]
fn test_duplicate_rate_card_name_is_rejected() {
    let dir = TempDir::new().unwrap();

    ledger(&dir)
        .args(["rate-card", "add", "Gaffer", "700"])
        .assert()
        .success();

    ledger(&dir)
        .args(["rate-card", "add", "gaffer", "750"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));
}

#[test]
fn test_payroll_add_and_list() {
    let dir = TempDir::new().unwrap();

    ledger(&dir)
        .args(["payroll", "add", "Jordan Lee", "Gaffer", "-d", "Electric", "-b", "5000"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Added payroll entry: Jordan Lee (Gaffer)"));

    ledger(&dir)
        .args([
            "payroll", "add-period", "Jordan Lee", "Week 1", "2024-03-04", "2024-03-08", "2500",
            "--deductions", "500",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("net 2000.00"));

    ledger(&dir)
        .args(["payroll", "list", "--sort", "budgeted-desc"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Jordan Lee"))
        .stdout(predicate::str::contains("Electric"));

    ledger(&dir)
        .args(["payroll", "list", "--sort", "sideways"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown sort order"));
}

#[test]
fn test_payroll_rejects_non_finite_budget() {
    let dir = TempDir::new().unwrap();

    ledger(&dir)
        .args(["payroll", "add", "Ana Ruiz", "Gaffer", "--budget", "NaN"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("positive number"));

    ledger(&dir)
        .args(["payroll", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Ana Ruiz").not());
}

#[test]
fn test_migrates_legacy_versions_on_startup() {
    let dir = TempDir::new().unwrap();
    let data_dir = dir.path().join("data");
    fs::create_dir_all(&data_dir).unwrap();

    let legacy = serde_json::json!([{
        "id": "6f1c2a9e-3b4d-4c8e-9a7f-0d2e5b1c3a44",
        "name": "Legacy Budget",
        "created_date": "2024-01-05T10:00:00Z",
        "currency": "EUR"
    }]);
    let defaults = serde_json::json!({ "savedBudgetVersions": legacy.to_string() });
    fs::write(data_dir.join("defaults.json"), defaults.to_string()).unwrap();

    ledger(&dir)
        .args(["migrate", "status"])
        .assert()
        .success()
        .stdout(predicate::str::contains("1 migrated"))
        .stdout(predicate::str::contains("savedBudgetVersions.backup."));

    ledger(&dir)
        .args(["version", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Legacy Budget"))
        .stdout(predicate::str::contains("Budget v1").not());

    ledger(&dir)
        .args(["migrate", "verify"])
        .assert()
        .success()
        .stdout(predicate::str::contains("passed"));
}

#[test]
fn test_audit_records_changes() {
    let dir = TempDir::new().unwrap();

    ledger(&dir)
        .args(["version", "create", "Final"])
        .assert()
        .success();
    ledger(&dir).args(["version", "lock"]).assert().success();

    ledger(&dir)
        .args(["audit"])
        .assert()
        .success()
        .stdout(predicate::str::contains("CREATED"))
        .stdout(predicate::str::contains("LOCKED"));
}

#[test]
fn test_config_shows_paths() {
    let dir = TempDir::new().unwrap();

    ledger(&dir)
        .arg("config")
        .assert()
        .success()
        .stdout(predicate::str::contains("Data directory"))
        .stdout(predicate::str::contains("Budget v1"));
}
