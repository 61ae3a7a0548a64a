#![cfg(feature = "cli_api")]

use assert_cmd::Command;
use predicates::str::contains as str_contains;
use tempfile::{NamedTempFile, tempdir};

#[allow(deprecated)]
fn run_cli(script: &str) -> assert_cmd::assert::Assert {
    let mut cmd = Command::cargo_bin("cli").expect("cli binary");
    cmd.env_remove("RENOVATION_CONFIG")
        .write_stdin(script.to_string())
        .assert()
}

fn escaped(path: &std::path::Path) -> String {
    path.to_string_lossy().replace('\\', "\\\\")
}

#[test]
fn cli_starts_with_a_default_renovation() {
    run_cli("reno list\nquit\n")
        .success()
        .stdout(str_contains("My renovation"));
}

#[test]
fn cli_add_numbers_items_sequentially() {
    run_cli("add Floor tiles\nadd Wall paint\nquit\n")
        .success()
        .stdout(str_contains("Added item 001 (id=1)."))
        .stdout(str_contains("Added item 002 (id=2)."));
}

#[test]
fn cli_delete_command_removes_item() {
    run_cli("add Floor tiles\ndelete 1\ndelete 1\nquit\n")
        .success()
        .stdout(str_contains("Deleted item 1."))
        .stdout(str_contains("Error: item 1 not found"));
}

#[test]
fn cli_reports_validation_errors() {
    run_cli("add Floor tiles\nset 1 budget -10\nset 1 planned 2024-02-30\nquit\n")
        .success()
        .stdout(str_contains("budget must be a non-negative number"))
        .stdout(str_contains("Invalid date '2024-02-30' (YYYY-MM-DD)"));
}

#[test]
fn cli_end_date_skips_weekends() {
    run_cli("add Floor tiles\nset 1 planned 2024-01-05\nset 1 est_days 3\nenddate\nquit\n")
        .success()
        .stdout(str_contains("Estimated end: 10/01/2024"))
        .stdout(str_contains("Actual end: -"));
}

#[test]
fn cli_end_date_respects_holidays() {
    run_cli(
        "calendar holiday 2024-01-08\nadd Floor tiles\nset 1 planned 2024-01-05\nset 1 est_days 3\nenddate\nquit\n",
    )
    .success()
    .stdout(str_contains("Holiday 08/01/2024 added."))
    .stdout(str_contains("Estimated end: 11/01/2024"));
}

#[test]
fn cli_gantt_prints_window_and_legend() {
    run_cli("add Floor tiles\nset 1 planned 2024-01-05\nset 1 est_days 3\ngantt\nquit\n")
        .success()
        .stdout(str_contains("Window: 29/12/2023 -> 24/01/2024 (26 days)"))
        .stdout(str_contains("Legend: Uncategorized #6b7280"))
        .stdout(str_contains("05/01/2024 -> 10/01/2024"));
}

#[test]
fn cli_gantt_without_items_uses_today() {
    run_cli("gantt 2024-06-15\nquit\n")
        .success()
        .stdout(str_contains("Window: 16/05/2024 -> 14/08/2024 (90 days)"))
        .stdout(str_contains("No items."));
}

#[test]
fn cli_report_formats_currency() {
    run_cli("sample\nreport\nquit\n")
        .success()
        .stdout(str_contains("Sample item added."))
        .stdout(str_contains("Total budget: R$ 2.500,00"))
        .stdout(str_contains("Remaining budget: R$ 200,00"))
        .stdout(str_contains("Kitchen (1 items): R$ 2.500,00"));
}

#[test]
fn cli_category_commands() {
    run_cli("category add Electrical\ncategory add electrical\ncategory rename 1 Wiring\ncategory list\nquit\n")
        .success()
        .stdout(str_contains("Added category 1 (Electrical)."))
        .stdout(str_contains("category 'electrical' already exists"))
        .stdout(str_contains("Renamed category 1 to Wiring."));
}

#[test]
fn cli_unknown_command_hints_help() {
    run_cli("frobnicate\nquit\n")
        .success()
        .stdout(str_contains("Unknown command. Type 'help'."));
}

#[test]
fn cli_save_and_load_json_round_trip() {
    let tmp = NamedTempFile::new().expect("create temp file");
    let path = escaped(tmp.path());
    let script = format!(
        "add Persisted countertop\nsave json {path}\nadd Temporary shelf\nload json {path}\nshow\nquit\n"
    );
    let assert = run_cli(&script).success();
    let output = String::from_utf8_lossy(&assert.get_output().stdout);
    assert!(output.contains("Tracker saved to"));
    assert!(
        output.contains("Tracker loaded from"),
        "expected output to mention load completion"
    );
    let after_reload = output
        .split("Tracker loaded from")
        .last()
        .unwrap_or_default();
    assert!(after_reload.contains("Persisted countertop"));
    assert!(
        !after_reload.contains("Temporary shelf"),
        "temporary item should not appear after reload:\n{}",
        after_reload
    );
}

#[test]
fn cli_export_then_import_yaml() {
    let dir = tempdir().unwrap();
    let path = escaped(&dir.path().join("items.yaml"));
    let script = format!(
        "sample\nexport yaml {path}\nreno new Second home\nimport yaml {path}\nquit\n"
    );
    run_cli(&script)
        .success()
        .stdout(str_contains("Exported 1 items to"))
        .stdout(str_contains("Created renovation 2 (Second home)."))
        .stdout(str_contains("Imported 1 items."));
}

#[test]
fn cli_export_then_import_csv() {
    let dir = tempdir().unwrap();
    let path = escaped(&dir.path().join("items.csv"));
    let script = format!("add Door handles\nexport csv {path}\nimport csv {path}\nshow\nquit\n");
    run_cli(&script)
        .success()
        .stdout(str_contains("Exported 1 items to"))
        .stdout(str_contains("Imported 1 items."));
}
