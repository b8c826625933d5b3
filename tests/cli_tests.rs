#![cfg(feature = "cli")]

use assert_cmd::Command;
use predicates::str::contains as str_contains;
use tempfile::NamedTempFile;

#[allow(deprecated)]
fn run_cli(script: &str) -> assert_cmd::assert::Assert {
    let mut cmd = Command::cargo_bin("cli").expect("cli binary");
    cmd.write_stdin(script.to_string()).assert()
}

#[test]
fn cli_quotes_worked_example() {
    run_cli("overhead pct 39\nquote 1 500\nquit\n")
        .success()
        .stdout(str_contains("Total cost    : $2,224.00"))
        .stdout(str_contains("Exact units   : 0.44"));
}

#[test]
fn cli_rejects_invalid_unit_price_and_keeps_previous() {
    run_cli("unit-price 0\nrates\nquit\n")
        .success()
        .stdout(str_contains("Error: invalid input: unit price"))
        .stdout(str_contains("Unit price           : $5,000.00"));
}

#[test]
fn cli_add_and_remove_updates_log() {
    run_cli("add 1\nadd 16 0 high Phase 2\nremove 1\nlog\nquit\n")
        .success()
        .stdout(str_contains("Added 'Landscape Scan' to the sprint log."))
        .stdout(str_contains("Removed 'Landscape Scan' from the sprint log."))
        .stdout(str_contains("Total: 0.24 units, $1,200.00"));
}

#[test]
fn cli_simulates_with_theme() {
    run_cli("simulate 4 2 survey\nquit\n")
        .success()
        .stdout(str_contains("Survey Design + Launch"))
        .stdout(str_contains("Period 1 (Q1 2025)"))
        .stdout(str_contains("fits"));
}

#[test]
fn cli_reports_missing_prerequisites() {
    run_cli("add 27\nprereqs\nquit\n")
        .success()
        .stdout(str_contains("'IRB Amendment' expects 'IRB Protocol Development' first."));
}

#[test]
fn cli_save_and_load_session_round_trip() {
    let tmp = NamedTempFile::new().expect("create temp file");
    let path = tmp.path().to_string_lossy().replace('\\', "\\\\");
    let script = format!("add 2\nsave {}\nremove 1\nload {}\nquit\n", path, path);
    let assert = run_cli(&script).success();
    let output = String::from_utf8_lossy(&assert.get_output().stdout);
    assert!(output.contains("Session loaded from"), "stdout: {output}");
    assert!(output.contains("Discovery Workshop"), "stdout: {output}");
}

#[test]
fn cli_exports_csv() {
    let tmp = NamedTempFile::new().expect("create temp file");
    let path = tmp.path().to_string_lossy().to_string();
    run_cli(&format!("add 8\nexport csv {}\nquit\n", path))
        .success()
        .stdout(str_contains("Sprint log exported to"));
    let contents = std::fs::read_to_string(tmp.path()).unwrap();
    assert!(contents.contains("Survey Design + Launch"));
}

#[test]
fn cli_unknown_command_prints_hint() {
    run_cli("frobnicate\nquit\n")
        .success()
        .stdout(str_contains("Unknown command. Type 'help'."));
}

#[test]
fn cli_quote_and_add_accept_fixed_fee() {
    run_cli("quote 1 0 medium fee=1000\nadd 1 0 low fee=500 Phase 1\nlog\nquit\n")
        .success()
        .stdout(str_contains("Fixed fees    : $1,000.00"))
        .stdout(str_contains("Total cost    : $4,200.00"))
        .stdout(str_contains("Added 'Landscape Scan' to the sprint log."))
        .stdout(str_contains("Total: 0.64 units, $3,200.00"));
}

#[test]
fn cli_rejects_unbounded_period_counts() {
    run_cli("scope periods 4294967295\nsimulate 10 4294967295\nscope show\nquit\n")
        .success()
        .stdout(str_contains(
            "Error: invalid input: periods must be between 1 and 400 (got 4294967295)",
        ))
        .stdout(str_contains("Periods      : 4"));
}

#[test]
fn cli_prints_sprint_summary() {
    run_cli("summary 1 Evidence Sprint\nsummary 2\nquit\n")
        .success()
        .stdout(str_contains("#### Sprint Summary"))
        .stdout(str_contains("- **Sprint Name:** Evidence Sprint"))
        .stdout(str_contains("- **Total Cost:** $2,200.00"))
        .stdout(str_contains("- **Sprint Name:** Discovery Workshop Sprint"));
}
