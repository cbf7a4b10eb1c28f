use assert_cmd::Command;
use predicates::prelude::*;
use std::io::Write;

fn loancalc() -> Command {
    Command::cargo_bin("loancalc").unwrap()
}

#[test]
fn test_version() {
    loancalc()
        .arg("version")
        .assert()
        .success()
        .stdout(predicate::str::starts_with("loancalc "));
}

#[test]
fn test_repayment_json_output() {
    loancalc()
        .args(["repayment", "--principal", "500000", "--rate", "6.5", "--term-years", "30"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"monthly_repayment\": \"3160.34"))
        .stdout(predicate::str::contains("Principal & Interest Annuity Repayment"));
}

#[test]
fn test_repayment_minimal_zero_rate() {
    loancalc()
        .args([
            "repayment",
            "--principal",
            "12000",
            "--rate",
            "0",
            "--term-years",
            "1",
            "--output",
            "minimal",
        ])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("1000"));
}

#[test]
fn test_interest_only_flag() {
    loancalc()
        .args([
            "repayment",
            "--principal",
            "100000",
            "--rate",
            "6",
            "--interest-only",
            "--output",
            "minimal",
        ])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("500"));
}

#[test]
fn test_negative_principal_fails() {
    loancalc()
        .args(["repayment", "--principal=-5", "--rate", "5"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid parameter: principal"));
}

#[test]
fn test_missing_rate_fails() {
    loancalc()
        .args(["repayment", "--principal", "5000"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--rate is required"));
}

#[test]
fn test_out_of_range_principal_fails_cleanly() {
    loancalc()
        .args([
            "repayment",
            "--principal",
            "1000000000000000000000000000",
            "--rate",
            "20",
            "--term-years",
            "30",
        ])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("Arithmetic overflow"));
}

#[test]
fn test_stamp_duty_nsw() {
    loancalc()
        .args(["stamp-duty", "--price", "600000", "--state", "nsw", "--output", "minimal"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("21530"));
}

#[test]
fn test_stamp_duty_first_home_buyer() {
    loancalc()
        .args([
            "stamp-duty",
            "--price",
            "600000",
            "--state",
            "NSW",
            "--first-home-buyer",
            "--output",
            "minimal",
        ])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("0"));
}

#[test]
fn test_unknown_state_rejected() {
    loancalc()
        .args(["stamp-duty", "--price", "600000", "--state", "NZ"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown state or territory"));
}

#[test]
fn test_offset_from_json_file() {
    let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
    write!(
        file,
        r#"{{"principal":"500000","annual_rate_percent":"6.5","term_years":30,"offset_balance":"50000"}}"#
    )
    .unwrap();

    loancalc()
        .args(["offset", "--input"])
        .arg(file.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("\"effective_principal\": \"450000\""))
        .stdout(predicate::str::contains("monthly_savings"));
}

#[test]
fn test_equity_from_yaml_file() {
    let mut file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
    writeln!(file, "property_value: \"800000\"\nloan_balance: \"400000\"").unwrap();

    loancalc()
        .args(["equity", "--output", "minimal", "--input"])
        .arg(file.path())
        .assert()
        .success()
        .stdout(predicate::str::starts_with("240000"));
}

#[test]
fn test_missing_input_file() {
    loancalc()
        .args(["equity", "--input", "does-not-exist.json"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("File not found"));
}

#[test]
fn test_consolidate_flags() {
    loancalc()
        .args([
            "consolidate",
            "--credit-card",
            "12000",
            "--car-loan",
            "20000",
            "--rate",
            "6.5",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"total_debt\": \"32000\""))
        .stdout(predicate::str::contains("CreditCard"));
}

#[test]
fn test_schedule_table_output() {
    loancalc()
        .args([
            "schedule",
            "--principal",
            "12000",
            "--rate",
            "0",
            "--term-years",
            "1",
            "--start-date",
            "2025-01-31",
            "--output",
            "table",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("rows:"))
        .stdout(predicate::str::contains("2025-02-28"))
        .stdout(predicate::str::contains("Methodology: Monthly Amortisation Schedule"));
}

#[test]
fn test_schedule_csv_rows() {
    let output = loancalc()
        .args([
            "schedule",
            "--principal",
            "24000",
            "--rate",
            "0",
            "--term-years",
            "2",
            "--output",
            "csv",
        ])
        .output()
        .unwrap();
    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    let mut lines = stdout.lines();
    let header = lines.next().unwrap();
    assert!(header.contains("period"));
    assert!(header.contains("closing_balance"));
    assert_eq!(lines.count(), 24);
}

#[test]
fn test_jurisdictions_lists_every_state() {
    let assert = loancalc().arg("jurisdictions").assert().success();
    let stdout = String::from_utf8(assert.get_output().stdout.clone()).unwrap();
    for code in ["NSW", "VIC", "QLD", "WA", "SA", "TAS", "ACT", "NT"] {
        assert!(stdout.contains(&format!("\"{code}\"")), "missing {code}");
    }
}
