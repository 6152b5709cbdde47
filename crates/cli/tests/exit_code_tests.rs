// Exit code contract for `stockbook rollup`. See src/exit_codes.rs.

use std::path::PathBuf;
use std::process::{Command, Output};

fn fixture(name: &str) -> String {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("../rollup/tests/fixtures")
        .join(name)
        .to_string_lossy()
        .into_owned()
}

fn run(dir: &tempfile::TempDir, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_stockbook"))
        .current_dir(dir.path())
        .env("XDG_CONFIG_HOME", dir.path())
        .env_remove("STOCKBOOK_CONFIG")
        .env_remove("STOCKBOOK_LOG")
        .args(args)
        .output()
        .expect("run stockbook")
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

#[test]
fn no_subcommand_prints_usage() {
    let dir = tempfile::tempdir().unwrap();
    let output = run(&dir, &[]);
    assert_eq!(output.status.code(), Some(0));
    assert!(stderr(&output).contains("Usage: stockbook"));
}

#[test]
fn unknown_flag_is_usage_error() {
    let dir = tempfile::tempdir().unwrap();
    let output = run(&dir, &["rollup", "run", "x.json", "--no-such-flag"]);
    assert_eq!(output.status.code(), Some(2));
}

#[test]
fn missing_config_file_is_usage_error() {
    let dir = tempfile::tempdir().unwrap();
    let output = run(&dir, &["rollup", "validate", "nope.rollup.toml"]);
    assert_eq!(output.status.code(), Some(2));
    assert!(stderr(&output).contains("cannot read config"));
}

#[test]
fn validate_accepts_fixture_configs() {
    let dir = tempfile::tempdir().unwrap();
    for config in ["sales.rollup.toml", "batches.rollup.toml"] {
        let output = run(&dir, &["rollup", "validate", &fixture(config)]);
        assert_eq!(output.status.code(), Some(0), "{config}: {}", stderr(&output));
        assert!(stderr(&output).starts_with("valid: rollup"), "{}", stderr(&output));
    }
}

#[test]
fn validate_rejects_duplicate_column_mapping() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("bad.rollup.toml");
    std::fs::write(&config, "[columns]\ndue = \"amount\"\n").unwrap();

    let output = run(&dir, &["rollup", "validate", config.to_str().unwrap()]);
    assert_eq!(output.status.code(), Some(60));
    let err = stderr(&output);
    assert!(err.contains("both map to 'amount'"), "{err}");
    assert!(err.contains("hint:"), "{err}");
}

#[test]
fn validate_rejects_unknown_enum_value() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("bad.rollup.toml");
    std::fs::write(&config, "sort = \"alphabetical\"\n").unwrap();

    let output = run(&dir, &["rollup", "validate", config.to_str().unwrap()]);
    assert_eq!(output.status.code(), Some(60));
    assert!(stderr(&output).contains("config parse error"));
}

#[test]
fn missing_input_is_input_error() {
    let dir = tempfile::tempdir().unwrap();
    let output = run(&dir, &["rollup", "run", "absent.json"]);
    assert_eq!(output.status.code(), Some(61));
    assert!(stderr(&output).contains("input not found"));
}

#[test]
fn csv_without_mapped_columns_is_input_error() {
    let dir = tempfile::tempdir().unwrap();
    // Default mapping expects camelCase headers; the fixture uses sale_id etc.
    let output = run(&dir, &["rollup", "run", &fixture("sales.csv")]);
    assert_eq!(output.status.code(), Some(61));
    let err = stderr(&output);
    assert!(err.contains("missing column 'transactionId'"), "{err}");
    assert!(err.contains("[columns]"), "{err}");
}

#[test]
fn unknown_extension_needs_format_flag() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("export.txt");
    std::fs::write(&input, "[{\"transactionId\": \"T1\", \"amount\": 1}]").unwrap();
    let input = input.to_str().unwrap();

    let output = run(&dir, &["rollup", "run", input]);
    assert_eq!(output.status.code(), Some(61));
    assert!(stderr(&output).contains("--format"));

    let output = run(&dir, &["rollup", "run", input, "--format", "json"]);
    assert_eq!(output.status.code(), Some(0), "{}", stderr(&output));
}

#[test]
fn malformed_json_is_input_error() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("broken.json");
    std::fs::write(&input, "{\"count\": 3}").unwrap();

    let output = run(&dir, &["rollup", "run", input.to_str().unwrap()]);
    assert_eq!(output.status.code(), Some(61));
    assert!(stderr(&output).contains("input parse error"));
}

#[test]
fn fail_on_debt_passes_when_everything_is_paid() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("paid.json");
    std::fs::write(
        &input,
        r#"[{"transactionId": "T1", "itemId": 1, "amount": 2, "due": "0", "paid": "500"}]"#,
    )
    .unwrap();

    let output = run(&dir, &["rollup", "run", input.to_str().unwrap(), "--fail-on-debt"]);
    assert_eq!(output.status.code(), Some(0), "{}", stderr(&output));
}

#[test]
fn fail_on_debt_trips_on_outstanding_rows() {
    let dir = tempfile::tempdir().unwrap();
    let output = run(&dir, &["rollup", "run", &fixture("debtor-sales.json"), "--fail-on-debt"]);
    assert_eq!(output.status.code(), Some(63));
}

#[test]
fn unwritable_output_is_runtime_error() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("no-such-dir").join("report.json");
    let output = run(
        &dir,
        &["rollup", "run", &fixture("debtor-sales.json"), "--output", out.to_str().unwrap()],
    );
    assert_eq!(output.status.code(), Some(62));
    assert!(stderr(&output).contains("cannot write output"));
}

#[test]
fn log_filter_env_enables_engine_logs() {
    let dir = tempfile::tempdir().unwrap();
    let output = Command::new(env!("CARGO_BIN_EXE_stockbook"))
        .current_dir(dir.path())
        .env("XDG_CONFIG_HOME", dir.path())
        .env("STOCKBOOK_LOG", "debug")
        .args(["rollup", "run", &fixture("debtor-sales.json")])
        .output()
        .expect("run stockbook");

    assert!(output.status.success());
    assert!(stderr(&output).contains("no transactionId, skipped"), "{}", stderr(&output));
}
