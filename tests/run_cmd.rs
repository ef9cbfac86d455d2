use assert_cmd::Command;
use predicates::prelude::*;
use std::io::Write;

fn cargo_bin() -> Command { Command::cargo_bin("bfs").unwrap() }

fn small_valid_bf() -> &'static str { "+++." }

fn code_to_tempfile(content: &str) -> tempfile::NamedTempFile {
    let mut tf = tempfile::NamedTempFile::new().expect("tempfile");
    write!(tf, "{}", content).unwrap();
    tf
}

#[test]
fn test_run_positional_code_success() {
    cargo_bin()
        .arg("run").arg(small_valid_bf())
        .assert()
        .success()
        .stdout(predicate::str::is_empty().not())
        .stderr(predicate::str::is_empty());
}

#[test]
fn test_run_positional_parts_are_concatenated() {
    // "+++" and "." arrive as separate args and form one program
    cargo_bin()
        .arg("run").arg("+++").arg(".")
        .assert()
        .success()
        .stdout(predicate::str::starts_with("\u{3}"));
}

#[test]
fn test_run_file_success() {
    let tf = code_to_tempfile(small_valid_bf());
    cargo_bin()
        .arg("run").arg("--file").arg(tf.path())
        .assert()
        .success()
        .stdout(predicate::str::is_empty().not())
        .stderr(predicate::str::is_empty());
}

#[test]
fn test_run_comments_are_ignored() {
    let tf = code_to_tempfile("add three +++ then emit . done");
    cargo_bin()
        .arg("run").arg("--file").arg(tf.path())
        .assert()
        .success()
        .stdout(predicate::str::starts_with("\u{3}"))
        .stderr(predicate::str::is_empty());
}

#[test]
fn test_run_consumes_stdin_bytes() {
    // ",." reads one byte from stdin and echoes it
    cargo_bin()
        .arg("run").arg(",.")
        .write_stdin("Z")
        .assert()
        .success()
        .stdout("Z\n");
}

#[test]
fn test_run_missing_code_and_file_is_usage_error() {
    cargo_bin()
        .arg("run")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Usage"));
}

#[test]
fn test_run_code_and_file_together_is_usage_error() {
    let tf = code_to_tempfile(small_valid_bf());
    // --file must come first: trailing positionals swallow later flags
    cargo_bin()
        .arg("run").arg("--file").arg(tf.path()).arg("+++")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("cannot use positional code together with --file"));
}
