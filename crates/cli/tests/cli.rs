// ABOUTME: Integration tests for the declutter CLI binary.
// ABOUTME: Tests file and stdin input, output file handling and precondition failures.

use assert_cmd::assert::OutputAssertExt;
use assert_cmd::cargo::CommandCargoExt;
use predicates::prelude::*;
use pretty_assertions::assert_eq;
use std::fs;
use std::process::Command;
use tempfile::TempDir;

fn declutter_cmd() -> Command {
    Command::cargo_bin("declutter").unwrap()
}

fn piped_cmd() -> assert_cmd::Command {
    assert_cmd::Command::cargo_bin("declutter").unwrap()
}

#[test]
fn clean_from_file_to_stdout() {
    let temp_dir = TempDir::new().unwrap();
    let html_path = temp_dir.path().join("page.html");
    fs::write(
        &html_path,
        r#"<div><div class="x"><p>Hello <span>ad</span></p><script>x()</script></div></div>"#,
    )
    .unwrap();

    declutter_cmd()
        .arg("--input")
        .arg(&html_path)
        .arg("--no-prettify")
        .assert()
        .success()
        .stdout("<div><p>Hello </p></div>\n")
        .stderr(predicate::str::contains(format!(
            "input: {}",
            html_path.display()
        )))
        .stderr(predicate::str::contains("output: -"));
}

#[test]
fn clean_from_stdin_pretty() {
    piped_cmd()
        .write_stdin("<div><div>Hello</div></div>")
        .assert()
        .success()
        .stdout("<div>\n Hello\n</div>\n")
        .stderr(predicate::str::contains("input: <stdin>"));
}

#[test]
fn flags_change_the_pipeline() {
    piped_cmd()
        .args([
            "--no-prettify",
            "--no-same-name-only",
            "--no-remove-comments",
            "-k",
            "class",
            "-r",
            "nav",
        ])
        .write_stdin(r#"<section><div><p class="c">a<!--n--></p></div></section><nav>menu</nav>"#)
        .assert()
        .success()
        .stdout("<p class=\"c\">a<!--n--></p>\n");
}

#[test]
fn output_to_file() {
    let temp_dir = TempDir::new().unwrap();
    let output_path = temp_dir.path().join("out.html");

    piped_cmd()
        .arg("-o")
        .arg(&output_path)
        .arg("--no-prettify")
        .write_stdin("<p>x<!-- c --></p>")
        .assert()
        .success()
        .stdout("");

    assert_eq!(fs::read_to_string(&output_path).unwrap(), "<p>x</p>\n");
}

#[test]
fn existing_output_file_is_refused() {
    let temp_dir = TempDir::new().unwrap();
    let output_path = temp_dir.path().join("out.html");
    fs::write(&output_path, "keep me").unwrap();

    piped_cmd()
        .arg("--output")
        .arg(&output_path)
        .write_stdin("<p>x</p>")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("output file exists"));

    assert_eq!(fs::read_to_string(&output_path).unwrap(), "keep me");
}

#[test]
fn output_directory_is_refused() {
    let temp_dir = TempDir::new().unwrap();

    piped_cmd()
        .arg("--output")
        .arg(temp_dir.path())
        .write_stdin("<p>x</p>")
        .assert()
        .failure()
        .stderr(predicate::str::contains("output is a directory"));
}

#[test]
fn missing_input_file_fails() {
    let temp_dir = TempDir::new().unwrap();

    declutter_cmd()
        .arg("--input")
        .arg(temp_dir.path().join("nope.html"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("file not found"));
}

#[test]
fn no_input_is_a_usage_error() {
    declutter_cmd()
        .assert()
        .code(2)
        .stderr(predicate::str::contains("provide --input FILE"));
}

#[test]
fn input_file_and_piped_stdin_conflict() {
    let temp_dir = TempDir::new().unwrap();
    let html_path = temp_dir.path().join("page.html");
    fs::write(&html_path, "<p>x</p>").unwrap();

    piped_cmd()
        .arg("--input")
        .arg(&html_path)
        .write_stdin("<p>y</p>")
        .assert()
        .code(2)
        .stderr(predicate::str::contains(
            "both --input and stdin were provided",
        ));
}

#[test]
fn xml_parse_errors_are_reported() {
    piped_cmd()
        .args(["--parser", "xml"])
        .write_stdin("<a><b></a>")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("parse xml"));
}

#[test]
fn stats_and_timing_go_to_stderr() {
    piped_cmd()
        .args(["--stats", "--timing", "--no-prettify"])
        .write_stdin("<div><div>x</div></div>")
        .assert()
        .success()
        .stdout("<div>x</div>\n")
        .stderr(predicate::str::contains("\"wrappers_unwrapped\": 1"))
        .stderr(predicate::str::contains("elapsed:"));
}

#[test]
fn explicit_encoding_is_applied() {
    let temp_dir = TempDir::new().unwrap();
    let html_path = temp_dir.path().join("latin1.html");
    fs::write(&html_path, b"<p>caf\xe9</p>").unwrap();

    declutter_cmd()
        .arg("-i")
        .arg(&html_path)
        .args(["--encoding", "iso-8859-1", "--no-prettify"])
        .assert()
        .success()
        .stdout("<p>café</p>\n");
}
