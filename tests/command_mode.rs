//! Integration tests for the command surface (-c and --feed)

use std::io::Write;
use std::process::{Command, Stdio};

fn run_command(args: &[&str]) -> (String, String, i32) {
    let output = Command::new("cargo")
        .arg("run")
        .arg("-q")
        .arg("--")
        .args(args)
        .output()
        .expect("Failed to execute command");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let exit_code = output.status.code().unwrap_or(-1);

    (stdout, stderr, exit_code)
}

fn run_feed(script: &str) -> (String, i32) {
    let mut child = Command::new("cargo")
        .args(["run", "-q", "--", "--feed"])
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
        .expect("Failed to spawn feed session");

    child
        .stdin
        .as_mut()
        .expect("stdin must be piped")
        .write_all(script.as_bytes())
        .expect("Failed to write feed script");

    let output = child.wait_with_output().expect("Failed to wait for feed session");
    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    (stdout, output.status.code().unwrap_or(-1))
}

#[test]
fn test_basic_arithmetic() {
    let (stdout, _, code) = run_command(&["-c", "5 + 3"]);
    assert_eq!(stdout.trim(), "8");
    assert_eq!(code, 0);
}

#[test]
fn test_auto_prepend_equals() {
    let (stdout1, _, _) = run_command(&["-c", "10 + 5"]);
    let (stdout2, _, _) = run_command(&["-c", "=10 + 5"]);
    assert_eq!(stdout1, stdout2);
}

#[test]
fn test_math_context() {
    let (stdout, _, code) = run_command(&["-c", "round(sqrt(16) + PI - PI)"]);
    assert_eq!(stdout.trim(), "4");
    assert_eq!(code, 0);
}

#[test]
fn test_unknown_identifier_exit_code() {
    let (stdout, _, code) = run_command(&["-c", "undefined_function()"]);
    assert!(stdout.starts_with("#ERR"));
    assert_eq!(code, 1);
}

#[test]
fn test_division_by_zero() {
    let (stdout, _, code) = run_command(&["-c", "1/0"]);
    assert!(stdout.starts_with("#ERR"));
    assert_eq!(code, 1);
}

#[test]
fn test_feed_session_edits_and_pushes() {
    let script = "\
# a tiny session: edits, a live binding, and a push
set A1 5
set B1 =A1+1
get B1
set C1 =LIVE('speedup_factor')
push {\"type\":\"metrics:update\",\"payload\":{\"name\":\"speedup_factor\",\"value\":42}}
get C1
set A1 6
get B1
";
    let (stdout, code) = run_feed(script);
    assert_eq!(stdout, "6\n42\n7\n");
    assert_eq!(code, 0);
}

#[test]
fn test_feed_ignores_foreign_envelopes() {
    let script = "\
set C1 =LIVE('m')
push {\"type\":\"session:update\",\"payload\":{\"name\":\"m\",\"value\":1}}
push not json at all
get C1
";
    let (stdout, code) = run_feed(script);
    assert_eq!(stdout, "\n");
    assert_eq!(code, 0);
}
