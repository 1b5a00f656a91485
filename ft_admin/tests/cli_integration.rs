//! Integration tests for the operator binary on the in-memory store.

use std::io::Write;
use std::process::{Command, Output, Stdio};

/// Run the binary with the in-memory store and a known admin list
fn run(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_ft_admin"))
        .arg("--memory")
        .args(args)
        .env("ADMIN_IDS", "1000")
        .env("RUST_LOG", "warn")
        .output()
        .expect("Failed to run ft_admin")
}

/// Run the repl with the given stdin
fn run_repl(input: &str) -> Output {
    let mut child = Command::new(env!("CARGO_BIN_EXE_ft_admin"))
        .args(["--memory", "--json", "repl"])
        .env("ADMIN_IDS", "1000")
        .env("RUST_LOG", "warn")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("Failed to start ft_admin");

    child
        .stdin
        .take()
        .expect("stdin is piped")
        .write_all(input.as_bytes())
        .expect("Failed to write stdin");

    child.wait_with_output().expect("Failed to wait for ft_admin")
}

#[test]
fn test_help() {
    let output = run(&["--help"]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("USAGE:"));
    assert!(stdout.contains("grant-starters"));
}

#[test]
fn test_daily_json() {
    let output = run(&["--json", "daily", "42"]);
    assert!(output.status.success());

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["success"], true);
    assert_eq!(json["data"]["bronze"], 50);
    assert_eq!(json["data"]["streak"], 1);
}

#[test]
fn test_text_output() {
    let output = run(&["inventory", "42"]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("w0 Wooden Stick"));
    assert!(stdout.contains("g0 Worn Rags"));
}

#[test]
fn test_unauthorized_adjust_fails() {
    let output = run(&["--json", "adjust", "5", "42", "gold", "10"]);
    assert_eq!(output.status.code(), Some(1));

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["reason"], "Forbidden");
}

#[test]
fn test_authorized_adjust() {
    let output = run(&["--json", "adjust", "1000", "42", "gold", "10"]);
    assert!(output.status.success());

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["data"]["gold"], 10);
}

#[test]
fn test_unknown_command() {
    let output = run(&["fish", "42"]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("Unknown command"));
}

#[test]
fn test_repl_session_keeps_state() {
    let output = run_repl(
        "# comment\n\
         42 daily\n\
         42 daily\n\
         1000 adjust 42 gems 3\n\
         42 balance\n",
    );
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    let replies: Vec<serde_json::Value> = serde_json::Deserializer::from_str(&stdout)
        .into_iter::<serde_json::Value>()
        .collect::<Result<_, _>>()
        .unwrap();

    assert_eq!(replies.len(), 4);
    assert_eq!(replies[0]["success"], true);
    assert_eq!(replies[1]["reason"], "Cooldown");
    assert_eq!(replies[2]["data"]["gems"], 3);
    assert_eq!(replies[3]["data"]["bronze"], 50);
    assert_eq!(replies[3]["data"]["gems"], 3);
}
