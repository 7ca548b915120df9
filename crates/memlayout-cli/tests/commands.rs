//! End-to-end tests that run the `memlayout` binary

use std::fs;
use std::io::Write;
use std::path::Path;
use std::process::{Command, Output, Stdio};

const BOARD: &str = "\
defaults:
  address_format: acorn
layout:
  0x0000:
    size: 0x8000
    label: RAM
  0x8000:
    size: 0x4000
    label: Language
  0xC000:
    size: 0x4000
    label: OS
automatic:
  addresses: true
";

fn memlayout(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_memlayout"))
        .args(args)
        .env_remove("RUST_LOG")
        .env_remove("MEMLAYOUT_LOG_LEVEL")
        .env_remove("MEMLAYOUT_LOG_FORMAT")
        .output()
        .unwrap()
}

fn memlayout_stdin(args: &[&str], input: &str) -> Output {
    let mut child = Command::new(env!("CARGO_BIN_EXE_memlayout"))
        .args(args)
        .env_remove("RUST_LOG")
        .env_remove("MEMLAYOUT_LOG_LEVEL")
        .env_remove("MEMLAYOUT_LOG_FORMAT")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .unwrap();
    child
        .stdin
        .take()
        .unwrap()
        .write_all(input.as_bytes())
        .unwrap();
    child.wait_with_output().unwrap()
}

fn write_board(dir: &Path, name: &str, text: &str) -> String {
    let path = dir.join(name);
    fs::write(&path, text).unwrap();
    path.to_string_lossy().into_owned()
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

#[test]
fn test_render_writes_svg_next_to_input() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_board(dir.path(), "bbc.mld", BOARD);

    let output = memlayout(&["render", &input]);
    assert!(output.status.success(), "{}", stderr(&output));

    let svg = fs::read_to_string(dir.path().join("bbc.svg")).unwrap();
    assert!(svg.contains(">Language</text>"));
    assert!(svg.contains(">&amp;8000</text>"));
}

#[test]
fn test_render_dot_with_prefix() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_board(dir.path(), "bbc.mld", BOARD);
    let prefix = dir.path().join("out");

    let output = memlayout(&[
        "render",
        &input,
        "--format",
        "dot",
        "--output-prefix",
        &prefix.to_string_lossy(),
    ]);
    assert!(output.status.success(), "{}", stderr(&output));

    let dot = fs::read_to_string(dir.path().join("out.dot")).unwrap();
    assert!(dot.starts_with("digraph memory"));
}

#[test]
fn test_render_to_stdout() {
    let output = memlayout_stdin(&["render", "-", "--format", "dot"], BOARD);
    assert!(output.status.success(), "{}", stderr(&output));
    let text = stdout(&output);
    assert!(text.starts_with("digraph memory"));
    assert!(text.contains("label=\"OS\""));
}

#[test]
fn test_check_valid_document() {
    let output = memlayout_stdin(&["check", "-"], BOARD);
    assert!(output.status.success());
    assert!(stdout(&output).contains("Valid memory map with 3 regions"));
}

#[test]
fn test_check_reports_line_of_parse_error() {
    let output = memlayout_stdin(&["check", "-"], "layout:\n  0: RAM\n  stray words\n");
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("Error: Parse error"));
    assert!(stderr(&output).contains("(line 3)"));
}

#[test]
fn test_missing_input_file() {
    let output = memlayout(&["render", "/nonexistent/board.mld"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("Failed to read input file"));
}

#[test]
fn test_dump_as_json() {
    let output = memlayout_stdin(&["dump", "-"], "name: BBC\nbanks:\n  - 0x8000\n  - 49152\n");
    assert!(output.status.success(), "{}", stderr(&output));
    let json: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    assert_eq!(json["name"], "BBC");
    assert_eq!(json["banks"][0], 0x8000);
    assert_eq!(json["banks"][1], 49152);
}

#[test]
fn test_formats_json() {
    let output = memlayout(&["formats", "--json"]);
    assert!(output.status.success());
    let json: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    assert_eq!(json["total"], 2);
    assert_eq!(json["formats"][0]["name"], "dot");
    assert_eq!(json["formats"][1]["suffix"], ".svg");
}

#[test]
fn test_formats_human() {
    let output = memlayout(&["formats"]);
    assert!(output.status.success());
    let text = stdout(&output);
    assert!(text.contains("svg"));
    assert!(text.contains("Total: 2 output formats supported"));
}
