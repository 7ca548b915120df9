//! Tests for core error types

use memlayout::core::DiagramError;
use memlayout::yaml::{self, ParseError};

#[test]
fn test_parse_error_display() {
    let error = ParseError::new("Unexpected indentation", 4);
    assert_eq!(error.display_line(), 5);
    assert_eq!(error.to_string(), "Unexpected indentation (line 5)");
}

#[test]
fn test_parse_error_wrapped() {
    let error: DiagramError = yaml::load_str("a: 1\n  b: 2\n").unwrap_err().into();
    let error_msg = format!("{}", error);
    assert!(error_msg.starts_with("Parse error"));
    assert!(error_msg.contains("line 2"));
}

#[test]
fn test_config_error() {
    let error = DiagramError::config_error("'layout' not defined");
    let error_msg = format!("{}", error);
    assert!(error_msg.contains("Config error"));
    assert!(error_msg.contains("'layout' not defined"));
}

#[test]
fn test_render_error() {
    let error = DiagramError::render_error("Render failed");
    let error_msg = format!("{}", error);
    assert!(error_msg.contains("Render error"));
    assert!(error_msg.contains("Render failed"));
}

#[test]
fn test_unknown_format() {
    let error = DiagramError::UnknownFormat {
        format: "pdf".to_string(),
    };
    let error_msg = format!("{}", error);
    assert!(error_msg.contains("Unknown output format"));
    assert!(error_msg.contains("pdf"));
}

#[test]
fn test_io_error() {
    use std::io;
    let io_err = io::Error::new(io::ErrorKind::NotFound, "File not found");
    let error: DiagramError = io_err.into();
    let error_msg = format!("{}", error);
    assert!(error_msg.contains("IO error"));
    assert!(error_msg.contains("File not found"));
}

#[test]
fn test_builder_errors_name_the_field() {
    let root = yaml::load_str("layout:\n  0:\n    size: big\n").unwrap();
    let error = memlayout::map::MapBuilder::new().build(&root).unwrap_err();
    let error_msg = error.to_string();
    assert!(error_msg.contains("'size'"));
    assert!(error_msg.contains("big"));
}
