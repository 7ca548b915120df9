//! Integration tests for the structured text loader
//!
//! Covers mappings, sequences, nesting, scalar typing, folded text,
//! document markers, directives and error reporting.

use std::sync::{Arc, Mutex};

use memlayout::yaml::{self, Loader, Value};

fn load(text: &str) -> Value {
    yaml::load_str(text).unwrap()
}

fn collecting_loader() -> (Loader, Arc<Mutex<Vec<String>>>) {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    let loader = Loader::with_warning_handler(move |message| {
        sink.lock().unwrap().push(message.to_string());
    });
    (loader, seen)
}

// =============================================================================
// Mappings and sequences
// =============================================================================

mod structure {
    use super::*;

    #[test]
    fn test_flat_mapping_keeps_file_order() {
        let value = load("zeta: 1\nalpha: two\nmid: 3.5\n");
        let map = value.as_mapping().unwrap();
        let keys: Vec<&str> = map.keys().collect();
        assert_eq!(keys, vec!["zeta", "alpha", "mid"]);
        assert_eq!(map.get("zeta"), Some(&Value::Integer(1)));
        assert_eq!(map.get("alpha"), Some(&Value::from("two")));
        assert_eq!(map.get("mid"), Some(&Value::Float(3.5)));
    }

    #[test]
    fn test_sequence_keeps_order_and_count() {
        let value = load("- one\n- 2\n- three\n");
        assert_eq!(
            value,
            Value::Sequence(vec![
                Value::from("one"),
                Value::Integer(2),
                Value::from("three")
            ])
        );
    }

    #[test]
    fn test_nested_blocks() {
        let text = "\
name: map
regions:
  - base: 0x8000
    size: 0x4000
  - base: 0xC000
    size: 0x4000
options:
  fill: red
  tags:
    - a
    - b
";
        let value = load(text);
        let regions = value.get("regions").and_then(Value::as_sequence).unwrap();
        assert_eq!(regions.len(), 2);
        assert_eq!(regions[1].get("base"), Some(&Value::Integer(0xC000)));
        assert_eq!(regions[0].get("size"), Some(&Value::Integer(0x4000)));

        let options = value.get("options").unwrap();
        assert_eq!(options.get("fill"), Some(&Value::from("red")));
        assert_eq!(
            options.get("tags").and_then(Value::as_sequence).map(|s| s.len()),
            Some(2)
        );
    }

    #[test]
    fn test_nested_sequences_on_one_line() {
        let value = load("- - a\n  - b\n- - c\n");
        let outer = value.as_sequence().unwrap();
        assert_eq!(outer.len(), 2);
        assert_eq!(
            outer[0],
            Value::Sequence(vec![Value::from("a"), Value::from("b")])
        );
        assert_eq!(outer[1], Value::Sequence(vec![Value::from("c")]));
    }

    #[test]
    fn test_dedent_returns_to_outer_mapping() {
        let text = "\
a:
  b:
    c: 1
  d: 2
e: 3
";
        let value = load(text);
        assert_eq!(value.get("a").and_then(|a| a.get("d")), Some(&Value::Integer(2)));
        assert_eq!(
            value.get("a").and_then(|a| a.get("b")).and_then(|b| b.get("c")),
            Some(&Value::Integer(1))
        );
        assert_eq!(value.get("e"), Some(&Value::Integer(3)));
    }

    #[test]
    fn test_empty_value_is_null() {
        let value = load("a:\nb: # nothing\nc: 1\n");
        assert_eq!(value.get("a"), Some(&Value::Null));
        assert_eq!(value.get("b"), Some(&Value::Null));
    }

    #[test]
    fn test_commented_list_item_is_null() {
        let value = load("- #comment\n- x\n");
        assert_eq!(value, Value::Sequence(vec![Value::Null, Value::from("x")]));
    }

    #[test]
    fn test_duplicate_key_overwrites_in_place() {
        let value = load("a: 1\nb: 2\na: 3\n");
        let map = value.as_mapping().unwrap();
        assert_eq!(map.keys().collect::<Vec<_>>(), vec!["a", "b"]);
        assert_eq!(map.get("a"), Some(&Value::Integer(3)));
    }

    #[test]
    fn test_comments_and_blank_lines_ignored() {
        let text = "\
# header comment

a: 1   # trailing comment
  # indented comment
b: 2
";
        let value = load(text);
        assert_eq!(value.get("a"), Some(&Value::Integer(1)));
        assert_eq!(value.get("b"), Some(&Value::Integer(2)));
    }

    #[test]
    fn test_quoted_keys() {
        let value = load("\"0x10 00\": a\n'it': b\n");
        assert_eq!(value.get("0x10 00"), Some(&Value::from("a")));
        assert_eq!(value.get("it"), Some(&Value::from("b")));
    }

    #[test]
    fn test_sequence_under_key_at_same_indent_is_error() {
        let err = yaml::load_str("a:\n- x\n").unwrap_err();
        assert_eq!(err.line, 1);
    }
}

// =============================================================================
// Scalar typing
// =============================================================================

mod scalars {
    use super::*;

    fn scalar(text: &str) -> Value {
        load(&format!("v: {}\n", text)).get("v").cloned().unwrap()
    }

    #[test]
    fn test_integers() {
        assert_eq!(scalar("123"), Value::Integer(123));
        assert_eq!(scalar("-7"), Value::Integer(-7));
        assert_eq!(scalar("0x1F"), Value::Integer(31));
        assert_eq!(scalar("0b101"), Value::Integer(5));
        assert_eq!(scalar("010"), Value::Integer(8));
        assert_eq!(scalar("0"), Value::Integer(0));
        assert_eq!(scalar("1_000"), Value::Integer(1000));
    }

    #[test]
    fn test_floats() {
        assert_eq!(scalar("2.5"), Value::Float(2.5));
        assert_eq!(scalar(".5"), Value::Float(0.5));
        assert_eq!(scalar("1.5e+3"), Value::Float(1500.0));
        assert_eq!(scalar(".inf"), Value::Float(f64::INFINITY));
        assert_eq!(scalar("-.inf"), Value::Float(f64::NEG_INFINITY));
        assert!(matches!(scalar(".nan"), Value::Float(f) if f.is_nan()));
    }

    #[test]
    fn test_sexagesimal() {
        assert_eq!(scalar("1:30"), Value::Integer(90));
        assert_eq!(scalar("-1:30"), Value::Integer(-90));
    }

    #[test]
    fn test_booleans_and_nulls() {
        assert_eq!(scalar("true"), Value::Bool(true));
        assert_eq!(scalar("false"), Value::Bool(false));
        assert_eq!(scalar("~"), Value::Null);
        assert_eq!(scalar("null"), Value::Null);
        assert_eq!(scalar("yes"), Value::from("yes"));
        assert_eq!(scalar("True"), Value::from("True"));
    }

    #[test]
    fn test_quoted_strings() {
        assert_eq!(scalar("'it''s'"), Value::from("it's"));
        assert_eq!(scalar("\"a\\nb\""), Value::from("a\nb"));
        assert_eq!(scalar("\"tab\\there\""), Value::from("tab\there"));
        assert_eq!(scalar("\"\\x41\\u00e9\""), Value::from("Aé"));
        assert_eq!(scalar("'123'"), Value::from("123"));
        assert_eq!(scalar("'# not a comment'"), Value::from("# not a comment"));
    }

    #[test]
    fn test_plain_strings() {
        assert_eq!(scalar("Zero page"), Value::from("Zero page"));
        assert_eq!(scalar("0x"), Value::from("0x"));
        assert_eq!(scalar("09"), Value::Integer(9));
        assert_eq!(scalar("#abc"), Value::Null);
        assert_eq!(scalar("'#abc'"), Value::from("#abc"));
    }

    #[test]
    fn test_integer_overflow_is_error() {
        let err = yaml::load_str("a: 1\nb: 99999999999999999999\n").unwrap_err();
        assert_eq!(err.line, 1);
        assert!(err.message.contains("ScalarError"));
    }

    #[test]
    fn test_bad_escape_is_error() {
        let err = yaml::load_str("a: \"\\xZZ\"\n").unwrap_err();
        assert_eq!(err.line, 0);
    }
}

// =============================================================================
// Folded text
// =============================================================================

mod folding {
    use super::*;

    #[test]
    fn test_folded_scalar_joins_lines() {
        let text = "\
description:
  A long piece
  of text over
  three lines
next: 1
";
        let value = load(text);
        assert_eq!(
            value.get("description"),
            Some(&Value::from("A long piece of text over three lines"))
        );
        assert_eq!(value.get("next"), Some(&Value::Integer(1)));
    }

    #[test]
    fn test_folded_numbers_stay_text() {
        let value = load("note:\n  Version\n  2\n");
        assert_eq!(value.get("note"), Some(&Value::from("Version 2")));
    }

    #[test]
    fn test_folded_numbers_drop_comments() {
        let value = load("a:\n  foo\n  42 # note\n  0x10 # more\n");
        assert_eq!(value.get("a"), Some(&Value::from("foo 42 0x10")));
    }

    #[test]
    fn test_continuation_at_key_column() {
        let value = load("a:\nmore text\nb: 1\n");
        assert_eq!(value.get("a"), Some(&Value::from("more text")));
        assert_eq!(value.get("b"), Some(&Value::Integer(1)));
    }

    #[test]
    fn test_nested_continuation_at_key_column() {
        let text = "\
outer:
  note:
  first part
  second part
  next: 2
last: 3
";
        let value = load(text);
        let outer = value.get("outer").unwrap();
        assert_eq!(outer.get("note"), Some(&Value::from("first part second part")));
        assert_eq!(outer.get("next"), Some(&Value::Integer(2)));
        assert_eq!(value.get("last"), Some(&Value::Integer(3)));
    }

    #[test]
    fn test_single_continuation_keeps_type() {
        let value = load("size:\n  0x100\n");
        assert_eq!(value.get("size"), Some(&Value::Integer(0x100)));
    }
}

// =============================================================================
// Documents and directives
// =============================================================================

mod documents {
    use super::*;

    #[test]
    fn test_leading_document_marker_ignored() {
        let value = load("---\na: 1\n");
        assert_eq!(value.get("a"), Some(&Value::Integer(1)));
    }

    #[test]
    fn test_second_document_marker_stops() {
        let value = load("a: 1\n---\nb: 2\n");
        assert_eq!(value.get("a"), Some(&Value::Integer(1)));
        assert_eq!(value.get("b"), None);
    }

    #[test]
    fn test_end_marker_closes_nested_frames() {
        let value = load("a:\n  - x\n  - y\n---\nnot: parsed\n");
        assert_eq!(
            value.get("a").and_then(Value::as_sequence).map(|s| s.len()),
            Some(2)
        );
    }

    #[test]
    fn test_yaml_2_is_rejected() {
        let err = yaml::load_str("%YAML 2.0\n---\na: 1\n").unwrap_err();
        assert_eq!(err.line, 0);
        assert!(err.message.contains("2.0"));
    }

    #[test]
    fn test_yaml_1_1_warns_and_succeeds() {
        let (loader, seen) = collecting_loader();
        let value = loader.load_str("%YAML 1.1\n---\na: 1\n").unwrap();
        assert_eq!(value.get("a"), Some(&Value::Integer(1)));
        assert_eq!(seen.lock().unwrap().len(), 1);
    }

    #[test]
    fn test_yaml_1_0_is_silent() {
        let (loader, seen) = collecting_loader();
        let document = loader
            .load_document("%YAML 1.0\n---\na: 1\n".as_bytes())
            .unwrap();
        assert_eq!(document.version, Some(1.0));
        assert!(seen.lock().unwrap().is_empty());
    }

    #[test]
    fn test_unparseable_version_is_error() {
        assert!(yaml::load_str("%YAML one\n").is_err());
    }

    #[test]
    fn test_reader_input() {
        let reader = std::io::Cursor::new(b"- a\n- b\n".to_vec());
        let value = yaml::load(reader).unwrap();
        assert_eq!(value.as_sequence().map(|s| s.len()), Some(2));
    }
}

// =============================================================================
// Errors
// =============================================================================

mod errors {
    use super::*;

    #[test]
    fn test_bare_line_in_mapping_reports_line() {
        let err = yaml::load_str("a: 1\nb: 2\njust text\n").unwrap_err();
        assert_eq!(err.line, 2);
        assert_eq!(err.display_line(), 3);
        assert!(err.to_string().ends_with("(line 3)"));
    }

    #[test]
    fn test_unexpected_indentation() {
        let err = yaml::load_str("a: 1\n  b: 2\n").unwrap_err();
        assert_eq!(err.line, 1);
        assert!(err.message.contains("indentation"));
    }

    #[test]
    fn test_list_item_among_keys() {
        let err = yaml::load_str("a: 1\n- b\n").unwrap_err();
        assert_eq!(err.line, 1);
    }

    #[test]
    fn test_key_among_list_items() {
        let err = yaml::load_str("- a\nb: 1\n").unwrap_err();
        assert_eq!(err.line, 1);
    }

    #[test]
    fn test_loaders_are_independent_across_threads() {
        let handles: Vec<_> = (0..4)
            .map(|n| {
                std::thread::spawn(move || {
                    let text = format!("n: {}\nitems:\n  - {}\n", n, n * 2);
                    yaml::load_str(&text).unwrap()
                })
            })
            .collect();
        for (n, handle) in handles.into_iter().enumerate() {
            let value = handle.join().unwrap();
            assert_eq!(value.get("n"), Some(&Value::Integer(n as i128)));
        }
    }
}
