//! Structured text loader
//!
//! A small, indentation-sensitive subset of YAML: block mappings with
//! string keys, block sequences, comments, folded plain scalars, quoted
//! strings with escapes, and typed scalars (integers in several bases,
//! floats, booleans, null and sexagesimal numbers). Flow collections,
//! anchors, tags and multi-document streams are not supported.
//!
//! ```
//! use memlayout::yaml::{self, Value};
//!
//! let doc = yaml::load_str("base: 0x8000\nnames:\n  - ROM\n  - RAM\n").unwrap();
//! assert_eq!(doc.get("base"), Some(&Value::Integer(0x8000)));
//! assert_eq!(doc.get("names").and_then(Value::as_sequence).map(|s| s.len()), Some(2));
//! ```

pub mod error;
pub mod grammar;
pub mod loader;
pub mod scalar;
pub mod value;

pub use error::{ParseError, ScalarError};
pub use loader::{Document, Loader};
pub use scalar::decode_scalar;
pub use value::{Mapping, Value};

use std::io::BufRead;

/// Load a document with the default loader
pub fn load<R: BufRead>(reader: R) -> Result<Value, ParseError> {
    Loader::new().load(reader)
}

/// Load a document from a string with the default loader
pub fn load_str(text: &str) -> Result<Value, ParseError> {
    Loader::new().load_str(text)
}
