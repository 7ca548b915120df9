//! Line-oriented document loader
//!
//! Reads one line at a time and keeps an explicit stack of open containers,
//! keyed by indentation. A container is attached to its parent only when
//! its frame is closed, so no node is ever aliased while it is being built.

use std::fmt;
use std::io::BufRead;

use tracing::{debug, span, trace, warn, Level};

use super::error::ParseError;
use super::grammar;
use super::scalar::{decode_scalar, plain_text};
use super::value::{Mapping, Value};

/// Characters that cannot start a bare mapping key
const KEY_INDICATORS: &str = "-?:,.[]{}#&*!|>'\"%@`";

/// Characters that cannot appear inside a bare mapping key
const KEY_EXCLUDED: &str = ",[]{}:#\t";

type WarningHandler = Box<dyn Fn(&str) + Send + Sync>;

/// A loaded document and its `%YAML` version, if one was declared
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub root: Value,
    pub version: Option<f64>,
}

/// Loader for the indentation-based document format
///
/// Non-fatal problems (unknown directives, newer format versions) are
/// passed to the warning handler; by default they are logged with
/// `tracing::warn!`.
pub struct Loader {
    on_warning: WarningHandler,
}

impl Default for Loader {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Loader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Loader").finish_non_exhaustive()
    }
}

impl Loader {
    pub fn new() -> Self {
        Self {
            on_warning: Box::new(|message| warn!("{}", message)),
        }
    }

    /// Create a loader that reports warnings through `handler`
    pub fn with_warning_handler<F>(handler: F) -> Self
    where
        F: Fn(&str) + Send + Sync + 'static,
    {
        Self {
            on_warning: Box::new(handler),
        }
    }

    /// Load the first document from `reader`
    pub fn load<R: BufRead>(&self, reader: R) -> Result<Value, ParseError> {
        self.load_document(reader).map(|document| document.root)
    }

    /// Load the first document from a string
    pub fn load_str(&self, text: &str) -> Result<Value, ParseError> {
        self.load(text.as_bytes())
    }

    /// Load the first document from `reader`, keeping its version directive
    pub fn load_document<R: BufRead>(&self, reader: R) -> Result<Document, ParseError> {
        let load_span = span!(Level::INFO, "load_document");
        let _enter = load_span.enter();

        let mut state = LoadState::new(&*self.on_warning);
        for (index, line) in reader.lines().enumerate() {
            let line = line.map_err(|e| ParseError::new(format!("Read failed: {}", e), index))?;
            state.line = index;
            if state.process_line(&line)? == LineOutcome::EndOfDocument {
                debug!(line = index, "Document end marker");
                break;
            }
        }

        let document = state.finish();
        debug!(
            root = document.root.type_name(),
            version = ?document.version,
            "Document loaded"
        );
        Ok(document)
    }
}

#[derive(Debug, PartialEq, Eq)]
enum LineOutcome {
    Continue,
    EndOfDocument,
}

#[derive(Debug)]
enum Container {
    Mapping(Mapping),
    Sequence(Vec<Value>),
}

impl Container {
    fn into_value(self) -> Value {
        match self {
            Container::Mapping(map) => Value::Mapping(map),
            Container::Sequence(items) => Value::Sequence(items),
        }
    }

    fn kind(&self) -> &'static str {
        match self {
            Container::Mapping(_) => "mapping",
            Container::Sequence(_) => "sequence",
        }
    }
}

/// Where a closed container goes in its parent
#[derive(Debug)]
enum Slot {
    Root,
    Key(String),
    Append,
    /// Replaces the empty item the container was opened under
    ReplaceLast,
}

#[derive(Debug)]
struct Frame {
    indent: usize,
    container: Container,
    slot: Slot,
}

#[derive(Debug)]
enum Root {
    Unset,
    Scalar(Value),
    Container,
}

struct LoadState<'a> {
    frames: Vec<Frame>,
    root: Root,
    /// Key whose value may still be supplied by following lines
    pending: Option<String>,
    /// The previous line was a list item with no content
    empty_item: bool,
    line: usize,
    version: Option<f64>,
    on_warning: &'a (dyn Fn(&str) + Send + Sync),
}

impl<'a> LoadState<'a> {
    fn new(on_warning: &'a (dyn Fn(&str) + Send + Sync)) -> Self {
        Self {
            frames: Vec::new(),
            root: Root::Unset,
            pending: None,
            empty_item: false,
            line: 0,
            version: None,
            on_warning,
        }
    }

    fn error(&self, message: impl Into<String>) -> ParseError {
        ParseError::new(message, self.line)
    }

    fn process_line(&mut self, raw: &str) -> Result<LineOutcome, ParseError> {
        let line = raw.trim_end();
        if line.is_empty() {
            return Ok(LineOutcome::Continue);
        }

        if line == "---" {
            if matches!(self.root, Root::Unset) {
                trace!(line = self.line, "Document start marker");
                return Ok(LineOutcome::Continue);
            }
            return Ok(LineOutcome::EndOfDocument);
        }

        let content = line.trim_start();
        let indent = line.len() - content.len();

        if content.starts_with('#') {
            trace!(line = self.line, "Comment");
            return Ok(LineOutcome::Continue);
        }

        if indent == 0 && content.starts_with('%') {
            if let Some((name, args)) = grammar::parse_directive(content) {
                self.directive(&name, &args)?;
                return Ok(LineOutcome::Continue);
            }
        }

        if let Root::Scalar(_) = self.root {
            return Err(self.error(format!(
                "Content after a scalar document: '{}'",
                content
            )));
        }

        self.close_frames(indent)?;
        let after_empty_item = std::mem::take(&mut self.empty_item);
        self.process_content(indent, content, after_empty_item)?;
        Ok(LineOutcome::Continue)
    }

    fn directive(&mut self, name: &str, args: &str) -> Result<(), ParseError> {
        trace!(line = self.line, name, args, "Directive");
        if name != "YAML" {
            (self.on_warning)(&format!("Directive '{}' not supported", name));
            return Ok(());
        }
        if args.is_empty() {
            self.version = None;
            return Ok(());
        }

        let version = args
            .parse::<f64>()
            .ok()
            .filter(|v| v.is_finite())
            .ok_or_else(|| self.error(format!("YAML version '{}' not parseable", args)))?;
        if version >= 2.0 {
            return Err(self.error(format!("YAML version {} not supported", args)));
        }
        if version > 1.0 {
            (self.on_warning)(&format!("YAML version {} probably not supported", args));
        }
        self.version = Some(version);
        Ok(())
    }

    /// Close every frame indented deeper than `indent`
    fn close_frames(&mut self, indent: usize) -> Result<(), ParseError> {
        while let Some(top) = self.frames.last() {
            if top.indent <= indent {
                break;
            }
            if self.frames.len() == 1 {
                return Err(self.error(format!(
                    "Line indented less than the document root (column {} < {})",
                    indent, top.indent
                )));
            }
            self.pop_frame();
            self.pending = None;
            self.empty_item = false;
        }
        Ok(())
    }

    /// Pop the top frame into its parent
    fn pop_frame(&mut self) {
        let Some(frame) = self.frames.pop() else {
            return;
        };
        let value = frame.container.into_value();
        match (self.frames.last_mut().map(|f| &mut f.container), frame.slot) {
            (Some(Container::Mapping(map)), Slot::Key(key)) => {
                map.insert(key, value);
            }
            (Some(Container::Sequence(items)), Slot::ReplaceLast) => match items.last_mut() {
                Some(last) => *last = value,
                None => items.push(value),
            },
            (Some(Container::Sequence(items)), _) => items.push(value),
            // The root frame has no parent; it is only popped by `finish`
            _ => {}
        }
    }

    fn process_content(
        &mut self,
        mut indent: usize,
        mut content: &str,
        mut after_empty_item: bool,
    ) -> Result<(), ParseError> {
        let mut item_opened = false;
        while is_list_marker(content) {
            let marker = indent;
            let rest = content[1..].trim_start();
            indent += content.len() - rest.len();
            content = rest;
            self.open_item(marker, after_empty_item)?;
            after_empty_item = false;
            item_opened = true;
        }

        if item_opened && (content.is_empty() || content.starts_with('#')) {
            trace!(line = self.line, "Empty list item");
            self.sequence_mut()?.push(Value::Null);
            self.empty_item = true;
            return Ok(());
        }

        if let Some((key, value)) = split_key_value(content) {
            trace!(line = self.line, key, "Mapping entry");
            return self.mapping_entry(indent, key, value, after_empty_item);
        }

        trace!(line = self.line, "Scalar line");
        self.scalar_line(content, after_empty_item)
    }

    /// Start a sequence element whose marker is at column `marker`
    fn open_item(&mut self, marker: usize, after_empty_item: bool) -> Result<(), ParseError> {
        let Some(top) = self.frames.last() else {
            debug!(indent = marker, "Opened root sequence");
            self.root = Root::Container;
            self.frames.push(Frame {
                indent: marker,
                container: Container::Sequence(Vec::new()),
                slot: Slot::Root,
            });
            return Ok(());
        };

        if marker == top.indent {
            return match top.container {
                Container::Sequence(_) => Ok(()),
                Container::Mapping(_) => {
                    Err(self.error("List item at the same indentation as mapping keys"))
                }
            };
        }
        self.open_nested(marker, Container::Sequence(Vec::new()), after_empty_item)
    }

    /// Push a container indented under the current one
    fn open_nested(
        &mut self,
        indent: usize,
        container: Container,
        after_empty_item: bool,
    ) -> Result<(), ParseError> {
        let slot = match self.frames.last().map(|f| &f.container) {
            Some(Container::Mapping(_)) => match self.pending.take() {
                Some(key) => Slot::Key(key),
                None => {
                    return Err(self.error(format!(
                        "Unexpected indentation for a nested {}",
                        container.kind()
                    )))
                }
            },
            Some(Container::Sequence(_)) if after_empty_item => Slot::ReplaceLast,
            Some(Container::Sequence(_)) => Slot::Append,
            None => Slot::Root,
        };

        debug!(indent, kind = container.kind(), slot = ?slot, "Opened nested container");
        self.frames.push(Frame {
            indent,
            container,
            slot,
        });
        Ok(())
    }

    fn mapping_entry(
        &mut self,
        indent: usize,
        key: &str,
        value: Option<&str>,
        after_empty_item: bool,
    ) -> Result<(), ParseError> {
        let value = value.filter(|v| !v.is_empty() && !v.starts_with('#'));

        match self.frames.last() {
            None => {
                debug!(indent, "Opened root mapping");
                self.root = Root::Container;
                self.frames.push(Frame {
                    indent,
                    container: Container::Mapping(Mapping::new()),
                    slot: Slot::Root,
                });
            }
            Some(top) if top.indent == indent => {
                if let Container::Sequence(_) = top.container {
                    return Err(self.error("Mapping key at the same indentation as list items"));
                }
            }
            Some(_) => {
                self.open_nested(indent, Container::Mapping(Mapping::new()), after_empty_item)?
            }
        }

        let decoded = match value {
            Some(text) => Some(self.decode(text)?),
            None => None,
        };
        let line = self.line;
        let map = self.mapping_mut()?;
        match decoded {
            Some(decoded) => {
                if map.insert(key, decoded).is_some() {
                    trace!(line, key, "Duplicate key overwritten");
                }
                self.pending = None;
            }
            None => {
                map.insert(key, Value::Null);
                self.pending = Some(key.to_string());
            }
        }
        Ok(())
    }

    fn scalar_line(&mut self, content: &str, after_empty_item: bool) -> Result<(), ParseError> {
        let decoded = self.decode(content)?;

        if let Root::Unset = self.root {
            self.root = Root::Scalar(decoded);
            return Ok(());
        }

        if let Some(key) = self.pending.clone() {
            let line = self.line;
            let map = self.mapping_mut()?;
            let Some(existing) = map.get_mut(&key) else {
                return Err(ParseError::new(format!("Missing value for key '{}'", key), line));
            };
            if existing.is_null() {
                *existing = decoded;
                return Ok(());
            }
            // Folded text: continuation lines join with a single space
            let kind = existing.type_name();
            let Value::String(text) = existing else {
                return Err(ParseError::new(
                    format!("Cannot continue a {} value with '{}'", kind, content),
                    line,
                ));
            };
            text.push(' ');
            match decoded {
                Value::String(more) => text.push_str(&more),
                _ => text.push_str(plain_text(content)),
            }
            return Ok(());
        }

        if let Some(Frame {
            container: Container::Sequence(items),
            ..
        }) = self.frames.last_mut()
        {
            match items.last_mut() {
                Some(last) if after_empty_item => *last = decoded,
                _ => items.push(decoded),
            }
            return Ok(());
        }

        Err(self.error(format!("Unparseable line '{}'", content)))
    }

    fn decode(&self, text: &str) -> Result<Value, ParseError> {
        decode_scalar(text).map_err(|e| e.at_line(self.line))
    }

    fn mapping_mut(&mut self) -> Result<&mut Mapping, ParseError> {
        let line = self.line;
        match self.frames.last_mut().map(|f| &mut f.container) {
            Some(Container::Mapping(map)) => Ok(map),
            _ => Err(ParseError::new("Expected to be inside a mapping", line)),
        }
    }

    fn sequence_mut(&mut self) -> Result<&mut Vec<Value>, ParseError> {
        let line = self.line;
        match self.frames.last_mut().map(|f| &mut f.container) {
            Some(Container::Sequence(items)) => Ok(items),
            _ => Err(ParseError::new("Expected to be inside a sequence", line)),
        }
    }

    /// Close all open frames and hand back the root
    fn finish(mut self) -> Document {
        let root = match std::mem::replace(&mut self.root, Root::Unset) {
            Root::Unset => Value::Null,
            Root::Scalar(value) => value,
            Root::Container => {
                while self.frames.len() > 1 {
                    self.pop_frame();
                }
                self.frames
                    .pop()
                    .map(|frame| frame.container.into_value())
                    .unwrap_or_default()
            }
        };
        Document {
            root,
            version: self.version,
        }
    }
}

/// `-` followed by end of line or a space
fn is_list_marker(content: &str) -> bool {
    content == "-" || content.starts_with("- ")
}

/// Split `key: value` into the key and the raw value text.
///
/// Quoted keys are tried first, then a bare key.
fn split_key_value(content: &str) -> Option<(&str, Option<&str>)> {
    quoted_key(content, '"')
        .or_else(|| quoted_key(content, '\''))
        .or_else(|| bare_key(content))
}

/// Text following a key: optional spaces, a colon, then end or spaces and a value
fn key_suffix(rest: &str) -> Option<Option<&str>> {
    let after = rest.trim_start_matches(' ').strip_prefix(':')?;
    if after.is_empty() {
        return Some(None);
    }
    if !after.starts_with(' ') {
        return None;
    }
    let value = after.trim_start_matches(' ');
    Some((!value.is_empty()).then_some(value))
}

/// A quoted key, closed by the last quote that still leaves a valid suffix
fn quoted_key(content: &str, quote: char) -> Option<(&str, Option<&str>)> {
    let body = content.strip_prefix(quote)?;
    body.char_indices()
        .rev()
        .filter(|&(_, c)| c == quote)
        .find_map(|(idx, _)| {
            key_suffix(&body[idx + quote.len_utf8()..]).map(|value| (&body[..idx], value))
        })
}

fn is_key_char(c: char) -> bool {
    !KEY_EXCLUDED.contains(c)
}

/// A bare key: the shortest run of key characters followed by a valid suffix.
///
/// `#` is allowed directly after a key character and `:` directly before one.
fn bare_key(content: &str) -> Option<(&str, Option<&str>)> {
    let chars: Vec<(usize, char)> = content.char_indices().collect();
    let &(_, first) = chars.first()?;
    if first.is_whitespace() || KEY_INDICATORS.contains(first) {
        return None;
    }

    let offset = |pos: usize| chars.get(pos).map_or(content.len(), |&(idx, _)| idx);
    let next_is = |pos: usize, test: &dyn Fn(char) -> bool| {
        chars.get(pos + 1).map_or(false, |&(_, c)| test(c))
    };

    let mut pos = 1;
    loop {
        let end = offset(pos);
        if let Some(value) = key_suffix(&content[end..]) {
            return Some((&content[..end], value));
        }
        let &(_, c) = chars.get(pos)?;
        pos += match c {
            ':' if next_is(pos, &is_key_char) => 2,
            c if is_key_char(c) && next_is(pos, &|n| n == '#') => 2,
            c if is_key_char(c) => 1,
            _ => return None,
        };
    }
}
