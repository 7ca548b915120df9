//! Scalar decoding
//!
//! Turns the raw text of a value into a typed [`Value`]. Rules are tried in
//! a fixed order and the first match wins; anything unrecognised is kept as
//! a plain string.

use super::error::ScalarError;
use super::grammar;
use super::value::Value;

const NULL_WORDS: [&str; 4] = ["~", "null", "Null", "NULL"];
const INFINITY_WORDS: [&str; 3] = [".inf", ".Inf", ".INF"];
const NAN_WORDS: [&str; 3] = [".nan", ".NaN", ".NAN"];

/// Decode the raw text of a scalar value
pub fn decode_scalar(raw: &str) -> Result<Value, ScalarError> {
    let text = raw.trim();

    if let Some(body) = quoted_body(text, '\'') {
        return Ok(Value::String(body.replace("''", "'")));
    }
    if let Some(body) = quoted_body(text, '"') {
        return unescape_double_quoted(body).map(Value::String);
    }

    // Past the quoted forms a comment needs at least one space before it
    let text = strip_comment(text);
    if text.is_empty() {
        return Ok(Value::Null);
    }

    match text {
        "true" => return Ok(Value::Bool(true)),
        "false" => return Ok(Value::Bool(false)),
        _ => {}
    }
    if NULL_WORDS.contains(&text) {
        return Ok(Value::Null);
    }

    if let Some(value) = decode_prefixed_integer(text)? {
        return Ok(Value::Integer(value));
    }
    if let Some(value) = decode_decimal_integer(text)? {
        return Ok(Value::Integer(value));
    }
    if grammar::is_sexagesimal(text) {
        return decode_sexagesimal(text);
    }
    if grammar::is_float(text) {
        let cleaned = without_separators(text);
        return cleaned
            .parse::<f64>()
            .map(Value::Float)
            .map_err(|_| ScalarError::InvalidNumber { text: cleaned });
    }

    if let Some(value) = decode_infinity(text) {
        return Ok(Value::Float(value));
    }
    if NAN_WORDS.contains(&text) {
        return Ok(Value::Float(f64::NAN));
    }

    Ok(Value::String(text.to_string()))
}

/// Body of a string wrapped in `quote`, optionally followed by a comment.
///
/// The closing quote is the last one that leaves only whitespace and a
/// comment behind it.
fn quoted_body(text: &str, quote: char) -> Option<&str> {
    let rest = text.strip_prefix(quote)?;
    rest.char_indices()
        .rev()
        .filter(|&(_, c)| c == quote)
        .find(|&(idx, _)| {
            let tail = &rest[idx + quote.len_utf8()..];
            tail.is_empty() || tail.trim_start().starts_with('#')
        })
        .map(|(idx, _)| &rest[..idx])
}

/// Unquoted text of a scalar with any trailing comment removed
pub fn plain_text(raw: &str) -> &str {
    strip_comment(raw.trim())
}

fn strip_comment(text: &str) -> &str {
    match text.find(" #") {
        Some(idx) => text[..idx].trim_end(),
        None => text,
    }
}

fn without_separators(text: &str) -> String {
    text.chars().filter(|&c| c != '_').collect()
}

/// Integers span `i64::MIN..=u64::MAX`
fn in_range(value: i128, text: &str) -> Result<i128, ScalarError> {
    if (i128::from(i64::MIN)..=i128::from(u64::MAX)).contains(&value) {
        Ok(value)
    } else {
        Err(ScalarError::IntegerOverflow {
            text: text.to_string(),
        })
    }
}

/// `0x` hex, `0b` binary, or leading-zero octal
fn decode_prefixed_integer(text: &str) -> Result<Option<i128>, ScalarError> {
    let bytes = text.as_bytes();
    if bytes.len() < 2 || bytes[0] != b'0' {
        return Ok(None);
    }

    let cleaned = without_separators(text);
    let candidates: [(bool, &str, u32); 3] = [
        (bytes[1] == b'x', cleaned.get(2..).unwrap_or(""), 16),
        (bytes[1] == b'b', cleaned.get(2..).unwrap_or(""), 2),
        (true, cleaned.get(1..).unwrap_or(""), 8),
    ];

    for (applies, digits, radix) in candidates {
        if applies && !digits.is_empty() && digits.chars().all(|c| c.is_digit(radix)) {
            let value = i128::from_str_radix(digits, radix).map_err(|_| {
                ScalarError::IntegerOverflow {
                    text: text.to_string(),
                }
            })?;
            return in_range(value, text).map(Some);
        }
    }
    Ok(None)
}

/// Optionally signed decimal digits, with `_` separators allowed
fn decode_decimal_integer(text: &str) -> Result<Option<i128>, ScalarError> {
    let cleaned = without_separators(text);
    let digits = cleaned
        .strip_prefix('-')
        .or_else(|| cleaned.strip_prefix('+'))
        .unwrap_or(&cleaned);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Ok(None);
    }
    let value = cleaned
        .parse::<i128>()
        .map_err(|_| ScalarError::IntegerOverflow {
            text: text.to_string(),
        })?;
    in_range(value, text).map(Some)
}

/// Accumulate colon-separated groups as `value * 60 + group`.
///
/// Only the last group may carry a fraction, which makes the result a float.
fn decode_sexagesimal(text: &str) -> Result<Value, ScalarError> {
    let cleaned = without_separators(text);
    let (negative, body) = match cleaned.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, cleaned.strip_prefix('+').unwrap_or(&cleaned)),
    };
    let overflow = || ScalarError::IntegerOverflow {
        text: text.to_string(),
    };

    let mut total: i64 = 0;
    for part in body.split(':') {
        if part.contains('.') {
            let fraction: f64 = part.parse().map_err(|_| ScalarError::InvalidNumber {
                text: part.to_string(),
            })?;
            let value = total as f64 * 60.0 + fraction;
            return Ok(Value::Float(if negative { -value } else { value }));
        }
        let group: i64 = part.parse().map_err(|_| overflow())?;
        total = total
            .checked_mul(60)
            .and_then(|v| v.checked_add(group))
            .ok_or_else(overflow)?;
    }
    let total = i128::from(total);
    Ok(Value::Integer(if negative { -total } else { total }))
}

fn decode_infinity(text: &str) -> Option<f64> {
    let (negative, body) = match text.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, text.strip_prefix('+').unwrap_or(text)),
    };
    INFINITY_WORDS.contains(&body).then(|| {
        if negative {
            f64::NEG_INFINITY
        } else {
            f64::INFINITY
        }
    })
}

/// Expand backslash escapes inside a double-quoted string
fn unescape_double_quoted(body: &str) -> Result<String, ScalarError> {
    let mut out = String::with_capacity(body.len());
    let mut chars = body.chars();

    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        let Some(escape) = chars.next() else {
            out.push('\\');
            break;
        };
        let expanded = match escape {
            '0' => '\0',
            'a' => '\x07',
            'b' => '\x08',
            't' | '\t' => '\t',
            'n' => '\n',
            'N' => '\u{85}',
            'v' => '\x0b',
            'f' => '\x0c',
            'r' => '\r',
            'e' => '\x1b',
            ' ' => ' ',
            '_' => '\u{a0}',
            'L' => '\u{2028}',
            'P' => '\u{2029}',
            '\\' => '\\',
            '"' => '"',
            'x' => hex_escape(&mut chars, 'x', 2)?,
            'u' => hex_escape(&mut chars, 'u', 4)?,
            'U' => hex_escape(&mut chars, 'U', 8)?,
            // Unknown escapes keep the escaped character
            other => other,
        };
        out.push(expanded);
    }
    Ok(out)
}

fn hex_escape(
    chars: &mut std::str::Chars<'_>,
    kind: char,
    width: usize,
) -> Result<char, ScalarError> {
    let digits: String = chars.by_ref().take(width).collect();
    let valid = digits.chars().count() == width && digits.chars().all(|c| c.is_ascii_hexdigit());
    valid
        .then(|| u32::from_str_radix(&digits, 16).ok())
        .flatten()
        .and_then(char::from_u32)
        .ok_or_else(|| ScalarError::InvalidEscape {
            escape: format!("{}{}", kind, digits),
        })
}
