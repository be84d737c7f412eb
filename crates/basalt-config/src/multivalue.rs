//! Multi-valued property decoding
//!
//! A multi-valued property packs an ordered field list into one string using
//! a narrow CSV subset: fields separated by `,`, optionally wrapped in double
//! quotes, with `""` as an escaped quote inside a quoted field. Unquoted
//! fields are trimmed of surrounding whitespace; quoted fields are taken
//! literally. The grammar is deliberately implemented as a small state
//! machine instead of a general CSV parser so the edge cases stay exactly as
//! scanners have historically produced and consumed them:
//!
//! - `""` (empty input) decodes to zero fields
//! - `","` decodes to two empty fields, `",,"` to three
//! - `"a , b"` decodes to `a`, `b`; `"a b"` stays a single field
//! - `"a,b",c` decodes to `a,b` and `c`

use crate::{ConfigError, Result};

#[derive(Clone, Copy, PartialEq, Eq)]
enum State {
    /// Start of a field, before its first character.
    FieldStart,
    /// Inside an unquoted field.
    Unquoted,
    /// Inside a quoted field.
    Quoted,
    /// Past a closing quote; only a comma or end of input is valid here.
    AfterQuote,
}

/// Decode one raw multi-valued string into its ordered fields.
///
/// `key` is only used for error context; the offending key and raw value are
/// carried verbatim in [`ConfigError::MalformedMultiValue`].
pub fn parse_field_list(key: &str, raw: &str) -> Result<Vec<String>> {
    if raw.is_empty() {
        return Ok(Vec::new());
    }

    let mut fields = Vec::new();
    let mut field = String::new();
    let mut state = State::FieldStart;
    let mut chars = raw.chars().peekable();

    while let Some(c) = chars.next() {
        match state {
            State::FieldStart => match c {
                '"' => state = State::Quoted,
                ',' => fields.push(String::new()),
                _ => {
                    field.push(c);
                    state = State::Unquoted;
                }
            },
            State::Unquoted => {
                if c == ',' {
                    fields.push(field.trim().to_string());
                    field.clear();
                    state = State::FieldStart;
                } else {
                    field.push(c);
                }
            }
            State::Quoted => {
                if c == '"' {
                    // Doubled quote is an escaped literal quote.
                    if chars.peek() == Some(&'"') {
                        chars.next();
                        field.push('"');
                    } else {
                        state = State::AfterQuote;
                    }
                } else {
                    field.push(c);
                }
            }
            State::AfterQuote => {
                if c == ',' {
                    fields.push(std::mem::take(&mut field));
                    state = State::FieldStart;
                } else {
                    return Err(ConfigError::malformed_multi_value(key, raw));
                }
            }
        }
    }

    match state {
        // A trailing comma, or input that was a single comma, leaves an
        // empty field on the right-hand side.
        State::FieldStart => fields.push(String::new()),
        State::Unquoted => fields.push(field.trim().to_string()),
        // Unterminated quoted field.
        State::Quoted => return Err(ConfigError::malformed_multi_value(key, raw)),
        State::AfterQuote => fields.push(field),
    }

    Ok(fields)
}
