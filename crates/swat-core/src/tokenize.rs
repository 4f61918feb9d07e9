//! Quote-aware CSV tokenizer.
//!
//! Exports from ranking tools are "mostly RFC 4180": fields may be wrapped
//! in double quotes, a doubled quote (`""`) inside a quoted field stands for
//! one literal quote, and quoted fields may contain commas and raw newlines.
//! Line endings are LF, CRLF or a bare CR, and spreadsheet tools often
//! prepend a UTF-8 byte-order mark. A quote opens a quoted span anywhere
//! in a field, so padding before it is allowed: `x, "a,b"` gives `x` and
//! `a,b`.
//!
//! Tokenizing happens in two passes so the header can be resolved before
//! any data row is touched:
//!
//! 1. [`split_header`] separates the header line from the remainder.
//! 2. [`split_records`] cuts the remainder into logical lines and
//!    [`split_fields`] cuts one line into trimmed field values.
//!
//! # Example
//!
//! ```rust
//! use swat_core::tokenize::{split_fields, split_header, split_records};
//!
//! let text = "\u{feff}Keyword,Pos\n\"shoes, red\",3\n";
//! let split = split_header(text);
//! assert_eq!(split_fields(split.header_line), vec!["Keyword", "Pos"]);
//! let lines = split_records(split.remainder);
//! assert_eq!(split_fields(lines[0]), vec!["shoes, red", "3"]);
//! ```

use std::mem::take;

const BOM: char = '\u{feff}';

/// Header line and everything after it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SplitText<'a> {
    pub header_line: &'a str,
    pub remainder: &'a str,
}

/// Strip a leading byte-order mark, if any.
pub fn strip_bom(text: &str) -> &str {
    text.strip_prefix(BOM).unwrap_or(text)
}

/// Split raw CSV text at the first line break outside a quoted field.
///
/// Empty input yields an empty header and an empty remainder. Input with
/// no line break at all is a header with an empty remainder.
pub fn split_header(text: &str) -> SplitText<'_> {
    let text = strip_bom(text);
    match next_line_break(text) {
        Some((end, next)) => SplitText {
            header_line: &text[..end],
            remainder: &text[next..],
        },
        None => SplitText {
            header_line: text,
            remainder: "",
        },
    }
}

/// Split text into logical CSV lines, honoring quotes.
///
/// Whitespace-only lines are dropped: they are never valid data rows.
pub fn split_records(text: &str) -> Vec<&str> {
    let mut lines = Vec::new();
    let mut rest = text;

    while !rest.is_empty() {
        let (line, next) = match next_line_break(rest) {
            Some((end, next)) => (&rest[..end], next),
            None => (rest, rest.len()),
        };
        if !line.trim().is_empty() {
            lines.push(line);
        }
        rest = &rest[next..];
    }

    lines
}

/// Split one logical CSV line into field values.
///
/// Commas inside quotes do not split, `""` inside quotes becomes `"`, each
/// value is trimmed and its enclosing quotes removed. A trailing comma
/// yields a trailing empty field.
pub fn split_fields(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();

    while let Some(ch) = chars.next() {
        match ch {
            '"' if in_quotes => {
                if matches!(chars.peek(), Some('"')) {
                    chars.next();
                    field.push('"');
                } else {
                    in_quotes = false;
                }
            }
            '"' => in_quotes = true,
            ',' if !in_quotes => fields.push(finish_field(take(&mut field))),
            _ => field.push(ch),
        }
    }
    fields.push(finish_field(field));

    fields
}

fn finish_field(field: String) -> String {
    let trimmed = field.trim();
    if trimmed.len() == field.len() {
        field
    } else {
        trimmed.to_string()
    }
}

/// Find the first line break outside quotes.
///
/// Returns `(end_of_line, start_of_next_line)` as byte offsets; a CRLF pair
/// counts as one break.
fn next_line_break(text: &str) -> Option<(usize, usize)> {
    let bytes = text.as_bytes();
    let mut in_quotes = false;

    for (i, &b) in bytes.iter().enumerate() {
        match b {
            b'"' => in_quotes = !in_quotes,
            b'\n' if !in_quotes => return Some((i, i + 1)),
            b'\r' if !in_quotes => {
                let next = if bytes.get(i + 1) == Some(&b'\n') {
                    i + 2
                } else {
                    i + 1
                };
                return Some((i, next));
            }
            _ => {}
        }
    }

    None
}
