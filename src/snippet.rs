//! Reconstructs the source code a parser test embeds as C string literals.
//!
//! Tests pass their input as adjacent literals, one per source line:
//!
//! ```text
//! ast = driver->parse("test",
//!     "#constant mybool1 true\n"
//!     "#constant mybool2 false\n",
//!     matcher);
//! ```
//!
//! The literals are concatenated the way the C compiler would and their
//! escapes are decoded, giving back the original program text.

use std::sync::OnceLock;

use regex::Regex;

use crate::errors::{DevtoolsError, Result};
use crate::locator::{is_marker, TestMarker};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snippet {
    /// 1-based, inclusive.
    pub start_line: usize,
    pub end_line: usize,
    pub text: String,
}

fn call_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\bparse(?:String)?\s*\(").expect("call regex is valid"))
}

/// Finds the embedded source string of the test declared by `marker`.
pub fn extract(lines: &[String], marker: &TestMarker) -> Result<Snippet> {
    let body_start = marker.line.min(lines.len());
    let body_end = lines[body_start..]
        .iter()
        .position(|l| is_marker(l))
        .map_or(lines.len(), |off| body_start + off);
    let body = &lines[body_start..body_end];

    if let Some(first) = body.iter().position(|l| starts_with_literal(l)) {
        let mut text = String::new();
        let mut start = first;

        // The call line may open the string: parse("for n=1 to 5\n"
        if let Some(opening) = first.checked_sub(1).and_then(|prev| trailing_literal(&body[prev])) {
            text.push_str(&unescape(opening));
            start = first - 1;
        }

        let mut last = first;
        for (off, line) in body[first..].iter().enumerate() {
            if !starts_with_literal(line) {
                break;
            }
            let line_no = body_start + first + off + 1;
            for literal in scan_literals(line, line_no)? {
                text.push_str(&unescape(literal));
            }
            last = first + off;
        }
        return Ok(Snippet {
            start_line: body_start + start + 1,
            end_line: body_start + last + 1,
            text,
        });
    }

    // Single-line form: parse("print 1\n"). Lines that do not scan (a stray
    // quote in a comment) are not candidates.
    for (off, line) in body.iter().enumerate() {
        let line_no = body_start + off + 1;
        let Ok(literals) = scan_literals(line, line_no) else {
            continue;
        };
        if !literals.iter().any(|l| l.contains("\\n")) {
            continue;
        }
        if let Some(literal) = literals.last() {
            return Ok(Snippet {
                start_line: line_no,
                end_line: line_no,
                text: unescape(literal),
            });
        }
    }

    // One-statement programs without a newline: parse("RANDOMIZE")
    for (off, line) in body.iter().enumerate() {
        if let Some(literal) = call_argument(line) {
            let line_no = body_start + off + 1;
            return Ok(Snippet {
                start_line: line_no,
                end_line: line_no,
                text: unescape(literal),
            });
        }
    }

    Err(DevtoolsError::SnippetNotFound(marker.identifier()))
}

fn starts_with_literal(line: &str) -> bool {
    line.trim_start().starts_with('"')
}

/// The literal that ends `line`, if nothing but whitespace follows it.
fn trailing_literal(line: &str) -> Option<&str> {
    let trimmed = line.trim_end();
    let spans = literal_spans(trimmed)?;
    let &(start, end) = spans.last()?;
    (end + 1 == trimmed.len()).then(|| &trimmed[start..end])
}

/// Last string literal passed directly to the first `parse(`/`parseString(`
/// call on `line`.
fn call_argument(line: &str) -> Option<&str> {
    let call = call_regex().find(line)?;
    let bytes = line.as_bytes();
    let mut depth = 1usize;
    let mut found = None;
    let mut i = call.end();

    while i < bytes.len() {
        match bytes[i] {
            b'"' | b'\'' => {
                let end = literal_end(bytes, i)?;
                if bytes[i] == b'"' && depth == 1 {
                    found = Some(&line[i + 1..end]);
                }
                i = end + 1;
            }
            b'(' => {
                depth += 1;
                i += 1;
            }
            b')' => {
                depth -= 1;
                if depth == 0 {
                    break;
                }
                i += 1;
            }
            _ => i += 1,
        }
    }

    found
}

/// Index of the quote closing the literal opened at `open`.
fn literal_end(bytes: &[u8], open: usize) -> Option<usize> {
    let quote = bytes[open];
    let mut j = open + 1;
    loop {
        match bytes.get(j) {
            None => return None,
            Some(b'\\') => j += 2,
            Some(&c) if c == quote => return Some(j),
            Some(_) => j += 1,
        }
    }
}

/// `(start, end)` byte ranges of the string literal contents on `line`;
/// `end` is the closing quote. `None` for an unterminated string.
fn literal_spans(line: &str) -> Option<Vec<(usize, usize)>> {
    let bytes = line.as_bytes();
    let mut spans = Vec::new();
    let mut i = 0;

    while i < bytes.len() {
        match bytes[i] {
            b'/' if bytes.get(i + 1) == Some(&b'/') => break,
            quote @ (b'"' | b'\'') => match literal_end(bytes, i) {
                Some(end) => {
                    if quote == b'"' {
                        spans.push((i + 1, end));
                    }
                    i = end + 1;
                }
                None if quote == b'"' => return None,
                // stray apostrophe, e.g. inside a comment we did not detect
                None => break,
            },
            _ => i += 1,
        }
    }

    Some(spans)
}

/// Returns the raw (still escaped) contents of every string literal on
/// `line`, in order. Character literals and `//` comments are skipped.
pub fn scan_literals(line: &str, line_no: usize) -> Result<Vec<&str>> {
    let spans = literal_spans(line).ok_or(DevtoolsError::MalformedLiteral { line: line_no })?;
    Ok(spans.into_iter().map(|(start, end)| &line[start..end]).collect())
}

/// Decodes C escape sequences. Unknown escapes are kept as written.
pub fn unescape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();

    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('r') => out.push('\r'),
            Some('0') => out.push('\0'),
            Some('"') => out.push('"'),
            Some('\'') => out.push('\''),
            Some('\\') => out.push('\\'),
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }

    out
}
