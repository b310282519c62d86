//! Finds the GoogleTest declaration enclosing a given line of a test file.

use std::fs;
use std::path::Path;
use std::sync::OnceLock;

use regex::Regex;

use crate::errors::{DevtoolsError, Result};

fn marker_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^\s*(TEST|TEST_F|TEST_P)\s*\(\s*([A-Za-z_]\w*)\s*,\s*([A-Za-z_]\w*)\s*\)")
            .expect("marker regex is valid")
    })
}

fn define_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^\s*#\s*define\s+([A-Za-z_]\w*)\s+([A-Za-z_]\w*)\s*$")
            .expect("define regex is valid")
    })
}

/// A `TEST*(suite, case)` line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestMarker {
    /// 1-based line of the declaration.
    pub line: usize,
    pub macro_kind: String,
    pub suite: String,
    pub case: String,
}

impl TestMarker {
    /// Name used by the test harness for exported files: `<suite>__<case>`.
    pub fn identifier(&self) -> String {
        format!("{}__{}", self.suite, self.case)
    }
}

pub fn read_lines(path: &Path) -> Result<Vec<String>> {
    if !path.is_file() {
        return Err(DevtoolsError::FileNotFound(path.to_path_buf()));
    }
    let content = fs::read_to_string(path)?;
    Ok(split_lines(&content))
}

pub fn split_lines(content: &str) -> Vec<String> {
    content.lines().map(String::from).collect()
}

/// Returns true if `line` declares a test.
pub fn is_marker(line: &str) -> bool {
    marker_regex().is_match(line)
}

/// Walks from `line_number` (1-based, inclusive) toward the top of the file
/// and returns the first test declaration found.
pub fn find_marker(lines: &[String], line_number: usize) -> Result<TestMarker> {
    if line_number == 0 || line_number > lines.len() {
        return Err(DevtoolsError::LineOutOfRange {
            line: line_number,
            len: lines.len(),
        });
    }

    for idx in (0..line_number).rev() {
        if let Some(caps) = marker_regex().captures(&lines[idx]) {
            let raw_suite = &caps[2];
            let suite = resolve_suite(&lines[..idx], raw_suite);
            let marker = TestMarker {
                line: idx + 1,
                macro_kind: caps[1].to_string(),
                suite,
                case: caps[3].to_string(),
            };
            tracing::debug!(
                line = marker.line,
                identifier = %marker.identifier(),
                "found test declaration"
            );
            return Ok(marker);
        }
    }

    Err(DevtoolsError::MarkerNotFound { line: line_number })
}

/// Test files commonly `#define NAME some_suite` and declare `TEST_F(NAME, ...)`.
/// The last definition above the marker wins.
pub fn resolve_suite(preceding: &[String], raw: &str) -> String {
    preceding
        .iter()
        .rev()
        .filter_map(|line| define_regex().captures(line))
        .find(|caps| &caps[1] == raw)
        .map(|caps| caps[2].to_string())
        .unwrap_or_else(|| raw.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn marker_regex_accepts_spacing_variants() {
        assert!(is_marker("TEST_F(NAME, bool_constant)"));
        assert!(is_marker("  TEST ( suite , case )"));
        assert!(is_marker("TEST_P(Param, works) {"));
        assert!(!is_marker("// TEST_F(NAME, commented)"));
        assert!(!is_marker("MY_TEST_F(NAME, other)"));
    }
}
