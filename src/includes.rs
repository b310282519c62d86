//! Qualifies `#include "..."` directives inside vendored source trees.
//!
//! The vendored trees are compiled from the project root, so a directive
//! such as `#include "bitset/stats.h"` inside `bison-util/` has to become
//! `#include "bison-util/bitset/stats.h"`. Every file under the configured
//! trees is indexed by each suffix of its relative path; a quoted include
//! whose path matches an indexed suffix gets the owning tree as prefix.

use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use globset::{Glob, GlobSet, GlobSetBuilder};
use regex::Regex;
use serde::Serialize;
use walkdir::WalkDir;

use crate::config::IncludesConfig;
use crate::errors::{DevtoolsError, Result};

fn include_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"^(\s*#\s*include\s*)"([^"]+)"(.*)$"#).expect("include regex is valid")
    })
}

/// A source or header file found in one of the trees.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    pub tree: String,
    pub path: PathBuf,
    /// Path below the tree directory, `/`-separated.
    pub relative: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IncludeRewrite {
    pub line: usize,
    pub before: String,
    pub after: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileRewrite {
    pub path: PathBuf,
    pub changes: Vec<IncludeRewrite>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RewriteReport {
    pub files_scanned: usize,
    pub dry_run: bool,
    pub files: Vec<FileRewrite>,
}

impl RewriteReport {
    pub fn total_changes(&self) -> usize {
        self.files.iter().map(|f| f.changes.len()).sum()
    }
}

pub fn build_globset(patterns: &[String]) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pat in patterns {
        let glob = Glob::new(pat)
            .map_err(|e| DevtoolsError::PatternError(format!("{}: {}", pat, e)))?;
        builder.add(glob);
    }
    builder
        .build()
        .map_err(|e| DevtoolsError::PatternError(e.to_string()))
}

/// Lists every file under the configured trees whose name matches one of
/// the patterns. Trees are visited in configuration order.
pub fn collect_sources(root: &Path, config: &IncludesConfig) -> Result<Vec<SourceFile>> {
    let globs = build_globset(&config.patterns)?;
    let mut files = Vec::new();

    for tree in &config.trees {
        let tree_dir = root.join(tree);
        if !tree_dir.is_dir() {
            return Err(DevtoolsError::FileNotFound(tree_dir));
        }

        let mut entries: Vec<_> = WalkDir::new(&tree_dir)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
            .collect();
        entries.retain(|e| globs.is_match(e.file_name()));

        for entry in entries {
            let relative = match entry.path().strip_prefix(&tree_dir) {
                Ok(rel) => rel
                    .components()
                    .map(|c| c.as_os_str().to_string_lossy())
                    .collect::<Vec<_>>()
                    .join("/"),
                Err(_) => continue,
            };
            files.push(SourceFile {
                tree: tree.clone(),
                path: entry.into_path(),
                relative,
            });
        }
    }

    tracing::debug!(count = files.len(), "collected source files");
    Ok(files)
}

/// Include path to owning tree.
#[derive(Debug, Default, Clone)]
pub struct HeaderIndex {
    entries: HashMap<String, String>,
}

impl HeaderIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_sources(files: &[SourceFile]) -> Self {
        let mut index = Self::new();
        for file in files {
            index.register(&file.relative, &file.tree);
        }
        index
    }

    /// Registers every suffix of `relative` under `tree`. A configure
    /// template `foo.in.h` is also registered as the `foo.h` it generates.
    pub fn register(&mut self, relative: &str, tree: &str) {
        let parts: Vec<&str> = relative.split('/').collect();
        let Some((file_name, dirs)) = parts.split_last() else {
            return;
        };

        let mut names = vec![file_name.to_string()];
        if let Some(stem) = file_name.strip_suffix(".in.h") {
            names.push(format!("{}.h", stem));
        }

        for name in &names {
            for start in 0..=dirs.len() {
                let mut key = dirs[start..].join("/");
                if !key.is_empty() {
                    key.push('/');
                }
                key.push_str(name);
                self.insert(key, tree);
            }
        }
    }

    /// First registration wins.
    pub fn insert(&mut self, key: String, tree: &str) {
        match self.entries.get(&key) {
            Some(existing) if existing != tree => {
                tracing::debug!(include = %key, kept = %existing, ignored = tree, "include path present in several trees");
            }
            Some(_) => {}
            None => {
                self.entries.insert(key, tree.to_string());
            }
        }
    }

    pub fn lookup(&self, include: &str) -> Option<&str> {
        self.entries.get(include).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Rewrites the quoted includes of one file. Returns the new text and the
/// edits made; the text is unchanged when the edit list is empty.
pub fn rewrite_source(
    text: &str,
    index: &HeaderIndex,
    trees: &[String],
) -> (String, Vec<IncludeRewrite>) {
    let mut out = String::with_capacity(text.len() + 64);
    let mut changes = Vec::new();

    for (idx, raw_line) in text.split_inclusive('\n').enumerate() {
        let (line, ending) = split_line_ending(raw_line);
        match rewrite_line(line, index, trees) {
            Some(new_line) => {
                changes.push(IncludeRewrite {
                    line: idx + 1,
                    before: line.to_string(),
                    after: new_line.clone(),
                });
                out.push_str(&new_line);
            }
            None => out.push_str(line),
        }
        out.push_str(ending);
    }

    (out, changes)
}

fn split_line_ending(raw: &str) -> (&str, &str) {
    if let Some(line) = raw.strip_suffix("\r\n") {
        (line, "\r\n")
    } else if let Some(line) = raw.strip_suffix('\n') {
        (line, "\n")
    } else {
        (raw, "")
    }
}

/// `None` if the line is not a quoted include, is already qualified, or
/// names a file outside the trees.
pub fn rewrite_line(line: &str, index: &HeaderIndex, trees: &[String]) -> Option<String> {
    let caps = include_regex().captures(line)?;
    let include = &caps[2];

    let qualified = trees
        .iter()
        .any(|tree| include.strip_prefix(tree.as_str()).is_some_and(|rest| rest.starts_with('/')));
    if qualified {
        return None;
    }

    let tree = index.lookup(include)?;
    Some(format!("{}\"{}/{}\"{}", &caps[1], tree, include, &caps[3]))
}

/// Qualifies the includes of every source file under the configured trees
/// below `root`. Files are rewritten in place unless `dry_run` is set.
pub fn fix_includes(root: &Path, config: &IncludesConfig, dry_run: bool) -> Result<RewriteReport> {
    let files = collect_sources(root, config)?;
    let index = HeaderIndex::from_sources(&files);
    tracing::info!(files = files.len(), keys = index.len(), "built header index");

    let mut report = RewriteReport {
        files_scanned: 0,
        dry_run,
        files: Vec::new(),
    };

    for file in &files {
        let text = match fs::read_to_string(&file.path) {
            Ok(text) => text,
            Err(e) if e.kind() == ErrorKind::InvalidData => {
                tracing::warn!(path = %file.path.display(), "skipping non-UTF-8 file");
                continue;
            }
            Err(e) => return Err(e.into()),
        };
        report.files_scanned += 1;

        let (new_text, changes) = rewrite_source(&text, &index, &config.trees);
        if changes.is_empty() {
            continue;
        }

        if !dry_run {
            fs::write(&file.path, new_text)?;
        }
        tracing::info!(path = %file.path.display(), changes = changes.len(), dry_run, "rewrote includes");
        report.files.push(FileRewrite {
            path: file.path.clone(),
            changes,
        });
    }

    Ok(report)
}
