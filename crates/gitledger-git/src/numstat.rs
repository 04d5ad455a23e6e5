// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Numstat statistics parsing
//!
//! Parses the output of an author-header numstat log query:
//!
//! ```text
//! Alice
//! 3	1	src/lib.rs
//! -	-	assets/logo.png
//! Bob
//! 10	0	README.md
//! ```
//!
//! Header lines (no tab) carry the author name and appear once per commit.
//! Stat lines are `added<TAB>removed<TAB>path`, with `-` for binary files.
//!
//! The parse is two independent passes over one tokenized line sequence:
//! [`accumulate_file_stats`] sums lines and distinct files per author, and
//! [`count_commit_boundaries`] counts commits from the header lines only,
//! since a commit can be followed by any number of stat lines (including
//! none). [`merge_statistics`] joins the two.

use std::collections::{BTreeMap, HashSet};

use crate::commit::AuthorStatistics;
use crate::diagnostics::{DiagnosticKind, Diagnostics};

/// One classified line of numstat output
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NumstatLine<'a> {
    /// Author header; starts a new commit
    Author(&'a str),
    /// Per-file statistic
    File {
        /// Lines added (0 for binary files)
        added: u64,
        /// Lines removed (0 for binary files)
        removed: u64,
        /// File path as printed by the VCS
        path: &'a str,
    },
    /// Stat-shaped line that could not be parsed
    Malformed(&'a str),
}

/// Line and file totals from the accumulation pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FileTotals {
    /// Lines added
    pub lines_added: u64,
    /// Lines removed
    pub lines_removed: u64,
    /// Sum of distinct files per commit
    pub files_modified: u64,
}

/// Classify every non-blank line of `text`
#[must_use]
pub fn tokenize(text: &str) -> Vec<NumstatLine<'_>> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(classify)
        .collect()
}

fn classify(line: &str) -> NumstatLine<'_> {
    if !line.contains('\t') {
        return NumstatLine::Author(line);
    }

    let mut parts = line.splitn(3, '\t');
    let (Some(added), Some(removed), Some(path)) = (parts.next(), parts.next(), parts.next())
    else {
        return NumstatLine::Malformed(line);
    };

    match (parse_count(added), parse_count(removed)) {
        (Some(added), Some(removed)) if !path.is_empty() => NumstatLine::File {
            added,
            removed,
            path,
        },
        _ => NumstatLine::Malformed(line),
    }
}

fn parse_count(field: &str) -> Option<u64> {
    match field {
        "-" => Some(0),
        other => other.parse().ok(),
    }
}

/// First pass: sum added/removed lines and distinct files per author
///
/// The distinct-file set is flushed at every header line, so a file touched
/// by three commits counts three times, but a file listed twice within one
/// commit counts once. Stat lines before the first header and malformed
/// lines are ignored.
#[must_use]
pub fn accumulate_file_stats(lines: &[NumstatLine<'_>]) -> BTreeMap<String, FileTotals> {
    let mut totals: BTreeMap<String, FileTotals> = BTreeMap::new();
    let mut current: Option<&str> = None;
    let mut files: HashSet<&str> = HashSet::new();

    for line in lines {
        match *line {
            NumstatLine::Author(author) => {
                flush(&mut totals, current, &mut files);
                current = Some(author);
            }
            NumstatLine::File {
                added,
                removed,
                path,
            } => {
                let Some(author) = current else { continue };
                let entry = totals.entry(author.to_string()).or_default();
                entry.lines_added = entry.lines_added.saturating_add(added);
                entry.lines_removed = entry.lines_removed.saturating_add(removed);
                files.insert(path);
            }
            NumstatLine::Malformed(_) => {}
        }
    }
    flush(&mut totals, current, &mut files);

    totals
}

fn flush<'a>(
    totals: &mut BTreeMap<String, FileTotals>,
    author: Option<&str>,
    files: &mut HashSet<&'a str>,
) {
    if let Some(author) = author
        && !files.is_empty()
    {
        let entry = totals.entry(author.to_string()).or_default();
        entry.files_modified = entry.files_modified.saturating_add(files.len() as u64);
    }
    files.clear();
}

/// Second pass: count header lines per author
#[must_use]
pub fn count_commit_boundaries(lines: &[NumstatLine<'_>]) -> BTreeMap<String, u64> {
    let mut counts: BTreeMap<String, u64> = BTreeMap::new();
    for line in lines {
        if let NumstatLine::Author(author) = line {
            *counts.entry((*author).to_string()).or_default() += 1;
        }
    }
    counts
}

/// Join the two passes into per-author statistics
///
/// Every author with at least one header line or one stat line appears in
/// the result; commit counts come only from the boundary pass.
#[must_use]
pub fn merge_statistics(
    totals: BTreeMap<String, FileTotals>,
    commits: BTreeMap<String, u64>,
) -> BTreeMap<String, AuthorStatistics> {
    let mut merged: BTreeMap<String, AuthorStatistics> = BTreeMap::new();

    for (author, t) in totals {
        merged.insert(
            author.clone(),
            AuthorStatistics {
                author,
                commit_count: 0,
                lines_added: t.lines_added,
                lines_removed: t.lines_removed,
                files_modified: t.files_modified,
            },
        );
    }
    for (author, count) in commits {
        merged
            .entry(author.clone())
            .or_insert_with(|| AuthorStatistics::new(author))
            .commit_count = count;
    }

    merged
}

/// Parse numstat output into per-author statistics
///
/// Malformed stat lines and stat lines with no preceding author header are
/// skipped and recorded in `diagnostics`; they never abort the parse.
pub fn parse_statistics(
    text: &str,
    diagnostics: &mut Diagnostics,
) -> BTreeMap<String, AuthorStatistics> {
    let lines = tokenize(text);
    report_skipped(&lines, diagnostics);
    merge_statistics(accumulate_file_stats(&lines), count_commit_boundaries(&lines))
}

fn report_skipped(lines: &[NumstatLine<'_>], diagnostics: &mut Diagnostics) {
    let mut seen_author = false;
    for line in lines {
        match *line {
            NumstatLine::Author(_) => seen_author = true,
            NumstatLine::Malformed(raw) => diagnostics.push(
                DiagnosticKind::MalformedStatLine,
                raw,
                "stat line has a missing or non-numeric field",
            ),
            NumstatLine::File { path, .. } if !seen_author => diagnostics.push(
                DiagnosticKind::OrphanStatLine,
                path,
                "stat line appears before any author header",
            ),
            NumstatLine::File { .. } => {}
        }
    }
}
