// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Report renderers
//!
//! All renderers are pure: the same report always renders to the same bytes.

use std::collections::BTreeMap;
use std::fmt;

use gitledger_git::{AuthorStatistics, CommitRecord};
use serde::Serialize;

use crate::error::ReportError;
use crate::report::{Report, ReportTotals, RepositoryCommits};

const RULE_WIDTH: usize = 50;
const NO_COMMITS: &str = "No commits in the selected date range.";
const NO_REPOSITORY_COMMITS: &str = "No commits in this repository for the selected range.";

/// Output format for a rendered report
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ReportFormat {
    /// GitHub-flavoured Markdown
    #[default]
    Markdown,
    /// Plain text with ruled sections
    PlainText,
    /// Pretty-printed JSON including totals
    Json,
}

impl ReportFormat {
    /// Render `report` in this format
    ///
    /// # Errors
    ///
    /// Returns `ReportError::Serialize` if JSON serialisation fails.
    pub fn render(self, report: &Report) -> Result<String, ReportError> {
        match self {
            Self::Markdown => Ok(export_as_markdown(report)),
            Self::PlainText => Ok(export_as_plain_text(report)),
            Self::Json => export_as_json(report),
        }
    }
}

/// Render a report as Markdown
#[must_use]
pub fn export_as_markdown(report: &Report) -> String {
    MarkdownReport(report).to_string()
}

/// Render a report as plain text
#[must_use]
pub fn export_as_plain_text(report: &Report) -> String {
    PlainTextReport(report).to_string()
}

struct MarkdownReport<'a>(&'a Report);

impl fmt::Display for MarkdownReport<'_> {
    fn fmt(&self, out: &mut fmt::Formatter<'_>) -> fmt::Result {
        let report = self.0;
        writeln!(out, "# Git Commit Report\n")?;
        writeln!(out, "**Author:** {}", report.author)?;
        if let Some((label, value)) = range_line(report) {
            writeln!(out, "**{label}:** {value}")?;
        }
        writeln!(out)?;

        if report.repositories.is_empty() {
            writeln!(out, "{NO_COMMITS}\n")?;
        }
        for rc in &report.repositories {
            writeln!(out, "## Repository: {}", rc.repository.name)?;
            if rc.commits.is_empty() {
                writeln!(out, "_{NO_REPOSITORY_COMMITS}_")?;
            }
            for c in &rc.commits {
                writeln!(
                    out,
                    "- `{}` - {} : {}{}",
                    c.short_hash,
                    c.date,
                    c.subject,
                    line_stats_suffix(c)
                )?;
            }
            writeln!(out)?;
        }

        writeln!(out, "---\n\n**Summary:**")?;
        for (label, value) in summary_lines(&report.totals()) {
            writeln!(out, "- {label}: {value}")?;
        }
        Ok(())
    }
}

struct PlainTextReport<'a>(&'a Report);

impl fmt::Display for PlainTextReport<'_> {
    fn fmt(&self, out: &mut fmt::Formatter<'_>) -> fmt::Result {
        let report = self.0;
        let heavy = "=".repeat(RULE_WIDTH);
        let light = "-".repeat(RULE_WIDTH);

        writeln!(out, "Git Commit Report\n{heavy}\n")?;
        writeln!(out, "Author: {}", report.author)?;
        if let Some((label, value)) = range_line(report) {
            writeln!(out, "{label}: {value}")?;
        }
        writeln!(out)?;

        if report.repositories.is_empty() {
            writeln!(out, "{NO_COMMITS}\n")?;
        }
        for rc in &report.repositories {
            writeln!(out, "Repository: {}\n{light}", rc.repository.name)?;
            if rc.commits.is_empty() {
                writeln!(out, "{NO_REPOSITORY_COMMITS}")?;
            }
            for c in &rc.commits {
                writeln!(
                    out,
                    "{} {} {}{}",
                    c.date,
                    c.short_hash,
                    c.subject,
                    line_stats_suffix(c)
                )?;
            }
            writeln!(out)?;
        }

        writeln!(out, "{heavy}\nSummary:")?;
        for (label, value) in summary_lines(&report.totals()) {
            writeln!(out, "  {label}: {value}")?;
        }
        Ok(())
    }
}

#[derive(Serialize)]
struct JsonReport<'a> {
    author: &'a str,
    start_date: Option<chrono::NaiveDate>,
    end_date: Option<chrono::NaiveDate>,
    repositories: Vec<JsonRepository<'a>>,
    totals: ReportTotals,
}

#[derive(Serialize)]
struct JsonRepository<'a> {
    name: &'a str,
    path: &'a std::path::Path,
    relative_path: &'a str,
    current_branch: Option<&'a str>,
    commit_count: usize,
    total_files_changed: u64,
    total_additions: u64,
    total_deletions: u64,
    commits: &'a [CommitRecord],
}

impl<'a> From<&'a RepositoryCommits> for JsonRepository<'a> {
    fn from(rc: &'a RepositoryCommits) -> Self {
        Self {
            name: &rc.repository.name,
            path: &rc.repository.path,
            relative_path: &rc.repository.relative_path,
            current_branch: rc.repository.current_branch.as_deref(),
            commit_count: rc.commit_count(),
            total_files_changed: rc.total_files_changed(),
            total_additions: rc.total_additions(),
            total_deletions: rc.total_deletions(),
            commits: &rc.commits,
        }
    }
}

/// Render a report as pretty-printed JSON, with per-repository and overall totals
///
/// # Errors
///
/// Returns `ReportError::Serialize` if a path cannot be represented as UTF-8.
pub fn export_as_json(report: &Report) -> Result<String, ReportError> {
    let doc = JsonReport {
        author: &report.author,
        start_date: report.start_date,
        end_date: report.end_date,
        repositories: report.repositories.iter().map(JsonRepository::from).collect(),
        totals: report.totals(),
    };
    Ok(serde_json::to_string_pretty(&doc)?)
}

/// Render per-author statistics as an aligned table
///
/// Rows are ordered by commit count (highest first), then by author name.
#[must_use]
pub fn render_statistics_table(stats: &BTreeMap<String, AuthorStatistics>) -> String {
    const HEADERS: [&str; 5] = ["Author", "Commits", "Added", "Removed", "Files"];

    let mut rows: Vec<&AuthorStatistics> = stats.values().collect();
    rows.sort_by(|a, b| {
        b.commit_count
            .cmp(&a.commit_count)
            .then_with(|| a.author.cmp(&b.author))
    });

    let cells: Vec<[String; 5]> = rows
        .iter()
        .map(|s| {
            [
                s.author.clone(),
                s.commit_count.to_string(),
                format!("+{}", s.lines_added),
                format!("-{}", s.lines_removed),
                s.files_modified.to_string(),
            ]
        })
        .collect();

    let mut widths = HEADERS.map(|h| h.chars().count());
    for row in &cells {
        for (w, cell) in widths.iter_mut().zip(row) {
            *w = (*w).max(cell.chars().count());
        }
    }

    let mut out = String::new();
    let header: [String; 5] = HEADERS.map(str::to_string);
    push_row(&mut out, &header, &widths);
    let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    push_row(&mut out, &rule, &widths);
    for row in &cells {
        push_row(&mut out, row, &widths);
    }
    out
}

fn push_row(out: &mut String, cells: &[String], widths: &[usize; 5]) {
    let mut line = String::new();
    for (i, (cell, width)) in cells.iter().zip(widths).enumerate() {
        if i > 0 {
            line.push_str("  ");
        }
        let pad = width.saturating_sub(cell.chars().count());
        // Author left-aligned, numbers right-aligned.
        if i == 0 {
            line.push_str(cell);
            line.push_str(&" ".repeat(pad));
        } else {
            line.push_str(&" ".repeat(pad));
            line.push_str(cell);
        }
    }
    out.push_str(line.trim_end());
    out.push('\n');
}

fn range_line(report: &Report) -> Option<(&'static str, String)> {
    match (report.start_date, report.end_date) {
        (Some(start), Some(end)) => Some(("Date range", format!("{start} ~ {end}"))),
        (None, Some(end)) => Some(("Until", end.to_string())),
        (Some(start), None) => Some(("Since", start.to_string())),
        (None, None) => None,
    }
}

fn line_stats_suffix(commit: &CommitRecord) -> String {
    match (commit.files_changed, commit.additions, commit.deletions) {
        (Some(files), Some(add), Some(del)) => {
            let noun = if files == 1 { "file" } else { "files" };
            format!(" (+{add} -{del}, {files} {noun})")
        }
        _ => String::new(),
    }
}

fn summary_lines(totals: &ReportTotals) -> Vec<(&'static str, String)> {
    let mut lines = vec![
        (
            "Repositories",
            format!(
                "{} / {}",
                totals.repositories_with_commits, totals.total_repositories
            ),
        ),
        ("Total commits", totals.total_commits.to_string()),
    ];
    if totals.total_files_changed > 0 {
        lines.push(("Files changed", totals.total_files_changed.to_string()));
    }
    if totals.total_additions > 0 || totals.total_deletions > 0 {
        lines.push((
            "Lines",
            format!("+{} -{}", totals.total_additions, totals.total_deletions),
        ));
    }
    lines
}
