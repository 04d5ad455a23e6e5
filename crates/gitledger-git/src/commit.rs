//! Commit and per-author statistics types

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A single commit as reported by the log query
///
/// The line-statistic fields are only filled in by the numstat-backed query
/// ([`crate::GitExecutor::commit_logs_with_stats`]); the plain record query
/// leaves them as `None`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitRecord {
    /// Abbreviated commit hash
    pub short_hash: String,
    /// Author display name
    pub author: String,
    /// Author date, calendar day only
    pub date: NaiveDate,
    /// First line of the commit message
    pub subject: String,
    /// Number of files touched
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub files_changed: Option<u64>,
    /// Lines added
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub additions: Option<u64>,
    /// Lines removed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deletions: Option<u64>,
}

impl CommitRecord {
    /// Create a record without line statistics
    #[must_use]
    pub fn new(
        short_hash: impl Into<String>,
        author: impl Into<String>,
        date: NaiveDate,
        subject: impl Into<String>,
    ) -> Self {
        Self {
            short_hash: short_hash.into(),
            author: author.into(),
            date,
            subject: subject.into(),
            files_changed: None,
            additions: None,
            deletions: None,
        }
    }

    /// Attach line statistics
    #[must_use]
    pub fn with_line_stats(mut self, files_changed: u64, additions: u64, deletions: u64) -> Self {
        self.files_changed = Some(files_changed);
        self.additions = Some(additions);
        self.deletions = Some(deletions);
        self
    }

    /// Whether the numstat-backed fields are populated
    #[must_use]
    pub fn has_line_stats(&self) -> bool {
        self.files_changed.is_some() || self.additions.is_some() || self.deletions.is_some()
    }

    /// Check that a string looks like an abbreviated hash (4 to 40 hex digits)
    #[must_use]
    pub fn is_valid_short_hash(hash: &str) -> bool {
        (4..=40).contains(&hash.len()) && hash.chars().all(|c| c.is_ascii_hexdigit())
    }
}

/// Aggregated counters for one author over one statistics run
///
/// Authors are keyed by their exact display name; differently spelled names
/// are distinct authors.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorStatistics {
    /// Author display name
    pub author: String,
    /// Number of commits
    pub commit_count: u64,
    /// Lines added across all commits
    pub lines_added: u64,
    /// Lines removed across all commits
    pub lines_removed: u64,
    /// Sum over commits of the distinct files each commit touched
    pub files_modified: u64,
}

impl AuthorStatistics {
    /// Create zeroed statistics for an author
    #[must_use]
    pub fn new(author: impl Into<String>) -> Self {
        Self {
            author: author.into(),
            ..Self::default()
        }
    }
}

/// An optional calendar-day window; either end may be open
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    /// First day (inclusive)
    pub start: Option<NaiveDate>,
    /// Last day (inclusive)
    pub end: Option<NaiveDate>,
}

impl DateRange {
    /// A range with no bounds
    #[must_use]
    pub fn unbounded() -> Self {
        Self::default()
    }

    /// A range with both bounds
    #[must_use]
    pub fn between(start: NaiveDate, end: NaiveDate) -> Self {
        Self {
            start: Some(start),
            end: Some(end),
        }
    }

    /// Build from optional bounds
    #[must_use]
    pub fn new(start: Option<NaiveDate>, end: Option<NaiveDate>) -> Self {
        Self { start, end }
    }

    /// True when start is after end
    #[must_use]
    pub fn is_inverted(&self) -> bool {
        matches!((self.start, self.end), (Some(s), Some(e)) if s > e)
    }
}
