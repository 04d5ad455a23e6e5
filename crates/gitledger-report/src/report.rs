//! Report data model

use chrono::NaiveDate;
use gitledger_git::{CommitRecord, DateRange, Repository};
use serde::Serialize;

/// Commits found in one repository
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RepositoryCommits {
    /// The repository the commits belong to
    pub repository: Repository,
    /// Commits, newest first
    pub commits: Vec<CommitRecord>,
}

impl RepositoryCommits {
    /// Group commits under a repository
    #[must_use]
    pub fn new(repository: Repository, commits: Vec<CommitRecord>) -> Self {
        Self {
            repository,
            commits,
        }
    }

    /// Number of commits
    #[must_use]
    pub fn commit_count(&self) -> usize {
        self.commits.len()
    }

    /// Sum of line additions over commits that carry line statistics
    #[must_use]
    pub fn total_additions(&self) -> u64 {
        self.commits
            .iter()
            .filter_map(|c| c.additions)
            .fold(0, u64::saturating_add)
    }

    /// Sum of line deletions over commits that carry line statistics
    #[must_use]
    pub fn total_deletions(&self) -> u64 {
        self.commits
            .iter()
            .filter_map(|c| c.deletions)
            .fold(0, u64::saturating_add)
    }

    /// Sum of changed files over commits that carry line statistics
    #[must_use]
    pub fn total_files_changed(&self) -> u64 {
        self.commits
            .iter()
            .filter_map(|c| c.files_changed)
            .fold(0, u64::saturating_add)
    }
}

/// Aggregates over a report's repositories
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ReportTotals {
    /// Repositories that were queried
    pub total_repositories: usize,
    /// Repositories with at least one commit
    pub repositories_with_commits: usize,
    /// Commits across all repositories
    pub total_commits: usize,
    /// Changed files across all repositories
    pub total_files_changed: u64,
    /// Added lines across all repositories
    pub total_additions: u64,
    /// Deleted lines across all repositories
    pub total_deletions: u64,
}

/// One author's commits across a workspace for a date range
///
/// Totals are never stored: [`Report::totals`] sums them from the current
/// repository list each time it is called.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Report {
    /// Author the report is about
    pub author: String,
    /// Inclusive start date, if any
    pub start_date: Option<NaiveDate>,
    /// Inclusive end date, if any
    pub end_date: Option<NaiveDate>,
    /// Repositories with commits, in discovery order
    pub repositories: Vec<RepositoryCommits>,
    /// How many repositories were queried
    pub total_repositories: usize,
}

impl Report {
    /// Empty report for `author` over `range`
    #[must_use]
    pub fn new(author: impl Into<String>, range: DateRange, total_repositories: usize) -> Self {
        Self {
            author: author.into(),
            start_date: range.start,
            end_date: range.end,
            repositories: Vec::new(),
            total_repositories,
        }
    }

    /// Append a repository's commits
    pub fn push(&mut self, commits: RepositoryCommits) {
        self.repositories.push(commits);
    }

    /// Whether no repository contributed commits
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.repositories.iter().all(|rc| rc.commits.is_empty())
    }

    /// Sum the per-repository aggregates
    #[must_use]
    pub fn totals(&self) -> ReportTotals {
        self.repositories.iter().fold(
            ReportTotals {
                total_repositories: self.total_repositories,
                ..ReportTotals::default()
            },
            |mut t, rc| {
                if rc.commit_count() > 0 {
                    t.repositories_with_commits += 1;
                }
                t.total_commits += rc.commit_count();
                t.total_files_changed = t.total_files_changed.saturating_add(rc.total_files_changed());
                t.total_additions = t.total_additions.saturating_add(rc.total_additions());
                t.total_deletions = t.total_deletions.saturating_add(rc.total_deletions());
                t
            },
        )
    }
}
