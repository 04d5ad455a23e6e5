// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Cross-repository report generation
//!
//! [`CommitReportBuilder`] visits repositories in the order given, queries
//! each one independently and keeps going when one fails. Failures are
//! logged and recorded as [`DiagnosticKind::RepositorySkipped`].

use std::collections::{BTreeMap, BTreeSet};

use gitledger_git::{
    AuthorStatistics, CommitRecord, DateRange, DiagnosticKind, Diagnostics, GitCli, GitExecutor,
    Repository, VcsBackend, VcsError,
};
use tracing::{debug, info, warn};

use crate::error::ReportError;
use crate::report::{Report, RepositoryCommits};

/// Knobs for [`CommitReportBuilder`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReportOptions {
    /// Fetch per-commit file and line counts (one numstat query per repository)
    pub include_line_stats: bool,
}

impl ReportOptions {
    /// Enable per-commit line statistics
    #[must_use]
    pub fn with_line_stats(mut self) -> Self {
        self.include_line_stats = true;
        self
    }
}

/// Builds reports and workspace-wide aggregates from discovered repositories
#[derive(Debug, Clone)]
pub struct CommitReportBuilder<B = GitCli> {
    executor: GitExecutor<B>,
    options: ReportOptions,
}

impl Default for CommitReportBuilder<GitCli> {
    fn default() -> Self {
        Self::new(GitExecutor::default())
    }
}

impl<B: VcsBackend> CommitReportBuilder<B> {
    /// Builder over an executor with default options
    #[must_use]
    pub fn new(executor: GitExecutor<B>) -> Self {
        Self {
            executor,
            options: ReportOptions::default(),
        }
    }

    /// Replace the options
    #[must_use]
    pub fn with_options(mut self, options: ReportOptions) -> Self {
        self.options = options;
        self
    }

    /// The executor used for queries
    #[must_use]
    pub fn executor(&self) -> &GitExecutor<B> {
        &self.executor
    }

    /// Collect `author`'s non-merge commits in `range` across `repositories`
    ///
    /// Only repositories with at least one matching commit get an entry.
    /// A repository whose query fails is skipped; the rest are still
    /// visited.
    ///
    /// # Errors
    ///
    /// Returns `ReportError::InvalidDateRange` if the range is inverted.
    pub fn generate(
        &self,
        repositories: &[Repository],
        author: &str,
        range: DateRange,
        diagnostics: &mut Diagnostics,
    ) -> Result<Report, ReportError> {
        check_range(range)?;

        let mut report = Report::new(author, range, repositories.len());
        for repo in repositories {
            match self.repository_commits(repo, author, range, diagnostics) {
                Ok(commits) if commits.is_empty() => {
                    debug!(repo = %repo.name, "No commits in range");
                }
                Ok(commits) => {
                    info!(repo = %repo.name, count = commits.len(), "Collected commits");
                    report.push(RepositoryCommits::new(repo.clone(), commits));
                }
                Err(e) => skip(repo, &e, diagnostics),
            }
        }

        let totals = report.totals();
        info!(
            author,
            repositories = totals.repositories_with_commits,
            commits = totals.total_commits,
            "Report generated"
        );
        Ok(report)
    }

    /// Distinct authors with commits in `range` across `repositories`
    ///
    /// `branch` overrides the per-repository revision.
    ///
    /// # Errors
    ///
    /// Returns `ReportError::InvalidDateRange` if the range is inverted.
    pub fn collect_authors(
        &self,
        repositories: &[Repository],
        branch: Option<&str>,
        range: DateRange,
        diagnostics: &mut Diagnostics,
    ) -> Result<BTreeSet<String>, ReportError> {
        check_range(range)?;

        let mut authors = BTreeSet::new();
        for repo in repositories {
            let revision = match branch {
                Some(b) => b.to_string(),
                None => self.revision_for(repo, diagnostics),
            };
            match self.executor.authors(repo.path(), &revision, range) {
                Ok(found) => authors.extend(found),
                Err(e) => skip(repo, &e, diagnostics),
            }
        }
        Ok(authors)
    }

    /// Per-author statistics summed across `repositories`
    ///
    /// `branch` overrides the per-repository revision. An empty `authors`
    /// slice means every author.
    ///
    /// # Errors
    ///
    /// Returns `ReportError::InvalidDateRange` if the range is inverted.
    pub fn collect_statistics(
        &self,
        repositories: &[Repository],
        branch: Option<&str>,
        range: DateRange,
        authors: &[String],
        diagnostics: &mut Diagnostics,
    ) -> Result<BTreeMap<String, AuthorStatistics>, ReportError> {
        check_range(range)?;

        let mut merged: BTreeMap<String, AuthorStatistics> = BTreeMap::new();
        for repo in repositories {
            let revision = match branch {
                Some(b) => b.to_string(),
                None => self.revision_for(repo, diagnostics),
            };
            match self
                .executor
                .statistics(repo.path(), &revision, range, authors, diagnostics)
            {
                Ok(stats) => {
                    for (author, s) in stats {
                        let entry = merged
                            .entry(author.clone())
                            .or_insert_with(|| AuthorStatistics::new(author));
                        entry.commit_count = entry.commit_count.saturating_add(s.commit_count);
                        entry.lines_added = entry.lines_added.saturating_add(s.lines_added);
                        entry.lines_removed = entry.lines_removed.saturating_add(s.lines_removed);
                        entry.files_modified = entry.files_modified.saturating_add(s.files_modified);
                    }
                }
                Err(e) => skip(repo, &e, diagnostics),
            }
        }
        Ok(merged)
    }

    fn repository_commits(
        &self,
        repo: &Repository,
        author: &str,
        range: DateRange,
        diagnostics: &mut Diagnostics,
    ) -> Result<Vec<CommitRecord>, VcsError> {
        let scope = self.executor.at(repo.path())?;
        let branch = self.revision_for(repo, diagnostics);
        if self.options.include_line_stats {
            scope.commit_logs_with_stats(&branch, Some(author), range, diagnostics)
        } else {
            scope.commit_logs(&branch, Some(author), range, diagnostics)
        }
    }

    /// `HEAD` when it resolves, else the branch seen at discovery
    fn revision_for(&self, repo: &Repository, diagnostics: &mut Diagnostics) -> String {
        if self.executor.has_revision(repo.path(), "HEAD") {
            return "HEAD".to_string();
        }
        match &repo.current_branch {
            Some(branch) => {
                diagnostics.push(
                    DiagnosticKind::BranchUnresolved,
                    repo.name.clone(),
                    format!("HEAD does not resolve; using {branch}"),
                );
                branch.clone()
            }
            None => {
                diagnostics.push(
                    DiagnosticKind::BranchUnresolved,
                    repo.name.clone(),
                    "HEAD does not resolve and no branch is known",
                );
                "HEAD".to_string()
            }
        }
    }
}

fn check_range(range: DateRange) -> Result<(), ReportError> {
    match (range.start, range.end) {
        (Some(start), Some(end)) if range.is_inverted() => {
            Err(ReportError::InvalidDateRange { start, end })
        }
        _ => Ok(()),
    }
}

fn skip(repo: &Repository, error: &VcsError, diagnostics: &mut Diagnostics) {
    warn!(repo = %repo.name, error = %error, "Skipping repository");
    diagnostics.push(
        DiagnosticKind::RepositorySkipped,
        repo.name.clone(),
        error.to_string(),
    );
}
