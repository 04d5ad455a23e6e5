// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Repository-level VCS operations
//!
//! [`GitExecutor`] turns raw backend text into structured values. It holds no
//! per-repository state: every operation names its repository, so one
//! executor can serve any number of repositories (and threads, if the backend
//! allows). [`GitExecutor::at`] validates a directory once and returns a
//! [`RepoScope`] with the same operations bound to that path.

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::backend::{
    BranchScope, DateWindow, GitCli, HeadLookup, LogFilter, LogFormat, NumstatFormat, VcsBackend,
};
use crate::commit::{AuthorStatistics, CommitRecord, DateRange};
use crate::diagnostics::Diagnostics;
use crate::error::VcsError;
use crate::log::{parse_commit_records, parse_commit_records_with_stats};
use crate::numstat::parse_statistics;

/// Structured VCS operations over a [`VcsBackend`]
#[derive(Debug, Clone)]
pub struct GitExecutor<B = GitCli> {
    backend: B,
}

impl Default for GitExecutor<GitCli> {
    fn default() -> Self {
        Self::new(GitCli::new())
    }
}

impl<B: VcsBackend> GitExecutor<B> {
    /// Create an executor over a backend
    #[must_use]
    pub fn new(backend: B) -> Self {
        Self { backend }
    }

    /// The underlying backend
    #[must_use]
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Probe `dir`; returns its work-tree root, or `None` if it is not inside a repository
    ///
    /// # Errors
    ///
    /// Returns the probe failure when it is not a plain "not a repository"
    /// answer (timeout, launch failure).
    pub fn probe(&self, dir: &Path) -> Result<Option<PathBuf>, VcsError> {
        use crate::error::ProcessError;

        match self.backend.probe(dir) {
            Ok(top) => Ok(Some(top)),
            Err(VcsError::Command {
                source: ProcessError::NonZeroExit { .. },
                ..
            })
            | Err(VcsError::InvalidRepository { .. }) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Validate that `dir` is a usable repository
    ///
    /// # Errors
    ///
    /// Returns `VcsError::InvalidRepository` if `dir` does not exist, is not a
    /// directory, or does not pass the repository probe.
    pub fn validate_repository(&self, dir: &Path) -> Result<(), VcsError> {
        let invalid = |reason: &str| VcsError::InvalidRepository {
            path: dir.display().to_string(),
            reason: reason.to_string(),
        };
        if !dir.exists() {
            return Err(invalid("does not exist"));
        }
        if !dir.is_dir() {
            return Err(invalid("not a directory"));
        }
        match self.probe(dir) {
            Ok(Some(_)) => Ok(()),
            Ok(None) => Err(invalid("not a repository")),
            Err(e) => Err(invalid(&e.to_string())),
        }
    }

    /// Validate `dir` and bind subsequent operations to it
    ///
    /// # Errors
    ///
    /// Returns `VcsError::InvalidRepository` as [`Self::validate_repository`].
    pub fn at<'a>(&'a self, dir: &'a Path) -> Result<RepoScope<'a, B>, VcsError> {
        self.validate_repository(dir)?;
        Ok(RepoScope {
            executor: self,
            repo: dir,
        })
    }

    /// Branch currently checked out in `repo`
    ///
    /// Tries the symbolic reference first, then the abbreviated ref name.
    /// Returns `None` (not an error) for a detached HEAD or when both lookups
    /// fail.
    #[must_use]
    pub fn current_branch(&self, repo: &Path) -> Option<String> {
        [HeadLookup::Symbolic, HeadLookup::Abbreviated]
            .into_iter()
            .find_map(|lookup| match self.backend.resolve_head(repo, lookup) {
                Ok(out) => {
                    let name = out.trim();
                    (!name.is_empty() && name != "HEAD").then(|| name.to_string())
                }
                Err(e) => {
                    debug!(repo = %repo.display(), ?lookup, error = %e, "HEAD lookup failed");
                    None
                }
            })
    }

    /// Whether `revision` resolves to a commit in `repo`
    #[must_use]
    pub fn has_revision(&self, repo: &Path, revision: &str) -> bool {
        self.backend.verify_revision(repo, revision).is_ok()
    }

    /// Local then remote branches, without de-duplication
    ///
    /// The current-branch marker is stripped from local entries; remote
    /// `HEAD -> ...` aliases and detached-HEAD pseudo entries are left out.
    ///
    /// # Errors
    ///
    /// Returns `VcsError` if either listing fails.
    pub fn branches(&self, repo: &Path) -> Result<Vec<String>, VcsError> {
        let local = self.backend.list_branches(repo, BranchScope::Local)?;
        let remote = self.backend.list_branches(repo, BranchScope::Remote)?;

        let mut branches: Vec<String> = local
            .lines()
            .map(|line| strip_marker(line.trim()))
            .filter(|b| !b.is_empty() && !b.starts_with('('))
            .map(str::to_string)
            .collect();

        branches.extend(
            remote
                .lines()
                .map(str::trim)
                .filter(|b| !b.is_empty() && !b.contains("->") && !b.starts_with("HEAD"))
                .map(str::to_string),
        );

        Ok(branches)
    }

    /// Distinct author names on `branch` within `range`
    ///
    /// # Errors
    ///
    /// Returns `VcsError` if the log query fails.
    pub fn authors(
        &self,
        repo: &Path,
        branch: &str,
        range: DateRange,
    ) -> Result<BTreeSet<String>, VcsError> {
        let filter = LogFilter::new(branch).range(range, DateWindow::Approximate);
        let out = self
            .backend
            .query_log(repo, &filter, LogFormat::AuthorNames)?;
        Ok(out
            .lines()
            .map(str::trim)
            .filter(|a| !a.is_empty())
            .map(str::to_string)
            .collect())
    }

    /// Per-author commit, line and file statistics on `branch`
    ///
    /// An empty `authors` slice means every author.
    ///
    /// # Errors
    ///
    /// Returns `VcsError` if the numstat query fails. Malformed output lines
    /// are skipped and recorded in `diagnostics`.
    pub fn statistics(
        &self,
        repo: &Path,
        branch: &str,
        range: DateRange,
        authors: &[String],
        diagnostics: &mut Diagnostics,
    ) -> Result<BTreeMap<String, AuthorStatistics>, VcsError> {
        let filter = LogFilter::new(branch)
            .range(range, DateWindow::Approximate)
            .authors(authors.iter().cloned());
        let out = self
            .backend
            .query_numstat(repo, &filter, NumstatFormat::AuthorHeaders)?;
        let stats = parse_statistics(&out, diagnostics);
        info!(repo = %repo.display(), branch, authors = stats.len(), "Collected statistics");
        Ok(stats)
    }

    /// Non-merge commits on `branch`, newest first, by exactly `author` when given
    ///
    /// # Errors
    ///
    /// Returns `VcsError` if the log query fails. Records with unparseable
    /// dates are dropped and recorded in `diagnostics`.
    pub fn commit_logs(
        &self,
        repo: &Path,
        branch: &str,
        author: Option<&str>,
        range: DateRange,
        diagnostics: &mut Diagnostics,
    ) -> Result<Vec<CommitRecord>, VcsError> {
        let filter = record_filter(branch, author, range);
        let out = self.backend.query_log(repo, &filter, LogFormat::Records)?;
        let records = exact_author(parse_commit_records(&out, diagnostics), author);
        debug!(repo = %repo.display(), branch, count = records.len(), "Read commit log");
        Ok(records)
    }

    /// Like [`Self::commit_logs`], with files/additions/deletions filled in
    ///
    /// # Errors
    ///
    /// Returns `VcsError` if the numstat query fails.
    pub fn commit_logs_with_stats(
        &self,
        repo: &Path,
        branch: &str,
        author: Option<&str>,
        range: DateRange,
        diagnostics: &mut Diagnostics,
    ) -> Result<Vec<CommitRecord>, VcsError> {
        let filter = record_filter(branch, author, range);
        let out = self
            .backend
            .query_numstat(repo, &filter, NumstatFormat::Records)?;
        let records = exact_author(parse_commit_records_with_stats(&out, diagnostics), author);
        debug!(repo = %repo.display(), branch, count = records.len(), "Read commit log with stats");
        Ok(records)
    }
}

/// The VCS matches `--author` as a substring of `Name <email>`; keep only
/// commits whose author name is exactly `author`.
fn exact_author(mut records: Vec<CommitRecord>, author: Option<&str>) -> Vec<CommitRecord> {
    if let Some(author) = author {
        records.retain(|r| r.author == author);
    }
    records
}

fn record_filter(branch: &str, author: Option<&str>, range: DateRange) -> LogFilter {
    LogFilter::new(branch)
        .range(range, DateWindow::WholeDays)
        .authors(author)
        .no_merges()
}

fn strip_marker(line: &str) -> &str {
    line.strip_prefix("* ")
        .or_else(|| line.strip_prefix("+ "))
        .map_or(line, str::trim_start)
}

/// Executor operations bound to one validated repository
#[derive(Debug, Clone, Copy)]
pub struct RepoScope<'a, B> {
    executor: &'a GitExecutor<B>,
    repo: &'a Path,
}

impl<B: VcsBackend> RepoScope<'_, B> {
    /// The repository path
    #[must_use]
    pub fn path(&self) -> &Path {
        self.repo
    }

    /// See [`GitExecutor::current_branch`]
    #[must_use]
    pub fn current_branch(&self) -> Option<String> {
        self.executor.current_branch(self.repo)
    }

    /// See [`GitExecutor::has_revision`]
    #[must_use]
    pub fn has_revision(&self, revision: &str) -> bool {
        self.executor.has_revision(self.repo, revision)
    }

    /// See [`GitExecutor::branches`]
    ///
    /// # Errors
    ///
    /// Returns `VcsError` if either listing fails.
    pub fn branches(&self) -> Result<Vec<String>, VcsError> {
        self.executor.branches(self.repo)
    }

    /// See [`GitExecutor::authors`]
    ///
    /// # Errors
    ///
    /// Returns `VcsError` if the log query fails.
    pub fn authors(&self, branch: &str, range: DateRange) -> Result<BTreeSet<String>, VcsError> {
        self.executor.authors(self.repo, branch, range)
    }

    /// See [`GitExecutor::statistics`]
    ///
    /// # Errors
    ///
    /// Returns `VcsError` if the numstat query fails.
    pub fn statistics(
        &self,
        branch: &str,
        range: DateRange,
        authors: &[String],
        diagnostics: &mut Diagnostics,
    ) -> Result<BTreeMap<String, AuthorStatistics>, VcsError> {
        self.executor
            .statistics(self.repo, branch, range, authors, diagnostics)
    }

    /// See [`GitExecutor::commit_logs`]
    ///
    /// # Errors
    ///
    /// Returns `VcsError` if the log query fails.
    pub fn commit_logs(
        &self,
        branch: &str,
        author: Option<&str>,
        range: DateRange,
        diagnostics: &mut Diagnostics,
    ) -> Result<Vec<CommitRecord>, VcsError> {
        self.executor
            .commit_logs(self.repo, branch, author, range, diagnostics)
    }

    /// See [`GitExecutor::commit_logs_with_stats`]
    ///
    /// # Errors
    ///
    /// Returns `VcsError` if the numstat query fails.
    pub fn commit_logs_with_stats(
        &self,
        branch: &str,
        author: Option<&str>,
        range: DateRange,
        diagnostics: &mut Diagnostics,
    ) -> Result<Vec<CommitRecord>, VcsError> {
        self.executor
            .commit_logs_with_stats(self.repo, branch, author, range, diagnostics)
    }
}
