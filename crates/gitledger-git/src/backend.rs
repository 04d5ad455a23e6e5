// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! VCS capability interface and the git command-line implementation
//!
//! [`VcsBackend`] is the small set of raw capabilities the engine needs from a
//! version-control tool. Everything above it works on the returned text, so
//! flag names stay an implementation detail of [`GitCli`] and tests can swap
//! in an in-memory backend.

use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::NaiveDate;

use crate::commit::DateRange;
use crate::error::VcsError;
use crate::log::{FIELD_SEPARATOR, RECORD_SEPARATOR};
use crate::process::{DEFAULT_PROBE_TIMEOUT, DEFAULT_QUERY_TIMEOUT, ProcessRunner};

/// Strategy for resolving the checked-out branch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeadLookup {
    /// Follow the symbolic HEAD reference (fails when detached)
    Symbolic,
    /// Abbreviated ref name of HEAD (yields `HEAD` when detached)
    Abbreviated,
}

/// Which branches to list
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BranchScope {
    /// Local branches
    Local,
    /// Remote-tracking branches
    Remote,
}

/// How date bounds are handed to the VCS
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DateWindow {
    /// Bare `YYYY-MM-DD` after/before bounds, interpreted by the VCS in the
    /// local timezone
    #[default]
    Approximate,
    /// Whole calendar days: from the start of `start` through the end of `end`
    WholeDays,
}

/// Shape of a log query's output
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// One author name per commit
    AuthorNames,
    /// Delimited commit records (see [`crate::log`])
    Records,
}

/// Shape of a numstat query's output
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NumstatFormat {
    /// Author-name header per commit followed by stat lines
    AuthorHeaders,
    /// Delimited commit record header per commit followed by stat lines
    Records,
}

/// Filters shared by log and numstat queries
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogFilter {
    /// Revision to walk from (branch, `HEAD`, ...)
    pub revision: String,
    /// Date bounds
    pub range: DateRange,
    /// How the bounds are expressed
    pub window: DateWindow,
    /// Author filters, OR'd together and matched literally against
    /// `Name <email>`; empty means all authors
    pub authors: Vec<String>,
    /// Leave out merge commits
    pub no_merges: bool,
}

impl LogFilter {
    /// Filter walking `revision` with no other restriction
    #[must_use]
    pub fn new(revision: impl Into<String>) -> Self {
        Self {
            revision: revision.into(),
            range: DateRange::unbounded(),
            window: DateWindow::Approximate,
            authors: Vec::new(),
            no_merges: false,
        }
    }

    /// Restrict to a date range
    #[must_use]
    pub fn range(mut self, range: DateRange, window: DateWindow) -> Self {
        self.range = range;
        self.window = window;
        self
    }

    /// Restrict to the given authors
    #[must_use]
    pub fn authors<I, S>(mut self, authors: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.authors = authors.into_iter().map(Into::into).collect();
        self
    }

    /// Exclude merge commits
    #[must_use]
    pub fn no_merges(mut self) -> Self {
        self.no_merges = true;
        self
    }
}

/// Raw capabilities required from a version-control tool
///
/// Every method takes the repository (or candidate directory) explicitly and
/// returns the tool's raw text output.
pub trait VcsBackend {
    /// Probe whether `dir` lies inside a work tree; returns the work-tree root
    fn probe(&self, dir: &Path) -> Result<PathBuf, VcsError>;

    /// Resolve the checked-out branch with one strategy
    fn resolve_head(&self, repo: &Path, lookup: HeadLookup) -> Result<String, VcsError>;

    /// Check that `revision` names a commit
    fn verify_revision(&self, repo: &Path, revision: &str) -> Result<String, VcsError>;

    /// Raw branch listing
    fn list_branches(&self, repo: &Path, scope: BranchScope) -> Result<String, VcsError>;

    /// Raw log output
    fn query_log(&self, repo: &Path, filter: &LogFilter, format: LogFormat)
    -> Result<String, VcsError>;

    /// Raw log output with per-file numeric diff statistics
    fn query_numstat(
        &self,
        repo: &Path,
        filter: &LogFilter,
        format: NumstatFormat,
    ) -> Result<String, VcsError>;
}

impl<T: VcsBackend + ?Sized> VcsBackend for &T {
    fn probe(&self, dir: &Path) -> Result<PathBuf, VcsError> {
        (**self).probe(dir)
    }

    fn resolve_head(&self, repo: &Path, lookup: HeadLookup) -> Result<String, VcsError> {
        (**self).resolve_head(repo, lookup)
    }

    fn verify_revision(&self, repo: &Path, revision: &str) -> Result<String, VcsError> {
        (**self).verify_revision(repo, revision)
    }

    fn list_branches(&self, repo: &Path, scope: BranchScope) -> Result<String, VcsError> {
        (**self).list_branches(repo, scope)
    }

    fn query_log(
        &self,
        repo: &Path,
        filter: &LogFilter,
        format: LogFormat,
    ) -> Result<String, VcsError> {
        (**self).query_log(repo, filter, format)
    }

    fn query_numstat(
        &self,
        repo: &Path,
        filter: &LogFilter,
        format: NumstatFormat,
    ) -> Result<String, VcsError> {
        (**self).query_numstat(repo, filter, format)
    }
}

/// [`VcsBackend`] that shells out to the `git` command-line client
#[derive(Debug, Clone)]
pub struct GitCli {
    program: String,
    probe_runner: ProcessRunner,
    query_runner: ProcessRunner,
}

impl Default for GitCli {
    fn default() -> Self {
        Self::new()
    }
}

impl GitCli {
    /// Use `git` from `PATH` with the default timeouts
    #[must_use]
    pub fn new() -> Self {
        Self::with_timeouts(DEFAULT_PROBE_TIMEOUT, DEFAULT_QUERY_TIMEOUT)
    }

    /// Use `git` from `PATH` with custom timeouts
    #[must_use]
    pub fn with_timeouts(probe: Duration, query: Duration) -> Self {
        Self {
            program: "git".to_string(),
            probe_runner: runner(probe),
            query_runner: runner(query),
        }
    }

    /// Use a different git executable
    #[must_use]
    pub fn program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }

    fn probe_git(&self, dir: &Path, args: &[String], context: &str) -> Result<String, VcsError> {
        self.git(&self.probe_runner, dir, args, context)
    }

    fn query_git(&self, dir: &Path, args: &[String], context: &str) -> Result<String, VcsError> {
        self.git(&self.query_runner, dir, args, context)
    }

    fn git(
        &self,
        runner: &ProcessRunner,
        dir: &Path,
        args: &[String],
        context: &str,
    ) -> Result<String, VcsError> {
        let mut command = Vec::with_capacity(args.len() + 1);
        command.push(self.program.clone());
        command.extend(args.iter().cloned());
        runner
            .run(dir, &command)
            .map(|out| out.stdout)
            .map_err(|e| VcsError::command(context, e))
    }
}

fn runner(timeout: Duration) -> ProcessRunner {
    ProcessRunner::new(timeout)
        .with_env("GIT_TERMINAL_PROMPT", "0")
        .with_env("GIT_OPTIONAL_LOCKS", "0")
}

fn strings(args: &[&str]) -> Vec<String> {
    args.iter().map(|s| (*s).to_string()).collect()
}

impl VcsBackend for GitCli {
    fn probe(&self, dir: &Path) -> Result<PathBuf, VcsError> {
        let out = self.probe_git(
            dir,
            &strings(&["rev-parse", "--show-toplevel"]),
            "Failed to probe repository",
        )?;
        let top = out.trim();
        if top.is_empty() {
            return Err(VcsError::InvalidRepository {
                path: dir.display().to_string(),
                reason: "no work tree".to_string(),
            });
        }
        Ok(PathBuf::from(top))
    }

    fn resolve_head(&self, repo: &Path, lookup: HeadLookup) -> Result<String, VcsError> {
        let args = match lookup {
            HeadLookup::Symbolic => strings(&["symbolic-ref", "--short", "HEAD"]),
            HeadLookup::Abbreviated => strings(&["rev-parse", "--abbrev-ref", "HEAD"]),
        };
        self.probe_git(repo, &args, "Failed to resolve HEAD")
    }

    fn verify_revision(&self, repo: &Path, revision: &str) -> Result<String, VcsError> {
        let args = vec![
            "rev-parse".to_string(),
            "--verify".to_string(),
            "--quiet".to_string(),
            format!("{revision}^{{commit}}"),
        ];
        self.probe_git(repo, &args, &format!("Failed to resolve revision {revision}"))
    }

    fn list_branches(&self, repo: &Path, scope: BranchScope) -> Result<String, VcsError> {
        let args = match scope {
            BranchScope::Local => strings(&["branch", "--list", "--no-color"]),
            BranchScope::Remote => strings(&["branch", "-r", "--no-color"]),
        };
        self.query_git(repo, &args, "Failed to list branches")
    }

    fn query_log(
        &self,
        repo: &Path,
        filter: &LogFilter,
        format: LogFormat,
    ) -> Result<String, VcsError> {
        let context = match format {
            LogFormat::AuthorNames => "Failed to list authors",
            LogFormat::Records => "Failed to read commit log",
        };
        self.query_git(repo, &log_args(filter, format), context)
    }

    fn query_numstat(
        &self,
        repo: &Path,
        filter: &LogFilter,
        format: NumstatFormat,
    ) -> Result<String, VcsError> {
        self.query_git(
            repo,
            &numstat_args(filter, format),
            "Failed to collect statistics",
        )
    }
}

/// Arguments for a log query (after the program name)
#[must_use]
pub fn log_args(filter: &LogFilter, format: LogFormat) -> Vec<String> {
    let pretty = match format {
        LogFormat::AuthorNames => "--format=%an".to_string(),
        LogFormat::Records => format!(
            "--pretty=format:%h{f}%an{f}%aI{f}%s{r}",
            f = escape(FIELD_SEPARATOR),
            r = escape(RECORD_SEPARATOR)
        ),
    };
    let mut args = vec!["log".to_string(), filter.revision.clone(), pretty];
    push_filters(&mut args, filter);
    args
}

/// Arguments for a numstat query (after the program name)
#[must_use]
pub fn numstat_args(filter: &LogFilter, format: NumstatFormat) -> Vec<String> {
    let pretty = match format {
        NumstatFormat::AuthorHeaders => "--pretty=format:%an".to_string(),
        NumstatFormat::Records => format!(
            "--pretty=format:{r}%h{f}%an{f}%aI{f}%s",
            f = escape(FIELD_SEPARATOR),
            r = escape(RECORD_SEPARATOR)
        ),
    };
    let mut args = vec![
        "-c".to_string(),
        "core.quotepath=false".to_string(),
        "log".to_string(),
        filter.revision.clone(),
        "--numstat".to_string(),
        pretty,
    ];
    push_filters(&mut args, filter);
    args
}

fn push_filters(args: &mut Vec<String>, filter: &LogFilter) {
    args.push("--no-color".to_string());
    if filter.no_merges {
        args.push("--no-merges".to_string());
    }
    match filter.window {
        DateWindow::Approximate => {
            if let Some(start) = filter.range.start {
                args.push(format!("--after={}", day(start)));
            }
            if let Some(end) = filter.range.end {
                args.push(format!("--before={}", day(end)));
            }
        }
        DateWindow::WholeDays => {
            if let Some(start) = filter.range.start {
                args.push(format!("--since={} 00:00:00", day(start)));
            }
            if let Some(end) = filter.range.end {
                args.push(format!("--until={} 23:59:59", day(end)));
            }
        }
    }
    if !filter.authors.is_empty() {
        // Author names are literals, not regular expressions.
        args.push("--fixed-strings".to_string());
    }
    for author in &filter.authors {
        args.push(format!("--author={author}"));
    }
    // Keep the revision from being read as a path.
    args.push("--".to_string());
}

fn day(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// `%xNN` placeholder that makes git print `c`
fn escape(c: char) -> String {
    format!("%x{:02x}", c as u32)
}

#[cfg(test)]
mod tests {
    use super::*;
    use similar_asserts::assert_eq;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
    }

    #[test]
    fn test_author_names_args() {
        let filter = LogFilter::new("HEAD").range(
            DateRange::between(day(2026, 1, 1), day(2026, 1, 10)),
            DateWindow::Approximate,
        );
        assert_eq!(
            log_args(&filter, LogFormat::AuthorNames),
            vec![
                "log",
                "HEAD",
                "--format=%an",
                "--no-color",
                "--after=2026-01-01",
                "--before=2026-01-10",
                "--",
            ]
        );
    }

    #[test]
    fn test_record_args_use_whole_days_and_skip_merges() {
        let filter = LogFilter::new("main")
            .range(
                DateRange::new(None, Some(day(2026, 1, 10))),
                DateWindow::WholeDays,
            )
            .authors(["Alice"])
            .no_merges();
        assert_eq!(
            log_args(&filter, LogFormat::Records),
            vec![
                "log",
                "main",
                "--pretty=format:%h%x1f%an%x1f%aI%x1f%s%x1e",
                "--no-color",
                "--no-merges",
                "--until=2026-01-10 23:59:59",
                "--fixed-strings",
                "--author=Alice",
                "--",
            ]
        );
    }

    #[test]
    fn test_numstat_args_one_flag_per_author() {
        let filter = LogFilter::new("HEAD").authors(["Alice", "Bob Smith"]);
        let args = numstat_args(&filter, NumstatFormat::AuthorHeaders);
        assert_eq!(
            args,
            vec![
                "-c",
                "core.quotepath=false",
                "log",
                "HEAD",
                "--numstat",
                "--pretty=format:%an",
                "--no-color",
                "--fixed-strings",
                "--author=Alice",
                "--author=Bob Smith",
                "--",
            ]
        );
    }

    #[test]
    fn test_numstat_record_header_starts_with_separator() {
        let args = numstat_args(&LogFilter::new("HEAD"), NumstatFormat::Records);
        assert_eq!(args[5], "--pretty=format:%x1e%h%x1f%an%x1f%aI%x1f%s");
    }

    #[test]
    fn test_missing_program_is_command_error() {
        let dir = tempfile::tempdir().expect("temp dir");
        let git = GitCli::new().program("gitledger-no-such-git-12345");
        let err = git.probe(dir.path()).expect_err("should fail");
        assert!(matches!(err, VcsError::Command { .. }));
    }
}
