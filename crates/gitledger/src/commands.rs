// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Subcommand execution
//!
//! Each subcommand writes its result to the supplied writer; logs and
//! warnings go through `tracing` to stderr.

use std::collections::BTreeMap;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::NaiveDate;
use gitledger_git::{
    AuthorStatistics, DateRange, DiagnosticKind, Diagnostics, GitCli, GitExecutor, Repository,
    RepositoryFinder,
};
use gitledger_report::{CommitReportBuilder, ReportFormat, ReportOptions, render_statistics_table};
use tracing::{debug, info, warn};

use crate::config::{Command, Config};

/// Everything a subcommand needs, built once from [`Config`]
pub struct Session {
    root: PathBuf,
    config: Config,
    today: NaiveDate,
    diagnostics: Diagnostics,
}

impl Session {
    /// Session for `config`, resolving ranges against `today`
    ///
    /// # Errors
    ///
    /// Fails if no workspace is given and the current directory is unknown.
    pub fn new(config: Config, today: NaiveDate) -> Result<Self> {
        let root = config
            .workspace_path()
            .context("Cannot determine the workspace directory")?;
        Ok(Self {
            root,
            config,
            today,
            diagnostics: Diagnostics::new(),
        })
    }

    /// Diagnostics collected so far
    #[must_use]
    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    fn executor(&self) -> GitExecutor {
        GitExecutor::new(
            GitCli::with_timeouts(self.config.probe_timeout(), self.config.query_timeout())
                .program(&self.config.git),
        )
    }

    fn discover(&mut self) -> Result<Vec<Repository>> {
        let finder = RepositoryFinder::new(self.executor())
            .with_max_depth(self.config.max_depth)
            .with_excluded(self.config.excluded.iter().cloned());
        let repos = finder
            .find(&self.root, &mut self.diagnostics)
            .with_context(|| format!("Failed to scan {}", self.root.display()))?;
        info!(count = repos.len(), root = %self.root.display(), "Discovered repositories");
        Ok(repos)
    }

    /// Run the configured subcommand
    ///
    /// # Errors
    ///
    /// Returns an error if discovery fails, a named repository is invalid,
    /// the date range is inverted or output cannot be written.
    pub fn execute(&mut self, out: &mut dyn Write) -> Result<()> {
        let command = self.config.command.clone().unwrap_or(Command::Repos);
        let result = match command {
            Command::Repos => self.repos(out),
            Command::Branches { repo } => self.branches(repo.as_deref(), out),
            Command::Authors { branch, range } => {
                let range = range.resolve(self.today);
                self.authors(branch.as_deref(), range, out)
            }
            Command::Stats {
                repo,
                branch,
                range,
                authors,
                json,
            } => {
                let range = range.resolve(self.today);
                self.stats(repo.as_deref(), branch.as_deref(), range, &authors, json, out)
            }
            Command::Report {
                author,
                range,
                format,
                with_stats,
            } => {
                let range = range.resolve(self.today);
                self.report(&author, range, format.into(), with_stats, out)
            }
        };
        self.summarize_diagnostics();
        result
    }

    fn repos(&mut self, out: &mut dyn Write) -> Result<()> {
        let repos = self.discover()?;
        if repos.is_empty() {
            writeln!(out, "No repositories found under {}", self.root.display())?;
            return Ok(());
        }

        let name_width = repos.iter().map(|r| r.name.chars().count()).max().unwrap_or(0);
        let path_width = repos
            .iter()
            .map(|r| r.relative_path.chars().count())
            .max()
            .unwrap_or(0);
        for repo in &repos {
            let marker = if repo.is_primary { '*' } else { ' ' };
            let line = format!(
                "{marker} {:<name_width$}  {:<path_width$}  {}",
                repo.name,
                repo.relative_path,
                repo.branch_label()
            );
            writeln!(out, "{}", line.trim_end())?;
        }
        Ok(())
    }

    fn branches(&mut self, repo: Option<&Path>, out: &mut dyn Write) -> Result<()> {
        let executor = self.executor();
        if let Some(path) = repo {
            let scope = executor
                .at(path)
                .with_context(|| format!("Cannot open repository {}", path.display()))?;
            for branch in scope.branches()? {
                writeln!(out, "{branch}")?;
            }
            return Ok(());
        }

        for repo in self.discover()? {
            writeln!(out, "{}:", repo.name)?;
            match executor.branches(repo.path()) {
                Ok(branches) => {
                    for branch in branches {
                        writeln!(out, "  {branch}")?;
                    }
                }
                Err(e) => {
                    warn!(repo = %repo.name, error = %e, "Cannot list branches");
                    self.diagnostics.push(
                        DiagnosticKind::RepositorySkipped,
                        repo.name.clone(),
                        e.to_string(),
                    );
                }
            }
        }
        Ok(())
    }

    fn authors(&mut self, branch: Option<&str>, range: DateRange, out: &mut dyn Write) -> Result<()> {
        let repos = self.discover()?;
        let builder = CommitReportBuilder::new(self.executor());
        let authors = builder.collect_authors(&repos, branch, range, &mut self.diagnostics)?;
        for author in authors {
            writeln!(out, "{author}")?;
        }
        Ok(())
    }

    fn stats(
        &mut self,
        repo: Option<&Path>,
        branch: Option<&str>,
        range: DateRange,
        authors: &[String],
        json: bool,
        out: &mut dyn Write,
    ) -> Result<()> {
        let stats: BTreeMap<String, AuthorStatistics> = match repo {
            Some(path) => {
                let executor = self.executor();
                let scope = executor
                    .at(path)
                    .with_context(|| format!("Cannot open repository {}", path.display()))?;
                scope.statistics(
                    branch.unwrap_or("HEAD"),
                    range,
                    authors,
                    &mut self.diagnostics,
                )?
            }
            None => {
                let repos = self.discover()?;
                CommitReportBuilder::new(self.executor()).collect_statistics(
                    &repos,
                    branch,
                    range,
                    authors,
                    &mut self.diagnostics,
                )?
            }
        };

        if json {
            let rows: Vec<&AuthorStatistics> = stats.values().collect();
            writeln!(out, "{}", serde_json::to_string_pretty(&rows)?)?;
        } else {
            write!(out, "{}", render_statistics_table(&stats))?;
        }
        Ok(())
    }

    fn report(
        &mut self,
        author: &str,
        range: DateRange,
        format: ReportFormat,
        with_stats: bool,
        out: &mut dyn Write,
    ) -> Result<()> {
        let repos = self.discover()?;
        let options = ReportOptions {
            include_line_stats: with_stats,
        };
        let report = CommitReportBuilder::new(self.executor())
            .with_options(options)
            .generate(&repos, author, range, &mut self.diagnostics)?;
        let rendered = format.render(&report)?;
        write!(out, "{rendered}")?;
        if !rendered.ends_with('\n') {
            writeln!(out)?;
        }
        Ok(())
    }

    fn summarize_diagnostics(&self) {
        let notable = [
            DiagnosticKind::UnreadableDirectory,
            DiagnosticKind::ProbeFailed,
            DiagnosticKind::MalformedStatLine,
            DiagnosticKind::OrphanStatLine,
            DiagnosticKind::MalformedRecord,
            DiagnosticKind::UnparseableDate,
            DiagnosticKind::RepositorySkipped,
        ];
        for kind in notable {
            let count = self.diagnostics.count(kind);
            if count > 0 {
                warn!(?kind, count, "Some input was skipped");
            }
        }
        debug!(total = self.diagnostics.len(), "Diagnostics collected");
    }
}

/// Run `config` against today's local date
///
/// # Errors
///
/// See [`Session::execute`].
pub fn execute(config: Config, out: &mut dyn Write) -> Result<()> {
    let today = chrono::Local::now().date_naive();
    Session::new(config, today)?.execute(out)
}
