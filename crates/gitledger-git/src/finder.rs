// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Workspace repository discovery
//!
//! [`RepositoryFinder`] checks the scan root, then walks subdirectories up to
//! a depth limit. A directory is reported only when it is the top of its own
//! work tree, so plain subdirectories of an enclosing repository are not
//! reported again. Nested repositories are all reported.

use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::backend::{GitCli, VcsBackend};
use crate::diagnostics::{DiagnosticKind, Diagnostics};
use crate::error::VcsError;
use crate::executor::GitExecutor;
use crate::repository::Repository;

/// Default number of directory levels scanned below the root
pub const DEFAULT_MAX_DEPTH: usize = 1;

/// Directory names never descended into
pub const DEFAULT_EXCLUDED_DIRS: &[&str] = &[
    "node_modules",
    "bower_components",
    "target",
    "build",
    "dist",
    "out",
    ".gradle",
    ".maven",
    ".m2",
    "venv",
    ".venv",
    "env",
    ".idea",
    ".vscode",
    ".DS_Store",
    "src",
    "logs",
    "log",
    "tmp",
    "temp",
    "claude",
    ".claude",
    "openspec",
    ".openspec",
    "docs",
    "sql",
    "doc",
    "gradle",
    ".git",
];

/// Bounded-depth repository scanner
#[derive(Debug, Clone)]
pub struct RepositoryFinder<B = GitCli> {
    executor: GitExecutor<B>,
    excluded: BTreeSet<String>,
    max_depth: usize,
}

impl Default for RepositoryFinder<GitCli> {
    fn default() -> Self {
        Self::new(GitExecutor::default())
    }
}

impl<B: VcsBackend> RepositoryFinder<B> {
    /// Finder with the default exclusion set and depth
    #[must_use]
    pub fn new(executor: GitExecutor<B>) -> Self {
        Self {
            executor,
            excluded: DEFAULT_EXCLUDED_DIRS
                .iter()
                .map(|s| (*s).to_string())
                .collect(),
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    /// Scan this many levels below the root (0 checks only the root)
    #[must_use]
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Add directory names to the exclusion set
    #[must_use]
    pub fn with_excluded<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.excluded.extend(names.into_iter().map(Into::into));
        self
    }

    /// The executor used for probing
    #[must_use]
    pub fn executor(&self) -> &GitExecutor<B> {
        &self.executor
    }

    /// Whether a directory name is skipped during the walk
    #[must_use]
    pub fn is_excluded(&self, name: &str) -> bool {
        name.starts_with('.') || self.excluded.contains(name)
    }

    /// Discover repositories under `root`
    ///
    /// The root comes first when it is a repository itself; the rest follow
    /// in depth-first, name-sorted order. Probe failures never abort the
    /// scan: they are recorded in `diagnostics` and the directory is treated
    /// as not a repository.
    ///
    /// # Errors
    ///
    /// Returns `VcsError::InvalidRoot` if `root` does not exist or is not a
    /// directory.
    pub fn find(
        &self,
        root: &Path,
        diagnostics: &mut Diagnostics,
    ) -> Result<Vec<Repository>, VcsError> {
        let invalid = |reason: String| VcsError::InvalidRoot {
            path: root.display().to_string(),
            reason,
        };
        if !root.is_dir() {
            let reason = if root.exists() {
                "not a directory"
            } else {
                "does not exist"
            };
            return Err(invalid(reason.to_string()));
        }
        let root = root
            .canonicalize()
            .map_err(|e| invalid(e.to_string()))?;

        info!(root = %root.display(), max_depth = self.max_depth, "Scanning for repositories");

        let mut found = Vec::new();
        if self.qualifies(&root, diagnostics) {
            let name = root
                .file_name()
                .map_or_else(|| root.display().to_string(), |n| n.to_string_lossy().into_owned());
            found.push(self.describe(name, root.clone(), ".".to_string(), true));
        }
        self.scan(&root, "", 0, &mut found, diagnostics);

        info!(count = found.len(), "Repository scan complete");
        Ok(found)
    }

    fn scan(
        &self,
        dir: &Path,
        relative: &str,
        depth: usize,
        found: &mut Vec<Repository>,
        diagnostics: &mut Diagnostics,
    ) {
        if depth >= self.max_depth {
            return;
        }

        let entries = match fs::read_dir(dir) {
            Ok(entries) => entries,
            Err(e) => {
                warn!(dir = %dir.display(), error = %e, "Cannot read directory");
                diagnostics.push(
                    DiagnosticKind::UnreadableDirectory,
                    dir.display().to_string(),
                    e.to_string(),
                );
                return;
            }
        };

        let mut children: Vec<(String, PathBuf)> = entries
            .filter_map(Result::ok)
            .map(|entry| entry.path())
            .filter(|path| path.is_dir())
            .filter_map(|path| {
                let name = path.file_name()?.to_string_lossy().into_owned();
                Some((name, path))
            })
            .collect();
        children.sort();

        for (name, path) in children {
            if self.is_excluded(&name) {
                diagnostics.push(
                    DiagnosticKind::ExcludedDirectory,
                    path.display().to_string(),
                    "excluded by name",
                );
                continue;
            }

            let child_relative = if relative.is_empty() {
                name.clone()
            } else {
                format!("{relative}/{name}")
            };

            if self.qualifies(&path, diagnostics) {
                found.push(self.describe(name, path.clone(), child_relative.clone(), false));
            }

            self.scan(&path, &child_relative, depth + 1, found, diagnostics);
        }
    }

    /// Whether `dir` is the top of its own work tree
    fn qualifies(&self, dir: &Path, diagnostics: &mut Diagnostics) -> bool {
        match self.executor.probe(dir) {
            Ok(Some(top)) => same_dir(&top, dir),
            Ok(None) => false,
            Err(e) => {
                warn!(dir = %dir.display(), error = %e, "Repository probe failed");
                diagnostics.push(
                    DiagnosticKind::ProbeFailed,
                    dir.display().to_string(),
                    e.to_string(),
                );
                false
            }
        }
    }

    fn describe(&self, name: String, path: PathBuf, relative: String, primary: bool) -> Repository {
        let branch = self.executor.current_branch(&path);
        debug!(repo = %path.display(), branch = ?branch, "Found repository");
        Repository::new(name, path, relative, primary).with_branch(branch)
    }
}

fn same_dir(a: &Path, b: &Path) -> bool {
    match (a.canonicalize(), b.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => a == b,
    }
}
