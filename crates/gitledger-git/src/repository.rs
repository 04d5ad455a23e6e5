// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Discovered repository descriptor

use std::hash::{Hash, Hasher};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// A repository found during workspace discovery
///
/// Identity is the absolute path: two descriptors with the same path compare
/// equal regardless of their other fields. The branch is the one observed at
/// discovery time and is not refreshed if HEAD moves afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Repository {
    /// Directory name
    pub name: String,
    /// Absolute path to the work tree
    pub path: PathBuf,
    /// Path relative to the scan root (`.` for the root itself)
    pub relative_path: String,
    /// Branch checked out at discovery time
    pub current_branch: Option<String>,
    /// Whether this is the scan root itself
    pub is_primary: bool,
}

impl Repository {
    /// Create a descriptor without branch information
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        path: impl Into<PathBuf>,
        relative_path: impl Into<String>,
        is_primary: bool,
    ) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            relative_path: relative_path.into(),
            current_branch: None,
            is_primary,
        }
    }

    /// Attach the branch observed at discovery
    #[must_use]
    pub fn with_branch(mut self, branch: Option<String>) -> Self {
        self.current_branch = branch;
        self
    }

    /// Absolute path to the work tree
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Branch name for display, or `-` when unknown
    #[must_use]
    pub fn branch_label(&self) -> &str {
        self.current_branch.as_deref().unwrap_or("-")
    }
}

impl PartialEq for Repository {
    fn eq(&self, other: &Self) -> bool {
        self.path == other.path
    }
}

impl Eq for Repository {}

impl Hash for Repository {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.path.hash(state);
    }
}
