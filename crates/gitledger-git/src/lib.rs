// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! gitledger-git: repository discovery and git queries for gitledger
//!
//! This library crate finds git repositories under a workspace root, runs
//! bounded-time git queries against them and parses the output into commit
//! records and per-author statistics.

#![warn(missing_docs)]

//! # Example
//!
//! ```no_run
//! use gitledger_git::prelude::*;
//!
//! let mut diagnostics = Diagnostics::new();
//! let finder = RepositoryFinder::default();
//! let repos = finder
//!     .find(std::path::Path::new("."), &mut diagnostics)
//!     .expect("scan workspace");
//!
//! let executor = GitExecutor::default();
//! for repo in &repos {
//!     let stats = executor
//!         .statistics(repo.path(), "HEAD", DateRange::unbounded(), &[], &mut diagnostics)
//!         .expect("collect statistics");
//!     for (author, s) in stats {
//!         println!("{}: {author} {} commits", repo.name, s.commit_count);
//!     }
//! }
//! ```

pub mod backend;
pub mod commit;
pub mod diagnostics;
pub mod error;
pub mod executor;
pub mod finder;
pub mod log;
pub mod numstat;
pub mod process;
pub mod repository;

pub use backend::{GitCli, LogFilter, VcsBackend};
pub use commit::{AuthorStatistics, CommitRecord, DateRange};
pub use diagnostics::{Diagnostic, DiagnosticKind, Diagnostics};
pub use error::{ProcessError, VcsError};
pub use executor::{GitExecutor, RepoScope};
pub use finder::RepositoryFinder;
pub use process::{ProcessOutput, ProcessRunner};
pub use repository::Repository;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::backend::{GitCli, VcsBackend};
    pub use crate::commit::{AuthorStatistics, CommitRecord, DateRange};
    pub use crate::diagnostics::{DiagnosticKind, Diagnostics};
    pub use crate::error::{ProcessError, VcsError};
    pub use crate::executor::GitExecutor;
    pub use crate::finder::RepositoryFinder;
    pub use crate::repository::Repository;
}
