// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! gitledger-report: cross-repository commit reports
//!
//! Collects one author's commits from every discovered repository, sums the
//! totals and renders the result as Markdown, plain text or JSON.

#![warn(missing_docs)]

//! # Example
//!
//! ```no_run
//! use gitledger_git::prelude::*;
//! use gitledger_report::{CommitReportBuilder, export_as_markdown};
//!
//! let mut diagnostics = Diagnostics::new();
//! let repos = RepositoryFinder::default()
//!     .find(std::path::Path::new("."), &mut diagnostics)
//!     .expect("scan workspace");
//!
//! let report = CommitReportBuilder::default()
//!     .generate(&repos, "Alice", DateRange::unbounded(), &mut diagnostics)
//!     .expect("generate report");
//! print!("{}", export_as_markdown(&report));
//! ```

pub mod builder;
pub mod error;
pub mod render;
pub mod report;

pub use builder::{CommitReportBuilder, ReportOptions};
pub use error::ReportError;
pub use render::{
    ReportFormat, export_as_json, export_as_markdown, export_as_plain_text,
    render_statistics_table,
};
pub use report::{Report, ReportTotals, RepositoryCommits};
