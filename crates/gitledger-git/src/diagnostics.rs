// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Non-fatal warnings collected during discovery, parsing and reporting
//!
//! Best-effort operations never fail on a bad directory, a malformed line or
//! a broken repository; they record what they skipped here instead, so that
//! callers (and tests) can see exactly what was left out.

use serde::Serialize;
use tracing::debug;

/// Category of a skipped item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticKind {
    /// Directory skipped because its name is on the exclusion list or hidden
    ExcludedDirectory,
    /// Directory whose entries could not be listed
    UnreadableDirectory,
    /// Repository probe failed for a reason other than "not a repository"
    ProbeFailed,
    /// Neither branch lookup strategy produced a branch name
    BranchUnresolved,
    /// Numstat line with a non-numeric or missing field
    MalformedStatLine,
    /// Numstat line that appeared before any author header
    OrphanStatLine,
    /// Commit record with the wrong number of fields
    MalformedRecord,
    /// Commit record whose date could not be parsed
    UnparseableDate,
    /// Repository left out of a report because a query against it failed
    RepositorySkipped,
}

/// A single non-fatal warning
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    /// What kind of item was skipped
    pub kind: DiagnosticKind,
    /// The item itself: a path, a raw line, a repository name
    pub subject: String,
    /// Why it was skipped
    pub message: String,
}

/// Sink for [`Diagnostic`]s
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Diagnostics {
    entries: Vec<Diagnostic>,
}

impl Diagnostics {
    /// Create an empty sink
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a warning
    pub fn push(
        &mut self,
        kind: DiagnosticKind,
        subject: impl Into<String>,
        message: impl Into<String>,
    ) {
        let diagnostic = Diagnostic {
            kind,
            subject: subject.into(),
            message: message.into(),
        };
        debug!(
            kind = ?diagnostic.kind,
            subject = %diagnostic.subject,
            "{}",
            diagnostic.message
        );
        self.entries.push(diagnostic);
    }

    /// All recorded warnings, in the order they were pushed
    #[must_use]
    pub fn entries(&self) -> &[Diagnostic] {
        &self.entries
    }

    /// Warnings of one kind
    pub fn of_kind(&self, kind: DiagnosticKind) -> impl Iterator<Item = &Diagnostic> {
        self.entries.iter().filter(move |d| d.kind == kind)
    }

    /// Number of warnings of one kind
    #[must_use]
    pub fn count(&self, kind: DiagnosticKind) -> usize {
        self.of_kind(kind).count()
    }

    /// Number of recorded warnings
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when nothing was skipped
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Move all warnings from `other` into this sink
    pub fn extend(&mut self, other: Diagnostics) {
        self.entries.extend(other.entries);
    }

    /// Consume the sink
    #[must_use]
    pub fn into_vec(self) -> Vec<Diagnostic> {
        self.entries
    }
}
