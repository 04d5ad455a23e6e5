// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Error types for gitledger-git

use std::time::Duration;

use thiserror::Error;

/// Errors raised at the subprocess boundary
#[derive(Debug, Error)]
pub enum ProcessError {
    /// The process could not be started (missing binary, bad working directory, ...)
    #[error("Failed to launch `{program}`: {source}")]
    LaunchFailed {
        /// Program that was being launched
        program: String,
        /// Underlying OS error
        #[source]
        source: std::io::Error,
    },

    /// The process did not exit before its deadline and was killed
    #[error("`{program}` timed out after {}s", timeout.as_secs_f64())]
    TimedOut {
        /// Program that was killed
        program: String,
        /// The deadline that was exceeded
        timeout: Duration,
    },

    /// The process exited with a non-zero status
    #[error("`{program}` exited with code {code}: {}", stderr.trim())]
    NonZeroExit {
        /// Program that failed
        program: String,
        /// Exit code (-1 when terminated by a signal)
        code: i32,
        /// Captured standard error, for diagnostics
        stderr: String,
    },
}

/// Errors raised by version-control operations
#[derive(Debug, Error)]
pub enum VcsError {
    /// A VCS command failed; `context` says which operation
    #[error("{context}: {source}")]
    Command {
        /// Human-readable description of the failed operation
        context: String,
        /// The subprocess failure
        #[source]
        source: ProcessError,
    },

    /// The directory cannot be used as a repository
    #[error("Invalid repository {path}: {reason}")]
    InvalidRepository {
        /// The offending path
        path: String,
        /// Why it was rejected
        reason: String,
    },

    /// The workspace root handed to discovery is unusable
    #[error("Invalid workspace root {path}: {reason}")]
    InvalidRoot {
        /// The offending path
        path: String,
        /// Why it was rejected
        reason: String,
    },
}

impl VcsError {
    /// Wrap a process failure with a description of the operation
    pub fn command(context: impl Into<String>, source: ProcessError) -> Self {
        Self::Command {
            context: context.into(),
            source,
        }
    }

    /// True when the failure came from a subprocess that exceeded its timeout
    #[must_use]
    pub fn is_timeout(&self) -> bool {
        matches!(
            self,
            Self::Command {
                source: ProcessError::TimedOut { .. },
                ..
            }
        )
    }
}
