// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Error types for gitledger-report

use chrono::NaiveDate;
use thiserror::Error;

/// Errors raised while building or rendering a report
#[derive(Debug, Error)]
pub enum ReportError {
    /// The start date is after the end date
    #[error("Invalid date range: {start} is after {end}")]
    InvalidDateRange {
        /// Requested start date
        start: NaiveDate,
        /// Requested end date
        end: NaiveDate,
    },

    /// JSON serialisation failed
    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_range_display() {
        let err = ReportError::InvalidDateRange {
            start: NaiveDate::from_ymd_opt(2026, 2, 1).expect("valid date"),
            end: NaiveDate::from_ymd_opt(2026, 1, 1).expect("valid date"),
        };
        assert_eq!(
            err.to_string(),
            "Invalid date range: 2026-02-01 is after 2026-01-01"
        );
    }
}
