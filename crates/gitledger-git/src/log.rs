// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Commit record parsing
//!
//! Record queries use two control characters as delimiters so that commit
//! subjects containing tabs, commas or pipes cannot be mistaken for field
//! boundaries: [`FIELD_SEPARATOR`] (unit separator) between the fields and
//! [`RECORD_SEPARATOR`] (record separator) around each record.
//!
//! Plain records: `hash US author US iso-date US subject RS`
//!
//! Records with numstat: `RS hash US author US iso-date US subject` followed
//! by the numstat lines for that commit.

use chrono::{DateTime, NaiveDate};
use tracing::debug;

use crate::commit::CommitRecord;
use crate::diagnostics::{DiagnosticKind, Diagnostics};
use crate::numstat::{NumstatLine, tokenize};

/// Separator between fields of one record (ASCII unit separator)
pub const FIELD_SEPARATOR: char = '\u{1f}';

/// Separator between records (ASCII record separator)
pub const RECORD_SEPARATOR: char = '\u{1e}';

const FIELD_COUNT: usize = 4;

/// Parse plain commit records, preserving their order
///
/// Records with the wrong number of fields or an unparseable date are
/// dropped and recorded in `diagnostics`.
pub fn parse_commit_records(text: &str, diagnostics: &mut Diagnostics) -> Vec<CommitRecord> {
    text.split(RECORD_SEPARATOR)
        .map(|chunk| chunk.trim_matches(|c: char| c == '\n' || c == '\r'))
        .filter(|chunk| !chunk.trim().is_empty())
        .filter_map(|chunk| parse_header(chunk, diagnostics))
        .collect()
}

/// Parse commit records that are each followed by numstat lines
///
/// Populates `files_changed` (distinct paths), `additions` and `deletions`
/// on every returned record. Malformed stat lines are skipped and reported.
pub fn parse_commit_records_with_stats(
    text: &str,
    diagnostics: &mut Diagnostics,
) -> Vec<CommitRecord> {
    let mut records = Vec::new();

    for chunk in text.split(RECORD_SEPARATOR) {
        if chunk.trim().is_empty() {
            continue;
        }
        let (header, body) = chunk.split_once('\n').unwrap_or((chunk, ""));
        let Some(record) = parse_header(header.trim_end_matches('\r'), diagnostics) else {
            continue;
        };

        let mut files = std::collections::HashSet::new();
        let (mut additions, mut deletions) = (0u64, 0u64);
        for line in tokenize(body) {
            match line {
                NumstatLine::File {
                    added,
                    removed,
                    path,
                } => {
                    additions = additions.saturating_add(added);
                    deletions = deletions.saturating_add(removed);
                    files.insert(path);
                }
                NumstatLine::Malformed(raw) | NumstatLine::Author(raw) => diagnostics.push(
                    DiagnosticKind::MalformedStatLine,
                    raw,
                    format!("unexpected line in stats of {}", record.short_hash),
                ),
            }
        }

        records.push(record.with_line_stats(files.len() as u64, additions, deletions));
    }

    records
}

fn parse_header(raw: &str, diagnostics: &mut Diagnostics) -> Option<CommitRecord> {
    let fields: Vec<&str> = raw.splitn(FIELD_COUNT, FIELD_SEPARATOR).collect();
    let [hash, author, date, subject] = fields.as_slice() else {
        diagnostics.push(
            DiagnosticKind::MalformedRecord,
            raw.replace(FIELD_SEPARATOR, "|"),
            format!("expected {FIELD_COUNT} fields, found {}", fields.len()),
        );
        return None;
    };

    let hash = hash.trim();
    if !CommitRecord::is_valid_short_hash(hash) {
        diagnostics.push(
            DiagnosticKind::MalformedRecord,
            hash,
            "field is not an abbreviated commit hash",
        );
        return None;
    }
    let Some(date) = parse_day(date) else {
        diagnostics.push(
            DiagnosticKind::UnparseableDate,
            hash,
            format!("cannot parse commit date {date:?}"),
        );
        return None;
    };

    debug!(hash, %date, "Parsed commit record");
    Some(CommitRecord::new(hash, author.trim(), date, subject.trim()))
}

/// Calendar day of an ISO-8601 timestamp, in the timestamp's own offset
fn parse_day(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.date_naive())
        .ok()
        .or_else(|| NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok())
}
