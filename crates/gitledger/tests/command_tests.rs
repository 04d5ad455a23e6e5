// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Subcommand execution tests against real git repositories
//!
//! These tests return early when git is not installed.


use chrono::NaiveDate;
use clap::Parser;
use gitledger::commands::Session;
use gitledger::config::Config;
use similar_asserts::assert_eq;
use test_utils::{TestGitRepo, git_available};

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 1, 15).expect("valid date")
}

/// `alpha` (Alice x2, Bob x1) and `beta` (Bob x1) under one root
fn workspace() -> tempfile::TempDir {
    let root = tempfile::tempdir().expect("temp dir");

    let alpha = TestGitRepo::init(root.path().join("alpha"));
    alpha.change("Alice", "2026-01-05", "a.txt", "1\n2\n", "feat: alpha one");
    alpha.change("Bob", "2026-01-06", "b.txt", "1\n", "feat: alpha bob");
    alpha.change("Alice", "2026-01-10", "a.txt", "1\n2\n3\n", "feat: alpha two");

    let beta = TestGitRepo::init(root.path().join("beta"));
    beta.change("Bob", "2026-01-09", "c.txt", "c\n", "fix: beta");

    root
}

fn run(root: &std::path::Path, args: &[&str]) -> String {
    let mut argv = vec!["gitledger", "-w", root.to_str().expect("utf-8 path")];
    argv.extend_from_slice(args);
    let config = Config::try_parse_from(argv).expect("parse should succeed");
    config.validate().expect("valid config");

    let mut out = Vec::new();
    Session::new(config, today())
        .expect("session")
        .execute(&mut out)
        .expect("command succeeds");
    String::from_utf8(out).expect("utf-8 output")
}

#[test]
fn test_repos_lists_discovered_repositories() {
    if !git_available() {
        return;
    }
    let root = workspace();
    assert_eq!(
        run(root.path(), &["repos"]),
        "  alpha  alpha  main\n  beta   beta   main\n"
    );
}

#[test]
fn test_default_command_is_repos() {
    if !git_available() {
        return;
    }
    let root = workspace();
    assert_eq!(run(root.path(), &[]), run(root.path(), &["repos"]));
}

#[test]
fn test_authors_across_workspace() {
    if !git_available() {
        return;
    }
    let root = workspace();
    assert_eq!(run(root.path(), &["authors"]), "Alice\nBob\n");
}

#[test]
fn test_branches_for_one_repository() {
    if !git_available() {
        return;
    }
    let root = workspace();
    let alpha = root.path().join("alpha");
    assert_eq!(
        run(root.path(), &["branches", "--repo", alpha.to_str().expect("utf-8")]),
        "main\n"
    );
}

#[test]
fn test_stats_table_sums_repositories() {
    if !git_available() {
        return;
    }
    let root = workspace();
    let table = run(
        root.path(),
        &["stats", "--since", "2026-01-01", "--until", "2026-01-31"],
    );
    assert_eq!(
        table,
        "Author  Commits  Added  Removed  Files\n\
         ------  -------  -----  -------  -----\n\
         Alice         2     +3       -0      2\n\
         Bob           2     +2       -0      2\n"
    );
}

#[test]
fn test_stats_json_for_one_repository() {
    if !git_available() {
        return;
    }
    let root = workspace();
    let beta = root.path().join("beta");
    let out = run(
        root.path(),
        &["stats", "--repo", beta.to_str().expect("utf-8"), "--json"],
    );
    let json: serde_json::Value = serde_json::from_str(&out).expect("json output");
    assert_eq!(json[0]["author"], "Bob");
    assert_eq!(json[0]["commit_count"], 1);
    assert_eq!(json.as_array().map(Vec::len), Some(1));
}

#[test]
fn test_report_markdown_with_preset() {
    if !git_available() {
        return;
    }
    let root = workspace();
    let md = run(
        root.path(),
        &["report", "--author", "Alice", "--range", "last-7-days"],
    );
    assert!(md.starts_with(
        "# Git Commit Report\n\n**Author:** Alice\n**Date range:** 2026-01-08 ~ 2026-01-15\n\n## Repository: alpha\n- `"
    ));
    assert!(md.contains("` - 2026-01-10 : feat: alpha two\n"));
    assert!(!md.contains("alpha one"));
    assert!(md.ends_with("- Repositories: 1 / 2\n- Total commits: 1\n"));
}

#[test]
fn test_report_plaintext_with_stats() {
    if !git_available() {
        return;
    }
    let root = workspace();
    let text = run(
        root.path(),
        &[
            "report",
            "-a",
            "Bob",
            "--since",
            "2026-01-01",
            "--format",
            "plaintext",
            "--with-stats",
        ],
    );
    assert!(text.starts_with("Git Commit Report\n"));
    assert!(text.contains("Since: 2026-01-01\n"));
    assert!(text.contains("Repository: alpha\n"));
    assert!(text.contains("Repository: beta\n"));
    assert!(text.contains("feat: alpha bob (+1 -0, 1 file)\n"));
    assert!(text.ends_with("  Repositories: 2 / 2\n  Total commits: 2\n  Files changed: 2\n  Lines: +2 -0\n"));
}

#[test]
fn test_invalid_repo_path_is_an_error() {
    let root = tempfile::tempdir().expect("temp dir");
    let config = Config::try_parse_from([
        "gitledger",
        "-w",
        root.path().to_str().expect("utf-8"),
        "branches",
        "--repo",
        "/definitely/not/here/12345",
    ])
    .expect("parse should succeed");

    let mut out = Vec::new();
    let err = Session::new(config, today())
        .expect("session")
        .execute(&mut out)
        .expect_err("missing repository");
    assert!(err.to_string().contains("Cannot open repository"));
}

#[test]
fn test_empty_workspace() {
    let root = tempfile::tempdir().expect("temp dir");
    let out = run(root.path(), &["repos"]);
    assert!(out.starts_with("No repositories found under "));
}
