//! Integration tests for gitledger-git
//!
//! These tests build throwaway repositories with the real `git` executable
//! and check discovery, queries and parsing end to end. They return early
//! when git is not installed.


use chrono::NaiveDate;
use gitledger_git::prelude::*;
use gitledger_git::CommitRecord;
use similar_asserts::assert_eq;
use test_utils::{TestGitRepo, git_available};

fn day(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
}

fn january() -> DateRange {
    DateRange::between(day(2026, 1, 1), day(2026, 1, 31))
}

/// Alice: 2 commits in January and 1 in March; Bob: 1 commit in January
fn sample_repo(path: impl Into<std::path::PathBuf>) -> TestGitRepo {
    let repo = TestGitRepo::init(path);
    repo.change("Alice", "2026-01-05", "a.txt", "1\n2\n3\n", "feat: add a");
    repo.change("Bob", "2026-01-12", "b.txt", "x\n", "feat: add b");
    repo.change("Alice", "2026-01-20", "a.txt", "1\n2\n3\n4\n", "feat: extend a");
    repo.change("Alice", "2026-03-01", "c.txt", "late\n", "chore: later");
    repo
}

#[test]
fn test_finder_discovers_real_repositories() {
    if !git_available() {
        return;
    }
    let ws = tempfile::tempdir().expect("temp dir");
    sample_repo(ws.path().join("alpha"));
    TestGitRepo::init(ws.path().join("beta"));
    TestGitRepo::init(ws.path().join("node_modules").join("dep"));
    std::fs::create_dir_all(ws.path().join("notes")).expect("mkdir");

    let mut diags = Diagnostics::new();
    let repos = RepositoryFinder::default()
        .find(ws.path(), &mut diags)
        .expect("scan");

    let names: Vec<&str> = repos.iter().map(|r| r.relative_path.as_str()).collect();
    assert_eq!(names, vec!["alpha", "beta"]);
    assert!(repos.iter().all(|r| !r.is_primary));
    assert_eq!(repos[0].current_branch.as_deref(), Some("main"));
    assert_eq!(diags.count(DiagnosticKind::ExcludedDirectory), 1);
}

#[test]
fn test_root_repository_is_primary() {
    if !git_available() {
        return;
    }
    let ws = tempfile::tempdir().expect("temp dir");
    sample_repo(ws.path());
    std::fs::create_dir_all(ws.path().join("plain")).expect("mkdir");

    let mut diags = Diagnostics::new();
    let repos = RepositoryFinder::default()
        .find(ws.path(), &mut diags)
        .expect("scan");

    assert_eq!(repos.len(), 1);
    assert!(repos[0].is_primary);
    assert_eq!(repos[0].relative_path, ".");
}

#[test]
fn test_statistics_from_real_numstat() {
    if !git_available() {
        return;
    }
    let ws = tempfile::tempdir().expect("temp dir");
    let repo = sample_repo(ws.path().join("alpha"));

    let executor = GitExecutor::default();
    let mut diags = Diagnostics::new();
    let stats = executor
        .statistics(repo.path(), "main", january(), &[], &mut diags)
        .expect("statistics");

    assert!(diags.is_empty(), "unexpected diagnostics: {diags:?}");
    assert_eq!(stats.len(), 2);

    let alice = &stats["Alice"];
    assert_eq!(alice.commit_count, 2);
    assert_eq!(alice.lines_added, 4);
    assert_eq!(alice.lines_removed, 0);
    assert_eq!(alice.files_modified, 2);

    let bob = &stats["Bob"];
    assert_eq!(bob.commit_count, 1);
    assert_eq!(bob.lines_added, 1);
    assert_eq!(bob.files_modified, 1);
}

#[test]
fn test_statistics_author_filter() {
    if !git_available() {
        return;
    }
    let ws = tempfile::tempdir().expect("temp dir");
    let repo = sample_repo(ws.path().join("alpha"));

    let mut diags = Diagnostics::new();
    let stats = GitExecutor::default()
        .statistics(
            repo.path(),
            "HEAD",
            DateRange::unbounded(),
            &["Bob".to_string()],
            &mut diags,
        )
        .expect("statistics");

    assert_eq!(stats.keys().collect::<Vec<_>>(), vec!["Bob"]);
}

#[test]
fn test_authors_respect_range() {
    if !git_available() {
        return;
    }
    let ws = tempfile::tempdir().expect("temp dir");
    let repo = sample_repo(ws.path().join("alpha"));
    let executor = GitExecutor::default();

    let all = executor
        .authors(repo.path(), "main", DateRange::unbounded())
        .expect("authors");
    assert_eq!(all.into_iter().collect::<Vec<_>>(), vec!["Alice", "Bob"]);

    let march = DateRange::between(day(2026, 2, 20), day(2026, 3, 31));
    let late = executor
        .authors(repo.path(), "main", march)
        .expect("authors");
    assert_eq!(late.into_iter().collect::<Vec<_>>(), vec!["Alice"]);
}

#[test]
fn test_commit_logs_newest_first() {
    if !git_available() {
        return;
    }
    let ws = tempfile::tempdir().expect("temp dir");
    let repo = sample_repo(ws.path().join("alpha"));

    let mut diags = Diagnostics::new();
    let logs = GitExecutor::default()
        .commit_logs(repo.path(), "main", Some("Alice"), january(), &mut diags)
        .expect("logs");

    let subjects: Vec<&str> = logs.iter().map(|c| c.subject.as_str()).collect();
    assert_eq!(subjects, vec!["feat: extend a", "feat: add a"]);
    assert_eq!(logs[0].date, day(2026, 1, 20));
    assert!(logs.iter().all(|c| CommitRecord::is_valid_short_hash(&c.short_hash)));
    assert!(logs.iter().all(|c| !c.has_line_stats()));
}

#[test]
fn test_commit_logs_with_stats() {
    if !git_available() {
        return;
    }
    let ws = tempfile::tempdir().expect("temp dir");
    let repo = sample_repo(ws.path().join("alpha"));

    let mut diags = Diagnostics::new();
    let logs = GitExecutor::default()
        .commit_logs_with_stats(repo.path(), "main", Some("Alice"), january(), &mut diags)
        .expect("logs");

    assert_eq!(logs.len(), 2);
    assert_eq!(logs[0].files_changed, Some(1));
    assert_eq!(logs[0].additions, Some(1));
    assert_eq!(logs[1].additions, Some(3));
    assert_eq!(logs[1].deletions, Some(0));
}

#[test]
fn test_commit_logs_match_author_name_exactly() {
    if !git_available() {
        return;
    }
    let ws = tempfile::tempdir().expect("temp dir");
    let repo = TestGitRepo::init(ws.path().join("alpha"));
    repo.change("dependabot[bot]", "2026-01-03", "Cargo.lock", "1\n", "chore: bump deps");
    repo.change("Alan", "2026-01-04", "a.txt", "a\n", "feat: alan");
    repo.change("Al", "2026-01-05", "b.txt", "b\n", "feat: al");

    let exec = GitExecutor::default();
    let mut diags = Diagnostics::new();
    let bot = exec
        .commit_logs(repo.path(), "main", Some("dependabot[bot]"), january(), &mut diags)
        .expect("logs");
    assert_eq!(bot.len(), 1);
    assert_eq!(bot[0].subject, "chore: bump deps");

    let al = exec
        .commit_logs_with_stats(repo.path(), "main", Some("Al"), january(), &mut diags)
        .expect("logs");
    let authors: Vec<&str> = al.iter().map(|c| c.author.as_str()).collect();
    assert_eq!(authors, vec!["Al"]);
}

#[test]
fn test_subject_with_delimiter_lookalikes() {
    if !git_available() {
        return;
    }
    let ws = tempfile::tempdir().expect("temp dir");
    let repo = TestGitRepo::init(ws.path().join("alpha"));
    repo.change("Alice", "2026-01-05", "a.txt", "a\n", "fix:\ttabs | pipes, commas");

    let mut diags = Diagnostics::new();
    let logs = GitExecutor::default()
        .commit_logs(repo.path(), "HEAD", None, DateRange::unbounded(), &mut diags)
        .expect("logs");
    assert_eq!(logs[0].subject, "fix:\ttabs | pipes, commas");
}

#[test]
fn test_merge_commits_excluded_from_logs() {
    if !git_available() {
        return;
    }
    let ws = tempfile::tempdir().expect("temp dir");
    let repo = TestGitRepo::init(ws.path().join("alpha"));
    repo.change("Alice", "2026-01-05", "a.txt", "a\n", "base");
    repo.git(&["checkout", "-q", "-b", "feature"]);
    repo.change("Carol", "2026-01-06", "f.txt", "f\n", "feature work");
    repo.git(&["checkout", "-q", "main"]);
    repo.change("Alice", "2026-01-07", "b.txt", "b\n", "main work");
    repo.git(&["merge", "-q", "--no-ff", "-m", "Merge feature", "feature"]);

    let mut diags = Diagnostics::new();
    let logs = GitExecutor::default()
        .commit_logs(repo.path(), "main", None, DateRange::unbounded(), &mut diags)
        .expect("logs");

    assert_eq!(logs.len(), 3);
    assert!(logs.iter().all(|c| c.subject != "Merge feature"));
}

#[test]
fn test_branches_and_detached_head() {
    if !git_available() {
        return;
    }
    let ws = tempfile::tempdir().expect("temp dir");
    let repo = sample_repo(ws.path().join("alpha"));
    repo.git(&["branch", "feature"]);

    let executor = GitExecutor::default();
    assert_eq!(
        executor.branches(repo.path()).expect("branches"),
        vec!["feature", "main"]
    );
    assert_eq!(executor.current_branch(repo.path()).as_deref(), Some("main"));

    repo.git(&["checkout", "-q", "--detach"]);
    assert_eq!(executor.current_branch(repo.path()), None);
    assert_eq!(
        executor.branches(repo.path()).expect("branches"),
        vec!["feature", "main"]
    );
}

#[test]
fn test_scope_accepts_subdirectory_and_rejects_plain_dir() {
    if !git_available() {
        return;
    }
    let ws = tempfile::tempdir().expect("temp dir");
    let repo = TestGitRepo::init(ws.path().join("alpha"));
    repo.change("Alice", "2026-01-05", "sub/a.txt", "a\n", "nested");

    let executor = GitExecutor::default();
    let sub = repo.path().join("sub");
    let scope = executor.at(&sub).expect("inside a work tree");
    assert_eq!(scope.current_branch().as_deref(), Some("main"));

    let plain = ws.path().join("plain");
    std::fs::create_dir_all(&plain).expect("mkdir");
    assert!(matches!(
        executor.at(&plain),
        Err(VcsError::InvalidRepository { .. })
    ));
}

#[test]
fn test_unknown_branch_is_command_error() {
    if !git_available() {
        return;
    }
    let ws = tempfile::tempdir().expect("temp dir");
    let repo = sample_repo(ws.path().join("alpha"));

    let err = GitExecutor::default()
        .authors(repo.path(), "no-such-branch", DateRange::unbounded())
        .expect_err("unknown revision");
    assert!(matches!(err, VcsError::Command { .. }));
    assert!(!err.is_timeout());
}

#[test]
fn test_missing_git_program_is_recorded_per_directory() {
    let ws = tempfile::tempdir().expect("temp dir");
    std::fs::create_dir_all(ws.path().join("one")).expect("mkdir");

    let backend = GitCli::new().program("gitledger-no-such-git");
    let finder = RepositoryFinder::new(GitExecutor::new(backend));
    let mut diags = Diagnostics::new();
    let repos = finder.find(ws.path(), &mut diags).expect("scan completes");

    assert!(repos.is_empty());
    assert_eq!(diags.count(DiagnosticKind::ProbeFailed), 2);
}
