//! Configuration for the gitledger command line
//!
//! This module provides the command-line options, subcommands and date range
//! presets, plus validation and logging level selection.

use std::path::PathBuf;
use std::time::Duration;

use chrono::{Months, NaiveDate};
use clap::{Args, Parser, Subcommand, ValueEnum};
use gitledger_git::DateRange;
use gitledger_git::finder::DEFAULT_MAX_DEPTH;
use gitledger_git::process::{DEFAULT_PROBE_TIMEOUT, DEFAULT_QUERY_TIMEOUT};
use gitledger_report::ReportFormat;

/// gitledger - commit reports and author statistics across a workspace of git repositories
#[derive(Parser, Debug, Clone)]
#[command(name = "gitledger")]
#[command(version, about, long_about = None)]
pub struct Config {
    /// Subcommand to run (defaults to listing repositories)
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Workspace root to scan for repositories
    ///
    /// Defaults to the current working directory.
    #[arg(short, long, global = true, env = "GITLEDGER_WORKSPACE")]
    pub workspace: Option<PathBuf>,

    /// Directory levels scanned below the workspace root
    #[arg(short = 'd', long, global = true, default_value_t = DEFAULT_MAX_DEPTH)]
    pub max_depth: usize,

    /// Timeout in seconds for log and statistics queries
    #[arg(long, global = true, default_value_t = DEFAULT_QUERY_TIMEOUT.as_secs())]
    pub timeout: u64,

    /// Timeout in seconds for repository probes and HEAD lookups
    #[arg(long, global = true, default_value_t = DEFAULT_PROBE_TIMEOUT.as_secs())]
    pub probe_timeout: u64,

    /// Additional directory names to skip while scanning (repeatable)
    #[arg(long = "exclude", global = true, value_name = "NAME")]
    pub excluded: Vec<String>,

    /// git executable to run
    #[arg(long, global = true, env = "GITLEDGER_GIT", default_value = "git")]
    pub git: String,

    /// Enable verbose logging (debug level)
    ///
    /// Logs are written to stderr so that reports on stdout stay clean.
    #[arg(short, long, global = true, default_value = "false")]
    pub verbose: bool,

    /// Quiet mode - suppress info-level logs
    ///
    /// Only errors and warnings will be logged.
    #[arg(short, long, global = true, default_value = "false")]
    pub quiet: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            command: None,
            workspace: None,
            max_depth: DEFAULT_MAX_DEPTH,
            timeout: DEFAULT_QUERY_TIMEOUT.as_secs(),
            probe_timeout: DEFAULT_PROBE_TIMEOUT.as_secs(),
            excluded: Vec::new(),
            git: "git".to_string(),
            verbose: false,
            quiet: false,
        }
    }
}

/// Available subcommands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// List repositories found under the workspace
    Repos,

    /// List local and remote branches
    Branches {
        /// Repository to inspect (defaults to every discovered repository)
        #[arg(long)]
        repo: Option<PathBuf>,
    },

    /// List distinct commit authors across the workspace
    Authors {
        /// Revision to walk (defaults to each repository's HEAD)
        #[arg(long)]
        branch: Option<String>,

        #[command(flatten)]
        range: RangeArgs,
    },

    /// Per-author commit, line and file statistics
    ///
    /// With --repo, statistics for that repository only; otherwise summed
    /// across every discovered repository.
    Stats {
        /// Repository to inspect (defaults to every discovered repository)
        #[arg(long)]
        repo: Option<PathBuf>,

        /// Revision to walk (defaults to each repository's HEAD)
        #[arg(long)]
        branch: Option<String>,

        #[command(flatten)]
        range: RangeArgs,

        /// Only count these authors (repeatable)
        #[arg(long = "author", value_name = "NAME")]
        authors: Vec<String>,

        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// One author's commits across every discovered repository
    ///
    /// Example:
    ///   gitledger -w ~/work report --author "Alice" --range last-7-days
    Report {
        /// Author name, as recorded in commits
        #[arg(short, long)]
        author: String,

        #[command(flatten)]
        range: RangeArgs,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Markdown)]
        format: OutputFormat,

        /// Include per-commit file and line counts
        #[arg(long)]
        with_stats: bool,
    },
}

/// Date range options shared by several subcommands
#[derive(Args, Debug, Clone, Default, PartialEq, Eq)]
pub struct RangeArgs {
    /// First day to include (YYYY-MM-DD)
    #[arg(long)]
    pub since: Option<NaiveDate>,

    /// Last day to include (YYYY-MM-DD)
    #[arg(long)]
    pub until: Option<NaiveDate>,

    /// Preset window ending today; --since/--until override its ends
    #[arg(long = "range", value_enum)]
    pub preset: Option<RangePreset>,
}

impl RangeArgs {
    /// Resolve against `today`
    #[must_use]
    pub fn resolve(&self, today: NaiveDate) -> DateRange {
        let base = self
            .preset
            .map_or_else(DateRange::unbounded, |p| p.range(today));
        DateRange::new(self.since.or(base.start), self.until.or(base.end))
    }
}

/// Preset date windows, each ending today
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangePreset {
    /// The last 7 days
    #[value(name = "last-7-days")]
    Last7Days,
    /// The last 30 days
    #[value(name = "last-30-days")]
    Last30Days,
    /// The last year
    #[value(name = "last-year")]
    LastYear,
    /// The last 5 years
    #[value(name = "last-5-years")]
    Last5Years,
}

impl RangePreset {
    /// Window ending on `today`
    #[must_use]
    pub fn range(self, today: NaiveDate) -> DateRange {
        let start = match self {
            Self::Last7Days => today.checked_sub_days(chrono::Days::new(7)),
            Self::Last30Days => today.checked_sub_days(chrono::Days::new(30)),
            Self::LastYear => today.checked_sub_months(Months::new(12)),
            Self::Last5Years => today.checked_sub_months(Months::new(60)),
        };
        DateRange::new(start, Some(today))
    }
}

/// Report output formats accepted on the command line
#[derive(ValueEnum, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Markdown
    #[default]
    Markdown,
    /// Plain text
    #[value(name = "plaintext")]
    PlainText,
    /// JSON
    Json,
}

impl From<OutputFormat> for ReportFormat {
    fn from(format: OutputFormat) -> Self {
        match format {
            OutputFormat::Markdown => Self::Markdown,
            OutputFormat::PlainText => Self::PlainText,
            OutputFormat::Json => Self::Json,
        }
    }
}

impl Config {
    /// Get the workspace path, using current directory as default
    ///
    /// Returns `None` if no workspace is specified and the current
    /// directory cannot be determined.
    #[must_use]
    pub fn workspace_path(&self) -> Option<PathBuf> {
        self.workspace
            .clone()
            .or_else(|| std::env::current_dir().ok())
    }

    /// Timeout for log and statistics queries
    #[must_use]
    pub fn query_timeout(&self) -> Duration {
        Duration::from_secs(self.timeout)
    }

    /// Timeout for probes and HEAD lookups
    #[must_use]
    pub fn probe_timeout(&self) -> Duration {
        Duration::from_secs(self.probe_timeout)
    }

    /// Validate the configuration
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The workspace path is specified but doesn't exist or isn't a directory
    /// - Either timeout is zero
    /// - A subcommand's --since is after its --until
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(ref workspace) = self.workspace {
            if !workspace.exists() {
                return Err(ConfigError::WorkspaceNotFound(workspace.clone()));
            }
            if !workspace.is_dir() {
                return Err(ConfigError::WorkspaceNotDirectory(workspace.clone()));
            }
        }

        if self.timeout == 0 {
            return Err(ConfigError::ZeroTimeout("--timeout"));
        }
        if self.probe_timeout == 0 {
            return Err(ConfigError::ZeroTimeout("--probe-timeout"));
        }

        let range = match &self.command {
            Some(Command::Authors { range, .. })
            | Some(Command::Stats { range, .. })
            | Some(Command::Report { range, .. }) => Some(range),
            _ => None,
        };
        if let Some(RangeArgs {
            since: Some(since),
            until: Some(until),
            ..
        }) = range
            && since > until
        {
            return Err(ConfigError::InvertedRange(*since, *until));
        }

        Ok(())
    }

    /// Get the log level based on verbose/quiet flags
    #[must_use]
    pub fn log_level(&self) -> tracing::Level {
        if self.verbose {
            tracing::Level::DEBUG
        } else if self.quiet {
            tracing::Level::WARN
        } else {
            tracing::Level::INFO
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Workspace path not found
    #[error("Workspace path not found: {0}")]
    WorkspaceNotFound(PathBuf),

    /// Workspace path is not a directory
    #[error("Workspace path is not a directory: {0}")]
    WorkspaceNotDirectory(PathBuf),

    /// A timeout option was zero
    #[error("{0} must be at least 1 second")]
    ZeroTimeout(&'static str),

    /// --since is after --until
    #[error("--since {0} is after --until {1}")]
    InvertedRange(NaiveDate, NaiveDate),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(config.command.is_none());
        assert!(config.workspace.is_none());
        assert_eq!(config.max_depth, 1);
        assert_eq!(config.timeout, 30);
        assert_eq!(config.probe_timeout, 10);
        assert_eq!(config.git, "git");
        assert!(!config.verbose);
        assert!(!config.quiet);
    }

    #[test]
    fn test_workspace_path_default() {
        let config = Config::default();
        // Should fallback to current directory
        assert!(config.workspace_path().is_some());
    }

    #[test]
    fn test_log_level_default() {
        let config = Config::default();
        assert_eq!(config.log_level(), tracing::Level::INFO);
    }

    #[test]
    fn test_log_level_verbose() {
        let config = Config {
            verbose: true,
            ..Default::default()
        };
        assert_eq!(config.log_level(), tracing::Level::DEBUG);
    }

    #[test]
    fn test_log_level_quiet() {
        let config = Config {
            quiet: true,
            ..Default::default()
        };
        assert_eq!(config.log_level(), tracing::Level::WARN);
    }

    #[test]
    fn test_validate_nonexistent_workspace() {
        let config = Config {
            workspace: Some(PathBuf::from("/nonexistent/path/12345")),
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::WorkspaceNotFound(_))
        ));
    }

    #[test]
    fn test_validate_zero_timeout() {
        let config = Config {
            timeout: 0,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::ZeroTimeout("--timeout"))
        ));
    }

    #[test]
    fn test_validate_inverted_range() {
        let config = Config {
            command: Some(Command::Report {
                author: "Alice".to_string(),
                range: RangeArgs {
                    since: Some(day(2026, 2, 1)),
                    until: Some(day(2026, 1, 1)),
                    preset: None,
                },
                format: OutputFormat::Markdown,
                with_stats: false,
            }),
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvertedRange(_, _))
        ));
    }

    #[test]
    fn test_presets_end_today() {
        let today = day(2026, 3, 31);
        assert_eq!(
            RangePreset::Last7Days.range(today),
            DateRange::between(day(2026, 3, 24), today)
        );
        assert_eq!(
            RangePreset::Last30Days.range(today),
            DateRange::between(day(2026, 3, 1), today)
        );
        assert_eq!(
            RangePreset::LastYear.range(today),
            DateRange::between(day(2025, 3, 31), today)
        );
        assert_eq!(
            RangePreset::Last5Years.range(day(2028, 2, 29)),
            DateRange::between(day(2023, 2, 28), day(2028, 2, 29))
        );
    }

    #[test]
    fn test_explicit_dates_override_preset() {
        let args = RangeArgs {
            since: Some(day(2026, 1, 1)),
            until: None,
            preset: Some(RangePreset::Last7Days),
        };
        assert_eq!(
            args.resolve(day(2026, 3, 31)),
            DateRange::between(day(2026, 1, 1), day(2026, 3, 31))
        );
        assert_eq!(RangeArgs::default().resolve(day(2026, 3, 31)), DateRange::unbounded());
    }

    #[test]
    fn test_parse_report_command() {
        let config = Config::try_parse_from([
            "gitledger",
            "report",
            "--author",
            "Alice",
            "--since",
            "2026-01-01",
            "--format",
            "plaintext",
            "--with-stats",
        ])
        .expect("parse should succeed");

        match config.command {
            Some(Command::Report {
                author,
                range,
                format,
                with_stats,
            }) => {
                assert_eq!(author, "Alice");
                assert_eq!(range.since, Some(day(2026, 1, 1)));
                assert_eq!(format, OutputFormat::PlainText);
                assert!(with_stats);
            }
            other => panic!("Expected report command, got {other:?}"),
        }
    }

    #[test]
    fn test_invalid_date_rejected_by_parser() {
        let result = Config::try_parse_from(["gitledger", "authors", "--since", "01/02/2026"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_global_options_after_subcommand() {
        let config = Config::try_parse_from(["gitledger", "repos", "-d", "3", "--exclude", "vendor"])
            .expect("parse should succeed");
        assert_eq!(config.command, Some(Command::Repos));
        assert_eq!(config.max_depth, 3);
        assert_eq!(config.excluded, vec!["vendor"]);
    }

    #[test]
    fn verify_cli() {
        use clap::CommandFactory;
        Config::command().debug_assert();
    }
}
