// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Subprocess execution with a hard wall-clock timeout
//!
//! [`ProcessRunner`] spawns a command in a working directory and drains its
//! stdout and stderr on helper threads. Waiting for the exit status and
//! collecting the output share one deadline. On Unix the child leads its own
//! process group, and a run that overruns the deadline kills the whole group,
//! so background descendants holding the pipes open are killed with it.

use std::io::Read;
use std::path::Path;
use std::process::{Child, Command, ExitStatus, Stdio};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::thread;
use std::time::{Duration, Instant};

use tracing::debug;

use crate::error::ProcessError;

/// Timeout for statistics-class queries (log, numstat, branch listing)
pub const DEFAULT_QUERY_TIMEOUT: Duration = Duration::from_secs(30);

/// Timeout for lightweight discovery probes
pub const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_secs(10);

const POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Captured result of a successful process run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessOutput {
    /// Standard output, lossily decoded as UTF-8
    pub stdout: String,
    /// Standard error, lossily decoded as UTF-8
    pub stderr: String,
    /// Exit code (always 0 for outputs returned by [`ProcessRunner::run`])
    pub exit_code: i32,
}

/// Runs external commands with a deadline
#[derive(Debug, Clone)]
pub struct ProcessRunner {
    timeout: Duration,
    envs: Vec<(String, String)>,
}

impl Default for ProcessRunner {
    fn default() -> Self {
        Self::new(DEFAULT_QUERY_TIMEOUT)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stream {
    Stdout,
    Stderr,
}

impl ProcessRunner {
    /// Create a runner with the given timeout
    #[must_use]
    pub fn new(timeout: Duration) -> Self {
        Self {
            timeout,
            envs: Vec::new(),
        }
    }

    /// Set an environment variable on every spawned process
    #[must_use]
    pub fn with_env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.envs.push((key.into(), value.into()));
        self
    }

    /// Run `command` (program followed by its arguments) in `working_dir`
    ///
    /// # Errors
    ///
    /// - `ProcessError::LaunchFailed` if the command is empty or cannot be spawned
    /// - `ProcessError::TimedOut` if it, or any descendant holding its output
    ///   pipes, runs longer than the configured timeout
    /// - `ProcessError::NonZeroExit` if it exits unsuccessfully
    pub fn run<S: AsRef<str>>(
        &self,
        working_dir: &Path,
        command: &[S],
    ) -> Result<ProcessOutput, ProcessError> {
        let Some((program, args)) = command.split_first() else {
            return Err(ProcessError::LaunchFailed {
                program: String::new(),
                source: std::io::Error::new(std::io::ErrorKind::InvalidInput, "empty command"),
            });
        };
        let program = program.as_ref();
        let deadline = Instant::now() + self.timeout;

        debug!(
            program,
            args = ?args.iter().map(AsRef::as_ref).collect::<Vec<&str>>(),
            cwd = %working_dir.display(),
            "Spawning process"
        );

        let mut cmd = Command::new(program);
        cmd.args(args.iter().map(AsRef::as_ref))
            .current_dir(working_dir)
            .envs(self.envs.iter().map(|(k, v)| (k.as_str(), v.as_str())))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        #[cfg(unix)]
        {
            use std::os::unix::process::CommandExt;
            cmd.process_group(0);
        }
        let mut child = cmd.spawn().map_err(|source| ProcessError::LaunchFailed {
            program: program.to_string(),
            source,
        })?;

        let (tx, rx) = mpsc::channel();
        let mut pending = 0;
        if let Some(pipe) = child.stdout.take() {
            drain(pipe, Stream::Stdout, tx.clone());
            pending += 1;
        }
        if let Some(pipe) = child.stderr.take() {
            drain(pipe, Stream::Stderr, tx);
            pending += 1;
        }

        let status = self.wait_until(program, &mut child, deadline)?;
        let (stdout, stderr) = self.collect_until(program, &mut child, &rx, pending, deadline)?;
        let code = status.code().unwrap_or(-1);

        if !status.success() {
            return Err(ProcessError::NonZeroExit {
                program: program.to_string(),
                code,
                stderr,
            });
        }

        Ok(ProcessOutput {
            stdout,
            stderr,
            exit_code: code,
        })
    }

    fn wait_until(
        &self,
        program: &str,
        child: &mut Child,
        deadline: Instant,
    ) -> Result<ExitStatus, ProcessError> {
        loop {
            match child.try_wait() {
                Ok(Some(status)) => return Ok(status),
                Ok(None) => {
                    let now = Instant::now();
                    if now >= deadline {
                        return Err(self.time_out(program, child));
                    }
                    thread::sleep(POLL_INTERVAL.min(deadline - now));
                }
                Err(source) => {
                    kill_process_tree(child);
                    return Err(ProcessError::LaunchFailed {
                        program: program.to_string(),
                        source,
                    });
                }
            }
        }
    }

    /// Wait for both pipes to close; a descendant holding them past the
    /// deadline times the run out.
    fn collect_until(
        &self,
        program: &str,
        child: &mut Child,
        rx: &Receiver<(Stream, Vec<u8>)>,
        mut pending: usize,
        deadline: Instant,
    ) -> Result<(String, String), ProcessError> {
        let (mut stdout, mut stderr) = (Vec::new(), Vec::new());
        while pending > 0 {
            let remaining = deadline.saturating_duration_since(Instant::now());
            match rx.recv_timeout(remaining) {
                Ok((Stream::Stdout, bytes)) => stdout = bytes,
                Ok((Stream::Stderr, bytes)) => stderr = bytes,
                Err(RecvTimeoutError::Timeout) => return Err(self.time_out(program, child)),
                Err(RecvTimeoutError::Disconnected) => break,
            }
            pending -= 1;
        }
        Ok((
            String::from_utf8_lossy(&stdout).into_owned(),
            String::from_utf8_lossy(&stderr).into_owned(),
        ))
    }

    fn time_out(&self, program: &str, child: &mut Child) -> ProcessError {
        kill_process_tree(child);
        debug!(program, timeout = ?self.timeout, "Killed process after timeout");
        ProcessError::TimedOut {
            program: program.to_string(),
            timeout: self.timeout,
        }
    }
}

fn drain<R: Read + Send + 'static>(mut pipe: R, stream: Stream, tx: Sender<(Stream, Vec<u8>)>) {
    thread::spawn(move || {
        let mut buf = Vec::new();
        let _ = pipe.read_to_end(&mut buf);
        let _ = tx.send((stream, buf));
    });
}

/// Kill the child and every process in its group, then reap the child
#[cfg(unix)]
fn kill_process_tree(child: &mut Child) {
    // A negative pid addresses the process group created at spawn.
    let group = format!("-{}", child.id());
    let _ = Command::new("kill")
        .args(["-s", "KILL", "--", &group])
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status();
    let _ = child.kill();
    let _ = child.wait();
}

#[cfg(not(unix))]
fn kill_process_tree(child: &mut Child) {
    let _ = child.kill();
    let _ = child.wait();
}
