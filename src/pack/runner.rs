//! External process execution.
//!
//! [`SystemRunner`] launches the packer with piped stdout/stderr and waits
//! until it exits, collecting both streams in full. The standard library
//! drains the two pipes concurrently, so a chatty tool cannot block on a
//! full pipe buffer. There is no timeout.

use std::path::Path;
use std::process::{Command, Stdio};

use super::error::RunnerError;

/// Everything captured from one process invocation.
#[derive(Debug, Default)]
pub struct ExecutionResult {
    /// Raw standard output
    pub stdout: Vec<u8>,
    /// Raw standard error
    pub stderr: Vec<u8>,
    /// Exit code, if the process exited normally
    pub exit_code: Option<i32>,
    /// Launch or capture failure
    pub error: Option<RunnerError>,
}

impl ExecutionResult {
    /// Result of a process that ran to completion.
    pub fn completed(stdout: Vec<u8>, stderr: Vec<u8>, exit_code: Option<i32>) -> Self {
        Self { stdout, stderr, exit_code, error: None }
    }

    /// Result of a process that could not be run or drained.
    pub fn failed(error: RunnerError) -> Self {
        Self { error: Some(error), ..Default::default() }
    }

    /// Standard output decoded as UTF-8 (lossy).
    pub fn stdout_text(&self) -> String {
        String::from_utf8_lossy(&self.stdout).into_owned()
    }

    /// Standard error decoded as UTF-8 (lossy).
    pub fn stderr_text(&self) -> String {
        String::from_utf8_lossy(&self.stderr).into_owned()
    }

    /// Whether the process ran and exited with code 0.
    pub fn success(&self) -> bool {
        self.error.is_none() && self.exit_code == Some(0)
    }
}

/// Executes the external tool.
pub trait ProcessRunner: Send + Sync {
    /// Run `executable` with `args`, optionally inside `working_dir`.
    ///
    /// Never panics or returns early on failure: launch and capture errors
    /// are reported through [`ExecutionResult::error`].
    fn run(&self, executable: &str, args: &[String], working_dir: Option<&Path>)
        -> ExecutionResult;
}

/// Runner backed by `std::process::Command`.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemRunner;

impl SystemRunner {
    /// Create a new system runner.
    pub fn new() -> Self {
        Self
    }
}

impl ProcessRunner for SystemRunner {
    fn run(
        &self,
        executable: &str,
        args: &[String],
        working_dir: Option<&Path>,
    ) -> ExecutionResult {
        let mut cmd = Command::new(executable);
        cmd.args(args).stdin(Stdio::null()).stdout(Stdio::piped()).stderr(Stdio::piped());

        if let Some(dir) = working_dir {
            cmd.current_dir(dir);
        }

        let child = match cmd.spawn() {
            Ok(child) => child,
            Err(source) => {
                return ExecutionResult::failed(RunnerError::Launch {
                    executable: executable.to_string(),
                    source,
                })
            }
        };

        match child.wait_with_output() {
            Ok(output) => {
                ExecutionResult::completed(output.stdout, output.stderr, output.status.code())
            }
            Err(source) => ExecutionResult::failed(RunnerError::StreamCapture {
                executable: executable.to_string(),
                source,
            }),
        }
    }
}
