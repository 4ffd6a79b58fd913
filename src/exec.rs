//! External process execution and tool discovery.

use std::path::PathBuf;
use std::process::{Command, Output};

use anyhow::{Context, Result};

/// Result of a command execution.
#[derive(Debug)]
pub struct ExecResult {
    /// Captured standard output, lossily decoded.
    pub stdout: String,
    /// Captured standard error, lossily decoded.
    pub stderr: String,
    /// Whether the process exited with status zero.
    pub success: bool,
    /// Raw exit code, if the process exited normally.
    pub code: Option<i32>,
}

impl From<Output> for ExecResult {
    fn from(output: Output) -> Self {
        Self {
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
            success: output.status.success(),
            code: output.status.code(),
        }
    }
}

/// Command execution boundary, injectable so tests never spawn processes.
///
/// `run` never fails on a non-zero exit status; callers inspect
/// [`ExecResult::success`]. An `Err` means the process could not be spawned
/// at all (binary missing, permission denied).
pub trait Executor {
    /// Run a command to completion and capture its output.
    ///
    /// # Errors
    ///
    /// Returns an error if the process cannot be spawned.
    fn run(&self, program: &str, args: &[&str]) -> Result<ExecResult>;

    /// Locate a program on PATH. Returns its absolute path when found.
    fn which(&self, program: &str) -> Option<PathBuf>;
}

/// [`Executor`] backed by [`std::process::Command`] and the `which` crate.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemExecutor;

impl Executor for SystemExecutor {
    fn run(&self, program: &str, args: &[&str]) -> Result<ExecResult> {
        let output = Command::new(program)
            .args(args)
            .output()
            .with_context(|| format!("failed to execute: {program}"))?;
        Ok(ExecResult::from(output))
    }

    fn which(&self, program: &str) -> Option<PathBuf> {
        which::which(program).ok()
    }
}
