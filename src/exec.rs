//! External command execution.
use anyhow::{Context, Result};
use std::process::{Command, Output};

/// Result of a command execution.
#[derive(Debug, Clone, Default)]
pub struct ExecResult {
    /// Captured standard output.
    pub stdout: String,
    /// Captured standard error.
    pub stderr: String,
    /// Whether the process exited with status zero.
    pub success: bool,
    /// Exit code; `None` when terminated by a signal.
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

/// Seam between tasks and the operating system's process API.
#[cfg_attr(test, mockall::automock)]
pub trait Executor: Send + Sync {
    /// Run a command and return its output regardless of exit status.
    ///
    /// # Errors
    ///
    /// Returns an error only if the process could not be spawned.
    fn run_unchecked<'a>(&self, program: &str, args: &[&'a str]) -> Result<ExecResult>;

    /// Check if a program is available on `PATH`.
    fn which(&self, program: &str) -> bool;
}

/// [`Executor`] backed by [`std::process::Command`].
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemExecutor;

impl Executor for SystemExecutor {
    fn run_unchecked<'a>(&self, program: &str, args: &[&'a str]) -> Result<ExecResult> {
        run_unchecked(program, args)
    }

    fn which(&self, program: &str) -> bool {
        which(program)
    }
}

/// Run a command, allowing failure (returns result without bailing).
///
/// # Errors
///
/// Returns an error if the process could not be spawned.
pub fn run_unchecked(program: &str, args: &[&str]) -> Result<ExecResult> {
    let output = Command::new(program)
        .args(args)
        .output()
        .with_context(|| format!("failed to execute: {program}"))?;

    Ok(ExecResult::from(output))
}

/// Check if a program is available on `PATH`.
#[must_use]
pub fn which(program: &str) -> bool {
    which::which(program).is_ok()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[cfg(unix)]
    #[test]
    fn run_unchecked_captures_output() {
        let result = run_unchecked("echo", &["hello"]).unwrap();
        assert!(result.success);
        assert_eq!(result.code, Some(0));
        assert_eq!(result.stdout.trim(), "hello");
    }

    #[cfg(unix)]
    #[test]
    fn run_unchecked_failure_is_not_an_error() {
        let result = run_unchecked("false", &[]).unwrap();
        assert!(!result.success);
        assert_eq!(result.code, Some(1));
    }

    #[test]
    fn spawn_failure_is_an_error() {
        assert!(run_unchecked("dotlink-nonexistent-program-xyz", &[]).is_err());
    }

    #[cfg(unix)]
    #[test]
    fn which_finds_known_program() {
        assert!(which("sh"));
    }

    #[test]
    fn which_missing_program() {
        assert!(!which("dotlink-nonexistent-program-xyz"));
    }

    #[test]
    fn system_executor_delegates() {
        let exec = SystemExecutor;
        assert!(!exec.which("dotlink-nonexistent-program-xyz"));
    }
}
