//! External command capability.
//!
//! Everything that shells out (build, test, git, the package runner) goes
//! through `CommandRunner`, so tests can substitute a scripted runner.

use serde::Serialize;
use std::path::Path;
use std::process::Command;

use crate::error::{CommandFailedDetails, Error, Result};
use crate::utils::command;

/// Captured result of a finished command.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommandOutput {
    pub exit_code: i32,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub stdout: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub stderr: String,
}

impl CommandOutput {
    /// Stand-in output for a program that could not be started.
    pub fn not_started(err: &Error) -> Self {
        let reason = err.details["error"]
            .as_str()
            .map(str::to_string)
            .unwrap_or_else(|| err.message.clone());
        Self {
            exit_code: -1,
            stdout: String::new(),
            stderr: reason,
        }
    }

    pub fn success(&self) -> bool {
        self.exit_code == 0
    }

    pub fn error_text(&self) -> String {
        command::error_text(&self.stdout, &self.stderr)
    }

    /// Details for an error about this output, naming the command that produced it.
    pub fn failure_details(self, program: &str, args: &[String]) -> CommandFailedDetails {
        CommandFailedDetails {
            command: command::display(program, args),
            exit_code: self.exit_code,
            stdout: self.stdout,
            stderr: self.stderr,
        }
    }
}

/// Runs a program to completion in a working directory.
///
/// `Err` means the program could not be started at all; a non-zero exit is
/// reported through `CommandOutput::exit_code`.
pub trait CommandRunner {
    fn run_command(&self, program: &str, args: &[String], dir: &Path) -> Result<CommandOutput>;
}

/// Runs commands as real child processes. Stdin is closed, output captured.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemRunner;

impl CommandRunner for SystemRunner {
    fn run_command(&self, program: &str, args: &[String], dir: &Path) -> Result<CommandOutput> {
        let rendered = command::display(program, args);
        tracing::debug!(command = %rendered, dir = %dir.display(), "running");

        let output = Command::new(program)
            .args(args)
            .current_dir(dir)
            .output()
            .map_err(|e| {
                Error::internal_io(format!("Failed to run {}: {}", rendered, e), Some(rendered.clone()))
            })?;

        Ok(CommandOutput {
            // Terminated by a signal
            exit_code: output.status.code().unwrap_or(-1),
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        })
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn system_runner_captures_stdout() {
        let dir = std::env::temp_dir();
        let out = SystemRunner
            .run_command("echo", &["hello".to_string()], &dir)
            .unwrap();
        assert!(out.success());
        assert_eq!(out.stdout.trim(), "hello");
    }

    #[test]
    fn system_runner_reports_non_zero_exit() {
        let dir = std::env::temp_dir();
        let out = SystemRunner.run_command("false", &[], &dir).unwrap();
        assert!(!out.success());
    }

    #[test]
    fn system_runner_errors_when_program_is_missing() {
        let dir = std::env::temp_dir();
        let err = SystemRunner
            .run_command("nonexistent_command_xyz", &[], &dir)
            .unwrap_err();
        assert_eq!(err.code.as_str(), "internal.io_error");
    }

    #[test]
    fn not_started_carries_the_spawn_error() {
        let err = SystemRunner
            .run_command("nonexistent_command_xyz", &[], &std::env::temp_dir())
            .unwrap_err();
        let out = CommandOutput::not_started(&err);
        assert_eq!(out.exit_code, -1);
        assert!(!out.success());
        assert!(out.stderr.contains("nonexistent_command_xyz"));
    }

    #[test]
    fn failure_details_render_the_command() {
        let out = CommandOutput {
            exit_code: 3,
            stdout: String::new(),
            stderr: "boom".to_string(),
        };
        let details = out.failure_details("dotnet", &["test".to_string()]);
        assert_eq!(details.command, "dotnet test");
        assert_eq!(details.exit_code, 3);
        assert_eq!(details.stderr, "boom");
    }
}
