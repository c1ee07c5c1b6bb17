//! Build and test verification after a rename.

use std::path::Path;

use crate::defaults::{CommandSpec, ToolchainConfig};
use crate::error::{Error, Result};
use crate::runner::{CommandOutput, CommandRunner};

/// Runs the configured build and test commands at the template root.
pub struct BuildVerifier<'a> {
    runner: &'a dyn CommandRunner,
    root: &'a Path,
    toolchain: &'a ToolchainConfig,
}

impl<'a> BuildVerifier<'a> {
    pub fn new(runner: &'a dyn CommandRunner, root: &'a Path, toolchain: &'a ToolchainConfig) -> Self {
        Self {
            runner,
            root,
            toolchain,
        }
    }

    /// Run the build command; a non-zero exit becomes `template.build_failed`.
    pub fn build(&self) -> Result<CommandOutput> {
        let output = self.run(&self.toolchain.build);
        if output.success() {
            Ok(output)
        } else {
            let spec = &self.toolchain.build;
            Err(Error::template_build_failed(
                output.failure_details(&spec.program, &spec.args),
            ))
        }
    }

    /// Run the test command; a non-zero exit becomes `template.test_failed`.
    pub fn test(&self) -> Result<CommandOutput> {
        let output = self.run(&self.toolchain.test);
        if output.success() {
            Ok(output)
        } else {
            let spec = &self.toolchain.test;
            Err(Error::template_test_failed(
                output.failure_details(&spec.program, &spec.args),
            ))
        }
    }

    /// A program that cannot be started counts as a failed run.
    fn run(&self, spec: &CommandSpec) -> CommandOutput {
        crate::log_status!("build", "Running {}", spec.display());
        self.runner
            .run_command(&spec.program, &spec.args, self.root)
            .unwrap_or_else(|e| CommandOutput::not_started(&e))
    }
}
