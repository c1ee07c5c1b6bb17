//! Version control initialization for a freshly renamed template.

use serde::Serialize;
use std::path::Path;

use crate::defaults::VcsConfig;
use crate::error::{Error, Result};
use crate::runner::{CommandOutput, CommandRunner};
use crate::utils::command;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VcsOutcome {
    /// Commands that ran, in order.
    pub commands: Vec<String>,
    pub commit_message: String,
}

/// Whether `root` already contains a repository.
pub fn is_repository(root: &Path) -> bool {
    root.join(".git").exists()
}

/// Run `init`, stage everything and create the first commit.
pub fn initialize(runner: &dyn CommandRunner, root: &Path, config: &VcsConfig) -> Result<VcsOutcome> {
    let steps: [Vec<String>; 3] = [
        vec!["init".to_string()],
        vec!["add".to_string(), "-A".to_string()],
        vec![
            "commit".to_string(),
            "-m".to_string(),
            config.commit_message.clone(),
        ],
    ];

    let mut commands = Vec::with_capacity(steps.len());
    for args in &steps {
        let rendered = command::display(&config.program, args);
        crate::log_status!("vcs", "{}", rendered);

        let output = runner
            .run_command(&config.program, args, root)
            .unwrap_or_else(|e| CommandOutput::not_started(&e));
        if !output.success() {
            return Err(Error::vcs_command_failed(
                output.failure_details(&config.program, args),
            ));
        }
        commands.push(rendered);
    }

    Ok(VcsOutcome {
        commands,
        commit_message: config.commit_message.clone(),
    })
}
