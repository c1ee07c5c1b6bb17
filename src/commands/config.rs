use clap::{Args, Subcommand};
use serde::Serialize;
use std::path::PathBuf;

use retemplate::defaults::{self, RetemplateConfig};

use super::{CmdResult, RootArgs};

#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    command: ConfigCommand,
}

#[derive(Subcommand)]
enum ConfigCommand {
    /// Display the effective configuration (file merged over built-in defaults)
    Show {
        #[command(flatten)]
        root: RootArgs,

        /// Show only built-in defaults (ignore retemplate.json)
        #[arg(long)]
        builtin: bool,

        /// Configuration file (defaults to retemplate.json at the root)
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

#[derive(Debug, Serialize)]
pub struct ConfigOutput {
    command: String,
    path: String,
    exists: bool,
    config: RetemplateConfig,
}

pub fn run(args: ConfigArgs) -> CmdResult<ConfigOutput> {
    match args.command {
        ConfigCommand::Show {
            root,
            builtin,
            config,
        } => show(&root, builtin, config),
    }
}

fn show(root: &RootArgs, builtin: bool, explicit: Option<PathBuf>) -> CmdResult<ConfigOutput> {
    let root = root.root()?;
    let path = defaults::config_path(&root, explicit.as_deref());
    let exists = path.exists();

    let config = if builtin {
        RetemplateConfig::default()
    } else {
        defaults::load_config(&root, explicit.as_deref())?
    };

    Ok((
        ConfigOutput {
            command: "config.show".to_string(),
            path: path.display().to_string(),
            exists,
            config,
        },
        0,
    ))
}
