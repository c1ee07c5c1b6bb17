use clap::Args;
use std::path::PathBuf;

use retemplate::defaults;
use retemplate::plugins::{self, InstallOptions, InstallSummary};
use retemplate::runner::SystemRunner;

use super::{CmdResult, RootArgs};

#[derive(Args)]
pub struct PluginsArgs {
    #[command(flatten)]
    pub root: RootArgs,

    /// Check the package runner and list what would be fetched
    #[arg(long)]
    pub verify_only: bool,

    /// Refresh packages even when they are already cached
    #[arg(long)]
    pub force: bool,

    /// Manifest path relative to the root (defaults to .mcp.json)
    #[arg(long)]
    pub manifest: Option<String>,

    /// Configuration file (defaults to retemplate.json at the root)
    #[arg(long)]
    pub config: Option<PathBuf>,
}

pub fn run(args: PluginsArgs) -> CmdResult<InstallSummary> {
    let root = args.root.root()?;
    let config = defaults::load_config(&root, args.config.as_deref())?;

    let summary = plugins::install_plugins(
        &root,
        &config.plugins,
        args.manifest.as_deref(),
        &SystemRunner,
        InstallOptions {
            verify_only: args.verify_only,
            force: args.force,
        },
    )?;

    let exit_code = if summary.success() { 0 } else { 1 };
    Ok((summary, exit_code))
}
