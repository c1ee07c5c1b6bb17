use clap::{Args, ValueEnum};
use std::path::PathBuf;

use retemplate::defaults::{self, FileErrorPolicy};
use retemplate::refactor::MatchMode;
use retemplate::runner::SystemRunner;
use retemplate::template::{RenameRequest, RenameSummary, TemplateRenameOrchestrator};

use super::{CmdResult, RootArgs};
use crate::tty::TtyConfirm;

#[derive(Args)]
pub struct RenameArgs {
    /// New project name (letters, digits, '.' and '_', e.g. Contoso.Utilities)
    pub new_name: String,

    #[command(flatten)]
    pub root: RootArgs,

    /// Skip the build and test commands
    #[arg(long)]
    pub skip_build: bool,

    /// Skip repository initialization and the first commit
    #[arg(long)]
    pub skip_vcs_init: bool,

    /// Proceed without confirmation when the template looks customized
    #[arg(long, short = 'y')]
    pub yes: bool,

    /// Show the rename plan without changing anything
    #[arg(long)]
    pub dry_run: bool,

    /// How placeholder occurrences are matched in file contents
    #[arg(long = "match", value_enum)]
    pub match_mode: Option<MatchArg>,

    /// Stop at the first file that cannot be read, written or renamed
    #[arg(long)]
    pub strict: bool,

    /// Configuration file (defaults to retemplate.json at the root)
    #[arg(long)]
    pub config: Option<PathBuf>,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum MatchArg {
    Literal,
    Identifier,
}

impl From<MatchArg> for MatchMode {
    fn from(arg: MatchArg) -> Self {
        match arg {
            MatchArg::Literal => MatchMode::Literal,
            MatchArg::Identifier => MatchMode::Identifier,
        }
    }
}

pub fn run(args: RenameArgs) -> CmdResult<RenameSummary> {
    let root = args.root.root()?;
    let mut config = defaults::load_config(&root, args.config.as_deref())?;

    if let Some(mode) = args.match_mode {
        config.rename.match_mode = mode.into();
    }
    if args.strict {
        config.rename.file_error_policy = FileErrorPolicy::Abort;
    }

    let request = RenameRequest {
        old_token: config.rename.placeholder.clone(),
        new_token: args.new_name,
        skip_build: args.skip_build,
        skip_vcs_init: args.skip_vcs_init,
        assume_yes: args.yes,
        dry_run: args.dry_run,
    };

    let runner = SystemRunner;
    let summary = TemplateRenameOrchestrator::new(&root, &config, &runner, &TtyConfirm).run(&request)?;

    let exit_code = if summary.success { 0 } else { 1 };
    Ok((summary, exit_code))
}
