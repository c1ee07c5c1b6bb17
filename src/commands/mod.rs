use clap::Args;
use std::path::PathBuf;

pub type CmdResult<T> = retemplate::Result<(T, i32)>;

/// Template root shared by every command.
#[derive(Args, Debug, Clone)]
pub struct RootArgs {
    /// Template root directory (defaults to the current directory)
    #[arg(long, default_value = ".")]
    pub path: String,
}

impl RootArgs {
    /// Expanded root path (`~` resolved).
    pub fn root(&self) -> retemplate::Result<PathBuf> {
        let expanded = PathBuf::from(shellexpand::tilde(&self.path).to_string());
        if !expanded.is_dir() {
            return Err(retemplate::Error::validation_invalid_argument(
                "path",
                "Template root is not a directory",
                Some(self.path.clone()),
            ));
        }
        Ok(expanded)
    }
}

pub mod config;
pub mod plugins;
pub mod rename;

/// Dispatch a command to its handler and map result to JSON.
macro_rules! dispatch {
    ($args:expr, $module:ident) => {
        crate::output::map_cmd_result_to_json($module::run($args))
    };
}

pub(crate) fn run_json(command: crate::Commands) -> (retemplate::Result<serde_json::Value>, i32) {
    match command {
        crate::Commands::RenameTemplate(args) => dispatch!(args, rename),
        crate::Commands::InstallPlugins(args) => dispatch!(args, plugins),
        crate::Commands::Config(args) => dispatch!(args, config),
    }
}
