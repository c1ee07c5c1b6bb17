use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::refactor::{FileCategory, MatchMode};
use crate::utils::{command, io};

/// File name looked up at the template root when no `--config` is given.
pub const CONFIG_FILE: &str = "retemplate.json";

/// Root configuration structure for retemplate.json
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct RetemplateConfig {
    #[serde(default)]
    pub rename: RenameConfig,

    #[serde(default)]
    pub toolchain: ToolchainConfig,

    #[serde(default)]
    pub vcs: VcsConfig,

    #[serde(default)]
    pub plugins: PluginsConfig,
}

/// What gets renamed and which files are rewritten.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenameConfig {
    #[serde(default = "default_placeholder")]
    pub placeholder: String,

    /// Directory expected to contain `<placeholder>/` in a fresh template.
    #[serde(default = "default_source_dir")]
    pub source_dir: String,

    /// Ordered category rules; the first rule whose pattern matches wins.
    #[serde(default = "default_categories")]
    pub categories: Vec<CategoryRule>,

    /// Directory names skipped at any depth.
    #[serde(default = "default_skip_dirs")]
    pub skip_dirs: Vec<String>,

    /// Directory names skipped only directly under the root.
    #[serde(default = "default_root_only_skip_dirs")]
    pub root_only_skip_dirs: Vec<String>,

    #[serde(default = "default_binary_extensions")]
    pub binary_extensions: Vec<String>,

    #[serde(default)]
    pub match_mode: MatchMode,

    #[serde(default)]
    pub file_error_policy: FileErrorPolicy,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryRule {
    pub category: FileCategory,
    pub patterns: Vec<String>,
}

/// How a read/write/rename failure on a single file is handled.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum FileErrorPolicy {
    /// Report the file and keep going.
    #[default]
    Continue,
    /// Stop the run at the first failing file.
    Abort,
}

/// A program plus its arguments.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CommandSpec {
    pub program: String,
    #[serde(default)]
    pub args: Vec<String>,
}

impl CommandSpec {
    pub fn new(program: &str, args: &[&str]) -> Self {
        Self {
            program: program.to_string(),
            args: args.iter().map(|a| a.to_string()).collect(),
        }
    }

    pub fn display(&self) -> String {
        command::display(&self.program, &self.args)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolchainConfig {
    #[serde(default = "default_build_command")]
    pub build: CommandSpec,

    #[serde(default = "default_test_command")]
    pub test: CommandSpec,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VcsConfig {
    #[serde(default = "default_vcs_program")]
    pub program: String,

    #[serde(default = "default_commit_message")]
    pub commit_message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PluginsConfig {
    /// Manifest path relative to the root.
    #[serde(default = "default_manifest")]
    pub manifest: String,

    /// Package runner whose entries are pre-fetched.
    #[serde(default = "default_runner")]
    pub runner: String,
}

impl Default for RenameConfig {
    fn default() -> Self {
        Self {
            placeholder: default_placeholder(),
            source_dir: default_source_dir(),
            categories: default_categories(),
            skip_dirs: default_skip_dirs(),
            root_only_skip_dirs: default_root_only_skip_dirs(),
            binary_extensions: default_binary_extensions(),
            match_mode: MatchMode::default(),
            file_error_policy: FileErrorPolicy::default(),
        }
    }
}

impl Default for ToolchainConfig {
    fn default() -> Self {
        Self {
            build: default_build_command(),
            test: default_test_command(),
        }
    }
}

impl Default for VcsConfig {
    fn default() -> Self {
        Self {
            program: default_vcs_program(),
            commit_message: default_commit_message(),
        }
    }
}

impl Default for PluginsConfig {
    fn default() -> Self {
        Self {
            manifest: default_manifest(),
            runner: default_runner(),
        }
    }
}

// =============================================================================
// Default value functions
// =============================================================================

fn default_placeholder() -> String {
    "YourLibrary".to_string()
}

fn default_source_dir() -> String {
    "src".to_string()
}

fn rule(category: FileCategory, patterns: &[&str]) -> CategoryRule {
    CategoryRule {
        category,
        patterns: patterns.iter().map(|p| p.to_string()).collect(),
    }
}

fn default_categories() -> Vec<CategoryRule> {
    vec![
        rule(FileCategory::Source, &["**/*.cs", "**/*.fs", "**/*.vb"]),
        rule(
            FileCategory::ProjectManifest,
            &["**/*.csproj", "**/*.fsproj", "**/*.vbproj", "**/*.nuspec"],
        ),
        rule(FileCategory::SolutionManifest, &["**/*.sln", "**/*.slnx"]),
        rule(
            FileCategory::Documentation,
            &["**/*.md", "**/*.txt", "docs/**/*.yml", "docs/**/*.json"],
        ),
        rule(
            FileCategory::EditorConfig,
            &[
                "**/.editorconfig",
                ".vscode/*.json",
                ".vscode/*.code-snippets",
                "*.code-workspace",
            ],
        ),
        rule(
            FileCategory::BuildConfig,
            &[
                "**/*.props",
                "**/*.targets",
                "global.json",
                "nuget.config",
                "NuGet.Config",
                ".github/workflows/*.yml",
                ".github/workflows/*.yaml",
            ],
        ),
    ]
}

fn default_skip_dirs() -> Vec<String> {
    ["bin", "obj", ".git", ".vs", "node_modules", "packages", "TestResults"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn default_root_only_skip_dirs() -> Vec<String> {
    ["artifacts", "publish", "out", "dist"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn default_binary_extensions() -> Vec<String> {
    [
        "dll", "exe", "pdb", "nupkg", "snupkg", "snk", "pfx", "png", "jpg", "jpeg", "gif", "ico",
        "zip",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

fn default_build_command() -> CommandSpec {
    CommandSpec::new("dotnet", &["build"])
}

fn default_test_command() -> CommandSpec {
    CommandSpec::new("dotnet", &["test", "--no-build"])
}

fn default_vcs_program() -> String {
    "git".to_string()
}

fn default_commit_message() -> String {
    "Initial commit from template".to_string()
}

fn default_manifest() -> String {
    ".mcp.json".to_string()
}

fn default_runner() -> String {
    "npx".to_string()
}

// =============================================================================
// Loading functions
// =============================================================================

/// Resolve the config file path: an explicit path wins, else `<root>/retemplate.json`.
pub fn config_path(root: &Path, explicit: Option<&Path>) -> PathBuf {
    match explicit {
        Some(path) => path.to_path_buf(),
        None => root.join(CONFIG_FILE),
    }
}

/// Load configuration for a template root.
///
/// A missing default file yields built-in defaults. A missing explicit file, or
/// any file that fails to parse, is an error.
pub fn load_config(root: &Path, explicit: Option<&Path>) -> Result<RetemplateConfig> {
    let path = config_path(root, explicit);

    if !path.exists() {
        if explicit.is_some() {
            return Err(Error::config_invalid_value(
                "config",
                Some(path.display().to_string()),
                "Config file does not exist",
            ));
        }
        tracing::debug!(path = %path.display(), "no config file, using built-in defaults");
        return Ok(RetemplateConfig::default());
    }

    let content = io::read_file(&path, &format!("read {}", path.display()))?;
    let config: RetemplateConfig = serde_json::from_str(&content)
        .map_err(|e| Error::config_invalid_json(path.display().to_string(), e))?;

    validate_config(&config)?;
    Ok(config)
}

fn validate_config(config: &RetemplateConfig) -> Result<()> {
    if config.rename.placeholder.is_empty() {
        return Err(Error::config_invalid_value(
            "rename.placeholder",
            None,
            "Placeholder cannot be empty",
        ));
    }
    if config.toolchain.build.program.is_empty() || config.toolchain.test.program.is_empty() {
        return Err(Error::config_invalid_value(
            "toolchain",
            None,
            "Build and test commands need a program",
        ));
    }
    Ok(())
}
