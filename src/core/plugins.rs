//! Plugin pre-fetching from a server manifest.
//!
//! The manifest lists developer-tooling servers, most of which are launched
//! through a package runner (`npx <package> ...`). Installing means asking the
//! runner to fetch each package once so the first real launch is instant.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

use crate::defaults::PluginsConfig;
use crate::error::{Error, Result};
use crate::runner::CommandRunner;
use crate::utils::{command, io, paths};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PluginManifest {
    #[serde(rename = "mcpServers", alias = "servers", default)]
    pub servers: BTreeMap<String, PluginEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PluginEntry {
    pub command: String,
    #[serde(default)]
    pub args: Vec<String>,
    #[serde(default)]
    pub disabled: bool,
}

impl PluginEntry {
    /// First argument that is not a flag.
    pub fn package_id(&self) -> Option<&str> {
        self.args
            .iter()
            .map(String::as_str)
            .find(|a| !a.starts_with('-'))
    }

    /// Whether this entry is launched through `runner`, ignoring directory and extension.
    pub fn uses_runner(&self, runner: &str) -> bool {
        program_stem(&self.command) == program_stem(runner)
    }
}

fn program_stem(program: &str) -> &str {
    Path::new(program)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(program)
}

#[derive(Debug, Clone, Copy, Default)]
pub struct InstallOptions {
    /// Check the runner and report, without fetching anything.
    pub verify_only: bool,
    /// Bypass the runner's cache.
    pub force: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PluginStatus {
    Installed,
    Verified,
    Skipped,
    Failed,
}

#[derive(Debug, Clone, Serialize)]
pub struct PluginOutcome {
    pub name: String,
    pub status: PluginStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub package: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct InstallSummary {
    pub manifest: String,
    pub runner: String,
    /// Entries that were not disabled.
    pub processed: usize,
    pub installed: usize,
    pub verified: usize,
    pub skipped: usize,
    pub failed: usize,
    pub plugins: Vec<PluginOutcome>,
}

impl InstallSummary {
    pub fn success(&self) -> bool {
        self.failed == 0
    }
}

/// Read and parse the manifest at `path`.
pub fn load_manifest(path: &Path) -> Result<PluginManifest> {
    if !path.is_file() {
        return Err(Error::plugin_manifest_missing(path.display().to_string()));
    }
    let content = io::read_file(path, &format!("read {}", path.display()))?;
    serde_json::from_str(&content)
        .map_err(|e| Error::plugin_manifest_invalid(path.display().to_string(), e))
}

fn check_runner(runner: &dyn CommandRunner, program: &str, root: &Path) -> Result<()> {
    let args = vec!["--version".to_string()];
    match runner.run_command(program, &args, root) {
        Ok(output) if output.success() => {
            tracing::debug!(runner = program, version = %output.stdout.trim(), "runner available");
            Ok(())
        }
        Ok(output) => Err(Error::plugin_runner_unavailable(
            program,
            format!("exited with {}: {}", output.exit_code, output.error_text()),
        )),
        Err(err) => Err(Error::plugin_runner_unavailable(program, err.message)),
    }
}

fn fetch_args(package: &str, force: bool) -> Vec<String> {
    let mut args = vec!["--yes".to_string()];
    if force {
        args.push("--prefer-online".to_string());
    }
    args.push(package.to_string());
    args.push("--version".to_string());
    args
}

/// Pre-fetch every enabled runner-launched entry of the manifest.
///
/// `manifest_override` is relative to `root` unless absolute. Individual fetch
/// failures are reported per entry; only manifest and runner problems are errors.
pub fn install_plugins(
    root: &Path,
    config: &PluginsConfig,
    manifest_override: Option<&str>,
    runner: &dyn CommandRunner,
    options: InstallOptions,
) -> Result<InstallSummary> {
    let manifest_rel = manifest_override.unwrap_or(&config.manifest);
    let manifest_path = if Path::new(manifest_rel).is_absolute() {
        Path::new(manifest_rel).to_path_buf()
    } else {
        paths::join_relative(root, manifest_rel)
    };

    let manifest = load_manifest(&manifest_path)?;
    check_runner(runner, &config.runner, root)?;

    let mut summary = InstallSummary {
        manifest: manifest_path.display().to_string(),
        runner: config.runner.clone(),
        processed: 0,
        installed: 0,
        verified: 0,
        skipped: 0,
        failed: 0,
        plugins: Vec::with_capacity(manifest.servers.len()),
    };

    for (name, entry) in &manifest.servers {
        let outcome = process_entry(name, entry, root, config, runner, options);
        if entry.disabled {
            summary.skipped += 1;
        } else {
            summary.processed += 1;
            match outcome.status {
                PluginStatus::Installed => summary.installed += 1,
                PluginStatus::Verified => summary.verified += 1,
                PluginStatus::Skipped => summary.skipped += 1,
                PluginStatus::Failed => summary.failed += 1,
            }
        }
        summary.plugins.push(outcome);
    }

    crate::log_status!(
        "plugins",
        "{} processed, {} installed, {} verified, {} skipped, {} failed",
        summary.processed,
        summary.installed,
        summary.verified,
        summary.skipped,
        summary.failed
    );

    Ok(summary)
}

fn process_entry(
    name: &str,
    entry: &PluginEntry,
    root: &Path,
    config: &PluginsConfig,
    runner: &dyn CommandRunner,
    options: InstallOptions,
) -> PluginOutcome {
    let skipped = |message: String| PluginOutcome {
        name: name.to_string(),
        status: PluginStatus::Skipped,
        package: None,
        message: Some(message),
    };

    if entry.disabled {
        crate::log_status!("plugins", "Skipping {} (disabled)", name);
        return skipped("disabled".to_string());
    }
    if !entry.uses_runner(&config.runner) {
        return skipped(format!("launched by '{}', not '{}'", entry.command, config.runner));
    }
    let Some(package) = entry.package_id() else {
        return skipped("no package argument".to_string());
    };

    let args = fetch_args(package, options.force);
    let rendered = command::display(&config.runner, &args);

    if options.verify_only {
        return PluginOutcome {
            name: name.to_string(),
            status: PluginStatus::Verified,
            package: Some(package.to_string()),
            message: Some(format!("would run {}", rendered)),
        };
    }

    crate::log_status!("plugins", "Fetching {} ({})", name, package);
    let (status, message) = match runner.run_command(&config.runner, &args, root) {
        Ok(output) if output.success() => (PluginStatus::Installed, None),
        Ok(output) => {
            tracing::warn!(plugin = name, command = %rendered, exit_code = output.exit_code, "fetch failed");
            (
                PluginStatus::Failed,
                Some(format!("{} exited with {}: {}", rendered, output.exit_code, output.error_text())),
            )
        }
        Err(err) => (PluginStatus::Failed, Some(err.message)),
    };

    PluginOutcome {
        name: name.to_string(),
        status,
        package: Some(package.to_string()),
        message,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runner::testing::FakeRunner;
    use std::fs;
    use tempfile::TempDir;

    const FIVE_SERVERS: &str = r#"{
        "mcpServers": {
            "context7": { "command": "npx", "args": ["-y", "@upstash/context7-mcp"] },
            "fetch": { "command": "npx", "args": ["@modelcontextprotocol/server-fetch"] },
            "memory": { "command": "npx", "args": ["@modelcontextprotocol/server-memory"] },
            "playwright": { "command": "npx", "args": ["@playwright/mcp@latest"], "disabled": true },
            "sequential": { "command": "npx", "args": ["@modelcontextprotocol/server-sequential-thinking"] }
        }
    }"#;

    fn manifest(dir: &TempDir, body: &str) {
        fs::write(dir.path().join(".mcp.json"), body).unwrap();
    }

    #[test]
    fn disabled_entry_is_skipped_and_the_rest_processed() {
        let dir = TempDir::new().unwrap();
        manifest(&dir, FIVE_SERVERS);
        let runner = FakeRunner::new();

        let summary = install_plugins(
            dir.path(),
            &PluginsConfig::default(),
            None,
            &runner,
            InstallOptions::default(),
        )
        .unwrap();

        assert_eq!(summary.processed, 4);
        assert_eq!(summary.skipped, 1);
        assert_eq!(summary.installed, 4);
        assert!(summary.success());
        // Version check plus one fetch per enabled entry
        assert_eq!(runner.calls().len(), 5);
        assert!(runner
            .calls()
            .contains(&"npx --yes @upstash/context7-mcp --version".to_string()));
    }

    #[test]
    fn verify_only_does_not_fetch() {
        let dir = TempDir::new().unwrap();
        manifest(&dir, FIVE_SERVERS);
        let runner = FakeRunner::new();

        let summary = install_plugins(
            dir.path(),
            &PluginsConfig::default(),
            None,
            &runner,
            InstallOptions {
                verify_only: true,
                force: false,
            },
        )
        .unwrap();

        assert_eq!(runner.calls(), vec!["npx --version"]);
        assert_eq!(summary.verified, 4);
        assert_eq!(summary.installed, 0);
    }

    #[test]
    fn force_asks_runner_to_refresh() {
        let dir = TempDir::new().unwrap();
        manifest(
            &dir,
            r#"{ "servers": { "fetch": { "command": "npx", "args": ["server-fetch"] } } }"#,
        );
        let runner = FakeRunner::new();

        install_plugins(
            dir.path(),
            &PluginsConfig::default(),
            None,
            &runner,
            InstallOptions {
                verify_only: false,
                force: true,
            },
        )
        .unwrap();

        assert_eq!(runner.calls()[1], "npx --yes --prefer-online server-fetch --version");
    }

    #[test]
    fn entries_not_launched_by_runner_are_skipped() {
        let dir = TempDir::new().unwrap();
        manifest(
            &dir,
            r#"{ "mcpServers": {
                "local": { "command": "dotnet", "args": ["run"] },
                "bare": { "command": "npx", "args": ["--yes"] }
            } }"#,
        );

        let summary = install_plugins(
            dir.path(),
            &PluginsConfig::default(),
            None,
            &FakeRunner::new(),
            InstallOptions::default(),
        )
        .unwrap();

        assert_eq!(summary.processed, 2);
        assert_eq!(summary.skipped, 2);
        assert_eq!(summary.plugins[0].message.as_deref(), Some("no package argument"));
    }

    #[test]
    fn failed_fetch_is_reported_per_entry() {
        let dir = TempDir::new().unwrap();
        manifest(&dir, FIVE_SERVERS);
        let runner = FakeRunner::new().respond("npx --yes @modelcontextprotocol/server-memory", 1, "");

        let summary = install_plugins(
            dir.path(),
            &PluginsConfig::default(),
            None,
            &runner,
            InstallOptions::default(),
        )
        .unwrap();

        assert_eq!(summary.failed, 1);
        assert_eq!(summary.installed, 3);
        assert!(!summary.success());
        let memory = summary.plugins.iter().find(|p| p.name == "memory").unwrap();
        assert_eq!(memory.status, PluginStatus::Failed);
    }

    #[test]
    fn missing_manifest_is_an_error() {
        let dir = TempDir::new().unwrap();
        let err = install_plugins(
            dir.path(),
            &PluginsConfig::default(),
            None,
            &FakeRunner::new(),
            InstallOptions::default(),
        )
        .unwrap_err();
        assert_eq!(err.code.as_str(), "plugin.manifest_missing");
    }

    #[test]
    fn invalid_manifest_is_an_error() {
        let dir = TempDir::new().unwrap();
        manifest(&dir, "{ \"mcpServers\": [ }");
        let err = load_manifest(&dir.path().join(".mcp.json")).unwrap_err();
        assert_eq!(err.code.as_str(), "plugin.manifest_invalid");
    }

    #[test]
    fn unavailable_runner_stops_before_fetching() {
        let dir = TempDir::new().unwrap();
        manifest(&dir, FIVE_SERVERS);
        let runner = FakeRunner::new().respond("npx --version", 127, "");

        let err = install_plugins(
            dir.path(),
            &PluginsConfig::default(),
            None,
            &runner,
            InstallOptions::default(),
        )
        .unwrap_err();

        assert_eq!(err.code.as_str(), "plugin.runner_unavailable");
        assert_eq!(runner.calls().len(), 1);
    }

    #[test]
    fn runner_match_ignores_path_and_extension() {
        let entry = |command: &str| PluginEntry {
            command: command.to_string(),
            args: vec![],
            disabled: false,
        };
        assert!(entry("/usr/local/bin/npx").uses_runner("npx"));
        assert!(entry("npx.cmd").uses_runner("npx"));
        assert!(!entry("node").uses_runner("npx"));
    }
}
