use std::cell::RefCell;
use std::fs;
use std::path::Path;

use retemplate::defaults::PluginsConfig;
use retemplate::plugins::{install_plugins, InstallOptions, PluginStatus};
use retemplate::runner::{CommandOutput, CommandRunner};
use tempfile::TempDir;

#[derive(Default)]
struct RecordingRunner {
    calls: RefCell<Vec<Vec<String>>>,
}

impl CommandRunner for RecordingRunner {
    fn run_command(
        &self,
        program: &str,
        args: &[String],
        _dir: &Path,
    ) -> retemplate::Result<CommandOutput> {
        let mut call = vec![program.to_string()];
        call.extend(args.iter().cloned());
        self.calls.borrow_mut().push(call);
        Ok(CommandOutput {
            exit_code: 0,
            stdout: "10.9.0\n".to_string(),
            stderr: String::new(),
        })
    }
}

const MANIFEST: &str = r#"{
  "mcpServers": {
    "context7": { "command": "npx", "args": ["-y", "@upstash/context7-mcp"] },
    "fetch": { "command": "npx", "args": ["-y", "@modelcontextprotocol/server-fetch"] },
    "filesystem": { "command": "npx", "args": ["-y", "@modelcontextprotocol/server-filesystem", "."] },
    "github": { "command": "npx", "args": ["-y", "@modelcontextprotocol/server-github"], "disabled": true },
    "memory": { "command": "npx", "args": ["-y", "@modelcontextprotocol/server-memory"] }
  }
}"#;

#[test]
fn five_plugins_with_one_disabled_processes_four() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join(".mcp.json"), MANIFEST).unwrap();
    let runner = RecordingRunner::default();

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
    assert_eq!(summary.plugins.len(), 5);

    let github = summary.plugins.iter().find(|p| p.name == "github").unwrap();
    assert_eq!(github.status, PluginStatus::Skipped);

    let calls = runner.calls.borrow();
    assert_eq!(calls[0], vec!["npx", "--version"]);
    assert_eq!(
        calls[3],
        vec!["npx", "--yes", "@modelcontextprotocol/server-filesystem", "--version"]
    );
    assert!(!calls
        .iter()
        .any(|c| c.iter().any(|a| a.contains("server-github"))));
}

#[test]
fn manifest_path_can_be_overridden() {
    let dir = TempDir::new().unwrap();
    fs::create_dir(dir.path().join(".vscode")).unwrap();
    fs::write(dir.path().join(".vscode/mcp.json"), MANIFEST.replace("mcpServers", "servers"))
        .unwrap();

    let summary = install_plugins(
        dir.path(),
        &PluginsConfig::default(),
        Some(".vscode/mcp.json"),
        &RecordingRunner::default(),
        InstallOptions {
            verify_only: true,
            force: false,
        },
    )
    .unwrap();

    assert_eq!(summary.verified, 4);
    assert!(summary.manifest.ends_with("mcp.json"));
}

#[test]
fn missing_manifest_reports_its_path() {
    let dir = TempDir::new().unwrap();
    let err = install_plugins(
        dir.path(),
        &PluginsConfig::default(),
        None,
        &RecordingRunner::default(),
        InstallOptions::default(),
    )
    .unwrap_err();

    assert_eq!(err.code.as_str(), "plugin.manifest_missing");
    assert!(err.details["path"].as_str().unwrap().ends_with(".mcp.json"));
}
