use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    ConfigInvalidJson,
    ConfigInvalidValue,

    ValidationInvalidArgument,

    TemplatePreconditionDeclined,
    TemplateBuildFailed,
    TemplateTestFailed,

    VcsCommandFailed,

    PluginManifestMissing,
    PluginManifestInvalid,
    PluginRunnerUnavailable,

    InternalIoError,
    InternalJsonError,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::ConfigInvalidJson => "config.invalid_json",
            ErrorCode::ConfigInvalidValue => "config.invalid_value",

            ErrorCode::ValidationInvalidArgument => "validation.invalid_argument",

            ErrorCode::TemplatePreconditionDeclined => "template.precondition_declined",
            ErrorCode::TemplateBuildFailed => "template.build_failed",
            ErrorCode::TemplateTestFailed => "template.test_failed",

            ErrorCode::VcsCommandFailed => "vcs.command_failed",

            ErrorCode::PluginManifestMissing => "plugin.manifest_missing",
            ErrorCode::PluginManifestInvalid => "plugin.manifest_invalid",
            ErrorCode::PluginRunnerUnavailable => "plugin.runner_unavailable",

            ErrorCode::InternalIoError => "internal.io_error",
            ErrorCode::InternalJsonError => "internal.json_error",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Hint {
    pub message: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigInvalidJsonDetails {
    pub path: String,
    pub error: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigInvalidValueDetails {
    pub key: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    pub problem: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InvalidArgumentDetails {
    pub field: String,
    pub problem: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InternalIoErrorDetails {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InternalJsonErrorDetails {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
}

/// Captured result of an external command that exited non-zero.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommandFailedDetails {
    pub command: String,
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ManifestDetails {
    pub path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone)]
pub struct Error {
    pub code: ErrorCode,
    pub message: String,
    pub details: Value,
    pub hints: Vec<Hint>,
    pub retryable: Option<bool>,
}

pub type Result<T> = std::result::Result<T, Error>;

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for Error {}

fn to_details<T: Serialize>(details: T) -> Value {
    serde_json::to_value(details).unwrap_or_else(|_| Value::Object(serde_json::Map::new()))
}

impl Error {
    pub fn new(code: ErrorCode, message: impl Into<String>, details: Value) -> Self {
        Self {
            code,
            message: message.into(),
            details,
            hints: Vec::new(),
            retryable: None,
        }
    }

    pub fn validation_invalid_argument(
        field: impl Into<String>,
        problem: impl Into<String>,
        id: Option<String>,
    ) -> Self {
        let details = to_details(InvalidArgumentDetails {
            field: field.into(),
            problem: problem.into(),
            id,
        });

        Self::new(
            ErrorCode::ValidationInvalidArgument,
            "Invalid argument",
            details,
        )
    }

    pub fn config_invalid_json(path: impl Into<String>, err: serde_json::Error) -> Self {
        let details = to_details(ConfigInvalidJsonDetails {
            path: path.into(),
            error: err.to_string(),
        });

        Self::new(
            ErrorCode::ConfigInvalidJson,
            "Invalid JSON in configuration",
            details,
        )
    }

    pub fn config_invalid_value(
        key: impl Into<String>,
        value: Option<String>,
        problem: impl Into<String>,
    ) -> Self {
        let details = to_details(ConfigInvalidValueDetails {
            key: key.into(),
            value,
            problem: problem.into(),
        });

        Self::new(
            ErrorCode::ConfigInvalidValue,
            "Invalid configuration value",
            details,
        )
    }

    pub fn template_precondition_declined(source_dir: impl Into<String>) -> Self {
        let source_dir = source_dir.into();
        Self::new(
            ErrorCode::TemplatePreconditionDeclined,
            format!(
                "Placeholder directory '{}' not found; the template may already be customized",
                source_dir
            ),
            serde_json::json!({ "sourceDir": source_dir }),
        )
        .with_hint("Rerun with --yes to proceed anyway")
    }

    pub fn template_build_failed(details: CommandFailedDetails) -> Self {
        Self::new(ErrorCode::TemplateBuildFailed, "Build failed", to_details(details))
            .with_hint("Rerun with --skip-build and run the build command manually")
    }

    pub fn template_test_failed(details: CommandFailedDetails) -> Self {
        Self::new(ErrorCode::TemplateTestFailed, "Tests failed", to_details(details))
            .with_hint("Rerun with --skip-build and run the test command manually")
    }

    pub fn vcs_command_failed(details: CommandFailedDetails) -> Self {
        Self::new(
            ErrorCode::VcsCommandFailed,
            format!("Version control command failed: {}", details.command),
            to_details(details),
        )
        .with_hint("Rerun with --skip-vcs-init and initialize the repository manually")
    }

    pub fn plugin_manifest_missing(path: impl Into<String>) -> Self {
        let path = path.into();
        Self::new(
            ErrorCode::PluginManifestMissing,
            format!("Plugin manifest not found: {}", path),
            to_details(ManifestDetails { path, error: None }),
        )
    }

    pub fn plugin_manifest_invalid(path: impl Into<String>, err: serde_json::Error) -> Self {
        Self::new(
            ErrorCode::PluginManifestInvalid,
            "Plugin manifest is not valid JSON",
            to_details(ManifestDetails {
                path: path.into(),
                error: Some(err.to_string()),
            }),
        )
    }

    pub fn plugin_runner_unavailable(runner: impl Into<String>, problem: impl Into<String>) -> Self {
        let runner = runner.into();
        Self::new(
            ErrorCode::PluginRunnerUnavailable,
            format!("Package runner '{}' is not available", runner),
            serde_json::json!({ "runner": runner, "problem": problem.into() }),
        )
        .with_hint("Install Node.js so the package runner is on PATH, then rerun")
    }

    pub fn internal_io(error: impl Into<String>, context: Option<String>) -> Self {
        let details = to_details(InternalIoErrorDetails {
            error: error.into(),
            context,
        });

        Self::new(ErrorCode::InternalIoError, "IO error", details)
    }

    pub fn internal_json(error: impl Into<String>, context: Option<String>) -> Self {
        let details = to_details(InternalJsonErrorDetails {
            error: error.into(),
            context,
        });

        Self::new(ErrorCode::InternalJsonError, "JSON error", details)
    }

    pub fn with_hint(mut self, message: impl Into<String>) -> Self {
        self.hints.push(Hint {
            message: message.into(),
        });
        self
    }

    /// Attach an extra field to the details object (e.g. a partial run summary).
    pub fn with_detail(mut self, key: &str, value: Value) -> Self {
        match self.details {
            Value::Object(ref mut map) => {
                map.insert(key.to_string(), value);
            }
            _ => {
                let mut map = serde_json::Map::new();
                map.insert(key.to_string(), value);
                self.details = Value::Object(map);
            }
        }
        self
    }
}
