//! CLI response formatting and output.
//!
//! Provides JSON envelope, printing, and exit code mapping.

use retemplate::error::Hint;
use retemplate::{Error, ErrorCode, Result};
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct CliResponse<T: Serialize> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<CliError>,
}

#[derive(Debug, Serialize)]
pub struct CliError {
    pub code: String,
    pub message: String,
    pub details: serde_json::Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hints: Option<Vec<Hint>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retryable: Option<bool>,
}

impl<T: Serialize> CliResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| {
            Error::internal_json(e.to_string(), Some("serialize response".to_string()))
        })
    }
}

impl CliResponse<()> {
    pub fn from_error(err: &Error) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(CliError {
                code: err.code.as_str().to_string(),
                message: err.message.clone(),
                details: err.details.clone(),
                hints: if err.hints.is_empty() {
                    None
                } else {
                    Some(err.hints.clone())
                },
                retryable: err.retryable,
            }),
        }
    }
}

fn print_response<T: Serialize>(response: &CliResponse<T>) -> Result<()> {
    use std::io::{self, Write};

    let payload = response.to_json()?;
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    if let Err(e) = writeln!(handle, "{}", payload) {
        if e.kind() == io::ErrorKind::BrokenPipe {
            return Ok(()); // Exit gracefully on SIGPIPE
        }
        return Err(Error::internal_io(
            e.to_string(),
            Some("write stdout".to_string()),
        ));
    }
    Ok(())
}

pub fn print_success<T: Serialize>(data: T) -> Result<()> {
    print_response(&CliResponse::success(data))
}

pub fn map_cmd_result_to_json<T: Serialize>(
    result: Result<(T, i32)>,
) -> (Result<serde_json::Value>, i32) {
    match result {
        Ok((data, exit_code)) => match serde_json::to_value(data) {
            Ok(value) => (Ok(value), exit_code),
            Err(err) => (
                Err(Error::internal_json(
                    err.to_string(),
                    Some("serialize response".to_string()),
                )),
                1,
            ),
        },
        Err(err) => {
            let exit_code = exit_code_for_error(err.code);
            (Err(err), exit_code)
        }
    }
}

pub fn exit_code_for_error(code: ErrorCode) -> i32 {
    match code {
        ErrorCode::ConfigInvalidJson
        | ErrorCode::ConfigInvalidValue
        | ErrorCode::ValidationInvalidArgument
        | ErrorCode::TemplatePreconditionDeclined
        | ErrorCode::PluginManifestInvalid => 2,

        ErrorCode::PluginManifestMissing => 4,

        ErrorCode::TemplateBuildFailed
        | ErrorCode::TemplateTestFailed
        | ErrorCode::VcsCommandFailed
        | ErrorCode::PluginRunnerUnavailable => 20,

        ErrorCode::InternalIoError
        | ErrorCode::InternalJsonError => 1,
    }
}

pub fn print_json_result(result: Result<serde_json::Value>) -> Result<()> {
    match result {
        Ok(data) => print_success(data),
        Err(err) => print_response(&CliResponse::<()>::from_error(&err)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_and_precondition_errors_exit_2() {
        let err = retemplate::naming::require_valid("new_name", "123Bad").unwrap_err();
        assert_eq!(exit_code_for_error(err.code), 2);
        assert_eq!(
            exit_code_for_error(ErrorCode::TemplatePreconditionDeclined),
            2
        );
    }

    #[test]
    fn external_command_failures_exit_20() {
        assert_eq!(exit_code_for_error(ErrorCode::TemplateBuildFailed), 20);
        assert_eq!(exit_code_for_error(ErrorCode::TemplateTestFailed), 20);
        assert_eq!(exit_code_for_error(ErrorCode::VcsCommandFailed), 20);
    }

    #[test]
    fn missing_manifest_exits_4() {
        assert_eq!(exit_code_for_error(ErrorCode::PluginManifestMissing), 4);
    }

    #[test]
    fn error_envelope_carries_code_and_hints() {
        let err = Error::template_precondition_declined("src/YourLibrary");
        let json = serde_json::to_value(CliResponse::<()>::from_error(&err)).unwrap();

        assert_eq!(json["success"], false);
        assert_eq!(json["error"]["code"], "template.precondition_declined");
        assert!(json["error"]["hints"][0]["message"]
            .as_str()
            .unwrap()
            .contains("--yes"));
        assert!(json.get("data").is_none());
    }

    #[test]
    fn ok_result_keeps_command_exit_code() {
        let (value, code) = map_cmd_result_to_json(Ok((serde_json::json!({"a": 1}), 1)));
        assert_eq!(code, 1);
        assert_eq!(value.unwrap()["a"], 1);
    }
}
