//! JSON output types for machine-readable CLI output.
//!
//! Used by the `--json` flag on `generate` and `exec`.

use serde::{Deserialize, Serialize};
use stubgen_core::{BuildReport, Fault, ProcessExecutionResult};

/// Error codes for failures outside the library error taxonomy.
pub mod error_codes {
    /// Configuration file could not be loaded or is incomplete
    pub const CONFIG: &str = "CLI_001";
    /// JSON serialization error
    pub const JSON_SERIALIZE: &str = "CLI_002";
}

/// A structured error in JSON output.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct JsonError {
    /// Stable error code (e.g. "STUBGEN_008", "EXEC_003")
    pub code: String,
    /// Fault category
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    /// Human-readable error message
    pub message: String,
}

impl JsonError {
    /// Creates an error with a code and message.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            kind: None,
            message: message.into(),
        }
    }

    /// Creates an error from a library fault.
    pub fn from_fault<F: Fault + ?Sized>(fault: &F) -> Self {
        Self {
            code: fault.code().to_string(),
            kind: Some(fault.kind().to_string()),
            message: fault.to_string(),
        }
    }
}

/// Captured output of one process.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct JsonProcessOutput {
    pub exit_status: i32,
    pub stdout: String,
    pub stderr: String,
}

impl From<&ProcessExecutionResult> for JsonProcessOutput {
    fn from(result: &ProcessExecutionResult) -> Self {
        Self {
            exit_status: result.exit_status(),
            stdout: result.stdout_lossy(),
            stderr: result.stderr_lossy(),
        }
    }
}

/// Output of `stubgen generate --json`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct GenerateOutput {
    pub success: bool,
    pub classpath: Vec<String>,
    pub generated_files: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub compiler_command: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub compiler_output: Option<JsonProcessOutput>,
    pub warnings: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<JsonError>,
    pub duration_ms: u64,
}

impl GenerateOutput {
    /// Builds a success report.
    pub fn from_report(report: &BuildReport, duration_ms: u64) -> Self {
        Self {
            success: true,
            classpath: report.classpath.to_strings(),
            generated_files: report
                .generated_files
                .iter()
                .map(|p| p.display().to_string())
                .collect(),
            compiler_command: report.invocation.as_ref().map(|inv| {
                std::iter::once(inv.command().to_string())
                    .chain(inv.args().iter().cloned())
                    .collect()
            }),
            compiler_output: report.compiler_output.as_ref().map(JsonProcessOutput::from),
            warnings: report.warnings.clone(),
            error: None,
            duration_ms,
        }
    }

    /// Builds a failure report.
    pub fn failure(error: JsonError, duration_ms: u64) -> Self {
        Self {
            success: false,
            error: Some(error),
            duration_ms,
            ..Default::default()
        }
    }
}

/// Output of `stubgen exec --json`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ExecOutput {
    pub command: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<JsonProcessOutput>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<JsonError>,
    pub duration_ms: u64,
}

/// Serializes `value` as pretty JSON.
pub fn to_json<T: Serialize>(value: &T) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|e| {
        format!(
            r#"{{"success": false, "error": {{"code": "{}", "message": "{}"}}}}"#,
            error_codes::JSON_SERIALIZE,
            e.to_string().replace('"', "'")
        )
    })
}
