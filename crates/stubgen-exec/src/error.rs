//! Error types for subprocess execution.

use std::time::Duration;
use thiserror::Error;

/// Result type for subprocess execution.
pub type ExecResult<T> = Result<T, ExecError>;

/// Broad classification of a failure, shared by every stubgen error type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FaultKind {
    /// Bad input detected before any process was spawned.
    Configuration,
    /// The external generator failed for a requested type.
    Generation,
    /// The external command could not be started.
    Launch,
    /// Waiting for the external command to exit failed.
    Wait,
    /// The external command outlived its deadline and was killed.
    Timeout,
    /// The compiler ran and exited with a non-zero status.
    Compiler,
}

impl FaultKind {
    /// Returns the lowercase name of this kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            FaultKind::Configuration => "configuration",
            FaultKind::Generation => "generation",
            FaultKind::Launch => "launch",
            FaultKind::Wait => "wait",
            FaultKind::Timeout => "timeout",
            FaultKind::Compiler => "compiler",
        }
    }
}

impl std::fmt::Display for FaultKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Common interface for stubgen errors.
pub trait Fault: std::error::Error {
    /// Returns a stable error code (e.g., "EXEC_001").
    fn code(&self) -> &'static str;

    /// Returns the fault classification.
    fn kind(&self) -> FaultKind;
}

/// Errors raised while running an external command.
#[derive(Debug, Error)]
pub enum ExecError {
    /// The process could not be spawned.
    #[error("Failed to launch '{command}' with arguments {args:?}: {source}")]
    SpawnFailed {
        command: String,
        args: Vec<String>,
        #[source]
        source: std::io::Error,
    },

    /// Waiting for the process to exit failed.
    #[error("Failed while waiting for command to complete: '{command}': {source}")]
    WaitFailed {
        command: String,
        #[source]
        source: std::io::Error,
    },

    /// The process did not exit before its deadline and was killed.
    #[error("Command '{command}' timed out after {:.1} seconds", .timeout.as_secs_f64())]
    Timeout { command: String, timeout: Duration },
}

impl ExecError {
    /// Returns the command this error refers to.
    pub fn command(&self) -> &str {
        match self {
            ExecError::SpawnFailed { command, .. }
            | ExecError::WaitFailed { command, .. }
            | ExecError::Timeout { command, .. } => command,
        }
    }
}

impl Fault for ExecError {
    fn code(&self) -> &'static str {
        match self {
            ExecError::SpawnFailed { .. } => "EXEC_001",
            ExecError::WaitFailed { .. } => "EXEC_002",
            ExecError::Timeout { .. } => "EXEC_003",
        }
    }

    fn kind(&self) -> FaultKind {
        match self {
            ExecError::SpawnFailed { .. } => FaultKind::Launch,
            ExecError::WaitFailed { .. } => FaultKind::Wait,
            ExecError::Timeout { .. } => FaultKind::Timeout,
        }
    }
}
