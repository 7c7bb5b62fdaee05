//! Error types for stub generation and compilation.

use std::path::PathBuf;
use stubgen_exec::{ExecError, Fault, FaultKind, ProcessExecutionResult};
use thiserror::Error;

use crate::invocation::CompilerInvocation;

/// Result type for stubgen operations.
pub type StubgenResult<T> = Result<T, StubgenError>;

/// Errors that can occur while generating and compiling stubs.
#[derive(Debug, Error)]
pub enum StubgenError {
    /// A requested interface type could not be resolved.
    #[error("Class not found: {name}")]
    TypeNotFound { name: String },

    /// A classpath entry is not a well-formed location.
    #[error("Malformed classpath entry '{entry}': {reason}")]
    MalformedClasspathEntry { entry: String, reason: String },

    /// A path handed to the compiler is not valid UTF-8.
    #[error("Path is not valid UTF-8: {}", .path.display())]
    NonUtf8Path { path: PathBuf },

    /// An output directory is missing and could not be created.
    #[error("Could not create output directory {}: {source}", .path.display())]
    OutputDirectory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Dependency resolution failed.
    #[error("Dependency resolution failed: {message}")]
    DependencyResolution { message: String },

    /// Compiler settings could not be read.
    #[error("Failed to read compiler settings from {}: {message}", .path.display())]
    CompilerSettings { path: PathBuf, message: String },

    /// The external generator failed for a type.
    #[error("Generating stubs for '{type_name}' failed: {message}")]
    Generation { type_name: String, message: String },

    /// Running an external command failed before it could report a status.
    #[error(transparent)]
    Exec(#[from] ExecError),

    /// The compiler exited with a non-zero status.
    #[error(
        "Compilation of generated sources failed: '{command} {}' exited with status {exit_status}\nstderr:\n{}\nstdout:\n{}",
        .args.join(" "),
        String::from_utf8_lossy(.stderr),
        String::from_utf8_lossy(.stdout)
    )]
    CompilerFailed {
        command: String,
        args: Vec<String>,
        exit_status: i32,
        stdout: Vec<u8>,
        stderr: Vec<u8>,
    },
}

impl StubgenError {
    /// Creates a new malformed classpath entry error.
    pub fn malformed_entry(entry: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::MalformedClasspathEntry {
            entry: entry.into(),
            reason: reason.into(),
        }
    }

    /// Creates a new generation error.
    pub fn generation(type_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Generation {
            type_name: type_name.into(),
            message: message.into(),
        }
    }

    /// Creates a new dependency resolution error.
    pub fn dependency_resolution(message: impl Into<String>) -> Self {
        Self::DependencyResolution {
            message: message.into(),
        }
    }

    /// Creates a compiler failure from the invocation and its captured output.
    pub fn compiler_failed(invocation: &CompilerInvocation, result: ProcessExecutionResult) -> Self {
        let (exit_status, stdout, stderr) = result.into_parts();
        Self::CompilerFailed {
            command: invocation.command().to_string(),
            args: invocation.args().to_vec(),
            exit_status,
            stdout,
            stderr,
        }
    }
}

impl Fault for StubgenError {
    fn code(&self) -> &'static str {
        match self {
            StubgenError::TypeNotFound { .. } => "STUBGEN_001",
            StubgenError::MalformedClasspathEntry { .. } => "STUBGEN_002",
            StubgenError::NonUtf8Path { .. } => "STUBGEN_003",
            StubgenError::OutputDirectory { .. } => "STUBGEN_004",
            StubgenError::DependencyResolution { .. } => "STUBGEN_005",
            StubgenError::CompilerSettings { .. } => "STUBGEN_006",
            StubgenError::Generation { .. } => "STUBGEN_007",
            StubgenError::Exec(e) => e.code(),
            StubgenError::CompilerFailed { .. } => "STUBGEN_008",
        }
    }

    fn kind(&self) -> FaultKind {
        match self {
            StubgenError::TypeNotFound { .. }
            | StubgenError::MalformedClasspathEntry { .. }
            | StubgenError::NonUtf8Path { .. }
            | StubgenError::OutputDirectory { .. }
            | StubgenError::DependencyResolution { .. }
            | StubgenError::CompilerSettings { .. } => FaultKind::Configuration,
            StubgenError::Generation { .. } => FaultKind::Generation,
            StubgenError::Exec(e) => e.kind(),
            StubgenError::CompilerFailed { .. } => FaultKind::Compiler,
        }
    }
}
