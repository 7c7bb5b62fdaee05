//! stubgen subprocess engine
//!
//! Runs one external tool to completion and captures everything it writes,
//! without deadlocking on full pipe buffers.
//!
//! # Overview
//!
//! - [`StreamDrain`] copies one byte stream into memory on its own thread,
//!   starting immediately on construction.
//! - [`ProcessRunner`] spawns a command, attaches a drain to stdout and one to
//!   stderr *before* blocking on exit, then returns a
//!   [`ProcessExecutionResult`].
//!
//! Read failures on a captured stream never abort a run; they are rendered
//! into the affected buffer. Launch, wait and timeout failures are returned
//! as [`ExecError`].
//!
//! # Example
//!
//! ```no_run
//! use stubgen_exec::{ProcessRunner, RunnerConfig};
//!
//! let runner = ProcessRunner::with_config(RunnerConfig::default().timeout_secs(60));
//! let result = runner.run("javac", &["-version"])?;
//! println!("exit {}: {}", result.exit_status(), result.stderr_lossy());
//! # Ok::<(), stubgen_exec::ExecError>(())
//! ```

pub mod drain;
pub mod error;
pub mod runner;

pub use drain::{StreamDrain, DRAIN_BUFFER_SIZE};
pub use error::{ExecError, ExecResult, Fault, FaultKind};
pub use runner::{ProcessExecutionResult, ProcessRunner, RunnerConfig};
