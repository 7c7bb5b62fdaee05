//! Exec command implementation
//!
//! Runs a single command through the process runner and reports its exit
//! status and both output streams. Useful for checking how a tool behaves
//! under capture before wiring it into a project.

use anyhow::Result;
use colored::Colorize;
use std::io::Write;
use std::process::ExitCode;
use std::time::Instant;

use stubgen_exec::{Fault, ProcessRunner, RunnerConfig};

use super::json_output::{to_json, ExecOutput, JsonError, JsonProcessOutput};

/// Run the exec command
///
/// # Arguments
/// * `command` - Program to run
/// * `args` - Arguments passed verbatim
/// * `timeout_secs` - Optional deadline
/// * `json_output` - Whether to output a machine-readable JSON report
///
/// # Returns
/// The child's exit status when it fits in an exit code, otherwise 1
pub fn run(
    command: &str,
    args: &[String],
    timeout_secs: Option<u64>,
    json_output: bool,
) -> Result<ExitCode> {
    let mut config = RunnerConfig::default();
    if let Some(secs) = timeout_secs {
        config = config.timeout_secs(secs);
    }

    let start = Instant::now();
    let outcome = ProcessRunner::with_config(config).run(command, args);
    let duration_ms = start.elapsed().as_millis() as u64;

    if json_output {
        let command_line = std::iter::once(command.to_string())
            .chain(args.iter().cloned())
            .collect();
        let (out, code) = match outcome {
            Ok(ref result) => (
                ExecOutput {
                    command: command_line,
                    result: Some(JsonProcessOutput::from(result)),
                    error: None,
                    duration_ms,
                },
                exit_code(result.exit_status()),
            ),
            Err(ref e) => (
                ExecOutput {
                    command: command_line,
                    result: None,
                    error: Some(JsonError::from_fault(e)),
                    duration_ms,
                },
                ExitCode::from(1),
            ),
        };
        println!("{}", to_json(&out));
        return Ok(code);
    }

    match outcome {
        Ok(result) => {
            std::io::stdout().write_all(result.stdout())?;
            std::io::stderr().write_all(result.stderr())?;
            let status = result.exit_status();
            let label = if result.success() {
                "exit status".dimmed()
            } else {
                "exit status".red()
            };
            eprintln!("{} {} ({} ms)", label, status, duration_ms);
            Ok(exit_code(status))
        }
        Err(e) => {
            eprintln!("{} [{}] {}", "EXEC FAILED".red().bold(), e.code(), e);
            Ok(ExitCode::from(1))
        }
    }
}

/// Maps a child status onto a process exit code.
pub fn exit_code(status: i32) -> ExitCode {
    match u8::try_from(status) {
        Ok(code) => ExitCode::from(code),
        Err(_) => ExitCode::from(1),
    }
}
