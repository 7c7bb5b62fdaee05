//! Doctor command implementation
//!
//! Checks that the external tools a project needs can be found.

use anyhow::Result;
use colored::Colorize;
use std::path::Path;
use std::process::ExitCode;

use stubgen_exec::{ProcessRunner, RunnerConfig};

use crate::config::{locate_compiler, StubgenConfig, JAVA_HOME_ENV};

/// Run the doctor command
///
/// Checks:
/// - Configuration file (optional)
/// - Java compiler
/// - Generator command (when configured)
///
/// # Returns
/// Exit code: 0 if all checks pass, 1 if any fail
pub fn run(config_path: &str) -> Result<ExitCode> {
    println!("{}", "stubgen doctor".cyan().bold());
    println!("{}", "==============".cyan());
    println!();

    let mut all_ok = true;

    println!("{}", "Versions:".bold());
    println!(
        "  {} stubgen-cli v{}",
        "->".green(),
        env!("CARGO_PKG_VERSION")
    );
    println!();

    println!("{}", "Configuration:".bold());
    let config = if Path::new(config_path).exists() {
        match StubgenConfig::load(Path::new(config_path)) {
            Ok(config) => {
                println!("  {} {} ({} interfaces)", "ok".green(), config_path, config.interfaces.len());
                Some(config)
            }
            Err(e) => {
                println!("  {} {:#}", "!!".red(), e);
                all_ok = false;
                None
            }
        }
    } else {
        println!("  {} {} not found, checking defaults", "--".yellow(), config_path);
        None
    };
    println!();

    println!("{}", "Dependencies:".bold());
    let compiler = match config {
        Some(ref config) => config.locate_compiler(),
        None => locate_compiler(None, std::env::var_os(JAVA_HOME_ENV).map(Into::into)),
    };
    match compiler {
        Ok(path) => {
            let version = tool_version(&path, &["-version"]);
            println!(
                "  {} compiler {} {}",
                "ok".green(),
                path,
                version.unwrap_or_default().dimmed()
            );
        }
        Err(e) => {
            println!("  {} {}", "!!".red(), e);
            all_ok = false;
        }
    }

    if let Some(generator) = config.as_ref().and_then(|c| c.generator.as_ref()) {
        match which::which(&generator.command) {
            Ok(path) => println!("  {} generator {}", "ok".green(), path.display()),
            Err(_) if Path::new(&generator.command).is_file() => {
                println!("  {} generator {}", "ok".green(), generator.command)
            }
            Err(e) => {
                println!("  {} generator '{}': {}", "!!".red(), generator.command, e);
                all_ok = false;
            }
        }
    }

    println!();

    if all_ok {
        println!("{} All checks passed!", "SUCCESS".green().bold());
        Ok(ExitCode::SUCCESS)
    } else {
        println!(
            "{} Some checks failed. See above for details.",
            "WARNING".yellow().bold()
        );
        Ok(ExitCode::from(1))
    }
}

/// Runs `tool args` briefly and returns the first line it printed.
fn tool_version(tool: &str, args: &[&str]) -> Option<String> {
    let result = ProcessRunner::with_config(RunnerConfig::default().timeout_secs(10))
        .run(tool, args)
        .ok()?;
    // javac prints its version to stderr on older JDKs.
    [result.stdout_lossy(), result.stderr_lossy()]
        .into_iter()
        .find_map(|out| out.lines().next().map(|l| l.trim().to_string()))
        .filter(|l| !l.is_empty())
}
