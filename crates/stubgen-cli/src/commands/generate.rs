//! Generate command implementation
//!
//! Loads the project configuration, runs the generator for every configured
//! interface, and compiles the result.

use anyhow::{anyhow, Context, Result};
use colored::Colorize;
use std::path::Path;
use std::process::ExitCode;
use std::time::Instant;

use stubgen_core::{Fault, Orchestrator};

use super::json_output::{error_codes, to_json, GenerateOutput, JsonError};
use crate::adapters::{ClasspathTypeResolver, CommandGenerator};
use crate::config::StubgenConfig;

/// Run the generate command
///
/// # Arguments
/// * `config_path` - Path to the project configuration file
/// * `json_output` - Whether to output a machine-readable JSON report
///
/// # Returns
/// Exit code: 0 on success, 1 on any failure
pub fn run(config_path: &str, json_output: bool) -> Result<ExitCode> {
    let start = Instant::now();

    let prepared = prepare(config_path);
    let (orchestrator, resolver, generator, dependencies) = match prepared {
        Ok(parts) => parts,
        Err(e) if json_output => {
            let out = GenerateOutput::failure(
                JsonError::new(error_codes::CONFIG, format!("{:#}", e)),
                elapsed_ms(start),
            );
            println!("{}", to_json(&out));
            return Ok(ExitCode::from(1));
        }
        Err(e) => return Err(e),
    };

    if !json_output {
        println!("{} {}", "Config:".cyan().bold(), config_path);
        println!(
            "{} {}",
            "Interfaces:".cyan().bold(),
            orchestrator.config().interfaces.len()
        );
        println!(
            "{} {}",
            "Compiler:".cyan().bold(),
            orchestrator.config().compiler
        );
    }

    let outcome = orchestrator.run(&resolver, &generator, &dependencies);
    let duration_ms = elapsed_ms(start);

    if json_output {
        let (out, code) = match outcome {
            Ok(ref report) => (GenerateOutput::from_report(report, duration_ms), ExitCode::SUCCESS),
            Err(ref e) => (
                GenerateOutput::failure(JsonError::from_fault(e), duration_ms),
                ExitCode::from(1),
            ),
        };
        println!("{}", to_json(&out));
        return Ok(code);
    }

    match outcome {
        Ok(report) => {
            for warning in &report.warnings {
                println!("{} {}", "warning:".yellow().bold(), warning.trim_end());
            }
            if report.compiled() {
                println!(
                    "\n{} Generated and compiled {} files ({} ms)",
                    "SUCCESS".green().bold(),
                    report.generated_files.len(),
                    duration_ms
                );
            } else {
                println!(
                    "\n{} Nothing to compile ({} ms)",
                    "SUCCESS".green().bold(),
                    duration_ms
                );
            }
            Ok(ExitCode::SUCCESS)
        }
        Err(e) => {
            println!(
                "\n{} [{}] {}",
                "GENERATION FAILED".red().bold(),
                e.code(),
                e
            );
            Ok(ExitCode::from(1))
        }
    }
}

type Prepared = (
    Orchestrator,
    ClasspathTypeResolver,
    CommandGenerator,
    stubgen_core::StaticDependencyResolver,
);

fn prepare(config_path: &str) -> Result<Prepared> {
    let config = StubgenConfig::load(Path::new(config_path))?;
    let generator_config = config
        .generator
        .as_ref()
        .ok_or_else(|| anyhow!("No generator configured in {}", config_path))?;

    let orchestrator_config = config
        .orchestrator_config()
        .with_context(|| format!("Invalid configuration in {}", config_path))?;

    let resolver = ClasspathTypeResolver::new(orchestrator_config.resolved_source_root())
        .assume_exists(config.assume_types_exist);
    let generator = CommandGenerator::from_config(generator_config).timeout(config.timeout());

    Ok((
        Orchestrator::with_config(orchestrator_config),
        resolver,
        generator,
        config.dependency_resolver(),
    ))
}

fn elapsed_ms(start: Instant) -> u64 {
    start.elapsed().as_millis() as u64
}
