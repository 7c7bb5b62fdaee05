//! Classpath command implementation
//!
//! Prints the classpath the compiler would receive, one entry per line,
//! followed by the joined form.

use anyhow::Result;
use colored::Colorize;
use std::path::Path;
use std::process::ExitCode;

use stubgen_core::{Fault, Orchestrator, OrchestratorConfig};

use crate::config::StubgenConfig;

/// Run the classpath command
pub fn run(config_path: &str) -> Result<ExitCode> {
    let config = StubgenConfig::load(Path::new(config_path))?;
    let separator = config.separator()?;

    let mut orchestrator_config = OrchestratorConfig::with_base_dir(&config.base_dir).separator(separator);
    orchestrator_config.classpath_elements = config.classpath_elements.clone();

    let classpath = match Orchestrator::with_config(orchestrator_config)
        .classpath(&config.dependency_resolver())
    {
        Ok(classpath) => classpath,
        Err(e) => {
            eprintln!("{} [{}] {}", "INVALID CLASSPATH".red().bold(), e.code(), e);
            return Ok(ExitCode::from(1));
        }
    };

    eprintln!(
        "{} {} entries",
        "Classpath:".cyan().bold(),
        classpath.len()
    );
    for entry in &classpath {
        eprintln!("  {}", entry);
    }
    println!("{}", classpath.join(separator));

    Ok(ExitCode::SUCCESS)
}
