//! stubgen CLI - build-time interface stub generation
//!
//! This binary generates stubs for configured interfaces with an external
//! generator and compiles them with a single compiler run.

use clap::Parser;
use std::process::ExitCode;

use stubgen_cli::cli_args::{Cli, Commands};
use stubgen_cli::commands;
use stubgen_cli::logging::{init_logging, LoggingConfig};

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(LoggingConfig::from_env(cli.log_level.as_deref()));

    let result = match cli.command {
        Commands::Generate { config, json } => commands::generate::run(&config, json),
        Commands::Exec {
            timeout_secs,
            json,
            command,
            args,
        } => commands::exec::run(&command, &args, timeout_secs, json),
        Commands::Classpath { config } => commands::classpath::run(&config),
        Commands::Doctor { config } => commands::doctor::run(&config),
    };

    match result {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{}: {:#}", colored::Colorize::red("error"), e);
            ExitCode::from(1)
        }
    }
}
