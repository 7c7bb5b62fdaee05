//! CLI argument definitions for the stubgen command-line interface.
//!
//! All `#[derive(Parser)]` and `#[derive(Subcommand)]` types are defined here,
//! keeping `main.rs` focused on dispatch logic.

use clap::{Parser, Subcommand};

use crate::config::DEFAULT_CONFIG_FILE;

/// stubgen - generate and compile interface stubs at build time
#[derive(Parser, Debug)]
#[command(name = "stubgen")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Log level (trace, debug, info, warn, error); overrides STUBGEN_LOG_LEVEL
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Generate stubs for the configured interfaces and compile them
    Generate {
        /// Path to the project configuration file
        #[arg(short, long, default_value = DEFAULT_CONFIG_FILE)]
        config: String,

        /// Output a machine-readable JSON report (no colored output)
        #[arg(long)]
        json: bool,
    },

    /// Run one command with both output streams captured
    Exec {
        /// Kill the command after this many seconds
        #[arg(long)]
        timeout_secs: Option<u64>,

        /// Output a machine-readable JSON report (no colored output)
        #[arg(long)]
        json: bool,

        /// Command to run
        command: String,

        /// Arguments passed to the command verbatim
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        args: Vec<String>,
    },

    /// Print the classpath the compiler would receive
    Classpath {
        /// Path to the project configuration file
        #[arg(short, long, default_value = DEFAULT_CONFIG_FILE)]
        config: String,
    },

    /// Check that the compiler and generator can be found
    Doctor {
        /// Path to the project configuration file
        #[arg(short, long, default_value = DEFAULT_CONFIG_FILE)]
        config: String,
    },
}
