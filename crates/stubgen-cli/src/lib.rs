//! stubgen CLI library.
//!
//! Configuration loading, the filesystem and command-backed collaborators,
//! logging setup, and the command implementations behind the `stubgen`
//! binary.

pub mod adapters;
pub mod cli_args;
pub mod commands;
pub mod config;
pub mod logging;
