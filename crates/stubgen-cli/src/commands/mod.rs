//! CLI command implementations

pub mod classpath;
pub mod doctor;
pub mod exec;
pub mod generate;
pub mod json_output;
