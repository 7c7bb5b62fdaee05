//! Structured logging setup.
//!
//! Log output goes to stderr so that `--json` reports on stdout stay
//! machine-readable. The level comes from `--log-level`, then
//! `STUBGEN_LOG_LEVEL`; `RUST_LOG` directives are honored on top.

use std::env;
use std::sync::Once;

use tracing::Level;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Environment variable selecting the log level.
pub const LOG_LEVEL_ENV: &str = "STUBGEN_LOG_LEVEL";

/// Environment variable enabling JSON log lines.
pub const LOG_JSON_ENV: &str = "STUBGEN_LOG_JSON";

const CRATES: [&str; 3] = ["stubgen_cli", "stubgen_core", "stubgen_exec"];

static INIT: Once = Once::new();

/// Configuration for logging initialization.
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Minimum level for the stubgen crates.
    pub level: Level,
    /// Emit JSON lines instead of human-readable output.
    pub use_json: bool,
    /// Include the module target in each line.
    pub include_target: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: Level::INFO,
            use_json: false,
            include_target: false,
        }
    }
}

impl LoggingConfig {
    /// Builds a configuration from an optional CLI level and the environment.
    pub fn from_env(cli_level: Option<&str>) -> Self {
        let level = cli_level
            .map(str::to_string)
            .or_else(|| env::var(LOG_LEVEL_ENV).ok())
            .map(|s| parse_level(&s))
            .unwrap_or(Level::INFO);

        let use_json = env::var(LOG_JSON_ENV)
            .ok()
            .and_then(|v| v.parse::<bool>().ok())
            .unwrap_or(false);

        Self {
            level,
            use_json,
            include_target: level >= Level::DEBUG,
        }
    }
}

/// Parses a log level name, falling back to INFO.
pub fn parse_level(level_str: &str) -> Level {
    match level_str.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" | "warning" => Level::WARN,
        "error" => Level::ERROR,
        _ => {
            eprintln!(
                "Invalid log level '{}', defaulting to INFO. Valid levels: trace, debug, info, warn, error",
                level_str
            );
            Level::INFO
        }
    }
}

/// Installs the global subscriber. Later calls are ignored.
pub fn init_logging(config: LoggingConfig) {
    INIT.call_once(|| {
        let mut filter = EnvFilter::from_default_env();
        for krate in CRATES {
            if let Ok(directive) = format!("{}={}", krate, config.level).parse() {
                filter = filter.add_directive(directive);
            }
        }

        if config.use_json {
            tracing_subscriber::registry()
                .with(filter)
                .with(
                    fmt::layer()
                        .json()
                        .with_writer(std::io::stderr)
                        .with_target(config.include_target),
                )
                .init();
        } else {
            tracing_subscriber::registry()
                .with(filter)
                .with(
                    fmt::layer()
                        .with_writer(std::io::stderr)
                        .with_target(config.include_target)
                        .without_time(),
                )
                .init();
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_level() {
        assert_eq!(parse_level("debug"), Level::DEBUG);
        assert_eq!(parse_level("WARN"), Level::WARN);
        assert_eq!(parse_level("warning"), Level::WARN);
        assert_eq!(parse_level("bogus"), Level::INFO);
    }

    #[test]
    fn test_cli_level_wins() {
        let config = LoggingConfig::from_env(Some("error"));
        assert_eq!(config.level, Level::ERROR);
        assert!(!config.include_target);

        let config = LoggingConfig::from_env(Some("trace"));
        assert!(config.include_target);
    }
}
