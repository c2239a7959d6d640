//! Logging setup.
//!
//! The library only emits `tracing` events; embedders call [`init`] once (or
//! install their own subscriber) to see them. The `MFS_LOG` environment
//! variable, in `EnvFilter` syntax, overrides the configured level.

use crate::error::{Error, Result};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Environment variable holding an `EnvFilter` directive string.
pub const LOG_ENV: &str = "MFS_LOG";

/// Output format of log lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

impl LogFormat {
    pub fn parse(s: &str) -> Result<Self> {
        match s {
            "text" => Ok(LogFormat::Text),
            "json" => Ok(LogFormat::Json),
            _ => Err(Error::invalid_params(format!("Unknown log format: {}", s))),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Log level: trace, debug, info, warn, error, off
    pub level: String,
    pub format: LogFormat,
    /// Colored output (text format only)
    pub color: bool,
    /// Module-specific levels, e.g. `("mfs_core::shard", "trace")`
    pub modules: Vec<(String, String)>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Text,
            color: true,
            modules: Vec::new(),
        }
    }
}

/// Build the event filter: `MFS_LOG` if set, otherwise the config.
pub fn build_env_filter(config: &LoggingConfig) -> Result<EnvFilter> {
    if let Ok(filter) = EnvFilter::try_from_env(LOG_ENV) {
        return Ok(filter);
    }

    let mut filter = EnvFilter::try_new(&config.level)
        .map_err(|e| Error::invalid_params(format!("Invalid log level: {}", e)))?;

    for (module, level) in &config.modules {
        let directive = format!("{}={}", module, level);
        filter = filter.add_directive(
            directive
                .parse()
                .map_err(|e| Error::invalid_params(format!("Invalid log directive: {}", e)))?,
        );
    }

    Ok(filter)
}

/// Install a global stderr subscriber.
///
/// Fails if a global subscriber is already set.
pub fn init(config: &LoggingConfig) -> Result<()> {
    let filter = build_env_filter(config)?;
    let registry = tracing_subscriber::registry().with(filter);

    let result = match config.format {
        LogFormat::Json => registry
            .with(
                fmt::layer()
                    .json()
                    .with_target(true)
                    .with_writer(std::io::stderr),
            )
            .try_init(),
        LogFormat::Text => registry
            .with(
                fmt::layer()
                    .with_target(true)
                    .with_ansi(config.color)
                    .with_writer(std::io::stderr),
            )
            .try_init(),
    };

    result.map_err(|e| Error::invalid_params(format!("Logging already initialized: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_parse() {
        assert_eq!(LogFormat::parse("json").unwrap(), LogFormat::Json);
        assert_eq!(LogFormat::parse("text").unwrap(), LogFormat::Text);
        assert!(LogFormat::parse("xml").is_err());
    }

    #[test]
    fn test_filter_with_modules() {
        let config = LoggingConfig {
            level: "warn".to_string(),
            modules: vec![("mfs_core::shard".to_string(), "trace".to_string())],
            ..LoggingConfig::default()
        };
        assert!(build_env_filter(&config).is_ok());
    }

    #[test]
    fn test_filter_rejects_bad_directive() {
        let config = LoggingConfig {
            modules: vec![("mfs_core".to_string(), "loud".to_string())],
            ..LoggingConfig::default()
        };
        if std::env::var(LOG_ENV).is_err() {
            assert!(build_env_filter(&config).is_err());
        }
    }
}
