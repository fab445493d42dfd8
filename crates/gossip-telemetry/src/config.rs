//! Telemetry configuration from environment variables.

use std::env;

/// Configuration for node logging.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TelemetryConfig {
    /// Service name attached to the startup log line
    pub service_name: String,

    /// Log level filter (trace, debug, info, warn, error) or full directive
    pub log_level: String,

    /// Whether to enable console output
    pub console_output: bool,

    /// Whether to enable JSON formatted logs
    pub json_logs: bool,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            service_name: "gossip-chain".to_string(),
            log_level: "info".to_string(),
            console_output: true,
            json_logs: false,
        }
    }
}

impl TelemetryConfig {
    /// Create configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `GC_SERVICE_NAME`: Service name (default: gossip-chain)
    /// - `GC_LOG_LEVEL` or `RUST_LOG`: Log level (default: info)
    /// - `GC_CONSOLE_OUTPUT`: Enable console output (default: true)
    /// - `GC_JSON_LOGS`: Enable JSON logs (default: false in dev, true in containers)
    pub fn from_env() -> Self {
        let is_container =
            env::var("KUBERNETES_SERVICE_HOST").is_ok() || env::var("DOCKER_CONTAINER").is_ok();

        Self {
            service_name: env::var("GC_SERVICE_NAME")
                .unwrap_or_else(|_| "gossip-chain".to_string()),

            log_level: env::var("GC_LOG_LEVEL")
                .or_else(|_| env::var("RUST_LOG"))
                .unwrap_or_else(|_| "info".to_string()),

            console_output: env::var("GC_CONSOLE_OUTPUT")
                .map(|v| !is_false(&v))
                .unwrap_or(true),

            json_logs: env::var("GC_JSON_LOGS")
                .map(|v| is_true(&v))
                .unwrap_or(is_container),
        }
    }

    /// Same configuration with a different level filter.
    pub fn with_log_level(mut self, level: impl Into<String>) -> Self {
        self.log_level = level.into();
        self
    }
}

fn is_true(value: &str) -> bool {
    value.eq_ignore_ascii_case("true") || value == "1"
}

fn is_false(value: &str) -> bool {
    value.eq_ignore_ascii_case("false") || value == "0"
}
