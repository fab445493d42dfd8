//! # Gossip Telemetry
//!
//! Logging setup shared by Gossip-Chain binaries.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use gossip_telemetry::{init_telemetry, TelemetryConfig};
//!
//! fn main() -> anyhow::Result<()> {
//!     init_telemetry(&TelemetryConfig::from_env())?;
//!     tracing::info!("node starting");
//!     Ok(())
//! }
//! ```
//!
//! ## Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `GC_SERVICE_NAME` | `gossip-chain` | Service name in the startup line |
//! | `GC_LOG_LEVEL` | `info` | Log level filter (`RUST_LOG` takes precedence) |
//! | `GC_JSON_LOGS` | `false` | JSON output instead of pretty |
//! | `GC_CONSOLE_OUTPUT` | `true` | Disable to silence stdout |

mod config;
mod logging;

pub use config::TelemetryConfig;
pub use logging::{build_filter, init_logging};

use thiserror::Error;

/// Telemetry initialization errors
#[derive(Error, Debug)]
pub enum TelemetryError {
    #[error("Invalid log filter: {0}")]
    Filter(String),

    #[error("Failed to install tracing subscriber: {0}")]
    SubscriberInit(String),
}

/// Initialize logging for the process.
///
/// Fails if a global subscriber is already installed.
pub fn init_telemetry(config: &TelemetryConfig) -> Result<(), TelemetryError> {
    init_logging(config)?;

    tracing::info!(
        service = %config.service_name,
        json_logs = config.json_logs,
        "Telemetry initialized"
    );
    Ok(())
}
