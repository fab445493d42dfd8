//! # Gossip-Chain Node
//!
//! Runs one ledger node: an HTTP control API and a WebSocket P2P endpoint.
//!
//! Configuration is read from the environment first, then overridden by
//! command-line flags (see `--help`).

use std::net::IpAddr;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use gossip_telemetry::{init_telemetry, TelemetryConfig};
use tracing::info;

use node_runtime::container::config::parse_peer_list;
use node_runtime::{NodeConfig, NodeRuntime};

/// Command-line overrides for the environment configuration.
#[derive(Debug, Parser)]
#[command(name = "gossip-node", version, about = "Gossip-Chain ledger node")]
struct Args {
    /// HTTP control API port [env: HTTP_PORT]
    #[arg(long)]
    http_port: Option<u16>,

    /// P2P WebSocket port [env: P2P_PORT]
    #[arg(long)]
    p2p_port: Option<u16>,

    /// Comma separated ws:// peer URLs [env: PEERS]
    #[arg(long)]
    peers: Option<String>,

    /// Listen address for both servers [env: GC_BIND_ADDR]
    #[arg(long)]
    bind: Option<IpAddr>,

    /// Seconds between QUERY_LATEST broadcasts, 0 disables [env: GC_SYNC_INTERVAL_SECS]
    #[arg(long)]
    sync_interval: Option<u64>,

    /// Log filter, e.g. `debug` or `gc_02_block_propagation=trace` [env: GC_LOG_LEVEL]
    #[arg(long)]
    log_level: Option<String>,
}

impl Args {
    fn apply(&self, config: &mut NodeConfig) {
        if let Some(port) = self.http_port {
            config.network.http_port = port;
        }
        if let Some(port) = self.p2p_port {
            config.network.p2p_port = port;
        }
        if let Some(peers) = &self.peers {
            config.network.peers = parse_peer_list(peers);
        }
        if let Some(addr) = self.bind {
            config.network.bind_addr = addr;
        }
        if let Some(secs) = self.sync_interval {
            config.sync.interval_secs = secs;
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let mut telemetry = TelemetryConfig::from_env();
    if let Some(level) = &args.log_level {
        telemetry = telemetry.with_log_level(level.clone());
    }
    init_telemetry(&telemetry).context("Failed to initialize logging")?;

    let mut config = NodeConfig::from_env().context("Invalid environment configuration")?;
    args.apply(&mut config);

    let runtime = NodeRuntime::new(config).context("Invalid node configuration")?;
    runtime.start().await?;

    info!("Node is running. Press Ctrl+C to stop.");
    tokio::signal::ctrl_c()
        .await
        .context("Failed to listen for Ctrl+C")?;

    runtime.shutdown(Duration::from_secs(5)).await;
    Ok(())
}
