//! # Node Configuration
//!
//! Runtime parameters for one Gossip-Chain node.
//!
//! Values come from the environment (`NodeConfig::from_env`) and may then be
//! overridden from the command line. `validate` must pass before the node
//! binds any socket.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::time::Duration;

use thiserror::Error;
use url::Url;

/// Default HTTP control port.
pub const DEFAULT_HTTP_PORT: u16 = 3001;

/// Default P2P WebSocket port.
pub const DEFAULT_P2P_PORT: u16 = 6001;

/// Default interval between QUERY_LATEST broadcasts.
pub const DEFAULT_SYNC_INTERVAL_SECS: u64 = 30;

/// Largest inbound peer frame accepted (1 MiB).
pub const DEFAULT_MAX_FRAME_BYTES: usize = 1024 * 1024;

/// Complete node configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NodeConfig {
    /// Network configuration.
    pub network: NetworkConfig,
    /// Periodic sync configuration.
    pub sync: SyncConfig,
}

impl NodeConfig {
    /// Load configuration from the process environment.
    ///
    /// # Environment Variables
    ///
    /// - `HTTP_PORT`: control API port (default: 3001)
    /// - `P2P_PORT`: peer WebSocket port (default: 6001)
    /// - `PEERS`: comma separated `ws://` URLs to dial at startup
    /// - `GC_BIND_ADDR`: listen address for both servers (default: 0.0.0.0)
    /// - `GC_SYNC_INTERVAL_SECS`: periodic QUERY_LATEST interval, 0 disables (default: 30)
    /// - `GC_MAX_FRAME_BYTES`: inbound frame limit (default: 1048576)
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(port) = parse_var(&lookup, "HTTP_PORT")? {
            config.network.http_port = port;
        }
        if let Some(port) = parse_var(&lookup, "P2P_PORT")? {
            config.network.p2p_port = port;
        }
        if let Some(addr) = parse_var(&lookup, "GC_BIND_ADDR")? {
            config.network.bind_addr = addr;
        }
        if let Some(limit) = parse_var(&lookup, "GC_MAX_FRAME_BYTES")? {
            config.network.max_frame_bytes = limit;
        }
        if let Some(peers) = lookup("PEERS") {
            config.network.peers = parse_peer_list(&peers);
        }
        if let Some(secs) = parse_var(&lookup, "GC_SYNC_INTERVAL_SECS")? {
            config.sync.interval_secs = secs;
        }

        Ok(config)
    }

    /// Check the configuration before startup.
    ///
    /// # Returns
    ///
    /// Returns `Err` if:
    /// - HTTP and P2P ports are equal (port 0 is exempt, it means "any")
    /// - a peer URL is not a `ws://host[:port][/path]` URL
    /// - the frame limit is zero
    pub fn validate(&self) -> Result<(), ConfigError> {
        let net = &self.network;
        if net.http_port != 0 && net.http_port == net.p2p_port {
            return Err(ConfigError::PortConflict(net.http_port));
        }
        if net.max_frame_bytes == 0 {
            return Err(ConfigError::InvalidValue {
                key: "GC_MAX_FRAME_BYTES",
                value: "0".to_string(),
            });
        }
        for peer in &net.peers {
            validate_peer_url(peer)?;
        }
        Ok(())
    }
}

/// Configuration errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("HTTP and P2P ports must differ (both set to {0})")]
    PortConflict(u16),

    #[error("Invalid peer URL {0:?}: expected ws://host[:port][/path]")]
    InvalidPeerUrl(String),

    #[error("Invalid value for {key}: {value:?}")]
    InvalidValue { key: &'static str, value: String },
}

/// Network configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetworkConfig {
    /// Listen address for both servers.
    pub bind_addr: IpAddr,
    /// HTTP control API port.
    pub http_port: u16,
    /// P2P WebSocket port.
    pub p2p_port: u16,
    /// Peers dialled at startup.
    pub peers: Vec<String>,
    /// Inbound frames larger than this are dropped.
    pub max_frame_bytes: usize,
}

impl NetworkConfig {
    pub fn http_addr(&self) -> SocketAddr {
        SocketAddr::new(self.bind_addr, self.http_port)
    }

    pub fn p2p_addr(&self) -> SocketAddr {
        SocketAddr::new(self.bind_addr, self.p2p_port)
    }
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            bind_addr: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            http_port: DEFAULT_HTTP_PORT,
            p2p_port: DEFAULT_P2P_PORT,
            peers: Vec::new(),
            max_frame_bytes: DEFAULT_MAX_FRAME_BYTES,
        }
    }
}

/// Periodic sync configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncConfig {
    /// Seconds between QUERY_LATEST broadcasts; 0 disables.
    pub interval_secs: u64,
}

impl SyncConfig {
    pub fn interval(&self) -> Option<Duration> {
        (self.interval_secs > 0).then(|| Duration::from_secs(self.interval_secs))
    }
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            interval_secs: DEFAULT_SYNC_INTERVAL_SECS,
        }
    }
}

/// Split a comma separated peer list, dropping empty entries.
pub fn parse_peer_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Parse a peer URL of the form `ws://host[:port][/path]`.
///
/// Credentials, query strings and fragments are rejected.
pub fn parse_peer_url(raw: &str) -> Result<Url, ConfigError> {
    let invalid = || ConfigError::InvalidPeerUrl(raw.to_string());

    let url = Url::parse(raw).map_err(|_| invalid())?;
    if url.scheme() != "ws" {
        return Err(invalid());
    }
    if url.host_str().map_or(true, str::is_empty) {
        return Err(invalid());
    }
    if !url.username().is_empty()
        || url.password().is_some()
        || url.query().is_some()
        || url.fragment().is_some()
    {
        return Err(invalid());
    }
    Ok(url)
}

/// Check a peer URL without keeping the parsed form.
pub fn validate_peer_url(raw: &str) -> Result<(), ConfigError> {
    parse_peer_url(raw).map(|_| ())
}

fn parse_var<F, T>(lookup: &F, key: &'static str) -> Result<Option<T>, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    match lookup(key) {
        None => Ok(None),
        Some(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::InvalidValue { key, value: raw }),
    }
}
