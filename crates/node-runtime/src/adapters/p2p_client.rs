//! Outbound peer connections with reconnection.
//!
//! One task per peer URL. A dropped or failed connection is retried with
//! exponential backoff until the node shuts down; every successful
//! (re)connection raises `handle_peer_connected` again so the peers resync.
//! Dialing a URL that already has a loop is a no-op.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use futures_util::{SinkExt, StreamExt};
use gc_02_block_propagation::BlockReceiver;
use gossip_telemetry::log_peer_event;
use parking_lot::Mutex;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_tungstenite::connect_async_with_config;
use tokio_tungstenite::tungstenite::protocol::WebSocketConfig;
use tokio_tungstenite::tungstenite::Message as WsMessage;
use tracing::{debug, info, warn};

use super::connection::{binary_as_text, deliver_frame};
use super::peer_network::{Direction, PeerRegistry};
use crate::container::config::parse_peer_url;
use crate::container::NodeService;

/// Base delay between reconnection attempts (exponential backoff).
const RECONNECT_BASE_DELAY_SECS: u64 = 2;

/// Maximum delay between reconnection attempts.
const MAX_RECONNECT_DELAY_SECS: u64 = 60;

/// How a connection ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ConnectionEnd {
    /// Remote closed or the stream ended.
    Closed,
    /// The node is stopping.
    Shutdown,
}

/// Spawns outbound connection loops.
#[derive(Clone)]
pub struct PeerDialer {
    service: Arc<NodeService>,
    peers: Arc<PeerRegistry>,
    shutdown: watch::Receiver<bool>,
    max_frame_bytes: usize,
    /// Running connection loops, keyed by normalized URL.
    loops: Arc<Mutex<HashMap<String, JoinHandle<()>>>>,
}

impl PeerDialer {
    pub fn new(
        service: Arc<NodeService>,
        peers: Arc<PeerRegistry>,
        shutdown: watch::Receiver<bool>,
        max_frame_bytes: usize,
    ) -> Self {
        Self {
            service,
            peers,
            shutdown,
            max_frame_bytes,
            loops: Arc::default(),
        }
    }

    /// Start a connection loop for `url`.
    ///
    /// Returns false if a loop for the same URL is already running.
    pub fn dial(&self, url: String) -> bool {
        let key = dial_key(&url);
        let mut loops = self.loops.lock();
        if loops.contains_key(&key) {
            debug!(url = %url, "Already dialing peer");
            return false;
        }

        info!(url = %url, "Dialing peer");
        let dialer = self.clone();
        loops.insert(key, tokio::spawn(async move { dialer.connection_loop(url).await }));
        true
    }

    /// Number of connection loops held by the dialer.
    pub fn dialing(&self) -> usize {
        self.loops.lock().len()
    }

    /// Hand over every loop handle, for joining at shutdown.
    pub fn take_loops(&self) -> Vec<JoinHandle<()>> {
        self.loops.lock().drain().map(|(_, handle)| handle).collect()
    }

    async fn connection_loop(self, url: String) {
        let mut shutdown = self.shutdown.clone();
        let mut attempts = 0u32;

        loop {
            match self.run_connection(&url, &mut shutdown).await {
                Ok(ConnectionEnd::Shutdown) => break,
                Ok(ConnectionEnd::Closed) => {
                    debug!(url = %url, "Peer closed connection");
                    attempts = 0;
                }
                Err(e) => {
                    warn!(url = %url, attempt = attempts + 1, error = %e, "Peer connection failed");
                    attempts = attempts.saturating_add(1);
                }
            }

            if *shutdown.borrow() {
                break;
            }

            let delay = backoff_delay(attempts);
            tokio::select! {
                _ = tokio::time::sleep(delay) => {}
                _ = shutdown.changed() => break,
            }
        }

        debug!(url = %url, "Connection loop stopped");
    }

    /// Run a single WebSocket connection.
    async fn run_connection(
        &self,
        url: &str,
        shutdown: &mut watch::Receiver<bool>,
    ) -> Result<ConnectionEnd> {
        let config = socket_config(self.max_frame_bytes);
        let (ws_stream, _) = connect_async_with_config(url, Some(config), false)
            .await
            .with_context(|| format!("Failed to connect to {url}"))?;

        let (peer_id, mut outbox) = self.peers.register(url, Direction::Outbound);
        log_peer_event!(info, "Outbound peer connected", peer_id, addr = %url);
        self.service.handle_peer_connected(peer_id);

        let (mut write, mut read) = ws_stream.split();

        let end = loop {
            tokio::select! {
                frame = outbox.recv() => {
                    let Some(frame) = frame else { break Ok(ConnectionEnd::Closed) };
                    if let Err(e) = write.send(WsMessage::Text(frame.into())).await {
                        break Err(e).context("Failed to send frame");
                    }
                }
                incoming = read.next() => match incoming {
                    Some(Ok(WsMessage::Text(text))) => {
                        deliver_frame(self.service.as_ref(), peer_id, text.as_str());
                    }
                    Some(Ok(WsMessage::Binary(data))) => {
                        if let Some(text) = binary_as_text(&data) {
                            deliver_frame(self.service.as_ref(), peer_id, text);
                        }
                    }
                    Some(Ok(WsMessage::Ping(data))) => {
                        let _ = write.send(WsMessage::Pong(data)).await;
                    }
                    Some(Ok(WsMessage::Close(_))) | None => break Ok(ConnectionEnd::Closed),
                    Some(Ok(_)) => {}
                    Some(Err(e)) => break Err(e).context("Failed to read frame"),
                },
                _ = shutdown.changed() => {
                    let _ = write.send(WsMessage::Close(None)).await;
                    break Ok(ConnectionEnd::Shutdown);
                }
            }
        };

        self.peers.remove(peer_id);
        log_peer_event!(info, "Outbound peer disconnected", peer_id, addr = %url);
        end
    }
}

/// Messages over `max_frame_bytes` fail the read instead of being buffered.
pub fn socket_config(max_frame_bytes: usize) -> WebSocketConfig {
    WebSocketConfig::default()
        .max_message_size(Some(max_frame_bytes))
        .max_frame_size(Some(max_frame_bytes))
}

/// Equivalent spellings of a URL share one loop.
fn dial_key(url: &str) -> String {
    parse_peer_url(url)
        .map(|parsed| parsed.to_string())
        .unwrap_or_else(|_| url.to_string())
}

/// Calculate exponential backoff delay.
fn backoff_delay(attempts: u32) -> Duration {
    let secs = std::cmp::min(
        RECONNECT_BASE_DELAY_SECS.saturating_mul(1 << attempts.min(6)),
        MAX_RECONNECT_DELAY_SECS,
    );
    Duration::from_secs(secs)
}
