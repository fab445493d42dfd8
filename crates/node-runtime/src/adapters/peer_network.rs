//! # Peer Registry
//!
//! Implements the `PeerNetwork` port for the propagation service.
//!
//! Each live connection owns an unbounded outbox. Sends encode the message
//! once and push the text frame onto the outbox, so they never wait on a
//! socket. The connection's own loop drains the outbox into its socket and
//! removes the entry when the connection ends.

use std::collections::HashMap;

use gc_02_block_propagation::{PeerNetwork, PropagationError};
use parking_lot::RwLock;
use serde::Serialize;
use shared_types::{Message, PeerId};
use tokio::sync::mpsc;
use tracing::{debug, warn};

/// Receiving side of a peer's outbox.
pub type Outbox = mpsc::UnboundedReceiver<String>;

/// Who opened the connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// The peer dialled our P2P server.
    Inbound,
    /// We dialled the peer.
    Outbound,
}

/// Public view of a connected peer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PeerInfo {
    pub id: PeerId,
    pub addr: String,
    pub direction: Direction,
}

struct PeerEntry {
    info: PeerInfo,
    outbox: mpsc::UnboundedSender<String>,
}

/// Registry of connected peers.
#[derive(Default)]
pub struct PeerRegistry {
    peers: RwLock<HashMap<PeerId, PeerEntry>>,
}

impl PeerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a connection and hand back its id and outbox receiver.
    pub fn register(&self, addr: impl Into<String>, direction: Direction) -> (PeerId, Outbox) {
        let id = PeerId::new();
        let (tx, rx) = mpsc::unbounded_channel();
        let info = PeerInfo {
            id,
            addr: addr.into(),
            direction,
        };

        debug!(peer_id = %id, addr = %info.addr, ?direction, "Registering peer");
        self.peers.write().insert(id, PeerEntry { info, outbox: tx });
        (id, rx)
    }

    /// Drop a connection. Unknown ids are ignored.
    pub fn remove(&self, id: PeerId) -> Option<PeerInfo> {
        self.peers.write().remove(&id).map(|entry| entry.info)
    }

    /// Snapshot of connected peers.
    pub fn list(&self) -> Vec<PeerInfo> {
        let mut peers: Vec<PeerInfo> = self
            .peers
            .read()
            .values()
            .map(|entry| entry.info.clone())
            .collect();
        peers.sort_by(|a, b| a.addr.cmp(&b.addr));
        peers
    }

    pub fn len(&self) -> usize {
        self.peers.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.peers.read().is_empty()
    }
}

impl PeerNetwork for PeerRegistry {
    fn send_to_peer(&self, peer_id: PeerId, message: &Message) -> Result<(), PropagationError> {
        let frame = message.encode()?;
        let peers = self.peers.read();
        let entry = peers
            .get(&peer_id)
            .ok_or(PropagationError::UnknownPeer(peer_id))?;

        entry
            .outbox
            .send(frame)
            .map_err(|_| PropagationError::NetworkError(format!("outbox closed for {peer_id}")))
    }

    fn broadcast(&self, message: &Message) -> usize {
        let frame = match message.encode() {
            Ok(frame) => frame,
            Err(e) => {
                warn!(kind = message.kind(), error = %e, "Failed to encode broadcast");
                return 0;
            }
        };

        self.peers
            .read()
            .values()
            .filter(|entry| entry.outbox.send(frame.clone()).is_ok())
            .count()
    }
}
