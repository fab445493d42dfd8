//! Outbound ports (SPI) for Block Propagation subsystem.

use std::time::{SystemTime, UNIX_EPOCH};

use crate::events::PropagationError;
use shared_types::{Message, PeerId};

/// Peer network interface for P2P communication.
///
/// Implementations must not block: sends enqueue onto a per-peer outbox and
/// return immediately. The service calls these only after releasing the
/// ledger lock.
pub trait PeerNetwork: Send + Sync {
    /// Send message to a specific peer.
    fn send_to_peer(&self, peer_id: PeerId, message: &Message) -> Result<(), PropagationError>;

    /// Send message to every connected peer, skipping unreachable ones.
    ///
    /// Returns the number of peers the message was queued for.
    fn broadcast(&self, message: &Message) -> usize;
}

/// Clock used to stamp locally minted blocks.
pub trait TimeSource: Send + Sync {
    /// Seconds since the Unix epoch.
    fn now_secs(&self) -> u64;
}

/// Wall-clock time source.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemTimeSource;

impl TimeSource for SystemTimeSource {
    fn now_secs(&self) -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or_default()
    }
}
