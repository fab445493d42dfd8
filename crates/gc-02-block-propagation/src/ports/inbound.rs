//! Inbound ports (API) for Block Propagation subsystem.

use crate::domain::{PropagationMetrics, ReconciliationOutcome};
use crate::events::PropagationError;
use shared_types::{Block, Message, PeerId};

/// Primary API used by the local control surface.
pub trait BlockPropagationApi: Send + Sync {
    /// Mint a block carrying `data` on top of the local tip and broadcast it.
    ///
    /// # Returns
    /// The appended block, or the ledger's rejection. Nothing is broadcast
    /// on rejection.
    fn mint_block(&self, data: String) -> Result<Block, PropagationError>;

    /// Snapshot of the whole local chain.
    fn chain(&self) -> Vec<Block>;

    /// The local tip.
    fn latest(&self) -> Block;

    /// Number of blocks in the local chain.
    fn height(&self) -> usize;

    /// Get propagation counters.
    fn metrics(&self) -> PropagationMetrics;

    /// Broadcast QUERY_LATEST to every connected peer.
    fn request_latest_from_peers(&self) -> usize;
}

/// Handle for traffic arriving from network peers.
pub trait BlockReceiver: Send + Sync {
    /// Handle an already decoded message from `peer_id`.
    fn handle_message(&self, peer_id: PeerId, message: Message) -> ReconciliationOutcome;

    /// Decode a raw text frame and handle it.
    ///
    /// Undecodable frames are dropped and reported as `Err`.
    fn handle_raw_message(
        &self,
        peer_id: PeerId,
        raw: &str,
    ) -> Result<ReconciliationOutcome, PropagationError>;

    /// A connection to `peer_id` was established.
    fn handle_peer_connected(&self, peer_id: PeerId);
}
