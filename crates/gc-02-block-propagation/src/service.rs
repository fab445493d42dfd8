//! # Block Propagation Service
//!
//! Owns the node's Ledger State and applies the reconciliation protocol to
//! every event that can change it.
//!
//! ## Architecture
//!
//! This service implements both inbound ports:
//! - [`BlockPropagationApi`]: local minting and read access for the HTTP surface
//! - [`BlockReceiver`]: messages and connection events from the transport
//!
//! It depends on two outbound ports (implemented by adapters in node-runtime):
//! - [`PeerNetwork`]: non-blocking sends to connected peers
//! - [`TimeSource`]: timestamps for minted blocks
//!
//! ## Locking
//!
//! Each event reads the tip, decides and mutates inside one write critical
//! section. The messages it produces are collected and sent only after the
//! lock is dropped.

use parking_lot::RwLock;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::domain::{classify_response, Decision, Outbound, PropagationMetrics, ReconciliationOutcome};
use crate::events::PropagationError;
use crate::ports::inbound::{BlockPropagationApi, BlockReceiver};
use crate::ports::outbound::{PeerNetwork, SystemTimeSource, TimeSource};
use gc_01_ledger::Ledger;
use shared_types::{Block, Message, PeerId};

/// Block Propagation Service.
///
/// ## Thread Safety
///
/// This service is thread-safe and can be shared across async tasks via `Arc`.
/// The ledger and counters are each protected by a `RwLock`.
pub struct BlockPropagationService<N, T = SystemTimeSource>
where
    N: PeerNetwork,
    T: TimeSource,
{
    /// The single authoritative chain of this node.
    ledger: RwLock<Ledger>,
    /// P2P network adapter.
    network: Arc<N>,
    /// Clock for minted blocks.
    clock: T,
    /// Propagation metrics for monitoring.
    metrics: RwLock<PropagationMetrics>,
}

impl<N: PeerNetwork> BlockPropagationService<N, SystemTimeSource> {
    pub fn new(network: Arc<N>) -> Self {
        Self::with_time_source(network, SystemTimeSource)
    }
}

impl<N, T> BlockPropagationService<N, T>
where
    N: PeerNetwork,
    T: TimeSource,
{
    pub fn with_time_source(network: Arc<N>, clock: T) -> Self {
        Self {
            ledger: RwLock::new(Ledger::new()),
            network,
            clock,
            metrics: RwLock::new(PropagationMetrics::default()),
        }
    }

    /// Apply a RESPONSE_CHAIN to `ledger`. Caller holds the write lock.
    fn reconcile_response(
        ledger: &mut Ledger,
        peer_id: PeerId,
        blocks: Vec<Block>,
    ) -> (ReconciliationOutcome, Vec<Outbound>) {
        match classify_response(ledger.latest(), ledger.len(), blocks) {
            Decision::Ignore(reason) => {
                debug!(peer_id = %peer_id, ?reason, "Ignoring chain response");
                (ReconciliationOutcome::Ignored(reason), Vec::new())
            }
            Decision::Append(block) => match ledger.try_append(block) {
                Ok(appended) => {
                    info!(
                        peer_id = %peer_id,
                        block_index = appended.latest.index,
                        hash = appended.latest.short_hash(),
                        "Appended block from peer"
                    );
                    let index = appended.latest.index;
                    (
                        ReconciliationOutcome::Appended { index },
                        vec![Outbound::Broadcast(Message::latest(appended.latest))],
                    )
                }
                Err(e) => {
                    warn!(peer_id = %peer_id, error = %e, "Rejected block from peer");
                    (ReconciliationOutcome::Rejected(e), Vec::new())
                }
            },
            Decision::RequestFullChain => {
                debug!(peer_id = %peer_id, "Peer is ahead, requesting full chain");
                (
                    ReconciliationOutcome::RequestedFullChain,
                    vec![Outbound::Unicast(peer_id, Message::QueryAll)],
                )
            }
            Decision::Replace(candidate) => match ledger.try_replace(candidate) {
                Ok(replaced) => {
                    info!(
                        peer_id = %peer_id,
                        previous_len = replaced.previous_len,
                        new_len = replaced.new_len,
                        "Replaced chain with longer chain from peer"
                    );
                    (
                        ReconciliationOutcome::Replaced {
                            previous_len: replaced.previous_len,
                            new_len: replaced.new_len,
                        },
                        vec![Outbound::Broadcast(Message::latest(replaced.latest))],
                    )
                }
                Err(e) => {
                    warn!(peer_id = %peer_id, error = %e, "Rejected chain from peer");
                    (ReconciliationOutcome::Rejected(e), Vec::new())
                }
            },
        }
    }

    /// Send queued messages. Must be called without the ledger lock held.
    fn dispatch(&self, outbound: Vec<Outbound>) {
        for item in outbound {
            match item {
                Outbound::Broadcast(message) => {
                    let reached = self.network.broadcast(&message);
                    debug!(kind = message.kind(), peers = reached, "Broadcast");
                }
                Outbound::Unicast(peer_id, message) => {
                    if let Err(e) = self.network.send_to_peer(peer_id, &message) {
                        warn!(peer_id = %peer_id, kind = message.kind(), error = %e, "Send failed");
                    }
                }
            }
        }
    }

    fn record(&self, outcome: &ReconciliationOutcome) {
        let mut metrics = self.metrics.write();
        match outcome {
            ReconciliationOutcome::Replied => {}
            ReconciliationOutcome::Appended { .. } => metrics.blocks_appended += 1,
            ReconciliationOutcome::Replaced { .. } => metrics.chains_replaced += 1,
            ReconciliationOutcome::RequestedFullChain => metrics.full_chain_requests += 1,
            ReconciliationOutcome::Ignored(_) => metrics.responses_ignored += 1,
            ReconciliationOutcome::Rejected(_) => metrics.updates_rejected += 1,
        }
    }
}

impl<N, T> BlockPropagationApi for BlockPropagationService<N, T>
where
    N: PeerNetwork,
    T: TimeSource,
{
    fn mint_block(&self, data: String) -> Result<Block, PropagationError> {
        let block = {
            let mut ledger = self.ledger.write();
            let candidate = Block::next(ledger.latest(), data, self.clock.now_secs().to_string());
            ledger.try_append(candidate)?.latest
        };

        self.metrics.write().blocks_minted += 1;
        info!(
            block_index = block.index,
            hash = block.short_hash(),
            "Minted block"
        );

        self.dispatch(vec![Outbound::Broadcast(Message::latest(block.clone()))]);
        Ok(block)
    }

    fn chain(&self) -> Vec<Block> {
        self.ledger.read().snapshot()
    }

    fn latest(&self) -> Block {
        self.ledger.read().latest().clone()
    }

    fn height(&self) -> usize {
        self.ledger.read().len()
    }

    fn metrics(&self) -> PropagationMetrics {
        self.metrics.read().clone()
    }

    fn request_latest_from_peers(&self) -> usize {
        self.network.broadcast(&Message::QueryLatest)
    }
}

impl<N, T> BlockReceiver for BlockPropagationService<N, T>
where
    N: PeerNetwork,
    T: TimeSource,
{
    fn handle_message(&self, peer_id: PeerId, message: Message) -> ReconciliationOutcome {
        debug!(peer_id = %peer_id, kind = message.kind(), "Received message");

        let (outcome, outbound) = match message {
            Message::QueryLatest => {
                let latest = self.ledger.read().latest().clone();
                (
                    ReconciliationOutcome::Replied,
                    vec![Outbound::Unicast(peer_id, Message::latest(latest))],
                )
            }
            Message::QueryAll => {
                let chain = self.ledger.read().snapshot();
                (
                    ReconciliationOutcome::Replied,
                    vec![Outbound::Unicast(peer_id, Message::ResponseChain(chain))],
                )
            }
            Message::ResponseChain(blocks) => {
                let mut ledger = self.ledger.write();
                Self::reconcile_response(&mut ledger, peer_id, blocks)
            }
        };

        self.record(&outcome);
        self.dispatch(outbound);
        outcome
    }

    fn handle_raw_message(
        &self,
        peer_id: PeerId,
        raw: &str,
    ) -> Result<ReconciliationOutcome, PropagationError> {
        let message = match Message::decode(raw) {
            Ok(message) => message,
            Err(e) => {
                self.metrics.write().messages_dropped += 1;
                debug!(peer_id = %peer_id, error = %e, "Dropping undecodable message");
                return Err(e.into());
            }
        };
        Ok(self.handle_message(peer_id, message))
    }

    fn handle_peer_connected(&self, peer_id: PeerId) {
        info!(peer_id = %peer_id, "Peer connected, querying latest block");
        self.dispatch(vec![Outbound::Unicast(peer_id, Message::QueryLatest)]);
    }
}
