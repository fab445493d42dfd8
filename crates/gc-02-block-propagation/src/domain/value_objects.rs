//! Value objects describing reconciliation results and counters.

use gc_01_ledger::LedgerError;
use serde::Serialize;

use super::IgnoreReason;

/// What handling one inbound message did to the node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReconciliationOutcome {
    /// Answered a query with our latest block or chain.
    Replied,
    /// Extended the chain by one block received from a peer.
    Appended { index: u64 },
    /// Swapped in a peer's longer chain.
    Replaced { previous_len: usize, new_len: usize },
    /// Asked the originating peer for its full chain.
    RequestedFullChain,
    /// Nothing changed.
    Ignored(IgnoreReason),
    /// The ledger refused the update; no NACK is sent.
    Rejected(LedgerError),
}

impl ReconciliationOutcome {
    /// Whether the local chain changed.
    pub fn mutated(&self) -> bool {
        matches!(
            self,
            ReconciliationOutcome::Appended { .. } | ReconciliationOutcome::Replaced { .. }
        )
    }
}

/// Running counters for monitoring.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PropagationMetrics {
    pub blocks_minted: u64,
    pub blocks_appended: u64,
    pub chains_replaced: u64,
    pub full_chain_requests: u64,
    pub responses_ignored: u64,
    pub updates_rejected: u64,
    pub messages_dropped: u64,
}
