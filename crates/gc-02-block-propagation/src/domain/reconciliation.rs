//! Reconciliation decisions for RESPONSE_CHAIN messages.
//!
//! Given the local tip and a peer's report, decide what to do. The two-tier
//! strategy tries to extend by a single block first and only falls back to
//! fetching and replacing the full chain when the single block does not link.

use shared_types::{Block, Message, PeerId};

/// What to do with a peer's RESPONSE_CHAIN.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    /// Nothing to do.
    Ignore(IgnoreReason),
    /// Peer sent the direct successor of our tip.
    Append(Block),
    /// Peer is ahead but the single block does not link; fetch everything.
    RequestFullChain,
    /// Peer sent a longer chain; replace if it validates.
    Replace(Vec<Block>),
}

/// Why a response was ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnoreReason {
    /// The peer's tip is not past ours.
    NotAhead { received: u64, local: u64 },
    /// The peer's chain is ahead by index but not longer than ours.
    NotLonger { received: usize, local: usize },
    /// The response carried no blocks.
    Empty,
}

/// Message the engine wants sent once the ledger lock is released.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outbound {
    Broadcast(Message),
    Unicast(PeerId, Message),
}

/// Classify a peer's RESPONSE_CHAIN against the local tip.
///
/// Full chains are sorted by index first since the transport does not
/// guarantee order. Chain validity is not checked here; `Replace` is only a
/// proposal that the ledger's `try_replace` accepts or rejects.
pub fn classify_response(local_latest: &Block, local_len: usize, mut blocks: Vec<Block>) -> Decision {
    match blocks.len() {
        0 => Decision::Ignore(IgnoreReason::Empty),
        1 => {
            let received = blocks.remove(0);
            if received.index <= local_latest.index {
                Decision::Ignore(IgnoreReason::NotAhead {
                    received: received.index,
                    local: local_latest.index,
                })
            } else if received.previous_hash == local_latest.hash {
                Decision::Append(received)
            } else {
                Decision::RequestFullChain
            }
        }
        _ => {
            blocks.sort_by_key(|b| b.index);
            let tip_index = blocks[blocks.len() - 1].index;
            if tip_index <= local_latest.index {
                Decision::Ignore(IgnoreReason::NotAhead {
                    received: tip_index,
                    local: local_latest.index,
                })
            } else if blocks.len() > local_len {
                Decision::Replace(blocks)
            } else {
                Decision::Ignore(IgnoreReason::NotLonger {
                    received: blocks.len(),
                    local: local_len,
                })
            }
        }
    }
}
