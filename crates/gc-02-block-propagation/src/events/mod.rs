//! Error types for the Block Propagation subsystem.

use gc_01_ledger::LedgerError;
use shared_types::{MessageError, PeerId};
use thiserror::Error;

/// Block propagation errors.
#[derive(Debug, Error)]
pub enum PropagationError {
    #[error("Ledger rejected update: {0}")]
    Ledger(#[from] LedgerError),

    #[error("Dropped peer message: {0}")]
    Message(#[from] MessageError),

    #[error("Unknown peer: {0}")]
    UnknownPeer(PeerId),

    #[error("Network error: {0}")]
    NetworkError(String),
}
