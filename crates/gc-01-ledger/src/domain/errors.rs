//! Domain error types for the ledger subsystem.

use thiserror::Error;

/// Why a candidate block is not a valid successor.
///
/// Checks run in declaration order; the first failure is reported.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// `candidate.index != previous.index + 1`.
    #[error("Invalid index: expected {expected}, got {actual}")]
    InvalidIndex { expected: u64, actual: u64 },

    /// `candidate.previous_hash != previous.hash`.
    #[error("Invalid linkage at index {index}: previousHash {actual} does not match {expected}")]
    InvalidLinkage {
        index: u64,
        expected: String,
        actual: String,
    },

    /// Stored hash differs from the hash recomputed over the block's fields.
    #[error("Invalid hash at index {index}: stored {stored}, computed {computed}")]
    InvalidHash {
        index: u64,
        stored: String,
        computed: String,
    },
}

/// Why a candidate chain is invalid as a whole.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChainError {
    /// A chain must contain at least the Genesis Block.
    #[error("Chain is empty")]
    Empty,

    /// `chain[0]` is not the Genesis Block.
    #[error("First block is not the genesis block")]
    GenesisMismatch,

    /// `chain[position]` is not a valid successor of `chain[position - 1]`.
    #[error("Block at position {position} is invalid: {reason}")]
    InvalidBlock {
        position: usize,
        reason: ValidationError,
    },
}

/// Rejections from the two ledger mutations.
///
/// The ledger is untouched whenever one of these is returned.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    /// `try_append` candidate failed successor validation.
    #[error("Block rejected: {0}")]
    Rejected(#[from] ValidationError),

    /// `try_replace` candidate is valid but not strictly longer.
    #[error("Candidate chain too short: {candidate} blocks, local chain has {current}")]
    ChainTooShort { candidate: usize, current: usize },

    /// `try_replace` candidate failed chain validation.
    #[error("Candidate chain invalid: {0}")]
    ChainInvalid(#[from] ChainError),
}
