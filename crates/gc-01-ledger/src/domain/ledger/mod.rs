//! # Ledger State
//!
//! The node's authoritative chain. Starts at `[Genesis]` and changes only
//! through [`Ledger::try_append`] and [`Ledger::try_replace`], each of which
//! either applies fully or leaves the chain untouched.
//!
//! `Ledger` itself holds no lock. The owner (the propagation service) wraps
//! it in one and is the only code allowed to mutate it.

use shared_types::Block;

use super::errors::LedgerError;
use super::validator::{validate_chain, validate_successor};


/// Result of a successful append.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppendOutcome {
    /// The block now at the tip.
    pub latest: Block,
}

/// Result of a successful wholesale replacement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplaceOutcome {
    pub previous_len: usize,
    pub new_len: usize,
    /// The block now at the tip.
    pub latest: Block,
}

/// In-memory hash-chained ledger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ledger {
    blocks: Vec<Block>,
}

impl Ledger {
    pub fn new() -> Self {
        Self {
            blocks: vec![Block::genesis()],
        }
    }

    /// The tip of the chain.
    pub fn latest(&self) -> &Block {
        // Construction and both mutations keep at least the genesis block.
        &self.blocks[self.blocks.len() - 1]
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    /// Always false; present for API symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    /// Owned copy of the whole chain.
    pub fn snapshot(&self) -> Vec<Block> {
        self.blocks.clone()
    }

    /// Append `candidate` if it is a valid successor of the tip.
    pub fn try_append(&mut self, candidate: Block) -> Result<AppendOutcome, LedgerError> {
        validate_successor(&candidate, self.latest())?;
        self.blocks.push(candidate);

        Ok(AppendOutcome {
            latest: self.latest().clone(),
        })
    }

    /// Swap in `candidate` if it is valid and strictly longer.
    ///
    /// Validity is checked first, so an invalid candidate is reported as
    /// `ChainInvalid` whatever its length. Ties keep the local chain.
    pub fn try_replace(&mut self, candidate: Vec<Block>) -> Result<ReplaceOutcome, LedgerError> {
        validate_chain(&candidate)?;

        let current = self.blocks.len();
        if candidate.len() <= current {
            return Err(LedgerError::ChainTooShort {
                candidate: candidate.len(),
                current,
            });
        }

        self.blocks = candidate;
        tracing::debug!(
            previous_len = current,
            new_len = self.blocks.len(),
            "Ledger replaced with longer chain"
        );

        Ok(ReplaceOutcome {
            previous_len: current,
            new_len: self.blocks.len(),
            latest: self.latest().clone(),
        })
    }
}

impl Default for Ledger {
    fn default() -> Self {
        Self::new()
    }
}
