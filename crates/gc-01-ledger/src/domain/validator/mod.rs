//! # Chain Validator
//!
//! Pure checks of a single successor block and of a whole candidate chain.
//!
//! ## Rules
//!
//! | Check | Failure |
//! |-------|---------|
//! | `candidate.index == previous.index + 1` | `InvalidIndex` |
//! | `candidate.previous_hash == previous.hash` | `InvalidLinkage` |
//! | `candidate.hash == H(candidate fields)` | `InvalidHash` |
//! | `chain[0] == Genesis` | `GenesisMismatch` |

use shared_types::Block;

use super::errors::{ChainError, ValidationError};


/// Check that `candidate` may directly follow `previous`.
pub fn validate_successor(candidate: &Block, previous: &Block) -> Result<(), ValidationError> {
    let expected = previous.index + 1;
    if candidate.index != expected {
        return Err(ValidationError::InvalidIndex {
            expected,
            actual: candidate.index,
        });
    }

    if candidate.previous_hash != previous.hash {
        return Err(ValidationError::InvalidLinkage {
            index: candidate.index,
            expected: previous.hash.clone(),
            actual: candidate.previous_hash.clone(),
        });
    }

    let computed = candidate.recompute_hash();
    if computed != candidate.hash {
        return Err(ValidationError::InvalidHash {
            index: candidate.index,
            stored: candidate.hash.clone(),
            computed,
        });
    }

    Ok(())
}

/// Check a whole chain, stopping at the first failure.
pub fn validate_chain(chain: &[Block]) -> Result<(), ChainError> {
    let first = chain.first().ok_or(ChainError::Empty)?;
    if !first.is_genesis() {
        return Err(ChainError::GenesisMismatch);
    }

    for (position, pair) in chain.windows(2).enumerate() {
        validate_successor(&pair[1], &pair[0]).map_err(|reason| ChainError::InvalidBlock {
            position: position + 1,
            reason,
        })?;
    }

    Ok(())
}

pub fn is_valid_successor(candidate: &Block, previous: &Block) -> bool {
    validate_successor(candidate, previous).is_ok()
}

pub fn is_valid_chain(chain: &[Block]) -> bool {
    validate_chain(chain).is_ok()
}
