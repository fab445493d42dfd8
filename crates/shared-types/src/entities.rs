//! # Core Domain Entities
//!
//! The block and chain model shared by every subsystem.
//!
//! ## Clusters
//!
//! - **Chain**: `Block`, the Genesis Block, canonical hashing
//! - **Networking**: `PeerId`

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;
use uuid::Uuid;

// =============================================================================
// CLUSTER A: THE CHAIN
// =============================================================================

/// Sentinel `previousHash` carried by the Genesis Block.
pub const GENESIS_PREVIOUS_HASH: &str = "0";

/// Genesis creation time (Unix seconds).
pub const GENESIS_TIMESTAMP: &str = "1465154705";

/// Genesis payload.
pub const GENESIS_DATA: &str = "my genesis block!!";

/// Precomputed hash of the Genesis Block under [`compute_hash`].
pub const GENESIS_HASH: &str = "a516711f1f3383097f60fcbeabb383bf7e50bad5060ed3fc71667e01f1fa98d0";

/// A single ledger entry.
///
/// Blocks are immutable once created: `hash` is computed at construction
/// and never recomputed in place. Field names on the wire are camelCase
/// (`previousHash`) so that every node encodes blocks identically.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Block {
    /// Position in the chain, strictly sequential from 0.
    pub index: u64,
    /// Hash of the preceding block (`"0"` for genesis).
    pub previous_hash: String,
    /// Creation time, advisory only.
    pub timestamp: String,
    /// Opaque caller-supplied payload.
    pub data: String,
    /// Digest over `(index, previous_hash, timestamp, data)`.
    pub hash: String,
}

impl Block {
    /// The globally fixed first block every node starts from.
    pub fn genesis() -> Self {
        Self {
            index: 0,
            previous_hash: GENESIS_PREVIOUS_HASH.to_string(),
            timestamp: GENESIS_TIMESTAMP.to_string(),
            data: GENESIS_DATA.to_string(),
            hash: GENESIS_HASH.to_string(),
        }
    }

    /// Build the successor of `previous` carrying `data`, stamped with `now`.
    ///
    /// No validation is performed here; the ledger validates before insertion.
    pub fn next(previous: &Block, data: impl Into<String>, now: impl Into<String>) -> Self {
        let index = previous.index + 1;
        let previous_hash = previous.hash.clone();
        let timestamp = now.into();
        let data = data.into();
        let hash = compute_hash(index, &previous_hash, &timestamp, &data);
        Self {
            index,
            previous_hash,
            timestamp,
            data,
            hash,
        }
    }

    /// Hash implied by this block's own fields.
    pub fn recompute_hash(&self) -> String {
        compute_hash(self.index, &self.previous_hash, &self.timestamp, &self.data)
    }

    /// Whether this block is field-for-field the Genesis Block.
    pub fn is_genesis(&self) -> bool {
        *self == Block::genesis()
    }

    /// First 8 hex characters of the hash, for log lines.
    pub fn short_hash(&self) -> &str {
        self.hash.get(..8).unwrap_or(&self.hash)
    }
}

/// SHA-256 over the canonical encoding of a block's fields, lowercase hex.
///
/// # Canonical Encoding
///
/// ```text
/// [index:          8 bytes, big-endian]
/// [len(prev_hash): 8 bytes, big-endian][prev_hash bytes]
/// [len(timestamp): 8 bytes, big-endian][timestamp bytes]
/// [len(data):      8 bytes, big-endian][data bytes]
/// ```
///
/// Length prefixes keep `("1", "23")` and `("12", "3")` distinct.
pub fn compute_hash(index: u64, previous_hash: &str, timestamp: &str, data: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(index.to_be_bytes());
    for field in [previous_hash, timestamp, data] {
        hasher.update((field.len() as u64).to_be_bytes());
        hasher.update(field.as_bytes());
    }
    hex::encode(hasher.finalize())
}

// =============================================================================
// CLUSTER B: NETWORKING
// =============================================================================

/// Opaque handle for a connected peer.
///
/// Issued by the transport for each connection; the core only passes it back
/// when replying.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PeerId(pub Uuid);

impl PeerId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for PeerId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for PeerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
