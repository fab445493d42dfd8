//! # Ledger Subsystem (gc-01)
//!
//! Holds the node's hash-chained block sequence and enforces its invariants.
//!
//! ## Domain Invariants
//!
//! | ID | Invariant | Description |
//! |----|-----------|-------------|
//! | 1 | Genesis Anchor | `chain[0]` is the fixed Genesis Block |
//! | 2 | Sequential Index | `chain[i].index == chain[i-1].index + 1` |
//! | 3 | Hash Linkage | `chain[i].previous_hash == chain[i-1].hash` |
//! | 4 | Self-Consistent Hash | every stored hash recomputes from its fields |
//! | 5 | Atomic Mutation | append/replace apply fully or not at all |
//! | 6 | Longest Valid Wins | replacement only by a strictly longer valid chain |
//!
//! ## Usage
//!
//! ```
//! use gc_01_ledger::Ledger;
//! use shared_types::Block;
//!
//! let mut ledger = Ledger::new();
//! let block = Block::next(ledger.latest(), "hello", "1700000000");
//! ledger.try_append(block).unwrap();
//! assert_eq!(ledger.len(), 2);
//! ```

pub mod domain;

pub use domain::errors::{ChainError, LedgerError, ValidationError};
pub use domain::ledger::{AppendOutcome, Ledger, ReplaceOutcome};
pub use domain::validator::{is_valid_chain, is_valid_successor, validate_chain, validate_successor};
