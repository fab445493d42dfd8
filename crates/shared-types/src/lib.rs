//! # Shared Types Crate
//!
//! The block/chain model and the peer message envelope used by every
//! Gossip-Chain subsystem.
//!
//! ## Design Principles
//!
//! - **Single Source of Truth**: `Block`, the Genesis Block and the wire
//!   encoding are defined once, here.
//! - **Stable Hashing**: block hashes use a length-prefixed canonical
//!   encoding so every node derives identical digests.
//! - **Closed Dispatch**: peer messages are a closed enum decoded once at the
//!   transport boundary.

pub mod entities;
pub mod envelope;
pub mod errors;

pub use entities::*;
pub use envelope::Message;
pub use errors::*;
