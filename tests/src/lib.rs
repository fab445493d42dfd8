//! # Gossip-Chain Test Suite
//!
//! Cross-crate tests that run several nodes in one process.
//!
//! ## Structure
//!
//! ```text
//! tests/src/
//! ├── harness.rs        # In-memory network of propagation services
//! └── integration/
//!     ├── scenarios.rs  # Append, full-chain fallback, forged genesis
//!     ├── convergence.rs# Partitions, lost messages, delivery order
//!     └── transport.rs  # Real nodes over WebSocket
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p gc-tests
//! cargo test -p gc-tests integration::convergence
//! ```

pub mod harness;
