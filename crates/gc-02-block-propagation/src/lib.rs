//! # Block Propagation Subsystem (gc-02)
//!
//! Keeps every node's ledger converging on the longest valid chain by
//! gossiping chain tips and reconciling whatever peers report.
//!
//! ## Architecture Role
//!
//! ```text
//! [HTTP /mineBlock] ──mint_block──→ [Block Propagation] ──broadcast latest──→ [Peers]
//!                                          ↑    │
//!                       handle_message ────┘    └──→ [Ledger (gc-01)]
//!                     (QUERY_LATEST / QUERY_ALL / RESPONSE_CHAIN)
//! ```
//!
//! ## Protocol
//!
//! | Inbound | Action |
//! |---------|--------|
//! | QUERY_LATEST | reply with `[latest]` |
//! | QUERY_ALL | reply with the whole chain |
//! | RESPONSE_CHAIN, one block, direct successor | append, broadcast new latest |
//! | RESPONSE_CHAIN, one block, ahead but unlinked | ask the sender for QUERY_ALL |
//! | RESPONSE_CHAIN, several blocks, longer and valid | replace, broadcast new latest |
//! | anything else | ignore |

pub mod domain;
pub mod events;
pub mod ports;
pub mod service;

pub use domain::*;
pub use events::PropagationError;
pub use ports::inbound::{BlockPropagationApi, BlockReceiver};
pub use ports::outbound::{PeerNetwork, SystemTimeSource, TimeSource};
pub use service::BlockPropagationService;
