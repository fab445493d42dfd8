//! # Adapter Implementations
//!
//! Concrete adapters around the propagation service:
//! 1. `PeerRegistry` implements the **outbound** `PeerNetwork` port
//! 2. The P2P server and client drive the **inbound** `BlockReceiver` port
//! 3. The HTTP router drives the **inbound** `BlockPropagationApi` port
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                 OUTER LAYER (Adapters)                       │
//! │   http_api      p2p_server / p2p_client      peer_network    │
//! │                          ↓ calls ↓                ↑ implements│
//! │  ┌────────────────────────────────────────────────────────┐  │
//! │  │              MIDDLE LAYER (Ports)                      │  │
//! │  │  BlockPropagationApi, BlockReceiver, PeerNetwork       │  │
//! │  └────────────────────────────────────────────────────────┘  │
//! │                          ↑ uses ↑                            │
//! │  ┌────────────────────────────────────────────────────────┐  │
//! │  │              INNER LAYER (Domain)                      │  │
//! │  │  Ledger, validator, reconciliation decisions           │  │
//! │  └────────────────────────────────────────────────────────┘  │
//! └──────────────────────────────────────────────────────────────┘
//! ```

pub mod connection;
pub mod http_api;
pub mod p2p_client;
pub mod p2p_server;
pub mod peer_network;

pub use http_api::{http_router, HttpState};
pub use p2p_client::PeerDialer;
pub use p2p_server::{p2p_router, P2pState};
pub use peer_network::{Direction, Outbox, PeerInfo, PeerRegistry};
