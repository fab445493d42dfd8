//! # Node Runtime Library
//!
//! Wires the ledger and propagation subsystems to real sockets. The binary
//! in `main.rs` is a thin CLI around [`NodeRuntime`]; the library is exposed
//! so integration tests can run several nodes in one process.
//!
//! ## Modular Structure
//!
//! - `container/` - configuration and the subsystem container
//! - `adapters/` - peer registry, WebSocket transport, HTTP control API
//! - `handlers/` - background tasks (periodic sync)
//! - `runtime` - startup and graceful shutdown

pub mod adapters;
pub mod container;
pub mod handlers;
pub mod runtime;

pub use container::{ConfigError, NodeConfig, NodeService, SubsystemContainer};
pub use runtime::{ListenAddrs, NodeRuntime};
