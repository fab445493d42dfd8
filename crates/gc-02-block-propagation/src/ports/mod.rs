//! Ports layer for Block Propagation subsystem.
//!
//! Defines the hexagonal architecture port traits:
//! - Inbound (Driving) ports: API exposed to the HTTP surface and transport
//! - Outbound (Driven) ports: peer network and clock

pub mod inbound;
pub mod outbound;

pub use inbound::*;
pub use outbound::*;
