//! # Subsystem Container
//!
//! Central container holding the node's services with their configuration.

pub mod config;
pub mod subsystems;

pub use config::{ConfigError, NetworkConfig, NodeConfig, SyncConfig};
pub use subsystems::{NodeService, SubsystemContainer};
