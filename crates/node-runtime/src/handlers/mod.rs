//! # Background Handlers
//!
//! Long-running tasks that drive the node without an external trigger.

pub mod sync;

pub use sync::run_periodic_sync;
