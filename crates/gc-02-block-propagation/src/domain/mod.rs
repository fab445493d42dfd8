//! # Domain Layer for Block Propagation
//!
//! Pure business logic with no I/O dependencies.
//!
//! ## Contents
//!
//! - **reconciliation**: decision table for peer chain reports
//! - **value_objects**: outcomes and counters
//!
//! ## Design Principles
//!
//! 1. **No I/O**: All functions are pure and synchronous
//! 2. **No Locks**: the service owns locking; decisions see plain values
//! 3. **Testable**: All logic can be unit tested without mocks

mod reconciliation;
mod value_objects;

pub use reconciliation::*;
pub use value_objects::*;
