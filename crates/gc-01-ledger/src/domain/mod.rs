//! # Domain Layer for the Ledger
//!
//! Pure business logic with no I/O dependencies.
//!
//! ## Contents
//!
//! - **validator**: successor and whole-chain checks
//! - **ledger**: the single mutable chain and its two mutations
//! - **errors**: `ValidationError`, `ChainError`, `LedgerError`

pub mod errors;
pub mod ledger;
pub mod validator;

pub use errors::*;
pub use ledger::*;
pub use validator::*;
