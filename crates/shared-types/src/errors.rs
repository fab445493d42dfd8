//! # Error Types
//!
//! Defines error types shared across subsystems.

use thiserror::Error;

/// Errors raised while decoding a peer message.
///
/// Either variant means the single offending message is dropped; neither is
/// ever fatal to the receiving loop.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MessageError {
    /// Well-formed JSON that violates the envelope contract.
    #[error("Malformed message: {0}")]
    MalformedMessage(String),

    /// Payload could not be parsed at all.
    #[error("Decode failure: {0}")]
    DecodeFailure(String),

    /// Outbound message could not be serialized.
    #[error("Encode failure: {0}")]
    EncodeFailure(String),
}
