//! # Gossip Message Envelope
//!
//! The closed set of messages exchanged between peers, and their JSON wire
//! form.
//!
//! ## Wire Format
//!
//! ```text
//! { "type": 0 }                            QUERY_LATEST
//! { "type": 1 }                            QUERY_ALL
//! { "type": 2, "data": [ <block>, ... ] }  RESPONSE_CHAIN
//! ```
//!
//! Messages are decoded once at the transport boundary into [`Message`];
//! handlers never see the integer tag.

use serde::{Deserialize, Serialize};

use crate::entities::Block;
use crate::errors::MessageError;

/// Wire tag for [`Message::QueryLatest`].
pub const QUERY_LATEST: u8 = 0;
/// Wire tag for [`Message::QueryAll`].
pub const QUERY_ALL: u8 = 1;
/// Wire tag for [`Message::ResponseChain`].
pub const RESPONSE_CHAIN: u8 = 2;

/// A decoded peer message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Message {
    /// Ask a peer for its latest block.
    QueryLatest,
    /// Ask a peer for its whole chain.
    QueryAll,
    /// A peer's latest block (one element) or whole chain (several).
    ///
    /// Never empty once decoded.
    ResponseChain(Vec<Block>),
}

/// `data` of a RESPONSE_CHAIN frame: a block list, or a bare block.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
enum ChainPayload {
    Many(Vec<Block>),
    One(Block),
}

impl ChainPayload {
    fn into_blocks(self) -> Vec<Block> {
        match self {
            ChainPayload::Many(blocks) => blocks,
            ChainPayload::One(block) => vec![block],
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct WireMessage {
    #[serde(rename = "type")]
    kind: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    data: Option<ChainPayload>,
}

impl Message {
    /// RESPONSE_CHAIN carrying only `block`.
    pub fn latest(block: Block) -> Self {
        Message::ResponseChain(vec![block])
    }

    /// Human-readable kind, for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Message::QueryLatest => "QUERY_LATEST",
            Message::QueryAll => "QUERY_ALL",
            Message::ResponseChain(_) => "RESPONSE_CHAIN",
        }
    }

    /// Encode to a JSON text frame.
    pub fn encode(&self) -> Result<String, MessageError> {
        let wire = match self {
            Message::QueryLatest => WireMessage {
                kind: QUERY_LATEST,
                data: None,
            },
            Message::QueryAll => WireMessage {
                kind: QUERY_ALL,
                data: None,
            },
            Message::ResponseChain(blocks) => WireMessage {
                kind: RESPONSE_CHAIN,
                data: Some(ChainPayload::Many(blocks.clone())),
            },
        };
        serde_json::to_string(&wire).map_err(|e| MessageError::EncodeFailure(e.to_string()))
    }

    /// Decode a JSON text frame.
    ///
    /// # Errors
    ///
    /// - `DecodeFailure` if the text is not a JSON object of the wire shape
    /// - `MalformedMessage` for an unknown tag, or a RESPONSE_CHAIN without
    ///   blocks
    pub fn decode(text: &str) -> Result<Self, MessageError> {
        let wire: WireMessage =
            serde_json::from_str(text).map_err(|e| MessageError::DecodeFailure(e.to_string()))?;

        match wire.kind {
            QUERY_LATEST => Ok(Message::QueryLatest),
            QUERY_ALL => Ok(Message::QueryAll),
            RESPONSE_CHAIN => {
                let blocks = wire
                    .data
                    .ok_or_else(|| {
                        MessageError::MalformedMessage("RESPONSE_CHAIN without data".to_string())
                    })?
                    .into_blocks();
                if blocks.is_empty() {
                    return Err(MessageError::MalformedMessage(
                        "RESPONSE_CHAIN with no blocks".to_string(),
                    ));
                }
                Ok(Message::ResponseChain(blocks))
            }
            other => Err(MessageError::MalformedMessage(format!(
                "unknown message type {other}"
            ))),
        }
    }
}
