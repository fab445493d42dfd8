//! Frame handling shared by inbound and outbound peer connections.
//!
//! The size limit is enforced by the WebSocket layer (`max_message_size` on
//! both sides), so a message reaching `deliver_frame` is already bounded. An
//! oversized message fails the read and closes that connection.

use gc_02_block_propagation::BlockReceiver;
use shared_types::PeerId;
use tracing::debug;

/// Hand one inbound text frame to the receiver.
///
/// Decode failures only drop the frame; the connection stays open.
pub fn deliver_frame<R>(receiver: &R, peer_id: PeerId, frame: &str)
where
    R: BlockReceiver + ?Sized,
{
    match receiver.handle_raw_message(peer_id, frame) {
        Ok(outcome) => debug!(peer_id = %peer_id, ?outcome, "Frame handled"),
        Err(e) => debug!(peer_id = %peer_id, error = %e, "Frame dropped"),
    }
}

/// Binary frames are accepted when they carry UTF-8 text.
pub fn binary_as_text(data: &[u8]) -> Option<&str> {
    std::str::from_utf8(data).ok()
}
