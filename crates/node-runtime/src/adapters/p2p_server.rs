//! Inbound peer connections: the `/ws` route on the P2P port.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::ws::{Message as WsMessage, WebSocket, WebSocketUpgrade};
use axum::extract::{ConnectInfo, State};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::Router;
use futures_util::{SinkExt, StreamExt};
use gc_02_block_propagation::BlockReceiver;
use gossip_telemetry::log_peer_event;
use tokio::sync::watch;
use tracing::debug;

use super::connection::{binary_as_text, deliver_frame};
use super::peer_network::{Direction, PeerRegistry};
use crate::container::NodeService;

/// Shared state for the P2P router.
#[derive(Clone)]
pub struct P2pState {
    pub service: Arc<NodeService>,
    pub peers: Arc<PeerRegistry>,
    pub shutdown: watch::Receiver<bool>,
    pub max_frame_bytes: usize,
}

/// Build the P2P router.
pub fn p2p_router(state: P2pState) -> Router {
    Router::new()
        .route("/ws", get(ws_upgrade))
        .with_state(state)
}

async fn ws_upgrade(
    ws: WebSocketUpgrade,
    ConnectInfo(remote): ConnectInfo<SocketAddr>,
    State(state): State<P2pState>,
) -> impl IntoResponse {
    let limit = state.max_frame_bytes;
    ws.max_message_size(limit)
        .max_frame_size(limit)
        .on_upgrade(move |socket| handle_socket(state, socket, remote))
}

/// Drive one inbound connection until either side closes or the node stops.
async fn handle_socket(state: P2pState, socket: WebSocket, remote: SocketAddr) {
    let (peer_id, mut outbox) = state.peers.register(remote.to_string(), Direction::Inbound);
    log_peer_event!(info, "Inbound peer connected", peer_id, addr = %remote);
    state.service.handle_peer_connected(peer_id);

    let (mut sink, mut stream) = socket.split();
    let mut shutdown = state.shutdown.clone();

    loop {
        tokio::select! {
            frame = outbox.recv() => {
                let Some(frame) = frame else { break };
                if let Err(e) = sink.send(WsMessage::Text(frame)).await {
                    debug!(peer_id = %peer_id, error = %e, "Write failed");
                    break;
                }
            }
            incoming = stream.next() => match incoming {
                Some(Ok(WsMessage::Text(text))) => {
                    deliver_frame(state.service.as_ref(), peer_id, &text);
                }
                Some(Ok(WsMessage::Binary(data))) => {
                    if let Some(text) = binary_as_text(&data) {
                        deliver_frame(state.service.as_ref(), peer_id, text);
                    }
                }
                Some(Ok(WsMessage::Close(_))) | None => break,
                Some(Ok(_)) => {}
                Some(Err(e)) => {
                    debug!(peer_id = %peer_id, error = %e, "Read failed");
                    break;
                }
            },
            _ = shutdown.changed() => {
                let _ = sink.send(WsMessage::Close(None)).await;
                break;
            }
        }
    }

    state.peers.remove(peer_id);
    log_peer_event!(info, "Inbound peer disconnected", peer_id, addr = %remote);
}
