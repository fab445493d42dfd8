//! HTTP control surface.
//!
//! | Route | Response |
//! |-------|----------|
//! | `GET /blocks` | full chain |
//! | `POST /mineBlock` | 201 + new block, 422 on rejection |
//! | `GET /peers` | connected peers |
//! | `POST /addPeer` | 202, dials each new `ws://` URL; 400 on bad body |
//! | `GET /health` | status, height, peer count, counters |

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use gc_02_block_propagation::BlockPropagationApi;
use gossip_telemetry::log_block_event;
use serde_json::json;
use tracing::{info, warn};

use super::p2p_client::PeerDialer;
use super::peer_network::PeerRegistry;
use crate::container::config::validate_peer_url;
use crate::container::NodeService;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct HttpState {
    pub service: Arc<NodeService>,
    pub peers: Arc<PeerRegistry>,
    pub dialer: PeerDialer,
}

/// Build the HTTP control router.
pub fn http_router(state: HttpState) -> Router {
    Router::new()
        .route("/blocks", get(get_blocks))
        .route("/mineBlock", post(mine_block))
        .route("/peers", get(get_peers))
        .route("/addPeer", post(add_peer))
        .route("/health", get(health_check))
        .with_state(state)
}

async fn get_blocks(State(state): State<HttpState>) -> impl IntoResponse {
    Json(state.service.chain())
}

/// The raw request body becomes the block's data.
async fn mine_block(State(state): State<HttpState>, body: String) -> Response {
    match state.service.mint_block(body) {
        Ok(block) => {
            log_block_event!(info, "Block mined via HTTP", block.index, block.short_hash());
            (StatusCode::CREATED, Json(block)).into_response()
        }
        Err(e) => {
            warn!(error = %e, "Mint rejected");
            (
                StatusCode::UNPROCESSABLE_ENTITY,
                Json(json!({ "error": e.to_string() })),
            )
                .into_response()
        }
    }
}

async fn get_peers(State(state): State<HttpState>) -> impl IntoResponse {
    Json(state.peers.list())
}

/// Body is a JSON array of `ws://` URLs. All are checked before any is dialled.
async fn add_peer(State(state): State<HttpState>, body: String) -> Response {
    let urls: Vec<String> = match serde_json::from_str(&body) {
        Ok(urls) => urls,
        Err(e) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(json!({ "error": format!("expected a JSON array of peer URLs: {e}") })),
            )
                .into_response();
        }
    };

    if let Some(err) = urls.iter().find_map(|url| validate_peer_url(url).err()) {
        return (StatusCode::BAD_REQUEST, Json(json!({ "error": err.to_string() }))).into_response();
    }

    let dialing: Vec<&String> = urls
        .iter()
        .filter(|url| {
            info!(url = %url, "Adding peer");
            state.dialer.dial(url.to_string())
        })
        .collect();

    (
        StatusCode::ACCEPTED,
        Json(json!({ "accepted": urls, "dialing": dialing })),
    )
        .into_response()
}

async fn health_check(State(state): State<HttpState>) -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "height": state.service.height(),
        "peers": state.peers.len(),
        "metrics": state.service.metrics(),
    }))
}
