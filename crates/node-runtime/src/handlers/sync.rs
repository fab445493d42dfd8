//! Periodic QUERY_LATEST broadcast.
//!
//! Gossip alone stalls when a broadcast is lost; re-asking every peer for
//! its tip on a timer lets lagging nodes notice and catch up.

use std::sync::Arc;
use std::time::Duration;

use gc_02_block_propagation::BlockPropagationApi;
use tokio::sync::watch;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info};

/// Broadcast QUERY_LATEST every `interval` until shutdown.
pub async fn run_periodic_sync<S>(service: Arc<S>, interval: Duration, mut shutdown: watch::Receiver<bool>)
where
    S: BlockPropagationApi + ?Sized,
{
    info!(interval_secs = interval.as_secs(), "Periodic sync started");

    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // The first tick completes immediately; peers are queried on connect anyway.
    ticker.tick().await;

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let reached = service.request_latest_from_peers();
                debug!(peers = reached, "Periodic sync: QUERY_LATEST sent");
            }
            _ = shutdown.changed() => {
                info!("[sync] Shutdown signal received");
                break;
            }
        }
    }
}
