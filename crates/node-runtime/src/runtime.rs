//! # Node Runtime
//!
//! Binds the two servers, dials configured peers and starts the sync task.
//!
//! ## Startup Sequence
//!
//! 1. Validate configuration
//! 2. Build the subsystem container (ledger at genesis)
//! 3. Bind HTTP and P2P listeners
//! 4. Dial configured peers
//! 5. Start periodic sync
//!
//! Every spawned task watches the same shutdown channel. Peer connection
//! loops, including those added later through `/addPeer`, are owned by the
//! `PeerDialer` and joined with the server tasks on shutdown.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use parking_lot::Mutex;
use tokio::net::TcpListener;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{error, info};

use crate::adapters::{http_router, p2p_router, HttpState, P2pState, PeerDialer};
use crate::container::{ConfigError, NodeConfig, SubsystemContainer};
use crate::handlers::run_periodic_sync;

/// Addresses the servers actually bound to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListenAddrs {
    pub http: SocketAddr,
    pub p2p: SocketAddr,
}

/// The main node runtime.
pub struct NodeRuntime {
    /// Subsystem container with all initialized services.
    container: Arc<SubsystemContainer>,
    /// Dials outbound peers (startup list and `/addPeer`).
    dialer: PeerDialer,
    /// Shutdown signal sender.
    shutdown_tx: watch::Sender<bool>,
    /// Shutdown signal receiver.
    shutdown_rx: watch::Receiver<bool>,
    /// Server and background tasks, joined on shutdown.
    tasks: Mutex<Vec<JoinHandle<()>>>,
}

impl NodeRuntime {
    /// Create a new node runtime with configuration.
    pub fn new(config: NodeConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        info!("Creating Gossip-Chain node runtime");

        let max_frame_bytes = config.network.max_frame_bytes;
        let container = Arc::new(SubsystemContainer::new(config));
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let dialer = PeerDialer::new(
            Arc::clone(&container.propagation),
            Arc::clone(&container.peers),
            shutdown_rx.clone(),
            max_frame_bytes,
        );

        Ok(Self {
            container,
            dialer,
            shutdown_tx,
            shutdown_rx,
            tasks: Mutex::new(Vec::new()),
        })
    }

    /// Start the node runtime.
    pub async fn start(&self) -> Result<ListenAddrs> {
        let config = &self.container.config;

        info!("===========================================");
        info!("  Gossip-Chain Node v{}", env!("CARGO_PKG_VERSION"));
        info!("===========================================");

        let p2p_listener = TcpListener::bind(config.network.p2p_addr())
            .await
            .with_context(|| format!("Failed to bind P2P port {}", config.network.p2p_addr()))?;
        let http_listener = TcpListener::bind(config.network.http_addr())
            .await
            .with_context(|| format!("Failed to bind HTTP port {}", config.network.http_addr()))?;

        let addrs = ListenAddrs {
            http: http_listener.local_addr().context("HTTP listener has no address")?,
            p2p: p2p_listener.local_addr().context("P2P listener has no address")?,
        };

        self.spawn_p2p_server(p2p_listener);
        self.spawn_http_server(http_listener);

        for url in &config.network.peers {
            self.dialer.dial(url.clone());
        }

        match config.sync.interval() {
            Some(interval) => {
                let service = Arc::clone(&self.container.propagation);
                self.track(tokio::spawn(run_periodic_sync(
                    service,
                    interval,
                    self.shutdown_rx.clone(),
                )));
            }
            None => info!("Periodic sync disabled"),
        }

        info!("P2P Port: {}", addrs.p2p);
        info!("HTTP Port: {}", addrs.http);
        Ok(addrs)
    }

    fn spawn_p2p_server(&self, listener: TcpListener) {
        let router = p2p_router(P2pState {
            service: Arc::clone(&self.container.propagation),
            peers: Arc::clone(&self.container.peers),
            shutdown: self.shutdown_rx.clone(),
            max_frame_bytes: self.container.config.network.max_frame_bytes,
        });
        let mut shutdown = self.shutdown_rx.clone();

        self.track(tokio::spawn(async move {
            let server = axum::serve(
                listener,
                router.into_make_service_with_connect_info::<SocketAddr>(),
            )
            .with_graceful_shutdown(async move {
                let _ = shutdown.changed().await;
            });
            if let Err(e) = server.await {
                error!(error = %e, "P2P server error");
            }
        }));
    }

    fn spawn_http_server(&self, listener: TcpListener) {
        let router = http_router(HttpState {
            service: Arc::clone(&self.container.propagation),
            peers: Arc::clone(&self.container.peers),
            dialer: self.dialer.clone(),
        });
        let mut shutdown = self.shutdown_rx.clone();

        self.track(tokio::spawn(async move {
            let server = axum::serve(listener, router).with_graceful_shutdown(async move {
                let _ = shutdown.changed().await;
            });
            if let Err(e) = server.await {
                error!(error = %e, "HTTP server error");
            }
        }));
    }

    fn track(&self, handle: JoinHandle<()>) {
        self.tasks.lock().push(handle);
    }

    /// Dial another peer after startup.
    ///
    /// Returns false if the URL is already being dialed.
    pub fn connect_to_peer(&self, url: impl Into<String>) -> bool {
        self.dialer.dial(url.into())
    }

    /// Shutdown the node gracefully.
    ///
    /// Signals every task, then waits up to `grace` for them to finish.
    pub async fn shutdown(&self, grace: Duration) {
        info!("Initiating graceful shutdown...");

        if let Err(e) = self.shutdown_tx.send(true) {
            error!("Failed to send shutdown signal: {}", e);
        }

        let mut tasks: Vec<_> = std::mem::take(&mut *self.tasks.lock());
        tasks.extend(self.dialer.take_loops());
        let joined = tokio::time::timeout(grace, futures_util::future::join_all(tasks)).await;
        if joined.is_err() {
            error!("Some tasks did not stop within {:?}", grace);
        }

        info!("Shutdown complete");
    }

    /// Get a reference to the subsystem container.
    pub fn container(&self) -> Arc<SubsystemContainer> {
        Arc::clone(&self.container)
    }
}
