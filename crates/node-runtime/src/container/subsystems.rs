//! # Subsystem Container
//!
//! Holds the node's services and the peer registry they share.
//!
//! ```text
//! PeerRegistry ──implements PeerNetwork──→ BlockPropagationService
//!      ↑                                          ↑
//!   transport (P2P server/client)          HTTP control API
//! ```
//!
//! Only the propagation service touches the ledger. Adapters hold `Arc`s
//! to the service and the registry and nothing else.

use std::sync::Arc;

use gc_02_block_propagation::BlockPropagationService;
use tracing::info;

use crate::adapters::PeerRegistry;
use crate::container::config::NodeConfig;

/// Concrete propagation service wired to the live peer registry.
pub type NodeService = BlockPropagationService<PeerRegistry>;

/// Central container holding all subsystem instances.
pub struct SubsystemContainer {
    /// Connected peers and their outboxes.
    pub peers: Arc<PeerRegistry>,

    /// Ledger owner and reconciliation engine.
    pub propagation: Arc<NodeService>,

    /// Configuration the container was built from.
    pub config: NodeConfig,
}

impl SubsystemContainer {
    pub fn new(config: NodeConfig) -> Self {
        let peers = Arc::new(PeerRegistry::new());
        let propagation = Arc::new(BlockPropagationService::new(Arc::clone(&peers)));

        info!("[gc-01] Ledger initialized at genesis");
        info!("[gc-02] Block propagation service ready");

        Self {
            peers,
            propagation,
            config,
        }
    }
}
