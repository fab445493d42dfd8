//! In-memory network for driving several propagation services.
//!
//! Every send is queued as an encoded frame and delivered only when a test
//! asks for it, so tests control ordering, loss and partitions exactly.
//! Frames go through `Message::encode`/`decode` like on a real socket.

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Arc;

use gc_02_block_propagation::{
    BlockPropagationApi, BlockPropagationService, BlockReceiver, PeerNetwork, PropagationError,
};
use parking_lot::{Mutex, RwLock};
use rand::Rng;
use shared_types::{Block, Message, PeerId};

/// A frame in flight.
#[derive(Debug, Clone)]
pub struct Envelope {
    pub from: PeerId,
    pub to: PeerId,
    pub frame: String,
}

type Queue = Arc<Mutex<VecDeque<Envelope>>>;
type Links = Arc<RwLock<HashMap<PeerId, HashSet<PeerId>>>>;

/// One node's view of the simulated network.
pub struct SimPort {
    id: PeerId,
    queue: Queue,
    links: Links,
}

impl SimPort {
    fn linked_peers(&self) -> Vec<PeerId> {
        self.links
            .read()
            .get(&self.id)
            .map(|peers| peers.iter().copied().collect())
            .unwrap_or_default()
    }

    fn push(&self, to: PeerId, message: &Message) -> Result<(), PropagationError> {
        let frame = message.encode()?;
        self.queue.lock().push_back(Envelope {
            from: self.id,
            to,
            frame,
        });
        Ok(())
    }
}

impl PeerNetwork for SimPort {
    fn send_to_peer(&self, peer_id: PeerId, message: &Message) -> Result<(), PropagationError> {
        let linked = self
            .links
            .read()
            .get(&self.id)
            .is_some_and(|peers| peers.contains(&peer_id));
        if !linked {
            return Err(PropagationError::UnknownPeer(peer_id));
        }
        self.push(peer_id, message)
    }

    fn broadcast(&self, message: &Message) -> usize {
        self.linked_peers()
            .into_iter()
            .filter(|peer| self.push(*peer, message).is_ok())
            .count()
    }
}

pub type SimService = BlockPropagationService<SimPort>;

/// A node in the simulation.
pub struct SimNode {
    pub id: PeerId,
    pub service: Arc<SimService>,
}

/// A set of nodes sharing one message queue.
pub struct SimNetwork {
    queue: Queue,
    links: Links,
    nodes: Vec<SimNode>,
}

impl SimNetwork {
    /// `count` isolated nodes, each at genesis.
    pub fn new(count: usize) -> Self {
        let queue: Queue = Arc::default();
        let links: Links = Arc::default();

        let nodes = (0..count)
            .map(|_| {
                let id = PeerId::new();
                let port = SimPort {
                    id,
                    queue: Arc::clone(&queue),
                    links: Arc::clone(&links),
                };
                SimNode {
                    id,
                    service: Arc::new(BlockPropagationService::new(Arc::new(port))),
                }
            })
            .collect();

        Self {
            queue,
            links,
            nodes,
        }
    }

    pub fn node(&self, index: usize) -> &SimNode {
        &self.nodes[index]
    }

    pub fn service(&self, index: usize) -> &SimService {
        &self.nodes[index].service
    }

    /// Link two nodes and raise the connect event on both ends.
    pub fn connect(&self, a: usize, b: usize) {
        let (id_a, id_b) = (self.nodes[a].id, self.nodes[b].id);
        {
            let mut links = self.links.write();
            links.entry(id_a).or_default().insert(id_b);
            links.entry(id_b).or_default().insert(id_a);
        }
        self.nodes[a].service.handle_peer_connected(id_b);
        self.nodes[b].service.handle_peer_connected(id_a);
    }

    /// Unlink two nodes. Frames already queued between them are lost on delivery.
    pub fn disconnect(&self, a: usize, b: usize) {
        let (id_a, id_b) = (self.nodes[a].id, self.nodes[b].id);
        let mut links = self.links.write();
        if let Some(peers) = links.get_mut(&id_a) {
            peers.remove(&id_b);
        }
        if let Some(peers) = links.get_mut(&id_b) {
            peers.remove(&id_a);
        }
    }

    pub fn pending(&self) -> usize {
        self.queue.lock().len()
    }

    /// Lose every queued frame.
    pub fn drop_pending(&self) -> usize {
        let mut queue = self.queue.lock();
        let lost = queue.len();
        queue.clear();
        lost
    }

    /// Put an arbitrary frame on the wire.
    pub fn inject(&self, from: usize, to: usize, frame: impl Into<String>) {
        self.queue.lock().push_back(Envelope {
            from: self.nodes[from].id,
            to: self.nodes[to].id,
            frame: frame.into(),
        });
    }

    /// Deliver the oldest queued frame. Returns false when the queue is empty.
    pub fn deliver_next(&self) -> bool {
        let next = self.queue.lock().pop_front();
        match next {
            Some(envelope) => {
                self.deliver(envelope);
                true
            }
            None => false,
        }
    }

    /// Deliver a random queued frame.
    pub fn deliver_random<R: Rng>(&self, rng: &mut R) -> bool {
        let next = {
            let mut queue = self.queue.lock();
            if queue.is_empty() {
                None
            } else {
                let index = rng.gen_range(0..queue.len());
                queue.remove(index)
            }
        };
        match next {
            Some(envelope) => {
                self.deliver(envelope);
                true
            }
            None => false,
        }
    }

    /// FIFO delivery until nothing is queued. Returns frames delivered.
    ///
    /// # Panics
    /// If the network is still busy after `max_steps` deliveries.
    pub fn run_until_quiet(&self, max_steps: usize) -> usize {
        let mut steps = 0;
        while self.deliver_next() {
            steps += 1;
            assert!(steps <= max_steps, "network did not settle in {max_steps} steps");
        }
        steps
    }

    /// Random-order delivery until nothing is queued.
    pub fn run_shuffled<R: Rng>(&self, rng: &mut R, max_steps: usize) -> usize {
        let mut steps = 0;
        while self.deliver_random(rng) {
            steps += 1;
            assert!(steps <= max_steps, "network did not settle in {max_steps} steps");
        }
        steps
    }

    /// Whether every node holds the same chain.
    pub fn converged(&self) -> bool {
        let first = self.nodes[0].service.chain();
        self.nodes.iter().all(|node| node.service.chain() == first)
    }

    pub fn chain(&self, index: usize) -> Vec<Block> {
        self.nodes[index].service.chain()
    }

    fn deliver(&self, envelope: Envelope) {
        let linked = self
            .links
            .read()
            .get(&envelope.from)
            .is_some_and(|peers| peers.contains(&envelope.to));
        if !linked {
            return;
        }

        if let Some(node) = self.nodes.iter().find(|n| n.id == envelope.to) {
            let _ = node.service.handle_raw_message(envelope.from, &envelope.frame);
        }
    }
}
