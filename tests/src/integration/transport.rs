//! # Transport Tests
//!
//! Real nodes on loopback with ephemeral ports, linked over WebSocket.
//! Periodic sync is disabled so every block moves by broadcast or by the
//! connect-time QUERY_LATEST.

#[cfg(test)]
mod tests {
    use std::net::{IpAddr, Ipv4Addr};
    use std::time::Duration;

    use gc_02_block_propagation::BlockPropagationApi;
    use node_runtime::{ListenAddrs, NodeConfig, NodeRuntime};

    const WAIT: Duration = Duration::from_secs(10);
    const GRACE: Duration = Duration::from_secs(2);

    fn loopback_config() -> NodeConfig {
        let mut config = NodeConfig::default();
        config.network.bind_addr = IpAddr::V4(Ipv4Addr::LOCALHOST);
        config.network.http_port = 0;
        config.network.p2p_port = 0;
        config.sync.interval_secs = 0;
        config
    }

    async fn start_node() -> (NodeRuntime, ListenAddrs) {
        let node = NodeRuntime::new(loopback_config()).unwrap();
        let addrs = node.start().await.unwrap();
        (node, addrs)
    }

    fn peer_url(addrs: &ListenAddrs) -> String {
        format!("ws://{}/ws", addrs.p2p)
    }

    async fn wait_for<F: Fn() -> bool>(condition: F) -> bool {
        tokio::time::timeout(WAIT, async {
            while !condition() {
                tokio::time::sleep(Duration::from_millis(20)).await;
            }
        })
        .await
        .is_ok()
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_block_crosses_a_websocket_link() {
        let (a, a_addrs) = start_node().await;
        let (b, _) = start_node().await;

        assert!(b.connect_to_peer(peer_url(&a_addrs)));
        assert!(!b.connect_to_peer(peer_url(&a_addrs)));
        let a_container = a.container();
        assert!(wait_for(|| a_container.peers.len() == 1).await, "dial never landed");

        let block = a_container
            .propagation
            .mint_block("over the wire".to_string())
            .unwrap();

        let b_container = b.container();
        assert!(wait_for(|| b_container.propagation.height() == 2).await);
        assert_eq!(b_container.propagation.latest(), block);

        b.shutdown(GRACE).await;
        a.shutdown(GRACE).await;
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_late_joiner_replaces_its_chain() {
        let (a, a_addrs) = start_node().await;
        let a_container = a.container();
        for i in 0..3 {
            a_container.propagation.mint_block(format!("early {i}")).unwrap();
        }

        let (b, _) = start_node().await;
        b.connect_to_peer(peer_url(&a_addrs));

        let b_container = b.container();
        assert!(wait_for(|| b_container.propagation.metrics().chains_replaced == 1).await);
        assert_eq!(b_container.propagation.chain(), a_container.propagation.chain());

        b.shutdown(GRACE).await;
        a.shutdown(GRACE).await;
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_blocks_flow_both_ways() {
        let (a, a_addrs) = start_node().await;
        let (b, _) = start_node().await;
        b.connect_to_peer(peer_url(&a_addrs));

        let (a_container, b_container) = (a.container(), b.container());
        assert!(wait_for(|| a_container.peers.len() == 1 && b_container.peers.len() == 1).await);

        b_container.propagation.mint_block("from b".to_string()).unwrap();
        assert!(wait_for(|| a_container.propagation.height() == 2).await);

        a_container.propagation.mint_block("from a".to_string()).unwrap();
        assert!(wait_for(|| b_container.propagation.height() == 3).await);
        assert_eq!(a_container.propagation.chain(), b_container.propagation.chain());

        b.shutdown(GRACE).await;
        a.shutdown(GRACE).await;
    }

    #[tokio::test]
    async fn test_shutdown_with_unreachable_peer() {
        let mut config = loopback_config();
        config.network.peers = vec!["ws://127.0.0.1:9/ws".to_string()];
        let node = NodeRuntime::new(config).unwrap();
        node.start().await.unwrap();

        tokio::time::timeout(Duration::from_secs(5), node.shutdown(GRACE))
            .await
            .expect("shutdown hung");
        assert!(node.container().peers.is_empty());
    }
}
