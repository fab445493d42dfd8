//! # Convergence Tests
//!
//! Multi-node topologies with lost frames, partitions and arbitrary
//! delivery order. Every test ends with all linked nodes on one chain.

#[cfg(test)]
mod tests {
    use gc_01_ledger::is_valid_chain;
    use gc_02_block_propagation::BlockPropagationApi;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    use crate::harness::SimNetwork;

    const MAX_STEPS: usize = 10_000;

    fn mesh(count: usize) -> SimNetwork {
        let net = SimNetwork::new(count);
        for a in 0..count {
            for b in (a + 1)..count {
                net.connect(a, b);
            }
        }
        net.run_until_quiet(MAX_STEPS);
        net
    }

    // =============================================================================
    // RELAY
    // =============================================================================

    #[test]
    fn test_blocks_relay_along_a_line() {
        let net = SimNetwork::new(3);
        net.connect(0, 1);
        net.connect(1, 2);
        net.run_until_quiet(MAX_STEPS);

        for i in 0..5 {
            net.service(0).mint_block(format!("relay {i}")).unwrap();
            net.run_until_quiet(MAX_STEPS);
        }

        assert!(net.converged());
        assert_eq!(net.chain(2).len(), 6);
        assert_eq!(net.service(2).metrics().blocks_appended, 5);
    }

    #[test]
    fn test_query_latest_heals_a_lost_broadcast() {
        let net = SimNetwork::new(2);
        net.connect(0, 1);
        net.run_until_quiet(MAX_STEPS);

        net.service(0).mint_block("dropped".to_string()).unwrap();
        net.drop_pending();
        assert_eq!(net.chain(1).len(), 1);

        assert_eq!(net.service(1).request_latest_from_peers(), 1);
        net.run_until_quiet(MAX_STEPS);

        assert!(net.converged());
        assert_eq!(net.service(1).metrics().blocks_appended, 1);
    }

    #[test]
    fn test_frames_to_unlinked_peers_are_lost() {
        let net = SimNetwork::new(2);
        net.connect(0, 1);
        net.run_until_quiet(MAX_STEPS);

        net.service(0).mint_block("in flight".to_string()).unwrap();
        net.disconnect(0, 1);
        net.run_until_quiet(MAX_STEPS);

        assert_eq!(net.chain(1).len(), 1);
        assert_eq!(net.service(0).request_latest_from_peers(), 0);
    }

    // =============================================================================
    // PARTITIONS
    // =============================================================================

    #[test]
    fn test_longer_branch_wins_after_partition() {
        let net = SimNetwork::new(2);
        for i in 0..3 {
            net.service(0).mint_block(format!("a{i}")).unwrap();
        }
        net.service(1).mint_block("b0".to_string()).unwrap();
        let winner = net.chain(0);

        net.connect(0, 1);
        net.run_until_quiet(MAX_STEPS);

        assert!(net.converged());
        assert_eq!(net.chain(1), winner);
        assert_eq!(net.service(1).metrics().chains_replaced, 1);
        assert_eq!(net.service(0).metrics().chains_replaced, 0);
    }

    #[test]
    fn test_equal_branches_stay_apart_until_one_grows() {
        let net = SimNetwork::new(2);
        for i in 0..2 {
            net.service(0).mint_block(format!("a{i}")).unwrap();
            net.service(1).mint_block(format!("b{i}")).unwrap();
        }

        net.connect(0, 1);
        net.run_until_quiet(MAX_STEPS);
        assert!(!net.converged());
        assert_eq!(net.chain(0).len(), net.chain(1).len());

        net.service(0).mint_block("tiebreak".to_string()).unwrap();
        net.run_until_quiet(MAX_STEPS);

        assert!(net.converged());
        assert_eq!(net.chain(1)[1].data, "a0");
    }

    #[test]
    fn test_partitioned_mesh_heals() {
        let net = mesh(4);
        net.disconnect(0, 2);
        net.disconnect(0, 3);
        net.disconnect(1, 2);
        net.disconnect(1, 3);

        // {0, 1} grows faster than {2, 3}.
        for i in 0..4 {
            net.service(0).mint_block(format!("left {i}")).unwrap();
            net.run_until_quiet(MAX_STEPS);
        }
        net.service(3).mint_block("right".to_string()).unwrap();
        net.run_until_quiet(MAX_STEPS);
        assert!(!net.converged());

        net.connect(1, 2);
        net.run_until_quiet(MAX_STEPS);

        assert!(net.converged());
        assert_eq!(net.chain(3).len(), 5);
        assert!(is_valid_chain(&net.chain(3)));
    }

    // =============================================================================
    // DELIVERY ORDER
    // =============================================================================

    #[test]
    fn test_shuffled_delivery_converges() {
        for seed in 0..20u64 {
            let mut rng = StdRng::seed_from_u64(seed);
            let net = mesh(4);

            for _ in 0..6 {
                let minter = rng.gen_range(0..4);
                let burst = rng.gen_range(1..=3);
                for i in 0..burst {
                    net.service(minter).mint_block(format!("seed {seed} #{i}")).unwrap();
                }
                net.run_shuffled(&mut rng, MAX_STEPS);
                assert!(net.converged(), "seed {seed} diverged");
            }

            assert!(is_valid_chain(&net.chain(0)), "seed {seed} produced an invalid chain");
        }
    }

    #[test]
    fn test_burst_in_random_order_converges() {
        let net = mesh(3);
        net.service(0).mint_block("first".to_string()).unwrap();
        net.service(0).mint_block("second".to_string()).unwrap();
        assert_eq!(net.pending(), 4);

        let mut rng = StdRng::seed_from_u64(7);
        net.run_shuffled(&mut rng, MAX_STEPS);

        assert!(net.converged());
        assert_eq!(net.chain(2).len(), 3);
    }
}
