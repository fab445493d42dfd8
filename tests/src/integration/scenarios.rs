//! # Reconciliation Scenarios
//!
//! Two-node flows for each branch of the reconciliation table:
//!
//! 1. **Direct append**: a peer's new tip links to ours
//! 2. **Full-chain fallback**: a peer is several blocks ahead
//! 3. **Forged history**: a longer chain with a different genesis

#[cfg(test)]
mod tests {
    use gc_01_ledger::is_valid_chain;
    use gc_02_block_propagation::{BlockPropagationApi, BlockReceiver, ReconciliationOutcome};
    use shared_types::{Block, Message};

    use crate::harness::SimNetwork;

    const MAX_STEPS: usize = 1_000;

    fn connected_pair() -> SimNetwork {
        let net = SimNetwork::new(2);
        net.connect(0, 1);
        net.run_until_quiet(MAX_STEPS);
        net
    }

    // =============================================================================
    // SCENARIO 1: DIRECT APPEND
    // =============================================================================

    #[test]
    fn test_minted_block_reaches_peer_by_direct_append() {
        let net = connected_pair();

        let block = net.service(0).mint_block("hello".to_string()).unwrap();
        net.run_until_quiet(MAX_STEPS);

        assert_eq!(net.chain(1).len(), 2);
        assert_eq!(net.chain(1)[1], block);
        assert!(net.converged());

        let follower = net.service(1).metrics();
        assert_eq!(follower.blocks_appended, 1);
        assert_eq!(follower.full_chain_requests, 0);
        assert_eq!(follower.chains_replaced, 0);
    }

    #[test]
    fn test_mints_on_both_sides_interleave() {
        let net = connected_pair();

        for round in 0..5 {
            let minter = round % 2;
            net.service(minter).mint_block(format!("round {round}")).unwrap();
            net.run_until_quiet(MAX_STEPS);
        }

        assert!(net.converged());
        assert_eq!(net.chain(0).len(), 6);
        assert!(is_valid_chain(&net.chain(0)));
    }

    // =============================================================================
    // SCENARIO 2: FULL-CHAIN FALLBACK
    // =============================================================================

    #[test]
    fn test_late_joiner_fetches_full_chain() {
        let net = SimNetwork::new(2);
        for i in 0..4 {
            net.service(0).mint_block(format!("block {i}")).unwrap();
        }

        net.connect(0, 1);
        net.run_until_quiet(MAX_STEPS);

        assert!(net.converged());
        assert_eq!(net.chain(1).len(), 5);

        let follower = net.service(1).metrics();
        assert_eq!(follower.full_chain_requests, 1);
        assert_eq!(follower.chains_replaced, 1);
    }

    #[test]
    fn test_lost_broadcast_is_recovered_by_gap_detection() {
        let net = connected_pair();

        net.service(0).mint_block("lost".to_string()).unwrap();
        assert_eq!(net.drop_pending(), 1);

        net.service(0).mint_block("arrives".to_string()).unwrap();
        net.run_until_quiet(MAX_STEPS);

        assert!(net.converged());
        assert_eq!(net.chain(1).len(), 3);
        assert_eq!(net.service(1).metrics().full_chain_requests, 1);
    }

    // =============================================================================
    // SCENARIO 3: FORGED HISTORY
    // =============================================================================

    fn forged_chain(len: usize) -> Vec<Block> {
        let mut genesis = Block::genesis();
        genesis.data = "my genesis block!?".to_string();
        genesis.hash = genesis.recompute_hash();

        let mut chain = vec![genesis];
        while chain.len() < len {
            let next = Block::next(&chain[chain.len() - 1], "forged", "1700000000");
            chain.push(next);
        }
        chain
    }

    #[test]
    fn test_forged_genesis_is_rejected_at_any_length() {
        let net = connected_pair();
        net.service(1).mint_block("real".to_string()).unwrap();
        net.run_until_quiet(MAX_STEPS);
        let before = net.chain(1);

        let frame = Message::ResponseChain(forged_chain(50)).encode().unwrap();
        net.inject(0, 1, frame);
        net.run_until_quiet(MAX_STEPS);

        assert_eq!(net.chain(1), before);
        assert_eq!(net.service(1).metrics().updates_rejected, 1);
    }

    #[test]
    fn test_forged_tip_triggers_query_all_but_not_replace() {
        let net = connected_pair();
        let forged = forged_chain(10);

        let outcome = net
            .service(1)
            .handle_message(net.node(0).id, Message::latest(forged[9].clone()));
        assert_eq!(outcome, ReconciliationOutcome::RequestedFullChain);

        // Node 0 answers QUERY_ALL with its honest chain, which is not longer.
        net.run_until_quiet(MAX_STEPS);
        assert_eq!(net.chain(1), vec![Block::genesis()]);
    }

    // =============================================================================
    // IDEMPOTENCE
    // =============================================================================

    #[test]
    fn test_redelivered_block_is_ignored() {
        let net = connected_pair();
        let block = net.service(0).mint_block("once".to_string()).unwrap();
        net.run_until_quiet(MAX_STEPS);

        let frame = Message::latest(block).encode().unwrap();
        net.inject(0, 1, frame.clone());
        net.inject(0, 1, frame);
        net.run_until_quiet(MAX_STEPS);

        assert_eq!(net.chain(1).len(), 2);
        assert_eq!(net.service(1).metrics().blocks_appended, 1);
    }

    #[test]
    fn test_malformed_frames_do_not_disturb_state() {
        let net = connected_pair();
        for frame in ["", "{", r#"{"type":9}"#, r#"{"type":2}"#, r#"{"type":2,"data":[]}"#] {
            net.inject(0, 1, frame);
        }
        net.run_until_quiet(MAX_STEPS);

        assert_eq!(net.chain(1), vec![Block::genesis()]);
        assert_eq!(net.service(1).metrics().messages_dropped, 5);
    }

    #[test]
    fn test_bare_block_payload_is_accepted() {
        let net = connected_pair();
        let block = Block::next(&Block::genesis(), "bare", "1700000000");
        let frame = format!(
            r#"{{"type":2,"data":{{"index":1,"previousHash":"{}","timestamp":"1700000000","data":"bare","hash":"{}"}}}}"#,
            block.previous_hash, block.hash
        );

        net.inject(0, 1, frame);
        net.run_until_quiet(MAX_STEPS);

        assert_eq!(net.chain(1), vec![Block::genesis(), block]);
    }
}
