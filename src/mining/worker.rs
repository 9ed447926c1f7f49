//! Mining worker.
//!
//! Each worker waits at the start gate, then repeatedly claims a transaction
//! from the shared worklist, searches for a nonce whose digest falls under
//! the threshold, burns `work_factor` extra random draws, and commits the
//! record to the chain under the commit lock. A nonce that no longer
//! qualifies after the penalty sends the worker back to searching.

use std::collections::HashSet;
use std::sync::Arc;

use log::{debug, info, warn};
use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};
use serde::Serialize;

use super::worklist::Claim;
use super::{LinkPolicy, MiningContext};
use crate::blockchain::{Digest, MinerId, TransactionRecord, hash_parts};

/// Per-miner counters collected during a run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct WorkerStats {
    /// Records appended to the chain.
    pub mined: u64,
    /// Claims dropped because this miner had already committed the same id.
    pub skipped: u64,
    /// Commits abandoned because the post-penalty nonce missed the threshold.
    pub rejected_commits: u64,
    /// Commits abandoned because the tail moved (strict linking only).
    pub stale_retries: u64,
    /// Digests computed while searching.
    pub hashes: u64,
    /// Throwaway draws spent on the work penalty.
    pub penalty_draws: u64,
}

/// What a miner hands back to the coordinator when it is done.
#[derive(Debug, Clone)]
pub struct WorkerReport {
    pub miner: MinerId,
    pub mined: u64,
    /// Transaction ids this miner committed.
    pub processed: HashSet<u32>,
    pub stats: WorkerStats,
}

pub struct MinerWorker {
    id: MinerId,
    ctx: Arc<MiningContext>,
    rng: StdRng,
    processed: HashSet<u32>,
    stats: WorkerStats,
}

/// Derive a miner's RNG seed from the run seed and its identity.
pub fn worker_seed(run_seed: u64, id: MinerId) -> u64 {
    run_seed ^ (id.0 as u64 + 1).wrapping_mul(0x9e37_79b9_7f4a_7c15)
}

impl MinerWorker {
    pub fn new(id: MinerId, run_seed: u64, ctx: Arc<MiningContext>) -> Self {
        Self {
            id,
            ctx,
            rng: StdRng::seed_from_u64(worker_seed(run_seed, id)),
            processed: HashSet::new(),
            stats: WorkerStats::default(),
        }
    }

    /// Run until the worklist is exhausted. Blocks until the start signal is raised.
    pub fn run(mut self) -> WorkerReport {
        self.ctx.start.wait();
        debug!("Miner {} started", self.id);

        while let Some(claim) = self.ctx.worklist.claim() {
            debug!("Miner {} claimed #{} (id={})", self.id, claim.index, claim.id);
            self.mine(claim);
        }

        info!(
            "Miner {} done: mined={} skipped={} rejected={} hashes={}",
            self.id,
            self.stats.mined,
            self.stats.skipped,
            self.stats.rejected_commits,
            self.stats.hashes
        );

        WorkerReport {
            miner: self.id,
            mined: self.stats.mined,
            processed: self.processed,
            stats: self.stats,
        }
    }

    fn mine(&mut self, claim: Claim) {
        let prev_digest = self.ctx.chain.tail_digest();
        self.mine_on(claim, prev_digest);
    }

    /// Search and commit `claim` on top of the tail digest read at claim time.
    fn mine_on(&mut self, claim: Claim, mut prev_digest: Digest) {
        let threshold = self.ctx.params.threshold;
        loop {
            let found = self.search(claim.id, prev_digest);
            let nonce = self.penalty(found);

            let commit = self.ctx.chain.lock_commit();
            if hash_parts(claim.id, prev_digest, nonce) > threshold {
                self.stats.rejected_commits += 1;
                continue;
            }

            if self.ctx.link_policy == LinkPolicy::Strict {
                let tail = commit.tail_digest();
                if tail != prev_digest {
                    warn!(
                        "Miner {} tail moved while mining id={}, restarting search",
                        self.id, claim.id
                    );
                    self.stats.stale_retries += 1;
                    prev_digest = tail;
                    continue;
                }
            }

            if !self.processed.insert(claim.id) {
                debug!("Miner {} already committed id={}, skipping", self.id, claim.id);
                self.stats.skipped += 1;
                return;
            }

            let position =
                commit.append(TransactionRecord::new(claim.id, prev_digest, nonce, self.id));
            self.stats.mined += 1;
            debug!(
                "Miner {} sealed id={} at #{} (nonce={}, prev={:08x})",
                self.id, claim.id, position, nonce, prev_digest
            );
            return;
        }
    }

    /// Draw nonces until one hashes under the threshold.
    fn search(&mut self, id: u32, prev_digest: Digest) -> u32 {
        let threshold = self.ctx.params.threshold;
        loop {
            let nonce = self.rng.next_u32();
            self.stats.hashes += 1;
            if hash_parts(id, prev_digest, nonce) <= threshold {
                return nonce;
            }
        }
    }

    /// Simulate extra mining cost. The last draw replaces the nonce.
    fn penalty(&mut self, mut nonce: u32) -> u32 {
        let work_factor = self.ctx.params.work_factor;
        for _ in 0..work_factor {
            nonce = self.rng.next_u32();
        }
        self.stats.penalty_draws += work_factor;
        nonce
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blockchain::{hash_record, stale_links, validate};
    use crate::mining::{DifficultyParams, StartPolicy};
    use proptest::prelude::*;

    fn context(ids: Vec<u32>, difficulty: u32, link_policy: LinkPolicy) -> Arc<MiningContext> {
        let params = DifficultyParams::new(difficulty).unwrap();
        let ctx = Arc::new(MiningContext::new(params, ids, StartPolicy::Spin, link_policy));
        ctx.start.raise();
        ctx
    }

    #[test]
    fn single_miner_mines_everything() {
        let ctx = context(vec![10, 20, 30], 1, LinkPolicy::Reference);
        let report = MinerWorker::new(MinerId(0), 42, Arc::clone(&ctx)).run();

        assert_eq!(report.mined, 3);
        assert_eq!(report.processed, HashSet::from([10, 20, 30]));

        let records = ctx.chain.snapshot();
        assert_eq!(records.len(), 4);
        assert!(validate(&records, ctx.params.threshold));
        for pair in records.windows(2) {
            assert_eq!(pair[1].prev_digest, hash_record(&pair[0]));
            assert_eq!(pair[1].miner, Some(MinerId(0)));
        }
    }

    #[test]
    fn repeated_id_is_skipped_by_the_same_miner() {
        let ctx = context(vec![5, 5, 6], 1, LinkPolicy::Reference);
        let report = MinerWorker::new(MinerId(3), 7, Arc::clone(&ctx)).run();

        assert_eq!(report.mined, 2);
        assert_eq!(report.stats.skipped, 1);
        assert_eq!(ctx.chain.len(), 3);
    }

    #[test]
    fn empty_worklist_mines_nothing() {
        let ctx = context(vec![], 2, LinkPolicy::Reference);
        let report = MinerWorker::new(MinerId(0), 1, Arc::clone(&ctx)).run();

        assert_eq!(report.mined, 0);
        assert_eq!(report.stats.hashes, 0);
        assert_eq!(ctx.chain.len(), 1);
    }

    #[test]
    fn penalty_draws_follow_work_factor() {
        let ctx = context(vec![1, 2], 3, LinkPolicy::Strict);
        let report = MinerWorker::new(MinerId(0), 9, Arc::clone(&ctx)).run();

        let attempts = report.mined + report.stats.rejected_commits;
        assert_eq!(report.stats.penalty_draws, attempts * 100);
        assert!(report.stats.hashes >= attempts);
    }

    #[test]
    fn same_seed_same_chain() {
        let a = context(vec![10, 20, 30], 2, LinkPolicy::Reference);
        let b = context(vec![10, 20, 30], 2, LinkPolicy::Reference);
        MinerWorker::new(MinerId(1), 99, Arc::clone(&a)).run();
        MinerWorker::new(MinerId(1), 99, Arc::clone(&b)).run();
        assert_eq!(a.chain.snapshot(), b.chain.snapshot());
    }

    /// Read the tail, let another miner commit first, then finish mining.
    fn mine_after_competing_commit(link_policy: LinkPolicy) -> (MinerWorker, Vec<TransactionRecord>) {
        let ctx = context(vec![], 1, link_policy);
        let mut worker = MinerWorker::new(MinerId(0), 5, Arc::clone(&ctx));

        let observed = ctx.chain.tail_digest();
        let nonce = (0..)
            .find(|&n| hash_parts(99, observed, n) <= ctx.params.threshold)
            .unwrap();
        {
            let commit = ctx.chain.lock_commit();
            commit.append(TransactionRecord::new(99, observed, nonce, MinerId(1)));
        }
        worker.mine_on(Claim { index: 0, id: 42 }, observed);

        let records = ctx.chain.snapshot();
        (worker, records)
    }

    #[test]
    fn reference_policy_commits_on_the_observed_digest() {
        let (worker, records) = mine_after_competing_commit(LinkPolicy::Reference);

        assert_eq!(records.len(), 3);
        assert_eq!(records[2].id, 42);
        assert_eq!(records[2].prev_digest, hash_record(&records[0]));
        assert_eq!(records[2].prev_index, Some(1));
        assert_eq!(stale_links(&records), vec![2]);
        assert_eq!(worker.stats.stale_retries, 0);
        assert!(validate(&records, worker.ctx.params.threshold));
    }

    #[test]
    fn strict_policy_retries_on_the_new_tail() {
        let (worker, records) = mine_after_competing_commit(LinkPolicy::Strict);

        assert_eq!(records.len(), 3);
        assert_eq!(records[2].prev_digest, hash_record(&records[1]));
        assert!(stale_links(&records).is_empty());
        assert_eq!(worker.stats.stale_retries, 1);
        assert_eq!(worker.stats.mined, 1);
    }

    #[test]
    fn seeds_differ_per_miner() {
        assert_ne!(worker_seed(0, MinerId(0)), worker_seed(0, MinerId(1)));
        assert_ne!(worker_seed(5, MinerId(2)), worker_seed(6, MinerId(2)));
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        #[test]
        fn single_miner_chain_is_always_valid(
            seed in any::<u64>(),
            difficulty in 1u32..=2,
            ids in prop::collection::vec(any::<u32>(), 0..8),
        ) {
            let ctx = context(ids, difficulty, LinkPolicy::Reference);
            MinerWorker::new(MinerId(0), seed, Arc::clone(&ctx)).run();

            let records = ctx.chain.snapshot();
            prop_assert!(validate(&records, ctx.params.threshold));
            prop_assert!(stale_links(&records).is_empty());
        }
    }
}
