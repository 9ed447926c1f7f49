use std::collections::HashSet;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use log::{error, info, warn};

use super::worker::{MinerWorker, WorkerReport};
use super::{DifficultyParams, LinkPolicy, MiningContext, StartPolicy};
use crate::blockchain::{
    MinerId, TransactionRecord, Violation, stale_links, validate, validate_detailed,
};
use crate::error::{ConfigError, MiningError};

/// Parameters of one mining run.
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub params: DifficultyParams,
    pub miners: usize,
    pub start_policy: StartPolicy,
    pub link_policy: LinkPolicy,
    /// Base seed for the miners' generators; random when `None`.
    pub seed: Option<u64>,
}

impl RunConfig {
    pub fn new(difficulty: u32, miners: usize) -> Result<Self, ConfigError> {
        if miners == 0 {
            return Err(ConfigError::NoMiners);
        }
        Ok(Self {
            params: DifficultyParams::new(difficulty)?,
            miners,
            start_policy: StartPolicy::default(),
            link_policy: LinkPolicy::default(),
            seed: None,
        })
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_link_policy(mut self, policy: LinkPolicy) -> Self {
        self.link_policy = policy;
        self
    }

    pub fn with_start_policy(mut self, policy: StartPolicy) -> Self {
        self.start_policy = policy;
        self
    }
}

/// Outcome of a finished run.
#[derive(Debug, Clone)]
pub struct RunReport {
    pub params: DifficultyParams,
    pub seed: u64,
    /// One entry per miner, ordered by miner id.
    pub workers: Vec<WorkerReport>,
    pub chain: Vec<TransactionRecord>,
    pub valid: bool,
    pub violation: Option<Violation>,
    /// Positions whose `prev_digest` was stale at commit time.
    pub stale_links: Vec<usize>,
    pub elapsed: Duration,
}

impl RunReport {
    pub fn total_mined(&self) -> u64 {
        self.workers.iter().map(|w| w.mined).sum()
    }

    pub fn mined_counts(&self) -> Vec<(MinerId, u64)> {
        self.workers.iter().map(|w| (w.miner, w.mined)).collect()
    }
}

/// Mine every id in `ids` with `config.miners` threads and validate the result.
///
/// The chain is seeded with a genesis record, all miners are spawned and
/// parked at the start gate, the gate is raised, and the chain is validated
/// once every miner has been joined.
pub fn run_mining(config: &RunConfig, ids: Vec<u32>) -> Result<RunReport, MiningError> {
    let seed = config.seed.unwrap_or_else(rand::random);
    let ctx = Arc::new(MiningContext::new(
        config.params,
        ids,
        config.start_policy,
        config.link_policy,
    ));

    info!(
        "Mining {} transaction(s) with {} miner(s) at difficulty {} (threshold={}, work_factor={})",
        ctx.worklist.len(),
        config.miners,
        config.params.difficulty,
        config.params.threshold,
        config.params.work_factor
    );
    if ctx.worklist.is_empty() {
        warn!("Worklist is empty, the chain will hold only the genesis record");
    }

    let mut handles: Vec<(MinerId, JoinHandle<WorkerReport>)> = Vec::with_capacity(config.miners);
    for n in 0..config.miners {
        let id = MinerId(n);
        let worker = MinerWorker::new(id, seed, Arc::clone(&ctx));
        let spawned = thread::Builder::new()
            .name(format!("miner-{n}"))
            .spawn(move || worker.run());

        match spawned {
            Ok(handle) => handles.push((id, handle)),
            Err(source) => {
                error!("Failed to spawn miner {}: {}", n, source);
                // Let the miners already parked at the gate drain the worklist and exit.
                ctx.start.raise();
                join_all(handles)?;
                return Err(MiningError::Spawn { miner: n, source });
            }
        }
    }

    let started = Instant::now();
    ctx.start.raise();
    let workers = join_all(handles)?;
    let elapsed = started.elapsed();

    let shared = shared_ids(&workers);
    if shared > 0 {
        info!("{} transaction id(s) were committed by more than one miner", shared);
    }

    let chain = match Arc::try_unwrap(ctx) {
        Ok(ctx) => ctx.chain.into_records(),
        Err(ctx) => ctx.chain.snapshot(),
    };

    let valid = validate(&chain, config.params.threshold);
    let violation = if valid {
        None
    } else {
        validate_detailed(&chain, config.params.threshold).err()
    };
    let stale = stale_links(&chain);
    if let Some(v) = &violation {
        warn!("Chain failed validation: {:?}", v);
    }
    if !stale.is_empty() {
        warn!("{} record(s) were committed on a stale tail", stale.len());
    }

    info!(
        "Run finished in {:?}: {} record(s), valid={}",
        elapsed,
        chain.len(),
        valid
    );

    Ok(RunReport {
        params: config.params,
        seed,
        workers,
        chain,
        valid,
        violation,
        stale_links: stale,
        elapsed,
    })
}

fn join_all(
    handles: Vec<(MinerId, JoinHandle<WorkerReport>)>,
) -> Result<Vec<WorkerReport>, MiningError> {
    let mut reports = Vec::with_capacity(handles.len());
    let mut panicked = None;
    for (id, handle) in handles {
        match handle.join() {
            Ok(report) => reports.push(report),
            Err(_) => {
                error!("Miner {} panicked", id);
                panicked.get_or_insert(id);
            }
        }
    }
    match panicked {
        Some(id) => Err(MiningError::MinerPanicked(id.0)),
        None => Ok(reports),
    }
}

/// Number of distinct ids committed by two or more miners.
fn shared_ids(workers: &[WorkerReport]) -> usize {
    let mut seen = HashSet::new();
    let mut shared = HashSet::new();
    for worker in workers {
        for &id in &worker.processed {
            if !seen.insert(id) {
                shared.insert(id);
            }
        }
    }
    shared.len()
}
