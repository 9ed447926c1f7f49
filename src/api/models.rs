use serde::{Deserialize, Serialize};
use std::sync::Mutex;

use crate::blockchain::{MinerId, TransactionRecord, Violation};
use crate::config::ApiLimits;
use crate::mining::{LinkPolicy, RunReport, StartPolicy};

/// Shared application state: request limits and running totals.
/// No chain outlives the request that mined it.
pub struct AppState {
    pub limits: ApiLimits,
    pub stats: Mutex<ServiceStats>,
}

impl AppState {
    pub fn new(limits: ApiLimits) -> Self {
        Self {
            limits,
            stats: Mutex::new(ServiceStats::default()),
        }
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(ApiLimits::default())
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ServiceStats {
    pub runs: u64,
    pub transactions_mined: u64,
    pub invalid_chains: u64,
    /// Unix timestamp (UTC) of the last finished run.
    pub last_run_at: Option<i64>,
}

/* ---------- Mining API Models ---------- */

#[derive(Deserialize)]
pub struct MineRequest {
    pub difficulty: u32,
    pub miners: usize,
    pub transaction_ids: Vec<u32>,
    pub seed: Option<u64>,
    #[serde(default)]
    pub link_policy: LinkPolicy,
    #[serde(default)]
    pub start_policy: StartPolicy,
    #[serde(default)]
    pub include_chain: bool,
}

#[derive(Serialize)]
pub struct MinerResult {
    pub miner: MinerId,
    pub mined: u64,
    pub skipped: u64,
    pub rejected_commits: u64,
    pub hashes: u64,
}

#[derive(Serialize)]
pub struct MineResponse {
    pub run_id: String,
    pub difficulty: u32,
    pub threshold: u32,
    pub work_factor: u64,
    pub seed: u64,
    pub miners: Vec<MinerResult>,
    pub total_mined: u64,
    pub chain_length: usize,
    pub valid: bool,
    pub violation: Option<Violation>,
    pub stale_links: usize,
    pub elapsed_ms: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chain: Option<Vec<TransactionRecord>>,
}

impl MineResponse {
    pub fn from_report(run_id: String, report: RunReport, include_chain: bool) -> Self {
        let miners = report
            .workers
            .iter()
            .map(|w| MinerResult {
                miner: w.miner,
                mined: w.mined,
                skipped: w.stats.skipped,
                rejected_commits: w.stats.rejected_commits,
                hashes: w.stats.hashes,
            })
            .collect();
        Self {
            run_id,
            difficulty: report.params.difficulty,
            threshold: report.params.threshold,
            work_factor: report.params.work_factor,
            seed: report.seed,
            total_mined: report.total_mined(),
            miners,
            chain_length: report.chain.len(),
            valid: report.valid,
            violation: report.violation,
            stale_links: report.stale_links.len(),
            elapsed_ms: report.elapsed.as_millis() as u64,
            chain: include_chain.then_some(report.chain),
        }
    }
}

/* ---------- Chain API Models ---------- */

#[derive(Deserialize)]
pub struct ValidateRequest {
    pub difficulty: u32,
    pub chain: Vec<TransactionRecord>,
}

#[derive(Serialize)]
pub struct ValidateResponse {
    pub valid: bool,
    pub length: usize,
    pub threshold: u32,
    pub violation: Option<Violation>,
    pub stale_links: Vec<usize>,
}

#[derive(Serialize)]
pub struct StatsResponse {
    #[serde(flatten)]
    pub stats: ServiceStats,
    pub max_difficulty: u32,
    pub max_miners: usize,
    pub max_transactions: usize,
}
