use serde::Serialize;

use crate::blockchain::{DIFF_MAX, DIFF_MIN, Digest};
use crate::error::ConfigError;

/// Difficulty-derived constants shared read-only by every miner of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DifficultyParams {
    pub difficulty: u32,
    /// Largest digest a mined record may have: `2^(32 - difficulty) - 1`.
    pub threshold: Digest,
    /// Extra random draws after each qualifying nonce: `10^(difficulty - 1)`.
    pub work_factor: u64,
}

impl DifficultyParams {
    pub fn new(difficulty: u32) -> Result<Self, ConfigError> {
        if !(DIFF_MIN..=DIFF_MAX).contains(&difficulty) {
            return Err(ConfigError::InvalidDifficulty(difficulty));
        }
        Ok(Self {
            difficulty,
            threshold: ((1u64 << (32 - difficulty)) - 1) as Digest,
            work_factor: 10u64.pow(difficulty - 1),
        })
    }
}

impl TryFrom<u32> for DifficultyParams {
    type Error = ConfigError;

    fn try_from(difficulty: u32) -> Result<Self, Self::Error> {
        Self::new(difficulty)
    }
}
