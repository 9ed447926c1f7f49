//! Concurrent Proof-of-Work mining over a shared worklist and chain.
//!
//! - [`params`]: difficulty, threshold and work factor
//! - [`worklist`]: lock-free distribution of transaction ids
//! - [`signal`]: start gate released once every miner exists
//! - [`worker`]: the per-miner claim/search/penalty/commit loop
//! - [`coordinator`]: spawns miners, joins them and validates the chain

pub mod coordinator;
pub mod params;
pub mod signal;
pub mod worker;
pub mod worklist;

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::blockchain::Chain;
use crate::error::ConfigError;

pub use coordinator::{RunConfig, RunReport, run_mining};
pub use params::DifficultyParams;
pub use signal::{StartPolicy, StartSignal};
pub use worklist::Worklist;

/// What a miner does when the tail it built on was replaced before its commit.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LinkPolicy {
    /// Commit anyway, keeping the digest observed at claim time.
    #[default]
    Reference,
    /// Pick up the new tail digest and search again.
    Strict,
}

impl FromStr for LinkPolicy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "reference" => Ok(Self::Reference),
            "strict" => Ok(Self::Strict),
            other => Err(ConfigError::UnknownPolicy {
                kind: "link",
                value: other.to_string(),
            }),
        }
    }
}

/// State shared by every miner of one run.
#[derive(Debug)]
pub struct MiningContext {
    pub params: DifficultyParams,
    pub link_policy: LinkPolicy,
    pub chain: Chain,
    pub worklist: Worklist,
    pub start: StartSignal,
}

impl MiningContext {
    /// Seed a fresh chain with its genesis record and wrap `ids` in a worklist.
    pub fn new(
        params: DifficultyParams,
        ids: Vec<u32>,
        start_policy: StartPolicy,
        link_policy: LinkPolicy,
    ) -> Self {
        Self {
            params,
            link_policy,
            chain: Chain::with_genesis(),
            worklist: Worklist::new(ids),
            start: StartSignal::new(start_policy),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_link_policy() {
        assert_eq!("strict".parse::<LinkPolicy>(), Ok(LinkPolicy::Strict));
        assert_eq!("REFERENCE".parse::<LinkPolicy>(), Ok(LinkPolicy::Reference));
        assert_eq!(
            "loose".parse::<LinkPolicy>(),
            Err(ConfigError::UnknownPolicy {
                kind: "link",
                value: "loose".into()
            })
        );
    }

    #[test]
    fn context_starts_with_genesis() {
        let ctx = MiningContext::new(
            DifficultyParams::new(1).unwrap(),
            vec![1, 2],
            StartPolicy::Block,
            LinkPolicy::default(),
        );
        assert_eq!(ctx.chain.len(), 1);
        assert_eq!(ctx.worklist.len(), 2);
        assert!(!ctx.start.is_raised());
    }
}
