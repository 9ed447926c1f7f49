use serde::{Deserialize, Serialize};
use std::fmt;

/// Identity token handed to each miner at spawn time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MinerId(pub usize);

impl fmt::Display for MinerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A mined transaction as stored in the chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionRecord {
    pub id: u32,
    /// Digest of the chain tail observed when the id was claimed.
    pub prev_digest: u32,
    /// Proof-of-Work nonce
    pub nonce: u32,
    /// `None` for the genesis record.
    pub miner: Option<MinerId>,
    /// Position of the predecessor, assigned by the chain on append.
    #[serde(default)]
    pub prev_index: Option<usize>,
}

impl TransactionRecord {
    /// The zeroed record every chain starts with.
    pub fn genesis() -> Self {
        Self {
            id: 0,
            prev_digest: 0,
            nonce: 0,
            miner: None,
            prev_index: None,
        }
    }

    /// Create an unlinked record. The chain sets `prev_index` when appending.
    pub fn new(id: u32, prev_digest: u32, nonce: u32, miner: MinerId) -> Self {
        Self {
            id,
            prev_digest,
            nonce,
            miner: Some(miner),
            prev_index: None,
        }
    }

    #[cfg(test)]
    pub fn is_genesis(&self) -> bool {
        self.miner.is_none() && self.id == 0 && self.prev_digest == 0 && self.nonce == 0
    }
}
