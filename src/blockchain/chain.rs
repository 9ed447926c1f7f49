use std::sync::{Mutex, MutexGuard, PoisonError};

use super::{Digest, TransactionRecord, ZERO_DIGEST, hash_record};

/// Append-only, in-memory chain of mined transactions.
///
/// Records live in a single `Vec`; the backward link of each record is the
/// index of its predecessor. Appends and tail reads share one lock. A second,
/// independent lock (`lock_commit`) lets a miner hold exclusive commit rights
/// across its recheck and append.
#[derive(Debug, Default)]
pub struct Chain {
    records: Mutex<Vec<TransactionRecord>>,
    commit: Mutex<()>,
}

impl Chain {
    /// Create an empty chain.
    pub fn new() -> Self {
        Self::default()
    }

    /// Initialize a chain holding only the genesis record.
    pub fn with_genesis() -> Self {
        let chain = Self::new();
        chain.append(TransactionRecord::genesis());
        chain
    }

    /// Link `record` after the current tail and return its position.
    pub fn append(&self, mut record: TransactionRecord) -> usize {
        let mut records = self.records();
        let position = records.len();
        record.prev_index = position.checked_sub(1);
        records.push(record);
        position
    }

    /// Digest of the last record, or the zero digest when empty.
    pub fn tail_digest(&self) -> Digest {
        self.records().last().map(hash_record).unwrap_or(ZERO_DIGEST)
    }

    /// Enter the commit region. Only one miner may hold it at a time.
    pub fn lock_commit(&self) -> CommitGuard<'_> {
        CommitGuard {
            chain: self,
            _commit: self.commit.lock().unwrap_or_else(PoisonError::into_inner),
        }
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.records().len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.records().is_empty()
    }

    /// Copy of the records in chain order.
    pub fn snapshot(&self) -> Vec<TransactionRecord> {
        self.records().clone()
    }

    /// Consume the chain and return its records.
    pub fn into_records(self) -> Vec<TransactionRecord> {
        self.records
            .into_inner()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn records(&self) -> MutexGuard<'_, Vec<TransactionRecord>> {
        self.records.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Exclusive commit rights on a [`Chain`], released on drop.
pub struct CommitGuard<'a> {
    chain: &'a Chain,
    _commit: MutexGuard<'a, ()>,
}

impl CommitGuard<'_> {
    /// Tail digest as seen inside the commit region. Stable until this guard appends.
    pub fn tail_digest(&self) -> Digest {
        self.chain.tail_digest()
    }

    pub fn append(&self, record: TransactionRecord) -> usize {
        self.chain.append(record)
    }
}
