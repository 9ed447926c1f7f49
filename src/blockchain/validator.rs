//! Post-run chain validation.
//!
//! Validation is a single sequential pass and takes a plain slice, so callers
//! must hand it a finished chain (a snapshot taken after every miner joined).

use serde::Serialize;

use super::{Digest, TransactionRecord, hash_record};

/// First problem found while walking a chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Violation {
    /// The record's digest exceeds the threshold.
    AboveThreshold { position: usize, digest: Digest },
    /// The record's backward link does not point at the record before it.
    BrokenLink { position: usize },
}

/// Validate linkage and Proof-of-Work of every record after the head.
pub fn validate(records: &[TransactionRecord], threshold: Digest) -> bool {
    validate_detailed(records, threshold).is_ok()
}

/// Like [`validate`], returning the first violation instead of `false`.
pub fn validate_detailed(records: &[TransactionRecord], threshold: Digest) -> Result<(), Violation> {
    for (position, record) in records.iter().enumerate().skip(1) {
        let digest = hash_record(record);
        if digest > threshold {
            return Err(Violation::AboveThreshold { position, digest });
        }
        if record.prev_index != Some(position - 1) {
            return Err(Violation::BrokenLink { position });
        }
    }
    Ok(())
}

/// Positions whose `prev_digest` is not the digest of the record preceding them.
///
/// Such records were mined against a tail that another miner replaced before
/// the commit. They still carry valid Proof-of-Work and do not fail validation.
pub fn stale_links(records: &[TransactionRecord]) -> Vec<usize> {
    records
        .windows(2)
        .enumerate()
        .filter(|(_, pair)| pair[1].prev_digest != hash_record(&pair[0]))
        .map(|(i, _)| i + 1)
        .collect()
}
