use super::TransactionRecord;

/// 32-bit digest produced by the chain hash.
pub type Digest = u32;

/// Hash a (transaction id, previous digest, nonce) triple.
///
/// The three fields are packed into one word with per-field shifts and then
/// spread with the MurmurHash3 finalizer. The finalizer is a bijection on
/// `u32`, so a uniformly random nonce yields a uniformly random digest.
pub fn hash_parts(id: u32, prev_digest: Digest, nonce: u32) -> Digest {
    let packed = (id << 16) ^ (prev_digest << 8) ^ (nonce << 1);
    fmix32(packed)
}

/// Hash of a record as stored in the chain.
pub fn hash_record(record: &TransactionRecord) -> Digest {
    hash_parts(record.id, record.prev_digest, record.nonce)
}

fn fmix32(mut h: u32) -> u32 {
    h ^= h >> 16;
    h = h.wrapping_mul(0x85eb_ca6b);
    h ^= h >> 13;
    h = h.wrapping_mul(0xc2b2_ae35);
    h ^= h >> 16;
    h
}
