pub mod chain;
pub mod hash;
pub mod record;
pub mod validator;

pub use chain::Chain;
pub use hash::{Digest, hash_parts, hash_record};
pub use record::{MinerId, TransactionRecord};
pub use validator::{Violation, stale_links, validate, validate_detailed};

/// Digest reported for an empty chain.
pub const ZERO_DIGEST: Digest = 0;

/// Difficulty bounds accepted by the miner.
pub const DIFF_MIN: u32 = 1;
pub const DIFF_MAX: u32 = 10;
