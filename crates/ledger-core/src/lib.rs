//! Ledger-integrity core: blocks, the transaction pool, difficulty retargeting
//! and balances derived from chain history.
use sha2::{Digest, Sha256};
use std::time::{SystemTime, UNIX_EPOCH};

pub mod block;
pub mod chain;
pub mod config;
pub mod constants;
pub mod error;
pub mod merkle;
pub mod pool;
pub mod transaction;

pub use block::{validate_hash, validate_merkle_root, Block, BlockHeader, GENESIS_PREVIOUS_HASH};
pub use chain::Ledger;
pub use config::LedgerConfig;
pub use error::{AdmissionError, ChainValidationError, ConfigError, LedgerError, PolicyParseError};
pub use merkle::merkle_root;
pub use pool::{SelectionPolicy, TransactionPool};
pub use transaction::Transaction;

pub type Hash = [u8; constants::HASH_SIZE];

/// All-zero digest: the empty merkle root and the genesis previous hash.
pub const ZERO_HASH: Hash = [0u8; constants::HASH_SIZE];

pub(crate) fn sha256(parts: &[&[u8]]) -> Hash {
    let mut hasher = Sha256::new();
    for part in parts {
        hasher.update(part);
    }
    hasher.finalize().into()
}

/// Current unix time in seconds; a clock set before 1970 reads as 0.
pub fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}
