use crate::{sha256, unix_now, Hash, ZERO_HASH};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A value transfer with a fee. `hash` is the SHA-256 of every other field and
/// identifies the transaction for deduplication. `reward_for` is set only on a
/// block reward and names the block index it pays for, so two rewards to the
/// same miner in the same second still hash apart.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub from: String,
    pub to: String,
    pub amount: u64,
    pub fee: u64,
    pub timestamp: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reward_for: Option<u64>,
    pub hash: Hash,
}

impl Transaction {
    pub fn new(
        from: impl Into<String>,
        to: impl Into<String>,
        amount: u64,
        fee: u64,
        timestamp: u64,
    ) -> Self {
        let mut tx = Self {
            from: from.into(),
            to: to.into(),
            amount,
            fee,
            timestamp,
            reward_for: None,
            hash: ZERO_HASH,
        };
        tx.hash = tx.compute_hash();
        tx
    }

    /// Reward paying `amount` to `miner` for the block at `index`.
    pub fn reward(
        from: impl Into<String>,
        miner: impl Into<String>,
        amount: u64,
        index: u64,
        timestamp: u64,
    ) -> Self {
        let mut tx = Self::new(from, miner, amount, 0, timestamp);
        tx.reward_for = Some(index);
        tx.hash = tx.compute_hash();
        tx
    }

    /// Same as `new`, stamped with the current unix time.
    pub fn now(from: impl Into<String>, to: impl Into<String>, amount: u64, fee: u64) -> Self {
        Self::new(from, to, amount, fee, unix_now())
    }

    /// Canonical byte encoding of the hashed fields. Strings are length
    /// prefixed so that ("ab", "c") and ("a", "bc") never collide.
    pub fn content_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(8 + self.from.len() + 8 + self.to.len() + 33);
        bytes.extend_from_slice(&(self.from.len() as u64).to_le_bytes());
        bytes.extend_from_slice(self.from.as_bytes());
        bytes.extend_from_slice(&(self.to.len() as u64).to_le_bytes());
        bytes.extend_from_slice(self.to.as_bytes());
        bytes.extend_from_slice(&self.amount.to_le_bytes());
        bytes.extend_from_slice(&self.fee.to_le_bytes());
        bytes.extend_from_slice(&self.timestamp.to_le_bytes());
        if let Some(index) = self.reward_for {
            bytes.push(1);
            bytes.extend_from_slice(&index.to_le_bytes());
        }
        bytes
    }

    pub fn compute_hash(&self) -> Hash {
        sha256(&[self.content_bytes().as_slice()])
    }

    /// True when the stored hash still matches the content.
    pub fn verify_hash(&self) -> bool {
        self.compute_hash() == self.hash
    }

    /// What the sender is debited: amount plus fee.
    pub fn spend(&self) -> i128 {
        i128::from(self.amount) + i128::from(self.fee)
    }

    pub fn involves(&self, address: &str) -> bool {
        self.from == address || self.to == address
    }

    pub fn hash_hex(&self) -> String {
        hex::encode(self.hash)
    }
}

impl fmt::Display for Transaction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {} -> {}: {} (fee {}) at {}",
            self.hash_hex(),
            self.from,
            self.to,
            self.amount,
            self.fee,
            self.timestamp
        )
    }
}
