use crate::constants::{
    BLOCK_REWARD, DIFFICULTY_ADJUSTMENT_INTERVAL, GENESIS_DIFFICULTY, TARGET_BLOCK_TIME_SECONDS,
    TRANSACTIONS_PER_BLOCK,
};
use crate::error::ConfigError;
use serde::{Deserialize, Serialize};

/// Tunables for a `Ledger`. Missing fields fall back to the defaults in `constants`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LedgerConfig {
    /// Caller transactions per block, not counting the reward entry.
    pub transactions_per_block: usize,
    /// Number of blocks between the retarget reference block and the tip.
    pub difficulty_interval: usize,
    pub target_block_time_secs: u64,
    pub genesis_difficulty: u32,
    pub block_reward: u64,
    /// Count pending outgoing transactions against the sender at admission.
    pub reserve_pending_spends: bool,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            transactions_per_block: TRANSACTIONS_PER_BLOCK,
            difficulty_interval: DIFFICULTY_ADJUSTMENT_INTERVAL,
            target_block_time_secs: TARGET_BLOCK_TIME_SECONDS,
            genesis_difficulty: GENESIS_DIFFICULTY,
            block_reward: BLOCK_REWARD,
            reserve_pending_spends: false,
        }
    }
}

impl LedgerConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.transactions_per_block == 0 {
            return Err(ConfigError("transactions_per_block must be positive".into()));
        }
        if self.difficulty_interval == 0 {
            return Err(ConfigError("difficulty_interval must be positive".into()));
        }
        if self.target_block_time_secs == 0 {
            return Err(ConfigError("target_block_time_secs must be positive".into()));
        }
        if self.genesis_difficulty == 0 {
            return Err(ConfigError("genesis_difficulty must be positive".into()));
        }
        if self.difficulty_interval == usize::MAX
            || self
                .target_block_time_secs
                .checked_mul(self.difficulty_interval as u64)
                .is_none()
        {
            return Err(ConfigError("retarget window overflows".into()));
        }
        Ok(())
    }

    /// Seconds the retarget window is expected to span.
    pub fn expected_window_secs(&self) -> u64 {
        self.target_block_time_secs
            .saturating_mul(self.difficulty_interval as u64)
    }
}
