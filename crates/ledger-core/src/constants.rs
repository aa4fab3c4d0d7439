pub const HASH_SIZE: usize = 32;
pub const HASH_HEX_SIZE: usize = HASH_SIZE * 2;
pub const TRANSACTIONS_PER_BLOCK: usize = 5;
pub const DIFFICULTY_ADJUSTMENT_INTERVAL: usize = 10;
pub const TARGET_BLOCK_TIME_SECONDS: u64 = 60;
pub const GENESIS_DIFFICULTY: u32 = 4;
pub const MIN_DIFFICULTY: u32 = 1;
pub const MIN_RETARGET_RATIO: f64 = 0.5;
pub const MAX_RETARGET_RATIO: f64 = 2.0;
pub const BLOCK_REWARD: u64 = 50;
pub const REWARD_SENDER: &str = "Mine Rewards";
pub const GENESIS_MINER: &str = "genesis";
pub const NO_SUCH_BLOCK: &str = "No such block exists";
