use thiserror::Error;

/// Reasons a block is refused by `Ledger::add_block` or `Ledger::append_block`.
/// The chain and the pool are left untouched whenever one of these is returned.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    #[error("block carries {count} transactions but capacity is {capacity}")]
    CapacityExceeded { count: usize, capacity: usize },

    #[error("invalid transaction {hash}: {reason}")]
    InvalidTransaction { hash: String, reason: String },

    #[error("block does not extend the tip: expected {expected}, found {found}")]
    LinkageMismatch { expected: String, found: String },

    #[error("block hash does not match its header")]
    InvalidHash,

    #[error("merkle root does not match the block transactions")]
    InvalidMerkleRoot,

    #[error("block difficulty {found} differs from required {expected}")]
    DifficultyMismatch { expected: u32, found: u32 },
}

/// Why a transaction was kept out of the pool.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AdmissionError {
    #[error("{address} holds {balance} but needs {required}")]
    InsufficientBalance {
        address: String,
        balance: i128,
        required: i128,
    },

    #[error("transaction {0} is already pending")]
    DuplicateInPool(String),

    #[error("transaction {0} is already sealed in a block")]
    AlreadyInChain(String),

    #[error("transaction {0} spends from the reserved reward sender")]
    ReservedSender(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown selection policy: {0:?}")]
pub struct PolicyParseError(pub String);

/// First inconsistency found by `Ledger::validate_chain`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChainValidationError {
    #[error("block {0} does not link to its predecessor")]
    BrokenLink(usize),

    #[error("block {0} hash does not match its header")]
    BadHash(usize),

    #[error("block {0} merkle root does not match its transactions")]
    BadMerkleRoot(usize),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid ledger config: {0}")]
pub struct ConfigError(pub String);
