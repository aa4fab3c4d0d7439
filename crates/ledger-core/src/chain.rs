use crate::constants::{
    MAX_RETARGET_RATIO, MIN_DIFFICULTY, MIN_RETARGET_RATIO, NO_SUCH_BLOCK, REWARD_SENDER,
};
use crate::error::{AdmissionError, ChainValidationError, ConfigError, LedgerError};
use crate::{
    unix_now, validate_hash, validate_merkle_root, Block, BlockHeader, Hash, LedgerConfig,
    SelectionPolicy, Transaction, TransactionPool,
};
use rand::Rng;
use std::collections::HashSet;
use std::fmt;
use tracing::{debug, info};

/// Owns the chain and the pool of pending transactions. The chain always holds
/// at least the genesis block and only grows at the tip.
#[derive(Clone, Debug)]
pub struct Ledger {
    config: LedgerConfig,
    blocks: Vec<Block>,
    pool: TransactionPool,
}

impl Ledger {
    /// A ledger whose genesis block is stamped with the current time.
    pub fn new(config: LedgerConfig) -> Result<Self, ConfigError> {
        Self::starting_at(config, unix_now())
    }

    /// Refuses any config `LedgerConfig::validate` rejects.
    pub fn starting_at(
        config: LedgerConfig,
        genesis_timestamp: u64,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        let genesis = Block::genesis(config.genesis_difficulty, genesis_timestamp);
        Ok(Self {
            config,
            blocks: vec![genesis],
            pool: TransactionPool::new(),
        })
    }

    pub fn config(&self) -> &LedgerConfig {
        &self.config
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    pub fn block_count(&self) -> usize {
        self.blocks.len()
    }

    /// Index of the tip; 0 while only genesis exists.
    pub fn height(&self) -> u64 {
        self.last_block().header.index
    }

    pub fn last_block(&self) -> &Block {
        &self.blocks[self.blocks.len() - 1]
    }

    pub fn get_block(&self, index: usize) -> Option<&Block> {
        self.blocks.get(index)
    }

    /// Rendering of the block at `index`, or the "no such block" sentinel when
    /// the index is negative or past the tip.
    pub fn block_as_string(&self, index: i64) -> String {
        usize::try_from(index)
            .ok()
            .and_then(|i| self.blocks.get(i))
            .map_or_else(|| NO_SUCH_BLOCK.to_string(), Block::to_string)
    }

    pub fn pool(&self) -> &TransactionPool {
        &self.pool
    }

    pub fn pending_transactions_as_string(&self) -> String {
        self.pool.to_string()
    }

    pub fn is_sealed(&self, hash: &Hash) -> bool {
        self.blocks.iter().any(|b| b.contains(hash))
    }

    /// Difficulty for the next block. Until the chain holds `interval + 1`
    /// blocks the tip difficulty carries over. After that it is re-evaluated on
    /// every block against the window ending at the tip, with the swing capped
    /// to [0.5, 2.0] and the result never below 1.
    pub fn calculate_new_difficulty(&self) -> u32 {
        let last = self.last_block();
        let interval = self.config.difficulty_interval;
        if self.blocks.len() < interval.saturating_add(1) {
            return last.header.difficulty;
        }

        let reference = &self.blocks[self.blocks.len() - interval - 1];
        let actual = last
            .header
            .timestamp
            .saturating_sub(reference.header.timestamp) as f64;
        let expected = self.config.expected_window_secs() as f64;
        let ratio = (actual / expected).clamp(MIN_RETARGET_RATIO, MAX_RETARGET_RATIO);

        ((f64::from(last.header.difficulty) * ratio).floor() as u32).max(MIN_DIFFICULTY)
    }

    /// Reward entry the block at `index` mined by `miner` carries: the block
    /// reward plus the fees of `txs`. `None` when that sum is zero.
    pub fn reward_transaction(
        &self,
        miner: &str,
        txs: &[Transaction],
        index: u64,
        timestamp: u64,
    ) -> Option<Transaction> {
        let fees: u64 = txs.iter().map(|t| t.fee).fold(0, u64::saturating_add);
        let amount = self.config.block_reward.saturating_add(fees);
        (amount > 0).then(|| Transaction::reward(REWARD_SENDER, miner, amount, index, timestamp))
    }

    /// Header extending the current tip, for miners that seal blocks themselves
    /// and hand them to `append_block`.
    pub fn next_header(&self, miner: &str, timestamp: u64) -> BlockHeader {
        let last = self.last_block();
        BlockHeader::new(
            last.header.index + 1,
            last.hash,
            timestamp,
            self.calculate_new_difficulty(),
            miner,
        )
    }

    pub fn add_block(
        &mut self,
        transactions: Vec<Transaction>,
        miner: &str,
    ) -> Result<&Block, LedgerError> {
        self.add_block_at(transactions, miner, unix_now())
    }

    /// Builds the next block from `transactions`, prefixed with the miner's
    /// reward, and appends it. Nothing changes when an error is returned.
    pub fn add_block_at(
        &mut self,
        transactions: Vec<Transaction>,
        miner: &str,
        timestamp: u64,
    ) -> Result<&Block, LedgerError> {
        self.check_transactions(&transactions)?;

        let header = self.next_header(miner, timestamp);
        let mut txs = Vec::with_capacity(transactions.len() + 1);
        txs.extend(self.reward_transaction(miner, &transactions, header.index, timestamp));
        txs.extend(transactions);

        Ok(self.push_block(Block::seal(header, txs)))
    }

    /// Appends a block sealed outside the ledger. Linkage, hash, merkle root,
    /// difficulty and transactions are checked; proof-of-work is not.
    pub fn append_block(&mut self, block: Block) -> Result<&Block, LedgerError> {
        let tip = self.last_block();
        let expected_index = tip.header.index + 1;
        if block.header.previous_hash != tip.hash || block.header.index != expected_index {
            return Err(LedgerError::LinkageMismatch {
                expected: format!("#{expected_index} after {}", tip.hash_hex()),
                found: format!(
                    "#{} after {}",
                    block.header.index,
                    hex::encode(block.header.previous_hash)
                ),
            });
        }
        if !validate_hash(&block) {
            return Err(LedgerError::InvalidHash);
        }
        if !validate_merkle_root(&block) {
            return Err(LedgerError::InvalidMerkleRoot);
        }
        let expected = self.calculate_new_difficulty();
        if block.header.difficulty != expected {
            return Err(LedgerError::DifficultyMismatch {
                expected,
                found: block.header.difficulty,
            });
        }

        let (reward, rest) = match block.txs.split_first() {
            Some((first, rest)) if first.from == REWARD_SENDER => (Some(first), rest),
            _ => (None, block.txs.as_slice()),
        };
        self.check_transactions(rest)?;
        let expected_reward = self.reward_transaction(
            &block.header.miner,
            rest,
            block.header.index,
            block.header.timestamp,
        );
        if let Some(reward) = reward {
            if Some(reward) != expected_reward.as_ref() {
                return Err(LedgerError::InvalidTransaction {
                    hash: reward.hash_hex(),
                    reason: "reward does not match block reward plus fees".into(),
                });
            }
        }

        Ok(self.push_block(block))
    }

    fn check_transactions(&self, txs: &[Transaction]) -> Result<(), LedgerError> {
        let capacity = self.config.transactions_per_block;
        if txs.len() > capacity {
            return Err(LedgerError::CapacityExceeded {
                count: txs.len(),
                capacity,
            });
        }

        let mut seen = HashSet::with_capacity(txs.len());
        for tx in txs {
            let reason = if tx.from == REWARD_SENDER || tx.reward_for.is_some() {
                "only the leading reward entry may mint"
            } else if !tx.verify_hash() {
                "hash does not match content"
            } else if !seen.insert(tx.hash) {
                "listed twice"
            } else if self.is_sealed(&tx.hash) {
                "already sealed in a block"
            } else {
                continue;
            };
            return Err(LedgerError::InvalidTransaction {
                hash: tx.hash_hex(),
                reason: reason.into(),
            });
        }
        Ok(())
    }

    fn push_block(&mut self, block: Block) -> &Block {
        let sealed: HashSet<Hash> = block.txs.iter().map(|t| t.hash).collect();
        let purged = self.pool.purge(|h| sealed.contains(h));

        let previous = self.last_block().header.difficulty;
        if block.header.difficulty != previous {
            info!(
                from = previous,
                to = block.header.difficulty,
                "difficulty adjusted"
            );
        }

        info!(
            index = block.header.index,
            hash = %block.hash_hex(),
            txs = block.txs.len(),
            difficulty = block.header.difficulty,
            purged,
            "block appended"
        );
        self.blocks.push(block);
        self.last_block()
    }

    /// Confirmed balance: credits as recipient, debits amount + fee as sender,
    /// folded over the whole chain on every call.
    pub fn get_balance(&self, address: &str) -> i128 {
        self.blocks
            .iter()
            .flat_map(|b| &b.txs)
            .fold(0, |mut balance, t| {
                if t.to == address {
                    balance += i128::from(t.amount);
                }
                if t.from == address {
                    balance -= t.spend();
                }
                balance
            })
    }

    /// Admits `tx` when the sender can cover amount + fee and the hash is new
    /// to both the pool and the chain.
    ///
    /// Only confirmed balance is consulted unless
    /// `LedgerConfig::reserve_pending_spends` is set, so by default a sender
    /// can queue several transactions that each fit but together overdraw.
    pub fn submit_transaction(&mut self, tx: Transaction) -> Result<(), AdmissionError> {
        if tx.from == REWARD_SENDER || tx.reward_for.is_some() {
            return Err(AdmissionError::ReservedSender(tx.hash_hex()));
        }
        let mut available = self.get_balance(&tx.from);
        if self.config.reserve_pending_spends {
            available -= self.pool.pending_spend(&tx.from);
        }
        let required = tx.spend();
        if available < required {
            return Err(AdmissionError::InsufficientBalance {
                address: tx.from,
                balance: available,
                required,
            });
        }
        if self.pool.contains(&tx.hash) {
            return Err(AdmissionError::DuplicateInPool(tx.hash_hex()));
        }
        if self.is_sealed(&tx.hash) {
            return Err(AdmissionError::AlreadyInChain(tx.hash_hex()));
        }

        debug!(hash = %tx.hash_hex(), from = %tx.from, to = %tx.to, "transaction admitted");
        self.pool.push(tx);
        Ok(())
    }

    pub fn add_transaction_to_pool(&mut self, tx: Transaction) -> bool {
        match self.submit_transaction(tx) {
            Ok(()) => true,
            Err(e) => {
                debug!(error = %e, "transaction rejected");
                false
            }
        }
    }

    /// Removes and returns up to one block's worth of transactions, oldest first.
    pub fn get_pending_transactions(&mut self) -> Vec<Transaction> {
        self.pool.take_front(self.config.transactions_per_block)
    }

    /// Up to one block's worth of pending transactions ordered by `policy`.
    /// The pool is left as it was.
    pub fn get_preferred_transactions<R: Rng + ?Sized>(
        &self,
        policy: SelectionPolicy,
        miner: &str,
        rng: &mut R,
    ) -> Vec<Transaction> {
        self.pool
            .select(policy, miner, self.config.transactions_per_block, rng)
    }

    /// String-keyed form of `get_preferred_transactions`; an unknown policy
    /// name selects nothing.
    pub fn preferred_transactions_by_name<R: Rng + ?Sized>(
        &self,
        policy: &str,
        miner: &str,
        rng: &mut R,
    ) -> Vec<Transaction> {
        match policy.parse::<SelectionPolicy>() {
            Ok(policy) => self.get_preferred_transactions(policy, miner, rng),
            Err(e) => {
                debug!(error = %e, "empty selection");
                Vec::new()
            }
        }
    }

    pub fn validate_chain(&self) -> Result<(), ChainValidationError> {
        for (i, block) in self.blocks.iter().enumerate() {
            if i > 0 {
                let prev = &self.blocks[i - 1];
                if block.header.previous_hash != prev.hash
                    || block.header.index != prev.header.index + 1
                {
                    return Err(ChainValidationError::BrokenLink(i));
                }
            }
            if !validate_hash(block) {
                return Err(ChainValidationError::BadHash(i));
            }
            if !validate_merkle_root(block) {
                return Err(ChainValidationError::BadMerkleRoot(i));
            }
        }
        Ok(())
    }
}

impl fmt::Display for Ledger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, block) in self.blocks.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{block}")?;
        }
        Ok(())
    }
}
