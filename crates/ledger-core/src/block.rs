use crate::constants::GENESIS_MINER;
use crate::{merkle_root, sha256, Hash, Transaction, ZERO_HASH};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Previous-hash sentinel carried by the genesis block.
pub const GENESIS_PREVIOUS_HASH: Hash = ZERO_HASH;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockHeader {
    pub index: u64,
    pub previous_hash: Hash,
    pub merkle_root: Hash,
    pub timestamp: u64,
    pub difficulty: u32,
    pub miner: String,
    pub nonce: u64,
}

impl BlockHeader {
    /// Header with a zero merkle root and nonce; `Block::seal` fills the root.
    pub fn new(
        index: u64,
        previous_hash: Hash,
        timestamp: u64,
        difficulty: u32,
        miner: impl Into<String>,
    ) -> Self {
        Self {
            index,
            previous_hash,
            merkle_root: ZERO_HASH,
            timestamp,
            difficulty,
            miner: miner.into(),
            nonce: 0,
        }
    }

    pub fn hash_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(8 + 32 + 32 + 8 + 4 + 8 + self.miner.len() + 8);
        bytes.extend_from_slice(&self.index.to_le_bytes());
        bytes.extend_from_slice(&self.previous_hash);
        bytes.extend_from_slice(&self.merkle_root);
        bytes.extend_from_slice(&self.timestamp.to_le_bytes());
        bytes.extend_from_slice(&self.difficulty.to_le_bytes());
        bytes.extend_from_slice(&(self.miner.len() as u64).to_le_bytes());
        bytes.extend_from_slice(self.miner.as_bytes());
        bytes.extend_from_slice(&self.nonce.to_le_bytes());
        bytes
    }
}

/// A sealed block. Fields are public for inspection; a block that was edited
/// after sealing fails `validate_hash` or `validate_merkle_root`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    pub header: BlockHeader,
    pub hash: Hash,
    pub txs: Vec<Transaction>,
}

impl Block {
    /// Computes the merkle root over `txs` into the header and hashes the result.
    pub fn seal(mut header: BlockHeader, txs: Vec<Transaction>) -> Self {
        header.merkle_root = merkle_root(&txs);
        let mut block = Self {
            header,
            hash: ZERO_HASH,
            txs,
        };
        block.hash = block.compute_hash();
        block
    }

    pub fn genesis(difficulty: u32, timestamp: u64) -> Self {
        let header = BlockHeader::new(
            0,
            GENESIS_PREVIOUS_HASH,
            timestamp,
            difficulty,
            GENESIS_MINER,
        );
        Self::seal(header, Vec::new())
    }

    pub fn compute_hash(&self) -> Hash {
        sha256(&[self.header.hash_bytes().as_slice()])
    }

    pub fn is_genesis(&self) -> bool {
        self.header.index == 0 && self.header.previous_hash == GENESIS_PREVIOUS_HASH
    }

    pub fn contains(&self, hash: &Hash) -> bool {
        self.txs.iter().any(|t| &t.hash == hash)
    }

    pub fn hash_hex(&self) -> String {
        hex::encode(self.hash)
    }
}

/// Recomputes the header digest and compares it with the stored hash.
pub fn validate_hash(block: &Block) -> bool {
    block.compute_hash() == block.hash
}

/// Recomputes the merkle root over the block's transactions and compares it
/// with the one in the header.
pub fn validate_merkle_root(block: &Block) -> bool {
    merkle_root(&block.txs) == block.header.merkle_root
}

impl fmt::Display for Block {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Block {}", self.header.index)?;
        writeln!(f, "  hash:          {}", self.hash_hex())?;
        writeln!(f, "  previous hash: {}", hex::encode(self.header.previous_hash))?;
        writeln!(f, "  merkle root:   {}", hex::encode(self.header.merkle_root))?;
        writeln!(f, "  timestamp:     {}", self.header.timestamp)?;
        writeln!(f, "  difficulty:    {}", self.header.difficulty)?;
        writeln!(f, "  nonce:         {}", self.header.nonce)?;
        writeln!(f, "  miner:         {}", self.header.miner)?;
        write!(f, "  transactions:  {}", self.txs.len())?;
        for tx in &self.txs {
            write!(f, "\n    {tx}")?;
        }
        Ok(())
    }
}
