#![allow(dead_code)]

use ledger_core::{Ledger, LedgerConfig, Transaction};

pub const T0: u64 = 1_600_000_000;
pub const REWARD: i128 = 50;

pub fn ledger() -> Ledger {
    Ledger::starting_at(LedgerConfig::default(), T0).expect("default config is valid")
}

pub fn ledger_with(config: LedgerConfig) -> Ledger {
    Ledger::starting_at(config, T0).expect("test config is valid")
}

/// Timestamp one target block time after the current tip.
pub fn next_ts(ledger: &Ledger) -> u64 {
    ledger.last_block().header.timestamp + ledger.config().target_block_time_secs
}

/// Mines an empty block for each address so that each holds one block reward.
pub fn fund(ledger: &mut Ledger, addresses: &[&str]) {
    for address in addresses {
        let ts = next_ts(ledger);
        ledger
            .add_block_at(vec![], address, ts)
            .expect("empty block is always accepted");
    }
}

pub fn tx(from: &str, to: &str, amount: u64, fee: u64, timestamp: u64) -> Transaction {
    Transaction::new(from, to, amount, fee, timestamp)
}

/// Drains one block's worth of pending transactions into a new block.
pub fn mine_pending(ledger: &mut Ledger, miner: &str) {
    let txs = ledger.get_pending_transactions();
    let ts = next_ts(ledger);
    ledger
        .add_block_at(txs, miner, ts)
        .expect("admitted transactions form a valid block");
}
