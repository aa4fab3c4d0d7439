use crate::error::PolicyParseError;
use crate::{Hash, Transaction};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// How a miner orders pending transactions when filling a block.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SelectionPolicy {
    /// Highest fee first, earliest timestamp breaks ties.
    Greedy,
    /// Earliest timestamp first, fees ignored.
    Altruistic,
    /// Uniform shuffle drawn from the caller's RNG.
    Random,
    /// Transactions sent to or from the miner first, the rest after.
    AddressPreference,
}

impl SelectionPolicy {
    pub const ALL: [SelectionPolicy; 4] = [
        SelectionPolicy::Greedy,
        SelectionPolicy::Altruistic,
        SelectionPolicy::Random,
        SelectionPolicy::AddressPreference,
    ];

    pub fn name(self) -> &'static str {
        match self {
            SelectionPolicy::Greedy => "Greedy",
            SelectionPolicy::Altruistic => "Altruistic",
            SelectionPolicy::Random => "Random",
            SelectionPolicy::AddressPreference => "Address Preference",
        }
    }
}

impl FromStr for SelectionPolicy {
    type Err = PolicyParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Greedy" => Ok(SelectionPolicy::Greedy),
            "Altruistic" => Ok(SelectionPolicy::Altruistic),
            "Random" => Ok(SelectionPolicy::Random),
            "Address Preference" | "AddressPreference" => Ok(SelectionPolicy::AddressPreference),
            other => Err(PolicyParseError(other.to_string())),
        }
    }
}

impl fmt::Display for SelectionPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Pending transactions in arrival order. Only the ledger mutates it.
#[derive(Clone, Debug, Default)]
pub struct TransactionPool {
    txs: Vec<Transaction>,
}

impl TransactionPool {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.txs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.txs.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Transaction> {
        self.txs.iter()
    }

    pub fn as_slice(&self) -> &[Transaction] {
        &self.txs
    }

    pub fn contains(&self, hash: &Hash) -> bool {
        self.txs.iter().any(|t| &t.hash == hash)
    }

    /// Sum of amount + fee over pending transactions sent by `address`.
    pub fn pending_spend(&self, address: &str) -> i128 {
        self.txs
            .iter()
            .filter(|t| t.from == address)
            .map(Transaction::spend)
            .sum()
    }

    pub(crate) fn push(&mut self, tx: Transaction) {
        self.txs.push(tx);
    }

    /// Removes and returns up to `limit` transactions from the front.
    pub(crate) fn take_front(&mut self, limit: usize) -> Vec<Transaction> {
        let n = limit.min(self.txs.len());
        self.txs.drain(..n).collect()
    }

    /// Drops every entry for which `sealed` returns true; returns how many went.
    pub(crate) fn purge(&mut self, mut sealed: impl FnMut(&Hash) -> bool) -> usize {
        let before = self.txs.len();
        self.txs.retain(|t| !sealed(&t.hash));
        before - self.txs.len()
    }

    /// Orders a copy of the pool under `policy` and keeps the first `limit`.
    /// Sorts are stable, so full ties keep arrival order. `rng` is only drawn
    /// from by `SelectionPolicy::Random`.
    pub fn select<R: Rng + ?Sized>(
        &self,
        policy: SelectionPolicy,
        miner: &str,
        limit: usize,
        rng: &mut R,
    ) -> Vec<Transaction> {
        let mut ordered: Vec<&Transaction> = self.txs.iter().collect();
        match policy {
            SelectionPolicy::Greedy => ordered.sort_by(|a, b| {
                b.fee
                    .cmp(&a.fee)
                    .then_with(|| a.timestamp.cmp(&b.timestamp))
            }),
            SelectionPolicy::Altruistic => ordered.sort_by_key(|t| t.timestamp),
            SelectionPolicy::Random => ordered.shuffle(rng),
            SelectionPolicy::AddressPreference => {
                let (mut mine, rest): (Vec<_>, Vec<_>) =
                    ordered.into_iter().partition(|t| t.involves(miner));
                mine.extend(rest);
                ordered = mine;
            }
        }
        ordered.into_iter().take(limit).cloned().collect()
    }
}

impl fmt::Display for TransactionPool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for tx in &self.txs {
            writeln!(f, "{tx}")?;
        }
        Ok(())
    }
}
