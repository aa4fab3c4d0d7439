use crate::constants::DEFAULT_LISTEN;
use anyhow::{Context, Result};
use clap::Parser;
use ledger_core::LedgerConfig;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "ledger-node")]
#[command(about = "Single-node ledger simulator over local HTTP")]
pub struct Args {
    /// Address to listen on, e.g. 127.0.0.1:8080
    #[arg(long, default_value = DEFAULT_LISTEN)]
    pub listen: String,

    /// JSON file with ledger settings; missing fields keep their defaults
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Seed for the Random selection policy (OS entropy when omitted)
    #[arg(long)]
    pub seed: Option<u64>,

    /// Overrides `transactions_per_block` from the config file
    #[arg(long)]
    pub transactions_per_block: Option<usize>,

    /// Overrides `block_reward` from the config file
    #[arg(long)]
    pub block_reward: Option<u64>,
}

impl Args {
    /// Config file (if any), then command-line overrides, then validation.
    pub fn ledger_config(&self) -> Result<LedgerConfig> {
        let mut config = match &self.config {
            Some(path) => {
                let raw = std::fs::read_to_string(path)
                    .with_context(|| format!("reading {}", path.display()))?;
                serde_json::from_str(&raw)
                    .with_context(|| format!("parsing {}", path.display()))?
            }
            None => LedgerConfig::default(),
        };
        if let Some(n) = self.transactions_per_block {
            config.transactions_per_block = n;
        }
        if let Some(reward) = self.block_reward {
            config.block_reward = reward;
        }
        config.validate()?;
        Ok(config)
    }
}
