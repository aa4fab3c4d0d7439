//! HTTP host for a single in-memory ledger.
pub mod api;
pub mod config;
pub mod constants;

pub use api::{router, AppState};
pub use config::Args;
