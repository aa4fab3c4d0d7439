use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use ledger_core::{unix_now, Block, Ledger, SelectionPolicy, Transaction};
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::Mutex;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

/// Ledger and the RNG behind `SelectionPolicy::Random` share one lock, so
/// admission, selection and appends never interleave.
struct Node {
    ledger: Ledger,
    rng: StdRng,
}

#[derive(Clone)]
pub struct AppState {
    node: Arc<Mutex<Node>>,
}

impl AppState {
    pub fn new(ledger: Ledger, rng: StdRng) -> Self {
        Self {
            node: Arc::new(Mutex::new(Node { ledger, rng })),
        }
    }
}

#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    fn new(status: StatusCode, message: impl ToString) -> Self {
        Self {
            status,
            message: message.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(serde_json::json!({ "error": self.message }));
        (self.status, body).into_response()
    }
}

#[derive(Serialize)]
struct Health {
    status: &'static str,
}

#[derive(Serialize)]
struct Head {
    height: u64,
    hash: String,
    next_difficulty: u32,
    pending: usize,
}

#[derive(Serialize)]
struct ChainView {
    height: u64,
    valid: bool,
    error: Option<String>,
    rendered: String,
}

#[derive(Serialize)]
struct BlockView {
    index: i64,
    rendered: String,
}

#[derive(Serialize)]
struct Balance {
    address: String,
    balance: i128,
}

#[derive(Deserialize)]
pub struct TxIn {
    pub from: String,
    pub to: String,
    pub amount: u64,
    #[serde(default)]
    pub fee: u64,
    pub timestamp: Option<u64>,
}

#[derive(Serialize)]
struct Accepted {
    accepted: bool,
    hash: String,
}

#[derive(Serialize)]
struct Mempool {
    count: usize,
    rendered: String,
    transactions: Vec<Transaction>,
}

#[derive(Deserialize)]
pub struct MineIn {
    pub miner: String,
    /// Selection policy name; oldest-first when absent.
    pub policy: Option<String>,
    pub timestamp: Option<u64>,
}

#[derive(Serialize)]
struct Mined {
    index: u64,
    hash: String,
    difficulty: u32,
    tx_count: usize,
}

impl From<&Block> for Mined {
    fn from(block: &Block) -> Self {
        Self {
            index: block.header.index,
            hash: block.hash_hex(),
            difficulty: block.header.difficulty,
            tx_count: block.txs.len(),
        }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/healthz", get(health))
        .route("/chain", get(chain))
        .route("/chain/head", get(head))
        .route("/blocks/{index}", get(block))
        .route("/balance/{address}", get(balance))
        .route("/tx", post(submit_tx))
        .route("/mempool", get(mempool))
        .route("/mine", post(mine))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health() -> Json<Health> {
    Json(Health { status: "ok" })
}

async fn head(State(state): State<AppState>) -> Json<Head> {
    let node = state.node.lock().await;
    let ledger = &node.ledger;
    Json(Head {
        height: ledger.height(),
        hash: ledger.last_block().hash_hex(),
        next_difficulty: ledger.calculate_new_difficulty(),
        pending: ledger.pool().len(),
    })
}

async fn chain(State(state): State<AppState>) -> Json<ChainView> {
    let node = state.node.lock().await;
    let validation = node.ledger.validate_chain();
    Json(ChainView {
        height: node.ledger.height(),
        valid: validation.is_ok(),
        error: validation.err().map(|e| e.to_string()),
        rendered: node.ledger.to_string(),
    })
}

async fn block(State(state): State<AppState>, Path(index): Path<i64>) -> Json<BlockView> {
    let node = state.node.lock().await;
    Json(BlockView {
        index,
        rendered: node.ledger.block_as_string(index),
    })
}

async fn balance(State(state): State<AppState>, Path(address): Path<String>) -> Json<Balance> {
    let node = state.node.lock().await;
    let balance = node.ledger.get_balance(&address);
    Json(Balance { address, balance })
}

async fn submit_tx(
    State(state): State<AppState>,
    Json(input): Json<TxIn>,
) -> Result<Json<Accepted>, ApiError> {
    let tx = Transaction::new(
        input.from,
        input.to,
        input.amount,
        input.fee,
        input.timestamp.unwrap_or_else(unix_now),
    );
    let hash = tx.hash_hex();
    let mut node = state.node.lock().await;
    node.ledger
        .submit_transaction(tx)
        .map_err(|e| ApiError::new(StatusCode::CONFLICT, e))?;
    info!(%hash, "transaction accepted");
    Ok(Json(Accepted {
        accepted: true,
        hash,
    }))
}

async fn mempool(State(state): State<AppState>) -> Json<Mempool> {
    let node = state.node.lock().await;
    let pool = node.ledger.pool();
    Json(Mempool {
        count: pool.len(),
        rendered: node.ledger.pending_transactions_as_string(),
        transactions: pool.iter().cloned().collect(),
    })
}

async fn mine(
    State(state): State<AppState>,
    Json(input): Json<MineIn>,
) -> Result<Json<Mined>, ApiError> {
    let policy = input
        .policy
        .as_deref()
        .map(str::parse::<SelectionPolicy>)
        .transpose()
        .map_err(|e| ApiError::new(StatusCode::BAD_REQUEST, e))?;

    let mut guard = state.node.lock().await;
    let Node { ledger, rng } = &mut *guard;
    // Oldest-first is read without draining: appending purges whatever got
    // sealed, and a refused block must leave the pool intact.
    let txs = match policy {
        Some(policy) => ledger.get_preferred_transactions(policy, &input.miner, rng),
        None => ledger
            .pool()
            .iter()
            .take(ledger.config().transactions_per_block)
            .cloned()
            .collect(),
    };
    let timestamp = input.timestamp.unwrap_or_else(unix_now);
    let block = ledger
        .add_block_at(txs, &input.miner, timestamp)
        .map_err(|e| {
            warn!(error = %e, "block refused");
            ApiError::new(StatusCode::UNPROCESSABLE_ENTITY, e)
        })?;
    Ok(Json(Mined::from(block)))
}
