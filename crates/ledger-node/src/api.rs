//! HTTP routes. Every body is JSON.

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use ledger_core::{Block, NewTransaction, PeerChain, Transaction};
use serde::{Deserialize, Serialize};
use tower_http::trace::TraceLayer;

use crate::{constants::CHAIN_PATH, error::NodeError, state::NodeState};

#[derive(Serialize)]
struct Health {
    status: &'static str,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MinedBlock {
    pub message: String,
    pub index: u64,
    pub timestamp: u64,
    pub proof: u64,
    pub previous_hash: String,
    pub transactions: Vec<Transaction>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Validity {
    pub message: String,
    pub is_valid: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TxAccepted {
    pub message: String,
    pub index: u64,
}

#[derive(Debug, Default, Deserialize)]
pub struct ConnectRequest {
    pub nodes: Option<Vec<String>>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Connected {
    pub message: String,
    pub total_nodes: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ConsensusOutcome {
    pub message: String,
    pub replaced: bool,
    pub length: usize,
    pub chain: Vec<Block>,
}

pub fn router(state: NodeState) -> Router {
    Router::new()
        .route("/health", get(|| async { Json(Health { status: "ok" }) }))
        .route("/mine_block", get(mine_block))
        .route(CHAIN_PATH, get(get_chain))
        .route("/is_valid", get(is_valid))
        .route("/add_transaction", post(add_transaction))
        .route("/connect_node", post(connect_node))
        .route("/consensus", get(consensus))
        .route("/mempool", get(mempool))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn mine_block(State(state): State<NodeState>) -> Result<Json<MinedBlock>, NodeError> {
    let block = state.mine().await?;
    Ok(Json(MinedBlock {
        message: "Congratulations, you just mined a block".to_string(),
        index: block.index,
        timestamp: block.timestamp,
        proof: block.proof,
        previous_hash: block.previous_hash,
        transactions: block.transactions,
    }))
}

async fn get_chain(State(state): State<NodeState>) -> Json<PeerChain> {
    Json(state.chain().await)
}

async fn is_valid(State(state): State<NodeState>) -> Json<Validity> {
    let is_valid = state.is_valid().await;
    let message = if is_valid {
        "The blockchain is valid"
    } else {
        "The blockchain is NOT VALID"
    };
    Json(Validity {
        message: message.to_string(),
        is_valid,
    })
}

async fn add_transaction(
    State(state): State<NodeState>,
    body: Result<Json<NewTransaction>, JsonRejection>,
) -> Result<(StatusCode, Json<TxAccepted>), NodeError> {
    let Json(tx) = body.map_err(|e| NodeError::BadRequest(e.body_text()))?;
    let index = state.submit(tx).await?;
    Ok((
        StatusCode::CREATED,
        Json(TxAccepted {
            message: format!("Transaction will be added to block {index}"),
            index,
        }),
    ))
}

async fn connect_node(
    State(state): State<NodeState>,
    body: Result<Json<ConnectRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Connected>), NodeError> {
    let Json(req) = body.map_err(|e| NodeError::BadRequest(e.body_text()))?;
    let nodes = req
        .nodes
        .ok_or_else(|| NodeError::BadRequest("no nodes given".to_string()))?;
    let total_nodes = state.connect(&nodes).await?;
    Ok((
        StatusCode::CREATED,
        Json(Connected {
            message: "New nodes connected to the network".to_string(),
            total_nodes,
        }),
    ))
}

async fn consensus(State(state): State<NodeState>) -> Json<ConsensusOutcome> {
    let (resolution, chain) = state.consensus().await;
    let message = if resolution.replaced {
        "Chain replaced by the longest valid peer chain"
    } else {
        "No change, the local chain is the longest valid one"
    };
    Json(ConsensusOutcome {
        message: message.to_string(),
        replaced: resolution.replaced,
        length: resolution.length,
        chain,
    })
}

async fn mempool(State(state): State<NodeState>) -> Json<Vec<Transaction>> {
    Json(state.mempool().await)
}
