use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use ledger_core::LedgerError;
use serde_json::json;
use thiserror::Error;
use tracing::error;

#[derive(Debug, Error)]
pub enum NodeError {
    #[error(transparent)]
    Ledger(#[from] LedgerError),
    #[error("bad request: {0}")]
    BadRequest(String),
    #[error("mining worker failed: {0}")]
    Worker(#[from] tokio::task::JoinError),
    #[error("http client: {0}")]
    Http(#[from] reqwest::Error),
}

impl NodeError {
    pub fn status(&self) -> StatusCode {
        match self {
            NodeError::Ledger(LedgerError::MalformedTransaction(_))
            | NodeError::Ledger(LedgerError::InvalidPeerAddress(_))
            | NodeError::BadRequest(_) => StatusCode::BAD_REQUEST,
            NodeError::Ledger(LedgerError::EmptyChain)
            | NodeError::Ledger(LedgerError::NonceSpaceExhausted)
            | NodeError::Worker(_)
            | NodeError::Http(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for NodeError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(error = %self, "request failed");
        }
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}
