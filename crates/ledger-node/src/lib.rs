//! HTTP node around `ledger-core`: one in-memory ledger per process, served
//! over axum, with consensus pulling peer chains over reqwest.

pub mod api;
pub mod config;
pub mod constants;
pub mod error;
pub mod peer_client;
pub mod state;

pub use config::{Args, NodeConfig, Reward};
pub use error::NodeError;
pub use state::NodeState;
