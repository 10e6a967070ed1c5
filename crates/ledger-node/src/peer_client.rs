//! HTTP client used during consensus to pull full chains from peers.

use std::{collections::HashMap, time::Duration};

use ledger_core::{PeerChain, PeerError};
use reqwest::{Client, StatusCode};
use tracing::{debug, warn};

use crate::constants::CHAIN_PATH;

pub type FetchedChains = HashMap<String, Result<PeerChain, PeerError>>;

#[derive(Clone, Debug)]
pub struct PeerClient {
    http: Client,
    timeout: Duration,
}

impl PeerClient {
    pub fn new(timeout: Duration) -> Result<Self, reqwest::Error> {
        let http = Client::builder().timeout(timeout).build()?;
        Ok(Self { http, timeout })
    }

    /// Fetch one peer's chain, giving up after the configured timeout.
    pub async fn fetch_chain(&self, peer: &str) -> Result<PeerChain, PeerError> {
        match tokio::time::timeout(self.timeout, self.request_chain(peer)).await {
            Ok(result) => result,
            Err(_) => Err(PeerError::Timeout {
                peer: peer.to_string(),
            }),
        }
    }

    async fn request_chain(&self, peer: &str) -> Result<PeerChain, PeerError> {
        let url = format!("http://{peer}{CHAIN_PATH}");
        let resp = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|e| transport_error(peer, e))?;

        let status = resp.status();
        if status != StatusCode::OK {
            return Err(PeerError::Unreachable {
                peer: peer.to_string(),
                reason: format!("GET {CHAIN_PATH} returned {status}"),
            });
        }

        let body = resp.bytes().await.map_err(|e| transport_error(peer, e))?;
        let chain: PeerChain =
            serde_json::from_slice(&body).map_err(|e| PeerError::Malformed {
                peer: peer.to_string(),
                reason: e.to_string(),
            })?;
        debug!(%peer, length = chain.length, "fetched peer chain");
        Ok(chain)
    }

    /// Query every peer concurrently. Each request is bounded by the timeout,
    /// so the whole call returns within roughly one timeout.
    pub async fn fetch_all(&self, peers: &[String]) -> FetchedChains {
        let handles: Vec<_> = peers
            .iter()
            .cloned()
            .map(|peer| {
                let client = self.clone();
                tokio::spawn(async move { client.fetch_chain(&peer).await })
            })
            .collect();

        let mut fetched = FetchedChains::with_capacity(peers.len());
        for (peer, handle) in peers.iter().zip(handles) {
            let result = match handle.await {
                Ok(result) => result,
                Err(join_err) => {
                    warn!(%peer, error = %join_err, "peer fetch task failed");
                    Err(PeerError::Unreachable {
                        peer: peer.clone(),
                        reason: join_err.to_string(),
                    })
                }
            };
            fetched.insert(peer.clone(), result);
        }
        fetched
    }
}

fn transport_error(peer: &str, err: reqwest::Error) -> PeerError {
    let peer = peer.to_string();
    if err.is_timeout() {
        PeerError::Timeout { peer }
    } else if err.is_decode() {
        PeerError::Malformed {
            peer,
            reason: err.to_string(),
        }
    } else {
        PeerError::Unreachable {
            peer,
            reason: err.to_string(),
        }
    }
}
