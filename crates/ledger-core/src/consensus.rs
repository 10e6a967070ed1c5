//! Longest-valid-chain consensus.
//!
//! [`resolve`] asks every known peer for its chain through a [`ChainFetcher`]
//! and adopts the longest one that validates, provided it is strictly longer
//! than the local chain. Peers are visited in registration order and a later
//! peer must beat the current best strictly, so on equal lengths the first
//! peer seen wins. A peer that cannot be reached or answers with garbage is
//! skipped.

use std::collections::HashMap;
use std::hash::BuildHasher;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::{
    error::{PeerError, ValidationError},
    validate::validate_chain,
    Block, Ledger,
};

/// A peer's answer to "give me your full chain".
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeerChain {
    pub chain: Vec<Block>,
    pub length: usize,
}

impl PeerChain {
    pub fn new(chain: Vec<Block>) -> Self {
        let length = chain.len();
        Self { chain, length }
    }
}

/// Source of peer chains. The network client lives outside this crate.
pub trait ChainFetcher {
    fn fetch_chain(&self, peer: &str) -> Result<PeerChain, PeerError>;
}

/// Pre-fetched answers keyed by peer. A peer with no entry counts as unreachable.
impl<S: BuildHasher> ChainFetcher for HashMap<String, Result<PeerChain, PeerError>, S> {
    fn fetch_chain(&self, peer: &str) -> Result<PeerChain, PeerError> {
        self.get(peer).cloned().unwrap_or_else(|| {
            Err(PeerError::Unreachable {
                peer: peer.to_string(),
                reason: "no response recorded".to_string(),
            })
        })
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SkipReason {
    Peer(PeerError),
    /// The reported `length` disagrees with the number of blocks sent.
    LengthMismatch { reported: usize, actual: usize },
    NotLonger { length: usize, best: usize },
    Invalid(ValidationError),
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Resolution {
    pub replaced: bool,
    /// Local chain length after resolution.
    pub length: usize,
    /// Peer whose chain was adopted.
    pub adopted_from: Option<String>,
    pub skipped: Vec<(String, SkipReason)>,
}

pub fn resolve<F: ChainFetcher + ?Sized>(ledger: &mut Ledger, fetcher: &F) -> Resolution {
    let peers: Vec<String> = ledger.peers().iter().map(str::to_owned).collect();
    let difficulty = ledger.difficulty();
    let mut best_len = ledger.len();
    let mut best: Option<(String, Vec<Block>)> = None;
    let mut skipped = Vec::new();

    for peer in peers {
        let reported = match fetcher.fetch_chain(&peer) {
            Ok(reported) => reported,
            Err(err) => {
                warn!(%peer, error = %err, "skipping peer");
                skipped.push((peer, SkipReason::Peer(err)));
                continue;
            }
        };

        let actual = reported.chain.len();
        if reported.length != actual {
            warn!(%peer, reported = reported.length, actual, "peer length does not match its chain");
            skipped.push((
                peer,
                SkipReason::LengthMismatch {
                    reported: reported.length,
                    actual,
                },
            ));
            continue;
        }
        if actual <= best_len {
            debug!(%peer, length = actual, best = best_len, "peer chain not longer");
            skipped.push((
                peer,
                SkipReason::NotLonger {
                    length: actual,
                    best: best_len,
                },
            ));
            continue;
        }
        if let Err(err) = validate_chain(&reported.chain, difficulty) {
            warn!(%peer, length = actual, error = %err, "rejecting invalid peer chain");
            skipped.push((peer, SkipReason::Invalid(err)));
            continue;
        }

        best_len = actual;
        best = Some((peer, reported.chain));
    }

    match best {
        Some((peer, chain)) => {
            info!(%peer, from = ledger.len(), to = chain.len(), "adopting longer peer chain");
            ledger.swap_chain(chain);
            Resolution {
                replaced: true,
                length: ledger.len(),
                adopted_from: Some(peer),
                skipped,
            }
        }
        None => Resolution {
            replaced: false,
            length: ledger.len(),
            adopted_from: None,
            skipped,
        },
    }
}
