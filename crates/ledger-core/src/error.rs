use thiserror::Error;

/// Request-level failures raised by the ledger itself.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LedgerError {
    #[error("malformed transaction: missing `{0}`")]
    MalformedTransaction(&'static str),
    #[error("invalid peer address: {0:?}")]
    InvalidPeerAddress(String),
    #[error("no proof exists in the u64 nonce space at this difficulty")]
    NonceSpaceExhausted,
    /// The chain lost its genesis block. Only a construction bug can cause this.
    #[error("chain has no blocks")]
    EmptyChain,
}

/// Why a chain failed validation. Indices are 0-based positions in the slice.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("chain is empty")]
    Empty,
    #[error("first block is not a genesis block")]
    BadGenesis,
    #[error("block at position {index} does not follow its predecessor's index")]
    IndexGap { index: usize },
    #[error("block at position {index} does not link to the hash of its predecessor")]
    BrokenLink { index: usize },
    #[error("block at position {index} carries a proof that fails the difficulty target")]
    InvalidProof { index: usize },
}

/// Failure to obtain a usable chain from one peer during consensus.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PeerError {
    #[error("peer {peer} unreachable: {reason}")]
    Unreachable { peer: String, reason: String },
    #[error("peer {peer} timed out")]
    Timeout { peer: String },
    #[error("peer {peer} sent a malformed response: {reason}")]
    Malformed { peer: String, reason: String },
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ReplaceError {
    #[error("candidate chain of length {candidate} is not longer than local length {local}")]
    NotLonger { local: usize, candidate: usize },
    #[error("candidate chain is invalid: {0}")]
    Invalid(#[from] ValidationError),
}
