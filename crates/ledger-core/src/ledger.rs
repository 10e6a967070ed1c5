use serde_json::Number;
use tracing::{debug, info};

use crate::{
    error::{LedgerError, ReplaceError, ValidationError},
    hash::hash_block,
    peers::PeerSet,
    pow, validate, Block, Transaction,
};

/// One node's view of the ledger: the chain, the mempool and the known peers.
///
/// The chain always starts with a genesis block. Blocks are only ever
/// appended by [`Ledger::create_block`] or swapped wholesale by
/// [`Ledger::replace_chain`].
#[derive(Clone, Debug)]
pub struct Ledger {
    chain: Vec<Block>,
    mempool: Vec<Transaction>,
    peers: PeerSet,
    difficulty: u32,
}

impl Ledger {
    pub fn new(difficulty: u32) -> Self {
        Self {
            chain: vec![Block::genesis()],
            mempool: Vec::new(),
            peers: PeerSet::new(),
            difficulty,
        }
    }

    /// Start from an existing chain, e.g. a copy taken from another node.
    pub fn from_chain(chain: Vec<Block>, difficulty: u32) -> Result<Self, ValidationError> {
        validate::validate_chain(&chain, difficulty)?;
        Ok(Self {
            chain,
            mempool: Vec::new(),
            peers: PeerSet::new(),
            difficulty,
        })
    }

    pub fn chain(&self) -> &[Block] {
        &self.chain
    }

    /// Chain length. Never zero: the genesis block is always present.
    #[allow(clippy::len_without_is_empty)]
    pub fn len(&self) -> usize {
        self.chain.len()
    }

    pub fn mempool(&self) -> &[Transaction] {
        &self.mempool
    }

    pub fn peers(&self) -> &PeerSet {
        &self.peers
    }

    pub fn difficulty(&self) -> u32 {
        self.difficulty
    }

    pub fn latest_block(&self) -> Result<&Block, LedgerError> {
        self.chain.last().ok_or(LedgerError::EmptyChain)
    }

    /// Append a block holding the whole mempool and empty the mempool.
    pub fn create_block(&mut self, proof: u64, previous_hash: String) -> Block {
        let index = self.chain.len() as u64 + 1;
        let transactions = std::mem::take(&mut self.mempool);
        let block = Block::new(index, proof, previous_hash, transactions);
        info!(
            index,
            proof,
            txs = block.transactions.len(),
            "appended block"
        );
        self.chain.push(block.clone());
        block
    }

    /// Queue a transaction. Returns the index of the block it will land in.
    pub fn submit_transaction(
        &mut self,
        sender: impl Into<String>,
        receiver: impl Into<String>,
        amount: impl Into<Number>,
    ) -> Result<u64, LedgerError> {
        self.push_transaction(Transaction::new(sender, receiver, amount))
    }

    pub fn push_transaction(&mut self, tx: Transaction) -> Result<u64, LedgerError> {
        let next_index = self.latest_block()?.index + 1;
        debug!(sender = %tx.sender, receiver = %tx.receiver, amount = %tx.amount, next_index, "queued transaction");
        self.mempool.push(tx);
        Ok(next_index)
    }

    /// Solve the puzzle against the tip and append the next block.
    ///
    /// Blocks the calling thread for the whole search.
    pub fn mine_next_block(&mut self) -> Result<Block, LedgerError> {
        let tip = self.latest_block()?;
        let previous_proof = tip.proof;
        let previous_hash = hash_block(tip);
        let proof = pow::solve(previous_proof, self.difficulty)
            .ok_or(LedgerError::NonceSpaceExhausted)?;
        Ok(self.create_block(proof, previous_hash))
    }

    /// Add a peer. Returns `false` if it was already registered.
    pub fn register_peer(&mut self, address: &str) -> Result<bool, LedgerError> {
        let added = self.peers.insert(address)?;
        if added {
            info!(peer = address, "registered peer");
        }
        Ok(added)
    }

    pub fn is_chain_valid(&self) -> bool {
        validate::is_valid(&self.chain, self.difficulty)
    }

    /// Swap in `candidate` if it is valid and strictly longer than the local chain.
    /// The local chain is left untouched on any error.
    pub fn replace_chain(&mut self, candidate: Vec<Block>) -> Result<(), ReplaceError> {
        if candidate.len() <= self.chain.len() {
            return Err(ReplaceError::NotLonger {
                local: self.chain.len(),
                candidate: candidate.len(),
            });
        }
        validate::validate_chain(&candidate, self.difficulty)?;
        info!(
            from = self.chain.len(),
            to = candidate.len(),
            "replacing local chain"
        );
        self.swap_chain(candidate);
        Ok(())
    }

    /// Caller has already validated `chain` and checked it is longer.
    pub(crate) fn swap_chain(&mut self, chain: Vec<Block>) {
        debug_assert!(!chain.is_empty());
        self.chain = chain;
    }
}
