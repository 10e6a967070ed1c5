use std::sync::Arc;

use ledger_core::{
    consensus::{resolve, Resolution},
    hash_block, peers, pow, Block, Ledger, LedgerError, NewTransaction, PeerChain, Transaction,
};
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info};

use crate::{config::NodeConfig, constants::MINING_REWARD, error::NodeError, peer_client::PeerClient};

/// Everything a request handler needs. Cheap to clone; clones share one ledger.
///
/// Mutations go through the write lock. Mining holds `mining` for its whole
/// run but takes the ledger lock only to read the tip and to append, so chain
/// reads keep flowing while a proof is being searched for.
#[derive(Clone)]
pub struct NodeState {
    ledger: Arc<RwLock<Ledger>>,
    mining: Arc<Mutex<()>>,
    config: Arc<NodeConfig>,
    client: PeerClient,
}

impl NodeState {
    pub fn new(config: NodeConfig) -> Result<Self, NodeError> {
        let ledger = Ledger::new(config.difficulty);
        Self::with_ledger(ledger, config)
    }

    /// Start from an existing ledger, e.g. one seeded from another node's chain.
    pub fn with_ledger(mut ledger: Ledger, config: NodeConfig) -> Result<Self, NodeError> {
        for peer in &config.bootstrap_peers {
            ledger.register_peer(peer)?;
        }
        let client = PeerClient::new(config.peer_timeout)?;
        Ok(Self {
            ledger: Arc::new(RwLock::new(ledger)),
            mining: Arc::new(Mutex::new(())),
            config: Arc::new(config),
            client,
        })
    }

    /// Mine the next block on top of the current tip.
    ///
    /// The search runs on the blocking pool. If consensus replaces the chain
    /// meanwhile, the found proof no longer fits and the search restarts on
    /// the new tip.
    pub async fn mine(&self) -> Result<Block, NodeError> {
        let _miner = self.mining.lock().await;
        loop {
            let (tip_index, previous_proof, previous_hash, difficulty) = {
                let ledger = self.ledger.read().await;
                let tip = ledger.latest_block()?;
                (tip.index, tip.proof, hash_block(tip), ledger.difficulty())
            };

            let proof =
                tokio::task::spawn_blocking(move || pow::solve(previous_proof, difficulty))
                    .await?
                    .ok_or(LedgerError::NonceSpaceExhausted)?;

            let mut ledger = self.ledger.write().await;
            let tip = ledger.latest_block()?;
            if tip.index != tip_index || hash_block(tip) != previous_hash {
                debug!(
                    stale_index = tip_index,
                    tip_index = tip.index,
                    "tip moved while mining, retrying"
                );
                continue;
            }

            if let Some(reward) = &self.config.reward {
                ledger.push_transaction(Transaction::new(
                    reward.node_address.clone(),
                    reward.node_name.clone(),
                    MINING_REWARD,
                ))?;
            }
            return Ok(ledger.create_block(proof, previous_hash));
        }
    }

    pub async fn chain(&self) -> PeerChain {
        PeerChain::new(self.ledger.read().await.chain().to_vec())
    }

    pub async fn is_valid(&self) -> bool {
        self.ledger.read().await.is_chain_valid()
    }

    pub async fn mempool(&self) -> Vec<Transaction> {
        self.ledger.read().await.mempool().to_vec()
    }

    pub async fn peers(&self) -> Vec<String> {
        self.ledger
            .read()
            .await
            .peers()
            .iter()
            .map(str::to_owned)
            .collect()
    }

    /// Check required fields and queue the transaction.
    pub async fn submit(&self, tx: NewTransaction) -> Result<u64, NodeError> {
        let tx = Transaction::try_from(tx)?;
        Ok(self.ledger.write().await.push_transaction(tx)?)
    }

    /// Register every address or none of them. Returns the full peer set.
    pub async fn connect(&self, addresses: &[String]) -> Result<Vec<String>, NodeError> {
        for address in addresses {
            peers::canonical_address(address)?;
        }
        let mut ledger = self.ledger.write().await;
        for address in addresses {
            ledger.register_peer(address)?;
        }
        Ok(ledger.peers().iter().map(str::to_owned).collect())
    }

    /// Fetch all peer chains concurrently, then apply the longest-chain rule.
    /// Returns the outcome and the chain as it stands afterwards.
    pub async fn consensus(&self) -> (Resolution, Vec<Block>) {
        let peers = self.peers().await;
        let fetched = self.client.fetch_all(&peers).await;

        let mut ledger = self.ledger.write().await;
        let resolution = resolve(&mut *ledger, &fetched);
        info!(
            replaced = resolution.replaced,
            length = resolution.length,
            skipped = resolution.skipped.len(),
            "consensus round finished"
        );
        (resolution, ledger.chain().to_vec())
    }
}
