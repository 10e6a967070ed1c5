use std::{net::SocketAddr, time::Duration};

use anyhow::{bail, Context, Result};
use clap::Parser;
use ledger_core::constants::DEFAULT_DIFFICULTY;
use uuid::Uuid;

use crate::constants::{
    DEFAULT_LISTEN, DEFAULT_NODE_NAME, DEFAULT_PEER_TIMEOUT_SECS, MAX_NODE_DIFFICULTY,
};

#[derive(Parser, Debug, Clone)]
#[command(name = "ledger-node")]
#[command(about = "Proof-of-work ledger node")]
pub struct Args {
    /// Address to listen on, e.g. 127.0.0.1:5000
    #[arg(long, default_value = DEFAULT_LISTEN)]
    pub listen: String,

    /// Leading hex zeros required of every proof
    #[arg(long, default_value_t = DEFAULT_DIFFICULTY)]
    pub difficulty: u32,

    /// Peer to register at startup (host:port or URL); repeatable
    #[arg(long = "peer")]
    pub peers: Vec<String>,

    /// Seconds to wait for each peer during consensus
    #[arg(long, default_value_t = DEFAULT_PEER_TIMEOUT_SECS)]
    pub peer_timeout_secs: u64,

    /// Receiver label for the reward transaction added to each mined block
    #[arg(long, default_value = DEFAULT_NODE_NAME)]
    pub node_name: String,

    /// Do not add a reward transaction when mining
    #[arg(long)]
    pub no_reward: bool,
}

/// Reward transaction the node queues before appending each block it mines.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Reward {
    /// Random per-process address, used as the sender.
    pub node_address: String,
    pub node_name: String,
}

impl Reward {
    pub fn new(node_name: impl Into<String>) -> Self {
        Self {
            node_address: Uuid::new_v4().simple().to_string(),
            node_name: node_name.into(),
        }
    }
}

#[derive(Clone, Debug)]
pub struct NodeConfig {
    pub listen: SocketAddr,
    pub difficulty: u32,
    pub bootstrap_peers: Vec<String>,
    pub peer_timeout: Duration,
    pub reward: Option<Reward>,
}

impl NodeConfig {
    pub fn from_args(args: Args) -> Result<Self> {
        let listen: SocketAddr = args
            .listen
            .parse()
            .with_context(|| format!("invalid --listen address {:?}", args.listen))?;
        if !(1..=MAX_NODE_DIFFICULTY).contains(&args.difficulty) {
            bail!(
                "--difficulty must be between 1 and {MAX_NODE_DIFFICULTY}, got {}",
                args.difficulty
            );
        }
        if args.peer_timeout_secs == 0 {
            bail!("--peer-timeout-secs must be at least 1");
        }
        if !args.no_reward && args.node_name.trim().is_empty() {
            bail!("--node-name must not be empty");
        }

        Ok(Self {
            listen,
            difficulty: args.difficulty,
            bootstrap_peers: args.peers,
            peer_timeout: Duration::from_secs(args.peer_timeout_secs),
            reward: (!args.no_reward).then(|| Reward::new(args.node_name)),
        })
    }
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            listen: SocketAddr::from(([127, 0, 0, 1], 5000)),
            difficulty: DEFAULT_DIFFICULTY,
            bootstrap_peers: Vec::new(),
            peer_timeout: Duration::from_secs(DEFAULT_PEER_TIMEOUT_SECS),
            reward: Some(Reward::new(DEFAULT_NODE_NAME)),
        }
    }
}
