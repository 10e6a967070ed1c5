pub const DEFAULT_LISTEN: &str = "127.0.0.1:5000";
pub const DEFAULT_NODE_NAME: &str = "NODE";
pub const DEFAULT_PEER_TIMEOUT_SECS: u64 = 5;
/// Highest difficulty the node accepts; beyond this a block takes hours to mine.
pub const MAX_NODE_DIFFICULTY: u32 = 16;
pub const MINING_REWARD: u64 = 1;
/// Path every node serves its full chain on; peers fetch it during consensus.
pub const CHAIN_PATH: &str = "/get_chain";
