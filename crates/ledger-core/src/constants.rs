pub const HASH_SIZE: usize = 32;
pub const HASH_HEX_SIZE: usize = HASH_SIZE * 2;
pub const DEFAULT_DIFFICULTY: u32 = 4;
pub const GENESIS_PROOF: u64 = 1;
pub const GENESIS_PREVIOUS_HASH: &str = "0";
/// Nonces checked per parallel search window in `pow::solve`.
pub const SOLVE_WINDOW: u64 = 1 << 14;
