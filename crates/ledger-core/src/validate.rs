//! Whole-chain validation.
//!
//! Works on any slice of blocks, local or received from a peer. The first
//! block is only checked for genesis shape; the proof-of-work predicate is
//! applied from the second block onward.

use crate::{error::ValidationError, hash::hash_block, pow, Block};

/// Walk the chain and report the first failure.
pub fn validate_chain(chain: &[Block], difficulty: u32) -> Result<(), ValidationError> {
    let genesis = chain.first().ok_or(ValidationError::Empty)?;
    if !genesis.is_genesis() {
        return Err(ValidationError::BadGenesis);
    }

    for (offset, pair) in chain.windows(2).enumerate() {
        let (previous, block) = (&pair[0], &pair[1]);
        let index = offset + 1;

        if previous.index.checked_add(1) != Some(block.index) {
            return Err(ValidationError::IndexGap { index });
        }
        if block.previous_hash != hash_block(previous) {
            return Err(ValidationError::BrokenLink { index });
        }
        if !pow::is_valid(previous.proof, block.proof, difficulty) {
            return Err(ValidationError::InvalidProof { index });
        }
    }
    Ok(())
}

pub fn is_valid(chain: &[Block], difficulty: u32) -> bool {
    validate_chain(chain, difficulty).is_ok()
}
