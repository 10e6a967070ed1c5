//! Proof-of-work puzzle.
//!
//! A proof is valid against the previous block's proof when
//! `sha256(decimal(proof^2 - previous_proof^2))` starts with `difficulty`
//! hexadecimal zeros. Mining and validation share [`is_valid`].

use rayon::prelude::*;
use sha2::{Digest, Sha256};
use tracing::{debug, trace};

use crate::constants::SOLVE_WINDOW;
use crate::Hash;

/// The puzzle preimage, `proof^2 - previous_proof^2` in decimal.
/// `None` when the squares do not fit in an `i128`.
pub fn work_preimage(previous_proof: u64, proof: u64) -> Option<String> {
    let prev = i128::from(previous_proof);
    let next = i128::from(proof);
    let diff = next.checked_mul(next)?.checked_sub(prev.checked_mul(prev)?)?;
    Some(diff.to_string())
}

pub fn work_hash(previous_proof: u64, proof: u64) -> Option<Hash> {
    let preimage = work_preimage(previous_proof, proof)?;
    let mut hasher = Sha256::new();
    hasher.update(preimage.as_bytes());
    let digest = hasher.finalize();
    let mut out = [0u8; 32];
    out.copy_from_slice(&digest[..]);
    Some(out)
}

/// Hex form of [`work_hash`].
pub fn work_digest(previous_proof: u64, proof: u64) -> Option<String> {
    work_hash(previous_proof, proof).map(hex::encode)
}

/// Whether a hex digest starts with `difficulty` zeros.
pub fn meets_difficulty(hex_digest: &str, difficulty: u32) -> bool {
    let wanted = difficulty as usize;
    hex_digest.len() >= wanted && hex_digest.bytes().take(wanted).all(|c| c == b'0')
}

pub fn is_valid(previous_proof: u64, proof: u64, difficulty: u32) -> bool {
    work_digest(previous_proof, proof).is_some_and(|hex| meets_difficulty(&hex, difficulty))
}

/// Smallest proof `>= 1` that is valid against `previous_proof`.
///
/// Nonces are scanned in windows of [`SOLVE_WINDOW`]. Each window is searched
/// in parallel and `find_first` keeps the lowest hit, so the answer is the
/// same one [`solve_sequential`] returns. `None` only if the whole `u64`
/// range fails, which no real difficulty reaches.
pub fn solve(previous_proof: u64, difficulty: u32) -> Option<u64> {
    let mut start = 1u64;
    loop {
        let end = start.saturating_add(SOLVE_WINDOW);
        let found = (start..end)
            .into_par_iter()
            .find_first(|proof| is_valid(previous_proof, *proof, difficulty));
        if let Some(proof) = found {
            debug!(previous_proof, proof, difficulty, "proof found");
            return Some(proof);
        }
        trace!(start, end, "window exhausted");
        if end == u64::MAX {
            return is_valid(previous_proof, end, difficulty).then_some(end);
        }
        start = end;
    }
}

/// Plain linear scan from 1. Same result as [`solve`], single threaded.
pub fn solve_sequential(previous_proof: u64, difficulty: u32) -> Option<u64> {
    (1..=u64::MAX).find(|proof| is_valid(previous_proof, *proof, difficulty))
}
