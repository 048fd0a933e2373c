//! Per-card randomness: BLAKE3-derived keys feeding ChaCha20.
//!
//! Layout rule: each stream draws only the values its card needs. Classic
//! column `c` samples `column_needed` offsets into its range on stream `c`;
//! whole pools sample `cells_to_draw` indices on [`WHOLE_POOL_STREAM`].
//! Offsets come out in draw order and fill cells top-to-bottom (columns) or
//! row-major (whole pools), skipping the free center.

use std::collections::HashMap;

use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha20Rng;

// changing this changes every card of every event
const DERIVE_CONTEXT: &str = "sanctuary-bingo 2024-06-01 card layout v1";

pub const WHOLE_POOL_STREAM: u64 = u64::MAX;

pub fn derive_seed(seed: &str, card_index: u32, stream: u64) -> [u8; 32] {
    let mut hasher = blake3::Hasher::new_derive_key(DERIVE_CONTEXT);
    // length prefix keeps ("ab", 1) and ("a", ..) from sharing a preimage
    hasher.update(&(seed.len() as u64).to_le_bytes());
    hasher.update(seed.as_bytes());
    hasher.update(&u64::from(card_index).to_le_bytes());
    hasher.update(&stream.to_le_bytes());
    *hasher.finalize().as_bytes()
}

pub fn card_rng(seed: &str, card_index: u32, stream: u64) -> ChaCha20Rng {
    ChaCha20Rng::from_seed(derive_seed(seed, card_index, stream))
}

/// Uniform index in `0..bound` using rejection sampling over `next_u64`.
fn bounded_index<R: RngCore>(rng: &mut R, bound: usize) -> usize {
    let bound = bound as u64;
    // largest multiple of `bound` that fits; draws at or above it are rejected
    let zone = u64::MAX - u64::MAX % bound;
    loop {
        let draw = rng.next_u64();
        if draw < zone {
            return (draw % bound) as usize;
        }
    }
}

/// First `amount` positions of a forward Fisher–Yates over `0..len`.
///
/// Only touched slots are tracked, so the cost is O(`amount`) whatever `len`
/// is. `SliceRandom` is not value-stable across `rand` releases and must not
/// be used here.
pub fn sample_indices<R: RngCore>(rng: &mut R, len: usize, amount: usize) -> Vec<usize> {
    debug_assert!(amount <= len, "cannot sample {amount} of {len}");
    let mut swapped: HashMap<usize, usize> = HashMap::with_capacity(amount);
    let mut picked = Vec::with_capacity(amount);
    for i in 0..amount {
        let j = i + bounded_index(rng, len - i);
        let at_j = swapped.get(&j).copied().unwrap_or(j);
        let at_i = swapped.get(&i).copied().unwrap_or(i);
        swapped.insert(j, at_i);
        picked.push(at_j);
    }
    picked
}
