//! Overflow fragment sampling
//!
//! Splits dream bodies into sentence fragments and samples a small random
//! subset for ambient display. When the dreams themselves yield too few
//! fragments, a fixed pool of pre-written fragments fills the gap.

use rand::seq::SliceRandom;
use rand::Rng;

use crate::db::models::Dream;
use crate::error::Result;

/// Pre-written fragments appended wholesale when the real pool is scarce
pub const FALLBACK_FRAGMENTS: [&str; 7] = [
    "遠くで鐘が鳴っている",
    "鍵は開いたままだ",
    "古びた本棚に埃が積もっている",
    "森の奥から誰かが呼んでいる",
    "月が二つ見える",
    "時計の針が逆回りしている",
    "窓の外に誰かの影が見える",
];

/// Fewest fragments the sampler aims to return
pub const MIN_FRAGMENTS: usize = 5;
/// Most fragments the sampler returns
pub const MAX_FRAGMENTS: usize = 8;

/// Sample 5-8 display fragments from the given dreams.
///
/// Contents are split on 。！？ and blank pieces dropped. If fewer than
/// five real fragments come out, the whole fallback pool is appended (the
/// output may then mix real and fallback fragments, or be all-fallback).
/// The pool is shuffled and a uniform random count between five and eight
/// taken; a pool smaller than the chosen count is returned whole.
pub fn sample_overflow(dreams: &[Dream]) -> Result<Vec<String>> {
    let mut pool = extract_fragments(dreams);

    if pool.len() < MIN_FRAGMENTS {
        pool.extend(FALLBACK_FRAGMENTS.iter().map(|s| s.to_string()));
    }

    let mut rng = rand::thread_rng();
    pool.shuffle(&mut rng);
    let count = rng.gen_range(MIN_FRAGMENTS..=MAX_FRAGMENTS).min(pool.len());
    pool.truncate(count);

    Ok(pool)
}

fn extract_fragments(dreams: &[Dream]) -> Vec<String> {
    let mut fragments = Vec::new();
    for dream in dreams {
        for piece in dream.content.split(['。', '！', '？']) {
            let piece = piece.trim();
            if !piece.is_empty() {
                fragments.push(piece.to_string());
            }
        }
    }
    fragments
}
