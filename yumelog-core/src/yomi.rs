//! Phonetic-index classification
//!
//! Maps a tag's yomi (hiragana reading) to one of the twelve index buckets
//! used by the library view: ten syllabary rows, an alphanumeric bucket, and
//! a catch-all. Only the first character is inspected.

use crate::db::models::YomiIndex;

/// Classify a yomi string into its index bucket.
///
/// Dakuten/handakuten and small-kana variants fall inside their row's range
/// (e.g. ご is in the か row, ぽ is in the は row). A blank yomi is rejected
/// by validation before classification; the empty string falls through to
/// the catch-all here rather than panicking.
pub fn classify(yomi: &str) -> YomiIndex {
    let Some(first) = yomi.chars().next() else {
        return YomiIndex::Other;
    };

    if first.is_ascii_alphanumeric() {
        return YomiIndex::Alnum;
    }

    match first {
        'あ'..='お' => YomiIndex::A,
        'か'..='ご' => YomiIndex::Ka,
        'さ'..='ぞ' => YomiIndex::Sa,
        'た'..='ど' => YomiIndex::Ta,
        'な'..='の' => YomiIndex::Na,
        'は'..='ぽ' => YomiIndex::Ha,
        'ま'..='も' => YomiIndex::Ma,
        'や'..='よ' => YomiIndex::Ya,
        'ら'..='ろ' => YomiIndex::Ra,
        'わ'..='ん' => YomiIndex::Wa,
        _ => YomiIndex::Other,
    }
}
