//! Rhyme-tail extraction.
//!
//! The tail is the suffix of a unified sequence starting at the last vowel
//! that carried primary stress, falling back to the last vowel overall, and
//! to the whole sequence when no vowel exists.

use crate::types::UnifiedPhoneme;

/// Slice the rhyme tail out of a unified sequence.
pub fn extract(seq: &[UnifiedPhoneme]) -> &[UnifiedPhoneme] {
    if let Some(i) = seq.iter().rposition(|p| p.is_vowel() && p.stressed) {
        return &seq[i..];
    }
    if let Some(i) = seq.iter().rposition(|p| p.is_vowel()) {
        return &seq[i..];
    }
    seq
}
