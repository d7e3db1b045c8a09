//! Script detection for per-token routing.
//!
//! Classifies a surface token as Devanagari, romanized Hinglish, or English.
//! The Hinglish heuristic is table-driven and deterministic; when uncertain
//! the detector answers English.

use crate::language::hinglish;
use crate::types::Script;

/// Romanization digraph cues common in Hinglish. A token needs at least two
/// distinct cues to be routed as Hinglish on cues alone.
const HINGLISH_CUES: &[&str] = &[
    "aa", "ee", "oo", "bh", "dh", "gh", "kh", "ph", "th", "ch", "sh",
    "yaa", "iya", "ji", "bhai", "yaar",
];

/// Word endings typical of romanized Hindi.
const HINGLISH_SUFFIXES: &[&str] = &["aa", "ee", "oo", "ai", "ya", "iya", "aan", "aar"];

/// True for code points in the Devanagari block (U+0900..U+097F).
pub fn in_devanagari_range(c: char) -> bool {
    ('\u{0900}'..='\u{097F}').contains(&c)
}

/// Classify a token's script.
pub fn detect(surface: &str) -> Script {
    if surface.chars().any(in_devanagari_range) {
        return Script::Devanagari;
    }

    let lower = surface.to_lowercase();
    if !lower.is_empty()
        && lower.chars().all(|c| c.is_ascii_alphabetic())
        && looks_like_hinglish(&lower)
    {
        return Script::Hinglish;
    }

    Script::English
}

/// Hinglish heuristic: curated lexicon hit, two distinct digraph cues, or a
/// characteristic suffix.
fn looks_like_hinglish(lower: &str) -> bool {
    if hinglish::in_lexicon(lower) {
        return true;
    }

    let cue_count = HINGLISH_CUES.iter().filter(|cue| lower.contains(*cue)).count();
    if cue_count >= 2 {
        return true;
    }

    HINGLISH_SUFFIXES.iter().any(|suffix| lower.ends_with(suffix))
}
