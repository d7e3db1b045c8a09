//! Syllabification of unified sequences with surface char spans.
//!
//! Nuclei sit at vowel symbols. Between two nuclei the last consonant of the
//! run opens the next syllable (CV preference); the rest joins the previous
//! syllable's coda. Char spans over the token surface are recovered by
//! distributing the surface proportionally to phoneme positions.

use crate::types::{UnifiedPhoneme, UnifiedSequence};

/// One syllable of a word, with its slice of the unified sequence and the
/// char span it covers in the word's surface.
#[derive(Debug, Clone, PartialEq)]
pub struct Syllable {
    pub phonemes: Vec<UnifiedPhoneme>,
    /// Index of the nucleus within `phonemes`; the rime runs from here
    pub rime_start: usize,
    pub char_start: usize,
    pub char_end: usize,
}

impl Syllable {
    /// Nucleus plus coda: the part compared for rhyme purposes.
    pub fn rime(&self) -> &[UnifiedPhoneme] {
        &self.phonemes[self.rime_start..]
    }
}

/// Split a word's unified sequence into syllables.
///
/// `surface_chars` is the char length of the token surface; spans are char
/// indices into it. A vowel-less sequence comes back as one syllable whose
/// rime is the whole sequence.
pub fn syllabify(seq: &UnifiedSequence, surface_chars: usize) -> Vec<Syllable> {
    if seq.is_empty() {
        return vec![];
    }

    let nuclei: Vec<usize> = seq
        .iter()
        .enumerate()
        .filter(|(_, p)| p.is_vowel())
        .map(|(i, _)| i)
        .collect();

    if nuclei.is_empty() {
        return vec![Syllable {
            phonemes: seq.clone(),
            rime_start: 0,
            char_start: 0,
            char_end: surface_chars,
        }];
    }

    // Syllable start positions
    let mut starts = vec![0usize];
    for pair in nuclei.windows(2) {
        let (prev, next) = (pair[0], pair[1]);
        let start = if next - prev > 1 { next - 1 } else { next };
        starts.push(start);
    }

    let total = seq.len();
    let mut syllables = Vec::with_capacity(starts.len());
    for (k, &start) in starts.iter().enumerate() {
        let end = starts.get(k + 1).copied().unwrap_or(total);
        syllables.push(Syllable {
            phonemes: seq[start..end].to_vec(),
            rime_start: nuclei[k] - start,
            char_start: start * surface_chars / total,
            char_end: end * surface_chars / total,
        });
    }

    syllables
}
