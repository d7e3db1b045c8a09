//! Devanagari to IPA-style phonemes.
//!
//! Walks a Devanagari string as grapheme clusters (consonant + optional
//! virama + optional vowel sign) and emits phonemes from fixed tables:
//! aspirated consonants keep their ʰ, long vowels their ː. A bare consonant
//! receives the inherent ə unless followed by a virama or vowel sign, and
//! never word-finally (schwa deletion). Unknown code points are skipped.

use std::collections::HashMap;

use lazy_static::lazy_static;

use crate::types::{Phoneme, PhonemeOrigin, PhonemeSequence};

lazy_static! {
    /// Independent (word-initial / post-vowel) vowel letters.
    static ref VOWELS: HashMap<char, &'static str> = {
        [
            ('अ', "ə"), ('आ', "aː"), ('इ', "i"), ('ई', "iː"),
            ('उ', "u"), ('ऊ', "uː"), ('ए', "eː"), ('ऐ', "ɛː"),
            ('ओ', "oː"), ('औ', "ɔː"), ('ऑ', "ɔ"),
        ]
        .into_iter()
        .collect()
    };

    /// Dependent vowel signs (matras).
    static ref VOWEL_SIGNS: HashMap<char, &'static str> = {
        [
            ('ा', "aː"), ('ि', "i"), ('ी', "iː"), ('ु', "u"),
            ('ू', "uː"), ('े', "eː"), ('ै', "ɛː"), ('ो', "oː"),
            ('ौ', "ɔː"), ('ॉ', "ɔ"),
        ]
        .into_iter()
        .collect()
    };

    static ref CONSONANTS: HashMap<char, &'static str> = {
        [
            ('क', "k"), ('ख', "kʰ"), ('ग', "g"), ('घ', "gʰ"), ('ङ', "ŋ"),
            ('च', "tʃ"), ('छ', "tʃʰ"), ('ज', "dʒ"), ('झ', "dʒʰ"), ('ञ', "ɲ"),
            ('ट', "ʈ"), ('ठ', "ʈʰ"), ('ड', "ɖ"), ('ढ', "ɖʰ"), ('ण', "ɳ"),
            ('त', "t"), ('थ', "tʰ"), ('द', "d"), ('ध', "dʰ"), ('न', "n"),
            ('प', "p"), ('फ', "pʰ"), ('ब', "b"), ('भ', "bʰ"), ('म', "m"),
            ('य', "j"), ('र', "r"), ('ल', "l"), ('व', "ʋ"), ('श', "ʃ"),
            ('ष', "ʂ"), ('स', "s"), ('ह', "ɦ"), ('ळ', "ɭ"),
        ]
        .into_iter()
        .collect()
    };
}

const VIRAMA: char = '्';
/// Vocalic R letter and its sign both read as "ri".
const VOCALIC_R: char = 'ऋ';
const VOCALIC_R_SIGN: char = 'ृ';

/// Map Devanagari text to an IPA-style phoneme sequence.
///
/// Primary stress goes on the first vowel, the same convention the English
/// letter-fallback uses, so tails from both routes compare on equal footing.
pub fn to_phonemes(text: &str) -> PhonemeSequence {
    let chars: Vec<char> = text.chars().collect();
    let mut phonemes: Vec<Phoneme> = Vec::new();

    for (i, &c) in chars.iter().enumerate() {
        if c == VOCALIC_R || c == VOCALIC_R_SIGN {
            phonemes.push(Phoneme::consonant("r"));
            phonemes.push(Phoneme::vowel("i"));
            continue;
        }
        if let Some(&sym) = VOWELS.get(&c).or_else(|| VOWEL_SIGNS.get(&c)) {
            phonemes.push(Phoneme::vowel(sym));
            continue;
        }
        if let Some(&sym) = CONSONANTS.get(&c) {
            phonemes.push(Phoneme::consonant(sym));
            // Inherent vowel, unless suppressed by what follows
            match chars.get(i + 1) {
                None => {} // word-final: schwa deletion
                Some(&next) => {
                    let suppressed = next == VIRAMA
                        || next == VOCALIC_R_SIGN
                        || VOWEL_SIGNS.contains_key(&next);
                    if !suppressed {
                        phonemes.push(Phoneme::vowel("ə"));
                    }
                }
            }
            continue;
        }
        // Virama, nasalization marks, unknown code points: skipped
    }

    let stress = phonemes.iter().position(Phoneme::is_vowel);
    PhonemeSequence { phonemes, stress, origin: PhonemeOrigin::Devanagari }
}
