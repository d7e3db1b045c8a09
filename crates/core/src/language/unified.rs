//! Coercion of dictionary (ARPABET) and IPA phonemes into the shared
//! coarse alphabet.
//!
//! The coarse alphabet is five vowel classes (A, E, I, O, U) plus
//! ARPABET-style consonant classes. Two symbols collide here iff they are
//! close enough to count as rhyme-equivalent at this resolution, so these
//! tables are the false-positive/false-negative knob and are fixed for a
//! given `SCHEMA_VERSION`. Length, aspiration, and nasalization drop;
//! retroflexes merge with their dental counterparts; the AY/AW/OY
//! diphthongs and ER keep a glide/liquid tail symbol for discrimination.
//! Stress survives as a parallel flag on the vowel, never in the symbol.

use lazy_static::lazy_static;

use crate::language::english::strip_stress;
use crate::types::{PhonemeKind, PhonemeOrigin, PhonemeSequence, UnifiedPhoneme, UnifiedSequence};

lazy_static! {
    /// ARPABET base symbol -> coarse symbols.
    static ref ARPABET_TO_COARSE: Vec<(&'static str, &'static [&'static str])> = vec![
        // Vowels
        ("AA", &["A"][..]), ("AE", &["A"]), ("AH", &["A"]), ("AO", &["A"]),
        ("AW", &["A", "W"]), ("AY", &["A", "Y"]),
        ("EH", &["E"]), ("ER", &["E", "R"]), ("EY", &["E"]),
        ("IH", &["I"]), ("IY", &["I"]),
        ("OW", &["O"]), ("OY", &["O", "Y"]),
        ("UH", &["U"]), ("UW", &["U"]),
        // Consonants map through unchanged (HH included)
        ("B", &["B"]), ("CH", &["CH"]), ("D", &["D"]), ("DH", &["DH"]),
        ("F", &["F"]), ("G", &["G"]), ("HH", &["HH"]), ("JH", &["JH"]),
        ("K", &["K"]), ("L", &["L"]), ("M", &["M"]), ("N", &["N"]),
        ("NG", &["NG"]), ("P", &["P"]), ("R", &["R"]), ("S", &["S"]),
        ("SH", &["SH"]), ("T", &["T"]), ("TH", &["TH"]), ("V", &["V"]),
        ("W", &["W"]), ("Y", &["Y"]), ("Z", &["Z"]), ("ZH", &["ZH"]),
    ];

    /// IPA symbol -> coarse symbols. Multi-char entries first so diphthongs
    /// and affricates win over their leading character.
    static ref IPA_TO_COARSE: Vec<(&'static str, &'static [&'static str])> = vec![
        ("aɪ", &["A", "Y"][..]), ("aʊ", &["A", "W"]), ("eɪ", &["E"]),
        ("oʊ", &["O"]), ("ɔɪ", &["O", "Y"]),
        ("tʃ", &["CH"]), ("dʒ", &["JH"]),
        // Vowels
        ("a", &["A"]), ("ɑ", &["A"]), ("ə", &["A"]), ("æ", &["A"]),
        ("ʌ", &["A"]), ("ɐ", &["A"]),
        ("e", &["E"]), ("ɛ", &["E"]), ("ɜ", &["E"]),
        ("i", &["I"]), ("ɪ", &["I"]),
        ("o", &["O"]), ("ɔ", &["O"]),
        ("u", &["U"]), ("ʊ", &["U"]),
        // Consonants; retroflexes merge with dentals
        ("p", &["P"]), ("b", &["B"]), ("t", &["T"]), ("d", &["D"]),
        ("ʈ", &["T"]), ("ɖ", &["D"]), ("k", &["K"]), ("g", &["G"]),
        ("m", &["M"]), ("n", &["N"]), ("ɳ", &["N"]), ("ɲ", &["N"]),
        ("ŋ", &["NG"]), ("f", &["F"]), ("v", &["V"]), ("ʋ", &["V"]),
        ("θ", &["TH"]), ("ð", &["DH"]), ("s", &["S"]), ("z", &["Z"]),
        ("ʃ", &["SH"]), ("ʒ", &["ZH"]), ("ʂ", &["S"]),
        ("r", &["R"]), ("ɹ", &["R"]), ("ɾ", &["R"]), ("ɽ", &["R"]),
        ("l", &["L"]), ("ɭ", &["L"]), ("j", &["Y"]), ("w", &["W"]),
        ("h", &["HH"]), ("ɦ", &["HH"]),
    ];
}

fn coarse_kind(symbol: &str) -> PhonemeKind {
    match symbol {
        "A" | "E" | "I" | "O" | "U" => PhonemeKind::Vowel,
        _ => PhonemeKind::Consonant,
    }
}

/// Drop length, aspiration, and nasalization diacritics from an IPA symbol.
fn clean_ipa(symbol: &str) -> String {
    symbol
        .chars()
        .filter(|c| !matches!(c, 'ʰ' | 'ː' | 'ˑ' | '\u{0303}'))
        .collect()
}

/// True when an IPA symbol is a vowel. Used to tag oracle phoneme guesses.
pub fn ipa_is_vowel(symbol: &str) -> bool {
    clean_ipa(symbol)
        .chars()
        .next()
        .map(|c| "aeiouɑəæʌɐɛɜɪɔʊ".contains(c))
        .unwrap_or(false)
}

fn coarse_symbols(symbol: &str, origin: PhonemeOrigin) -> &'static [&'static str] {
    match origin {
        PhonemeOrigin::Dictionary | PhonemeOrigin::LetterRules => {
            let base = strip_stress(symbol);
            ARPABET_TO_COARSE
                .iter()
                .find(|(key, _)| *key == base)
                .map(|(_, out)| *out)
                .unwrap_or(&[])
        }
        PhonemeOrigin::Devanagari | PhonemeOrigin::Oracle => {
            let cleaned = clean_ipa(symbol);
            IPA_TO_COARSE
                .iter()
                .find(|(key, _)| cleaned.starts_with(key))
                .map(|(_, out)| *out)
                .unwrap_or(&[])
        }
    }
}

/// Coerce a phoneme sequence into the coarse comparison alphabet.
///
/// The primary-stressed source phoneme marks the first vowel symbol it
/// produces; symbols with no coarse mapping are dropped.
pub fn unify(seq: &PhonemeSequence) -> UnifiedSequence {
    let mut out: UnifiedSequence = Vec::with_capacity(seq.phonemes.len());

    for (i, phoneme) in seq.phonemes.iter().enumerate() {
        let stressed_source = seq.stress == Some(i);
        let mut stress_pending = stressed_source;
        for &symbol in coarse_symbols(&phoneme.symbol, seq.origin) {
            let kind = coarse_kind(symbol);
            let stressed = stress_pending && kind == PhonemeKind::Vowel;
            if stressed {
                stress_pending = false;
            }
            out.push(UnifiedPhoneme { symbol: symbol.to_string(), kind, stressed });
        }
    }

    out
}
