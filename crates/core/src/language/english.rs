//! English pronunciations: injected dictionary plus letter-fallback G2P.
//!
//! Dictionary entries use the CMU Pronouncing Dictionary format (ARPABET
//! with stress digits on vowels). A small seed lexicon is embedded at
//! compile time; callers wanting real coverage inject a full dictionary.
//! Out-of-vocabulary words go through a deterministic rule-based fallback.

use std::collections::HashMap;
use std::path::Path;
use std::sync::OnceLock;

use anyhow::{Context, Result};

use crate::types::{Phoneme, PhonemeKind, PhonemeOrigin, PhonemeSequence};

/// The embedded seed lexicon, CMU format.
const SEED_LEXICON: &str = include_str!("lexicon.txt");

/// Read-only pronunciation source: word -> pronunciations.
pub trait Dictionary: Send + Sync {
    /// All pronunciation variants for a word, or `None` when unknown.
    fn lookup(&self, word: &str) -> Option<Vec<PhonemeSequence>>;
}

/// Strip trailing stress digits from an ARPABET symbol.
pub fn strip_stress(symbol: &str) -> &str {
    symbol.trim_end_matches(|c: char| c.is_ascii_digit())
}

/// True for ARPABET vowel symbols (with or without stress digit).
pub fn is_arpabet_vowel(symbol: &str) -> bool {
    matches!(
        strip_stress(symbol),
        "AA" | "AE" | "AH" | "AO" | "AW" | "AY" | "EH" | "ER" | "EY" | "IH" | "IY" | "OW"
            | "OY" | "UH" | "UW"
    )
}

fn tag(symbol: &str) -> Phoneme {
    let kind = if is_arpabet_vowel(symbol) {
        PhonemeKind::Vowel
    } else {
        PhonemeKind::Consonant
    };
    Phoneme { symbol: symbol.to_string(), kind }
}

/// Build a sequence from raw dictionary symbols. The primary stress index is
/// the last symbol carrying a `1` digit, matching rhyme-tail semantics.
fn dictionary_sequence(symbols: &[String]) -> PhonemeSequence {
    let phonemes: Vec<Phoneme> = symbols.iter().map(|s| tag(s)).collect();
    let stress = symbols.iter().rposition(|s| s.ends_with('1'));
    PhonemeSequence { phonemes, stress, origin: PhonemeOrigin::Dictionary }
}

/// A dictionary parsed from CMU-format text.
pub struct CmuDictionary {
    entries: HashMap<String, Vec<Vec<String>>>,
}

impl CmuDictionary {
    /// Parse CMU-format text: `WORD  PH1 PH2 ...`, variants as `WORD(2)`,
    /// `;;;` comment lines.
    pub fn parse(data: &str) -> Self {
        let mut entries: HashMap<String, Vec<Vec<String>>> = HashMap::new();
        for line in data.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with(";;;") {
                continue;
            }
            let mut parts = line.splitn(2, ' ');
            let (Some(word_raw), Some(rest)) = (parts.next(), parts.next()) else {
                continue;
            };

            // Strip variant marker: WORD(2) -> WORD
            let word = word_raw.split('(').next().unwrap_or(word_raw).to_uppercase();
            let symbols: Vec<String> = rest.split_whitespace().map(str::to_string).collect();
            if !symbols.is_empty() {
                entries.entry(word).or_default().push(symbols);
            }
        }
        Self { entries }
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let data = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read dictionary: {}", path.display()))?;
        Ok(Self::parse(&data))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Dictionary for CmuDictionary {
    fn lookup(&self, word: &str) -> Option<Vec<PhonemeSequence>> {
        self.entries
            .get(&word.to_uppercase())
            .map(|variants| variants.iter().map(|v| dictionary_sequence(v)).collect())
    }
}

/// The compiled-in seed lexicon.
pub struct EmbeddedDictionary;

fn seed() -> &'static CmuDictionary {
    static SEED: OnceLock<CmuDictionary> = OnceLock::new();
    SEED.get_or_init(|| CmuDictionary::parse(SEED_LEXICON))
}

impl Dictionary for EmbeddedDictionary {
    fn lookup(&self, word: &str) -> Option<Vec<PhonemeSequence>> {
        seed().lookup(word)
    }
}

/// Always-miss dictionary: every word goes through the letter fallback.
pub struct NullDictionary;

impl Dictionary for NullDictionary {
    fn lookup(&self, _word: &str) -> Option<Vec<PhonemeSequence>> {
        None
    }
}

/// Collapse letters repeated three or more times ("shawtyyyy" -> "shawty").
fn squeeze_repeats(word: &str) -> String {
    let mut out = String::with_capacity(word.len());
    let mut run_char = '\0';
    let mut run_len = 0usize;
    for c in word.chars() {
        if c == run_char {
            run_len += 1;
        } else {
            run_char = c;
            run_len = 1;
        }
        if run_len < 3 {
            out.push(c);
        } else if run_len == 3 {
            // Drop the whole run down to a single letter
            out.pop();
        }
    }
    out
}

/// Convert a normalized word to phonemes.
///
/// Dictionary first (exact, then with stretched spellings squeezed), letter
/// fallback last. The first pronunciation variant wins on a hit.
pub fn to_phonemes(word: &str, dictionary: &dyn Dictionary) -> PhonemeSequence {
    if let Some(mut variants) = dictionary.lookup(word) {
        if !variants.is_empty() {
            return variants.remove(0);
        }
    }

    let squeezed = squeeze_repeats(word);
    if squeezed != word {
        if let Some(mut variants) = dictionary.lookup(&squeezed) {
            if !variants.is_empty() {
                return variants.remove(0);
            }
        }
    }

    letter_fallback(&squeezed)
}

/// Deterministic rule-based G2P for out-of-vocabulary words.
///
/// Digraphs and vowel teams first, then single letters, with silent final
/// `e` and doubled-consonant normalization. Output symbols carry no stress
/// digits; the first vowel is marked as primary stress.
pub fn letter_fallback(word: &str) -> PhonemeSequence {
    let chars: Vec<char> = word.chars().collect();
    let mut phonemes: Vec<Phoneme> = Vec::new();
    let mut i = 0;

    while i < chars.len() {
        // Doubled consonant: collapse to one
        if i > 0 && chars[i] == chars[i - 1] && !matches!(chars[i], 'a' | 'e' | 'i' | 'o' | 'u') {
            i += 1;
            continue;
        }

        if i + 1 < chars.len() {
            let digraph: String = chars[i..i + 2].iter().collect();
            let mapped: Option<&[&str]> = match digraph.as_str() {
                "th" => Some(&["TH"]),
                "sh" => Some(&["SH"]),
                "ch" => Some(&["CH"]),
                "ng" => Some(&["NG"]),
                "ph" => Some(&["F"]),
                "wh" => Some(&["W"]),
                "ck" => Some(&["K"]),
                "ee" | "ea" => Some(&["IY"]),
                "oo" => Some(&["UW"]),
                "ou" => Some(&["AW"]),
                "ow" => Some(&["OW"]),
                "ai" | "ay" => Some(&["EY"]),
                "oi" | "oy" => Some(&["OY"]),
                "au" | "aw" => Some(&["AO"]),
                _ => None,
            };
            if let Some(symbols) = mapped {
                for s in symbols {
                    phonemes.push(tag(s));
                }
                i += 2;
                continue;
            }
        }

        match chars[i] {
            'a' => phonemes.push(tag("AE")),
            'b' => phonemes.push(tag("B")),
            'c' => {
                // c before e/i/y softens to S
                if matches!(chars.get(i + 1), Some('e') | Some('i') | Some('y')) {
                    phonemes.push(tag("S"));
                } else {
                    phonemes.push(tag("K"));
                }
            }
            'd' => phonemes.push(tag("D")),
            'e' => {
                // Silent final e
                if i + 1 < chars.len() || phonemes.is_empty() {
                    phonemes.push(tag("EH"));
                }
            }
            'f' => phonemes.push(tag("F")),
            'g' => phonemes.push(tag("G")),
            'h' => phonemes.push(tag("HH")),
            'i' => phonemes.push(tag("IH")),
            'j' => phonemes.push(tag("JH")),
            'k' => phonemes.push(tag("K")),
            'l' => phonemes.push(tag("L")),
            'm' => phonemes.push(tag("M")),
            'n' => phonemes.push(tag("N")),
            'o' => phonemes.push(tag("AA")),
            'p' => phonemes.push(tag("P")),
            'q' => phonemes.push(tag("K")),
            'r' => phonemes.push(tag("R")),
            's' => phonemes.push(tag("S")),
            't' => phonemes.push(tag("T")),
            'u' => phonemes.push(tag("AH")),
            'v' => phonemes.push(tag("V")),
            'w' => phonemes.push(tag("W")),
            'x' => {
                phonemes.push(tag("K"));
                phonemes.push(tag("S"));
            }
            'y' => {
                if phonemes.is_empty() {
                    phonemes.push(tag("Y"));
                } else {
                    phonemes.push(tag("IY"));
                }
            }
            'z' => phonemes.push(tag("Z")),
            _ => {} // Non-ASCII letters are dropped
        }
        i += 1;
    }

    let stress = phonemes.iter().position(Phoneme::is_vowel);
    PhonemeSequence { phonemes, stress, origin: PhonemeOrigin::LetterRules }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn symbols(seq: &PhonemeSequence) -> Vec<&str> {
        seq.phonemes.iter().map(|p| p.symbol.as_str()).collect()
    }

    #[test]
    fn test_seed_lookup() {
        let seq = to_phonemes("cat", &EmbeddedDictionary);
        assert_eq!(symbols(&seq), vec!["K", "AE1", "T"]);
        assert_eq!(seq.origin, PhonemeOrigin::Dictionary);
        assert_eq!(seq.stress, Some(1));
    }

    #[test]
    fn test_lookup_case_insensitive() {
        let dict = EmbeddedDictionary;
        assert_eq!(dict.lookup("Mary"), dict.lookup("MARY"));
        assert!(dict.lookup("mary").is_some());
    }

    #[test]
    fn test_first_variant_wins() {
        // PRESENT has two entries; the noun reading comes first
        let seq = to_phonemes("present", &EmbeddedDictionary);
        assert_eq!(symbols(&seq)[0], "P");
        assert_eq!(seq.stress, Some(2)); // EH1
    }

    #[test]
    fn test_stretched_spelling_squeezed_then_looked_up() {
        let seq = to_phonemes("catttt", &EmbeddedDictionary);
        assert_eq!(symbols(&seq), vec!["K", "AE1", "T"]);
        assert_eq!(seq.origin, PhonemeOrigin::Dictionary);
    }

    #[test]
    fn test_squeeze_repeats() {
        assert_eq!(squeeze_repeats("shawtyyyy"), "shawty");
        assert_eq!(squeeze_repeats("yooooo"), "yo");
        // Doubles survive squeezing (handled later by the fallback)
        assert_eq!(squeeze_repeats("skrrt"), "skrrt");
    }

    #[test]
    fn test_fallback_marks_first_vowel_stressed() {
        let seq = letter_fallback("blorg");
        assert_eq!(symbols(&seq), vec!["B", "L", "AA", "R", "G"]);
        assert_eq!(seq.stress, Some(2));
        assert_eq!(seq.origin, PhonemeOrigin::LetterRules);
    }

    #[test]
    fn test_fallback_digraphs() {
        assert_eq!(symbols(&letter_fallback("shong")), vec!["SH", "AA", "NG"]);
        assert_eq!(symbols(&letter_fallback("phat")), vec!["F", "AE", "T"]);
    }

    #[test]
    fn test_fallback_silent_final_e() {
        assert_eq!(symbols(&letter_fallback("bame")), vec!["B", "AE", "M"]);
        // A lone "e" is not silent
        assert_eq!(symbols(&letter_fallback("e")), vec!["EH"]);
    }

    #[test]
    fn test_fallback_doubled_consonants() {
        assert_eq!(symbols(&letter_fallback("skrrt")), vec!["S", "K", "R", "T"]);
        assert_eq!(letter_fallback("skrrt").stress, None);
    }

    #[test]
    fn test_fallback_soft_c() {
        assert_eq!(symbols(&letter_fallback("cip"))[0], "S");
        assert_eq!(symbols(&letter_fallback("cop"))[0], "K");
    }

    #[test]
    fn test_fallback_non_ascii_dropped() {
        assert!(letter_fallback("काला").is_empty());
    }

    #[test]
    fn test_is_arpabet_vowel() {
        assert!(is_arpabet_vowel("AE1"));
        assert!(is_arpabet_vowel("ER"));
        assert!(!is_arpabet_vowel("K"));
        assert!(!is_arpabet_vowel("TH"));
    }

    #[test]
    fn test_parse_skips_comments_and_blanks() {
        let dict = CmuDictionary::parse(";;; header\n\nFOO  F UW1\n");
        assert_eq!(dict.len(), 1);
        assert!(dict.lookup("foo").is_some());
    }

    #[test]
    fn test_from_path_missing_file() {
        assert!(CmuDictionary::from_path(Path::new("/nonexistent/dict.txt")).is_err());
    }
}
