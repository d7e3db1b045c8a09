//! Romanized Hinglish to Devanagari transliteration.
//!
//! A closed lexicon of common Hinglish words is tried first; everything else
//! goes through a longest-match-first multigraph rewriter. The output is not
//! claimed to be linguistically correct, only stable and roughly phonetic;
//! downstream rhyme comparison is coarse enough to absorb the noise.

use std::collections::HashMap;

use lazy_static::lazy_static;

/// A rewriter unit: either a consonant or a vowel with its two Devanagari
/// forms (word-initial/post-vowel independent letter vs post-consonant sign).
enum Unit {
    Consonant(&'static str),
    Vowel { independent: &'static str, sign: &'static str },
}

lazy_static! {
    /// Common Hinglish words with known Devanagari forms.
    static ref LEXICON: HashMap<&'static str, &'static str> = {
        [
            ("bhai", "भाई"), ("yaar", "यार"), ("tera", "तेरा"), ("mera", "मेरा"),
            ("kya", "क्या"), ("hai", "है"), ("hoon", "हूं"), ("nahi", "नहीं"),
            ("koi", "कोई"), ("dil", "दिल"), ("pyar", "प्यार"), ("jaan", "जान"),
            ("aaj", "आज"), ("kal", "कल"), ("raat", "रात"), ("din", "दिन"),
            ("kala", "काला"), ("galla", "गल्ला"), ("bakchod", "बकचोद"),
            ("dhadkan", "धड़कन"), ("gaadi", "गाड़ी"), ("paisa", "पैसा"),
            ("chora", "छोरा"), ("kaam", "काम"), ("naam", "नाम"), ("shaam", "शाम"),
            ("jaga", "जगह"), ("sach", "सच"), ("jhoot", "झूठ"), ("dost", "दोस्त"),
            // English loanwords common in Desi hip-hop
            ("flow", "फ्लो"), ("game", "गेम"), ("boss", "बॉस"),
        ]
        .into_iter()
        .collect()
    };

    /// Multigraph rewrite rules, longest keys first.
    static ref RULES: Vec<(&'static str, Unit)> = vec![
        ("chh", Unit::Consonant("छ")),
        ("ksh", Unit::Consonant("क्ष")),
        ("kh", Unit::Consonant("ख")),
        ("gh", Unit::Consonant("घ")),
        ("ch", Unit::Consonant("च")),
        ("jh", Unit::Consonant("झ")),
        ("th", Unit::Consonant("थ")),
        ("dh", Unit::Consonant("ध")),
        ("ph", Unit::Consonant("फ")),
        ("bh", Unit::Consonant("भ")),
        ("sh", Unit::Consonant("श")),
        ("ng", Unit::Consonant("ङ")),
        ("aa", Unit::Vowel { independent: "आ", sign: "ा" }),
        ("ee", Unit::Vowel { independent: "ई", sign: "ी" }),
        ("ii", Unit::Vowel { independent: "ई", sign: "ी" }),
        ("oo", Unit::Vowel { independent: "ऊ", sign: "ू" }),
        ("uu", Unit::Vowel { independent: "ऊ", sign: "ू" }),
        ("ai", Unit::Vowel { independent: "ऐ", sign: "ै" }),
        ("au", Unit::Vowel { independent: "औ", sign: "ौ" }),
        ("k", Unit::Consonant("क")),
        ("g", Unit::Consonant("ग")),
        ("c", Unit::Consonant("च")),
        ("j", Unit::Consonant("ज")),
        ("z", Unit::Consonant("ज")),
        ("t", Unit::Consonant("त")),
        ("d", Unit::Consonant("द")),
        ("n", Unit::Consonant("न")),
        ("p", Unit::Consonant("प")),
        ("f", Unit::Consonant("फ")),
        ("b", Unit::Consonant("ब")),
        ("m", Unit::Consonant("म")),
        ("y", Unit::Consonant("य")),
        ("r", Unit::Consonant("र")),
        ("l", Unit::Consonant("ल")),
        ("v", Unit::Consonant("व")),
        ("w", Unit::Consonant("व")),
        ("s", Unit::Consonant("स")),
        ("h", Unit::Consonant("ह")),
        ("q", Unit::Consonant("क")),
        // Inherent vowel: silent after a consonant
        ("a", Unit::Vowel { independent: "अ", sign: "" }),
        ("e", Unit::Vowel { independent: "ए", sign: "े" }),
        ("i", Unit::Vowel { independent: "इ", sign: "ि" }),
        ("o", Unit::Vowel { independent: "ओ", sign: "ो" }),
        ("u", Unit::Vowel { independent: "उ", sign: "ु" }),
    ];
}

/// True if the lowercase word is in the curated Hinglish lexicon.
pub fn in_lexicon(lower: &str) -> bool {
    LEXICON.contains_key(lower)
}

/// Transliterate a romanized Hinglish word (lowercase ASCII) to Devanagari.
///
/// Lexicon lookup first, then the multigraph rewriter. Letters with no rule
/// are dropped.
pub fn transliterate(lower: &str) -> String {
    if let Some(form) = LEXICON.get(lower) {
        return (*form).to_string();
    }

    let mut out = String::new();
    let mut after_consonant = false;
    let mut rest = lower;

    while !rest.is_empty() {
        match RULES.iter().find(|(key, _)| rest.starts_with(key)) {
            Some((key, Unit::Consonant(dev))) => {
                out.push_str(dev);
                after_consonant = true;
                rest = &rest[key.len()..];
            }
            Some((key, Unit::Vowel { independent, sign })) => {
                out.push_str(if after_consonant { sign } else { independent });
                after_consonant = false;
                rest = &rest[key.len()..];
            }
            None => {
                // Unknown letter: drop it
                let skip = rest.chars().next().map(char::len_utf8).unwrap_or(1);
                after_consonant = false;
                rest = &rest[skip..];
            }
        }
    }

    out
}
