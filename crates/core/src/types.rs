use serde::{Deserialize, Serialize};

/// Version of the cluster schema. Cache entries written under a different
/// version are treated as missing.
pub const SCHEMA_VERSION: u32 = 3;

/// Script classification for a token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Script {
    /// Devanagari code points present (U+0900..U+097F)
    Devanagari,
    /// Romanized Indic (ASCII letters, Hinglish heuristic)
    Hinglish,
    /// Default route
    English,
}

/// A single word as produced by the tokenizer. Immutable afterward.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    /// Original text as it appeared in the lyrics
    pub surface: String,
    /// Zero-based position in tokenization order
    pub index: usize,
    pub script: Script,
    /// Lowercased form used for lookups
    pub normalized: String,
}

/// Whether a phoneme is a syllable nucleus or not.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PhonemeKind {
    Vowel,
    Consonant,
}

/// A phoneme symbol in either the dictionary (ARPABET-style) or the
/// IPA-style alphabet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Phoneme {
    /// Raw symbol, e.g. "AE1" or "aː"
    pub symbol: String,
    pub kind: PhonemeKind,
}

impl Phoneme {
    pub fn vowel(symbol: impl Into<String>) -> Self {
        Self { symbol: symbol.into(), kind: PhonemeKind::Vowel }
    }

    pub fn consonant(symbol: impl Into<String>) -> Self {
        Self { symbol: symbol.into(), kind: PhonemeKind::Consonant }
    }

    pub fn is_vowel(&self) -> bool {
        self.kind == PhonemeKind::Vowel
    }
}

/// Where a pronunciation came from. Letter-rule output is low-confidence
/// and eligible for oracle rescue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PhonemeOrigin {
    /// Pronunciation dictionary hit (ARPABET alphabet)
    Dictionary,
    /// Rule-based letter fallback (ARPABET alphabet, no stress digits)
    LetterRules,
    /// Devanagari grapheme mapping (IPA alphabet)
    Devanagari,
    /// External oracle guess (IPA alphabet)
    Oracle,
}

/// An ordered phoneme sequence with optional primary-stress position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhonemeSequence {
    pub phonemes: Vec<Phoneme>,
    /// Index of the primary-stressed phoneme, if known
    pub stress: Option<usize>,
    pub origin: PhonemeOrigin,
}

impl PhonemeSequence {
    pub fn is_empty(&self) -> bool {
        self.phonemes.is_empty()
    }
}

/// A symbol in the fixed coarse comparison alphabet: five vowel classes
/// (A, E, I, O, U) plus ARPABET-style consonant classes. Stress survives
/// as a parallel flag, never as part of the symbol.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnifiedPhoneme {
    pub symbol: String,
    pub kind: PhonemeKind,
    /// True when the source phoneme carried primary stress
    pub stressed: bool,
}

impl UnifiedPhoneme {
    pub fn is_vowel(&self) -> bool {
        self.kind == PhonemeKind::Vowel
    }
}

/// A word's coerced representation in the coarse alphabet.
pub type UnifiedSequence = Vec<UnifiedPhoneme>;

/// One word's membership in a rhyme class. `spans` are char indices into
/// `surface`; a single span covering the whole surface means a word-level
/// rhyme, narrower spans come from multisyllable windows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WordClusterEntry {
    pub word_index: usize,
    pub surface: String,
    pub class_id: u64,
    pub spans: Vec<(usize, usize)>,
}

/// A rhyme class and its members, ordered by `word_index`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cluster {
    pub class_id: u64,
    pub members: Vec<WordClusterEntry>,
}

impl Cluster {
    /// Smallest member word index; orders clusters in the output.
    pub fn first_word_index(&self) -> usize {
        self.members.first().map(|m| m.word_index).unwrap_or(usize::MAX)
    }
}

/// Feature switches for one analysis call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisFlags {
    /// Syllable n-gram window detection
    pub multisyllable: bool,
    /// Script routing for Devanagari / Hinglish tokens
    pub multilingual: bool,
    /// Consult and populate the result cache
    pub cache: bool,
    /// Rescue low-confidence tokens through the oracle
    pub oracle: bool,
}

impl AnalysisFlags {
    /// Canonical encoding for cache keys. Only flags that change the
    /// computed clusters participate; `cache` itself does not.
    pub fn canonical(&self) -> String {
        format!(
            "ml={};ms={};or={}",
            self.multilingual as u8, self.multisyllable as u8, self.oracle as u8
        )
    }
}

/// Output of one analysis call. Field order is the canonical serialization
/// order, so clients can content-hash the JSON encoding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub tokens: Vec<Token>,
    pub clusters: Vec<Cluster>,
    /// True when a collaborator (dictionary, oracle, cache) failed and the
    /// result was computed without it
    pub degraded: bool,
}

impl AnalysisResult {
    pub fn empty() -> Self {
        Self { tokens: vec![], clusters: vec![], degraded: false }
    }
}

/// Persisted cache blob.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheEntry {
    pub key_hash: String,
    pub feature_flags: String,
    pub clusters: Vec<Cluster>,
    pub version: u32,
}
