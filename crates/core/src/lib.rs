//! rhymescope-core — pronunciation-based rhyme detection for song lyrics.
//!
//! Converts heterogeneous text (English, Devanagari Hindi, romanized
//! Hinglish, slang) into a uniform phoneme space, extracts comparable
//! rhyme tails, and clusters tokens stably across repeated analyses so a
//! renderer can color-highlight rhyming groups.
//!
//! The pipeline is purely functional over its inputs: with a fixed
//! dictionary and oracle snapshot, the same `(lyrics, flags)` produce
//! byte-identical output. Callers may analyze from multiple threads in
//! parallel; nothing per-call is shared.
//!
//! ```
//! use rhymescope_core::{analyze, AnalysisFlags};
//!
//! let result = analyze("cat hat bat", &AnalysisFlags::default());
//! assert_eq!(result.clusters.len(), 1);
//! assert_eq!(result.clusters[0].members.len(), 3);
//! ```

pub mod cache;
pub mod language;
pub mod oracle;
pub mod pipeline;
pub mod rhyme;
pub mod tokenize;
pub mod types;

pub use cache::{CacheStore, FsCacheStore};
pub use language::english::{CmuDictionary, Dictionary, EmbeddedDictionary, NullDictionary};
pub use oracle::{ClassSummary, Oracle, OracleClass};
pub use pipeline::{analyze, Analyzer};
pub use types::{
    AnalysisFlags, AnalysisResult, Cluster, Script, Token, WordClusterEntry, SCHEMA_VERSION,
};
