//! Basic rhyme clustering: stable class IDs from hashed tails.
//!
//! Class IDs are a pure function of tail content (never of encounter order),
//! so repeated analyses agree bit for bit. Tokens whose unified sequence has
//! no vowel get the distinguished class 0 and are suppressed, as are
//! singleton classes and blacklisted function words.

use std::collections::BTreeMap;

use sha2::{Digest, Sha256};

use crate::rhyme::tail;
use crate::types::{Cluster, Token, UnifiedPhoneme, WordClusterEntry};

/// Common words that should never be highlighted as rhymes.
const BLACKLIST: &[&str] = &["a", "the", "can", "an", "of", "to", "in", "is", "it"];

/// Distinguished class for vowel-less or empty sequences.
pub const EMPTY_CLASS: u64 = 0;

pub fn is_blacklisted(normalized: &str) -> bool {
    BLACKLIST.contains(&normalized)
}

/// Stable 64-bit id from a domain tag and a payload string.
///
/// First 8 bytes of SHA-256, big-endian. The domain tag keeps tail hashes
/// and window hashes from colliding on equal symbol strings.
pub fn stable_hash(domain: &str, payload: &str) -> u64 {
    let mut hasher = Sha256::new();
    hasher.update(domain.as_bytes());
    hasher.update([0u8]);
    hasher.update(payload.as_bytes());
    let digest = hasher.finalize();
    u64::from_be_bytes(digest[..8].try_into().expect("digest is 32 bytes"))
}

/// Join unified symbols for hashing.
pub fn join_symbols(seq: &[UnifiedPhoneme]) -> String {
    seq.iter().map(|p| p.symbol.as_str()).collect::<Vec<_>>().join("-")
}

/// Class id for a full unified sequence: hash of its rhyme tail, or
/// `EMPTY_CLASS` when the sequence contains no vowel.
pub fn class_for(unified: &[UnifiedPhoneme]) -> u64 {
    if !unified.iter().any(UnifiedPhoneme::is_vowel) {
        return EMPTY_CLASS;
    }
    stable_hash("tail", &join_symbols(tail::extract(unified)))
}

/// Turn class groups into output clusters.
///
/// Suppresses the empty class and singletons; members carry a single span
/// covering the whole surface. Clusters come out ordered by their smallest
/// member index (class id as tiebreak), members by word index.
pub fn finalize(groups: &BTreeMap<u64, Vec<usize>>, tokens: &[Token]) -> Vec<Cluster> {
    let mut clusters: Vec<Cluster> = Vec::new();

    for (&class_id, token_indices) in groups {
        if class_id == EMPTY_CLASS || token_indices.len() < 2 {
            continue;
        }

        let mut members: Vec<WordClusterEntry> = token_indices
            .iter()
            .map(|&i| {
                let token = &tokens[i];
                WordClusterEntry {
                    word_index: token.index,
                    surface: token.surface.clone(),
                    class_id,
                    spans: vec![(0, token.surface.chars().count())],
                }
            })
            .collect();
        members.sort_by_key(|m| m.word_index);
        clusters.push(Cluster { class_id, members });
    }

    sort_clusters(&mut clusters);
    clusters
}

/// Global output ordering: ascending smallest member index, then class id.
pub fn sort_clusters(clusters: &mut [Cluster]) {
    clusters.sort_by_key(|c| (c.first_word_index(), c.class_id));
}
