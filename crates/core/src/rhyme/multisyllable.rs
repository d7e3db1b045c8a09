//! Multisyllable and internal rhyme detection.
//!
//! Slides 2- and 3-syllable windows across the whole lyrics' syllable
//! stream (crossing word boundaries) and groups windows by the hash of
//! their rime symbols. Onsets are dropped before hashing so "Mary Mack"
//! and "scary black" land in one class. Windows seen at two or more stream
//! positions become classes, emitted in addition to the basic clusters
//! with char spans narrowed to the syllables the window touches.

use std::collections::{BTreeMap, HashMap};

use crate::rhyme::cluster::stable_hash;
use crate::rhyme::syllable::Syllable;
use crate::types::{Cluster, Token, WordClusterEntry};

/// Window sizes in syllables.
const WINDOW_SIZES: &[usize] = &[2, 3];

/// The rime-based hash payload for one window.
fn window_payload(window: &[(usize, &Syllable)]) -> String {
    window
        .iter()
        .map(|(_, syl)| {
            syl.rime()
                .iter()
                .map(|p| p.symbol.as_str())
                .collect::<Vec<_>>()
                .join("-")
        })
        .collect::<Vec<_>>()
        .join("|")
}

/// Find multisyllable rhyme classes over per-word syllabifications.
///
/// `syllabified` pairs each token index (position in `tokens`) with its
/// syllables, in token order.
pub fn find_clusters(tokens: &[Token], syllabified: &[(usize, Vec<Syllable>)]) -> Vec<Cluster> {
    // Flatten into one stream crossing word boundaries
    let stream: Vec<(usize, &Syllable)> = syllabified
        .iter()
        .flat_map(|(token_idx, syls)| syls.iter().map(move |s| (*token_idx, s)))
        .collect();

    // hash -> occurrences; each occurrence maps token index -> covered span
    let mut groups: HashMap<u64, Vec<BTreeMap<usize, (usize, usize)>>> = HashMap::new();

    for &size in WINDOW_SIZES {
        if stream.len() < size {
            continue;
        }
        for window in stream.windows(size) {
            let class_id = stable_hash("window", &window_payload(window));

            let mut covered: BTreeMap<usize, (usize, usize)> = BTreeMap::new();
            for (token_idx, syl) in window {
                covered
                    .entry(*token_idx)
                    .and_modify(|span| {
                        span.0 = span.0.min(syl.char_start);
                        span.1 = span.1.max(syl.char_end);
                    })
                    .or_insert((syl.char_start, syl.char_end));
            }
            groups.entry(class_id).or_default().push(covered);
        }
    }

    let mut clusters: Vec<Cluster> = Vec::new();
    let mut class_ids: Vec<u64> = groups.keys().copied().collect();
    class_ids.sort_unstable();

    for class_id in class_ids {
        let occurrences = &groups[&class_id];
        if occurrences.len() < 2 {
            continue;
        }

        // Merge occurrences into one entry per word, collecting distinct spans
        let mut spans_by_word: BTreeMap<usize, Vec<(usize, usize)>> = BTreeMap::new();
        for occurrence in occurrences {
            for (&token_idx, &span) in occurrence {
                let spans = spans_by_word.entry(token_idx).or_default();
                if !spans.contains(&span) {
                    spans.push(span);
                }
            }
        }

        let members: Vec<WordClusterEntry> = spans_by_word
            .into_iter()
            .map(|(token_idx, mut spans)| {
                spans.sort_unstable();
                let token = &tokens[token_idx];
                WordClusterEntry {
                    word_index: token.index,
                    surface: token.surface.clone(),
                    class_id,
                    spans,
                }
            })
            .collect();

        clusters.push(Cluster { class_id, members });
    }

    clusters
}
