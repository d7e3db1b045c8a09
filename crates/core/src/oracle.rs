//! External oracle for rescuing low-confidence tokens.
//!
//! The oracle is an opaque classifier (in practice a large-model API). The
//! core only sees the two methods below, both deadline-bounded. Augmentation
//! is all-or-nothing: any failure skips it entirely so a result is never a
//! partial mix of oracle and non-oracle decisions.

use std::collections::BTreeMap;
use std::time::Duration;

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::language::unified;
use crate::types::{Phoneme, PhonemeOrigin, PhonemeSequence};

/// What the oracle sees of an existing rhyme class.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassSummary {
    pub class_id: u64,
    /// Sample member surfaces
    pub members: Vec<String>,
}

/// Oracle verdict for one unknown word.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OracleClass {
    /// Merge into an existing class
    Existing(u64),
    /// No match; ask for a phoneme guess instead
    New,
}

/// The injected oracle interface.
pub trait Oracle: Send + Sync {
    /// Assign unknown words to existing classes where they fit.
    fn classify(
        &self,
        unknown: &[String],
        classes: &[ClassSummary],
        deadline: Duration,
    ) -> Result<BTreeMap<String, OracleClass>>;

    /// IPA-style phoneme guess for a word the classifier could not place.
    fn guess_phonemes(&self, word: &str, deadline: Duration) -> Result<Vec<String>>;
}

/// Deterministic record of one consultation, cached under the oracle key so
/// reruns replay decisions instead of re-querying.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OracleOutcome {
    /// word -> existing class id
    pub assignments: BTreeMap<String, u64>,
    /// word -> IPA phoneme guess
    pub guesses: BTreeMap<String, Vec<String>>,
}

impl OracleOutcome {
    pub fn is_empty(&self) -> bool {
        self.assignments.is_empty() && self.guesses.is_empty()
    }
}

/// Run one full consultation for a set of unknown words.
///
/// Classification first; words the oracle calls `New` (or omits) get a
/// phoneme guess. The first error aborts the whole consultation.
pub fn consult(
    oracle: &dyn Oracle,
    deadline: Duration,
    unknown: &[String],
    classes: &[ClassSummary],
) -> Result<OracleOutcome> {
    let mut outcome = OracleOutcome::default();
    if unknown.is_empty() {
        return Ok(outcome);
    }

    let verdicts = oracle.classify(unknown, classes, deadline)?;

    for word in unknown {
        match verdicts.get(word) {
            Some(OracleClass::Existing(class_id)) => {
                outcome.assignments.insert(word.clone(), *class_id);
            }
            Some(OracleClass::New) | None => {
                let guess = oracle.guess_phonemes(word, deadline)?;
                if !guess.is_empty() {
                    outcome.guesses.insert(word.clone(), guess);
                }
            }
        }
    }

    Ok(outcome)
}

/// Turn an IPA guess into a phoneme sequence that re-enters the pipeline.
/// First-vowel stress, like the other non-dictionary routes.
pub fn guess_to_sequence(symbols: &[String]) -> PhonemeSequence {
    let phonemes: Vec<Phoneme> = symbols
        .iter()
        .map(|s| {
            if unified::ipa_is_vowel(s) {
                Phoneme::vowel(s.clone())
            } else {
                Phoneme::consonant(s.clone())
            }
        })
        .collect();
    let stress = phonemes.iter().position(Phoneme::is_vowel);
    PhonemeSequence { phonemes, stress, origin: PhonemeOrigin::Oracle }
}
