//! Lyrics tokenization.
//!
//! Splits on whitespace and punctuation, preserving each token's original
//! surface and assigning zero-based word indices left to right. Word-internal
//! apostrophes stay in the surface ("don't" is one token) and are dropped
//! from the normalized form.

use crate::language::script;
use crate::types::{Script, Token};

/// True for characters that belong inside a token.
///
/// Devanagari vowel signs and the virama are combining marks, not
/// alphanumerics, so the code-range check keeps conjuncts intact.
fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || script::in_devanagari_range(c) || c == '\''
}

/// Split lyrics into tokens.
///
/// When `multilingual` is false every token is routed as English; otherwise
/// each token's script is classified up front.
pub fn tokenize(lyrics: &str, multilingual: bool) -> Vec<Token> {
    let mut tokens = Vec::new();

    for raw in lyrics.split(|c: char| !is_word_char(c)) {
        let surface = raw.trim_matches('\'');
        if surface.is_empty() {
            continue;
        }

        let normalized: String = surface
            .chars()
            .filter(|&c| c != '\'')
            .collect::<String>()
            .to_lowercase();
        if normalized.is_empty() {
            continue;
        }

        let script = if multilingual {
            script::detect(surface)
        } else {
            Script::English
        };

        tokens.push(Token {
            surface: surface.to_string(),
            index: tokens.len(),
            script,
            normalized,
        });
    }

    tokens
}

#[cfg(test)]
mod tests {
    use super::*;

    fn surfaces(lyrics: &str) -> Vec<String> {
        tokenize(lyrics, false).into_iter().map(|t| t.surface).collect()
    }

    #[test]
    fn test_split_on_whitespace() {
        assert_eq!(surfaces("cat hat bat"), vec!["cat", "hat", "bat"]);
    }

    #[test]
    fn test_split_on_punctuation_and_newlines() {
        assert_eq!(
            surfaces("cat, hat!\nbat? (dog)"),
            vec!["cat", "hat", "bat", "dog"]
        );
    }

    #[test]
    fn test_indices_are_sequential() {
        let tokens = tokenize("one two three", false);
        let indices: Vec<usize> = tokens.iter().map(|t| t.index).collect();
        assert_eq!(indices, vec![0, 1, 2]);
    }

    #[test]
    fn test_case_preserved_in_surface_lowered_in_normalized() {
        let tokens = tokenize("Mary Mack", false);
        assert_eq!(tokens[0].surface, "Mary");
        assert_eq!(tokens[0].normalized, "mary");
    }

    #[test]
    fn test_internal_apostrophe_kept_in_surface() {
        let tokens = tokenize("don't stop", false);
        assert_eq!(tokens[0].surface, "don't");
        assert_eq!(tokens[0].normalized, "dont");
    }

    #[test]
    fn test_leading_apostrophe_trimmed() {
        let tokens = tokenize("'cause", false);
        assert_eq!(tokens[0].surface, "cause");
    }

    #[test]
    fn test_empty_input() {
        assert!(tokenize("", false).is_empty());
        assert!(tokenize("  \n\t ...!!", false).is_empty());
    }

    #[test]
    fn test_devanagari_matras_stay_attached() {
        let tokens = tokenize("काला गला", true);
        assert_eq!(tokens.len(), 2);
        assert_eq!(tokens[0].surface, "काला");
        assert_eq!(tokens[0].script, Script::Devanagari);
    }

    #[test]
    fn test_multilingual_off_routes_everything_english() {
        let tokens = tokenize("काला tera cat", false);
        assert!(tokens.iter().all(|t| t.script == Script::English));
    }

    #[test]
    fn test_multilingual_on_routes_hinglish() {
        let tokens = tokenize("tera mera cat", true);
        assert_eq!(tokens[0].script, Script::Hinglish);
        assert_eq!(tokens[1].script, Script::Hinglish);
        assert_eq!(tokens[2].script, Script::English);
    }
}
