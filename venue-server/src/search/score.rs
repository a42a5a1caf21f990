//! Fuzzy match scoring
//!
//! Token-level matching over lowercased alphanumeric words. A query token
//! hits a field token either exactly (score 2.0) or at edit distance 1 when
//! the two share their first two characters (score 1.0). The prefix guard
//! keeps one-edit noise like "cat"/"bat" from matching.

use strsim::levenshtein;

pub const EXACT_SCORE: f64 = 2.0;
pub const FUZZY_SCORE: f64 = 1.0;

const FUZZY_PREFIX_LEN: usize = 2;
const FUZZY_MAX_EDITS: usize = 1;

/// Split into lowercased alphanumeric tokens
pub fn tokenize(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(|t| t.to_string())
        .collect()
}

/// Score one query token against one field token
fn token_score(query: &str, field: &str) -> Option<f64> {
    if query == field {
        return Some(EXACT_SCORE);
    }
    if query.chars().count() < FUZZY_PREFIX_LEN || field.chars().count() < FUZZY_PREFIX_LEN {
        return None;
    }
    let query_prefix: String = query.chars().take(FUZZY_PREFIX_LEN).collect();
    let field_prefix: String = field.chars().take(FUZZY_PREFIX_LEN).collect();
    if query_prefix != field_prefix {
        return None;
    }
    if levenshtein(query, field) <= FUZZY_MAX_EDITS {
        return Some(FUZZY_SCORE);
    }
    None
}

/// Score pre-tokenized query terms against a text field. Each query token
/// contributes its best hit; tokens with no hit contribute nothing. Returns
/// `None` when nothing matched at all.
pub fn score_text(query_tokens: &[String], text: &str) -> Option<f64> {
    let field_tokens = tokenize(text);
    let mut total = 0.0;
    let mut matched = false;

    for query in query_tokens {
        let best = field_tokens
            .iter()
            .filter_map(|field| token_score(query, field))
            .fold(None, |acc: Option<f64>, s| {
                Some(acc.map_or(s, |a| a.max(s)))
            });
        if let Some(score) = best {
            total += score;
            matched = true;
        }
    }

    matched.then_some(total)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokenize_lowercases_and_splits_punctuation() {
        assert_eq!(tokenize("La Vida-Loca!"), vec!["la", "vida", "loca"]);
    }

    #[test]
    fn exact_token_outscores_fuzzy() {
        let q = tokenize("vida");
        let exact = score_text(&q, "La Vida Loca").expect("exact");
        let fuzzy = score_text(&q, "La Vidas Loca").expect("fuzzy");
        assert_eq!(exact, EXACT_SCORE);
        assert_eq!(fuzzy, FUZZY_SCORE);
    }

    #[test]
    fn one_edit_typo_matches() {
        let q = tokenize("bohemain");
        assert!(score_text(&q, "Bohemian Rhapsody").is_some());
    }

    #[test]
    fn different_prefix_never_fuzzy_matches() {
        // "cat" and "bat" are one edit apart but share no 2-char prefix
        let q = tokenize("cat");
        assert!(score_text(&q, "bat").is_none());
    }

    #[test]
    fn two_edits_do_not_match() {
        let q = tokenize("bohxxian");
        assert!(score_text(&q, "bohemian").is_none());
    }

    #[test]
    fn multi_token_query_sums_per_token() {
        let q = tokenize("vida loca");
        let score = score_text(&q, "La Vida Loca").expect("both");
        assert_eq!(score, 2.0 * EXACT_SCORE);
    }

    #[test]
    fn no_hits_is_none() {
        let q = tokenize("zzz");
        assert!(score_text(&q, "La Vida Loca").is_none());
    }
}
