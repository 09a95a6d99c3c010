//! Token-level helpers shared by the hashing embedder and the lexical scorer.

use std::collections::HashSet;

const STOPWORDS: &[&str] = &[
    "the", "a", "an", "and", "or", "of", "to", "in", "on", "for", "with", "by", "is", "are", "be",
    "it", "its", "this", "that", "as", "at", "from", "your", "you", "so", "but", "not", "their",
    "they", "we", "our", "can", "will", "into", "about", "more", "than", "then",
];

/// Lowercase alphanumeric terms of two or more chars, stopwords removed and a
/// trailing plural `s` stripped from longer words.
pub fn tokenize(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter_map(|raw| {
            let word = raw.to_lowercase();
            let len = word.chars().count();
            if len < 2 || STOPWORDS.contains(&word.as_str()) {
                return None;
            }
            if len > 4 && word.ends_with('s') && !word.ends_with("ss") {
                return Some(word[..word.len() - 1].to_string());
            }
            Some(word)
        })
        .collect()
}

pub fn token_set(text: &str) -> HashSet<String> {
    tokenize(text).into_iter().collect()
}

/// |A ∩ B| / |A ∪ B|, zero when both are empty.
pub fn jaccard(a: &HashSet<String>, b: &HashSet<String>) -> f32 {
    let union = a.union(b).count();
    if union == 0 {
        return 0.0;
    }
    a.intersection(b).count() as f32 / union as f32
}

/// Share of `reference` tokens that also appear in `query`.
pub fn coverage(reference: &HashSet<String>, query: &HashSet<String>) -> f32 {
    if reference.is_empty() {
        return 0.0;
    }
    reference.intersection(query).count() as f32 / reference.len() as f32
}
