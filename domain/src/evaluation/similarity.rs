//! Bag-of-words cosine similarity.

use std::collections::HashMap;

/// Cosine similarity of the term-frequency vectors of `a` and `b`.
///
/// Terms are lowercase alphanumeric runs. Returns `0.0` when either side has
/// no terms and `1.0` for texts with identical term counts.
pub fn cosine_similarity(a: &str, b: &str) -> f64 {
    let left = term_frequencies(a);
    let right = term_frequencies(b);
    if left.is_empty() || right.is_empty() {
        return 0.0;
    }

    let dot: f64 = left
        .iter()
        .filter_map(|(term, &count)| right.get(term).map(|&other| f64::from(count * other)))
        .sum();
    let norm = |tf: &HashMap<String, u32>| {
        tf.values()
            .map(|&c| f64::from(c) * f64::from(c))
            .sum::<f64>()
            .sqrt()
    };

    (dot / (norm(&left) * norm(&right))).clamp(0.0, 1.0)
}

fn term_frequencies(text: &str) -> HashMap<String, u32> {
    let mut tf = HashMap::new();
    for term in text
        .split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
    {
        *tf.entry(term.to_lowercase()).or_insert(0) += 1;
    }
    tf
}
