// src/domain/matching/similarity.rs

/// Case-insensitive, length-normalized Levenshtein similarity in [0, 1].
///
/// Two empty titles are identical (1.0); one empty title matches nothing (0.0).
/// Lengths are counted in chars, not bytes.
pub fn title_similarity(a: &str, b: &str) -> f64 {
    let a = a.to_lowercase();
    let b = b.to_lowercase();

    match (a.is_empty(), b.is_empty()) {
        (true, true) => 1.0,
        (true, false) | (false, true) => 0.0,
        (false, false) => strsim::normalized_levenshtein(&a, &b),
    }
}
