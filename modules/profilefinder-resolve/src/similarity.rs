/// Levenshtein closeness in `[0, 1]`: `1 - distance / max(len(a), len(b))`.
///
/// Two empty strings are identical (1.0); an empty string against a
/// non-empty one scores 0.0.
pub fn similarity(a: &str, b: &str) -> f64 {
    let max_len = a.chars().count().max(b.chars().count());
    if max_len == 0 {
        return 1.0;
    }
    let distance = strsim::levenshtein(a, b);
    1.0 - distance as f64 / max_len as f64
}
