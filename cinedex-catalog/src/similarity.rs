//! Fuzzy similarity scoring for ranking candidate matches
//!
//! Scores live in 0.0..=1.0 with lower = better, derived from normalized
//! Levenshtein distance. Comparison is case-insensitive.

/// Worst-case score, returned when there is no query to match against
pub const WORST_SCORE: f64 = 1.0;

/// Default acceptance threshold: accept every candidate
pub const DEFAULT_THRESHOLD: f64 = 1.0;

/// Score a query against a candidate set with the default threshold
pub fn rate<S: AsRef<str>>(set: &[S], query: Option<&str>) -> f64 {
    rate_with_threshold(set, query, DEFAULT_THRESHOLD)
}

/// Score a query against a candidate set
///
/// Returns the best (lowest) score among candidates at or under the
/// threshold. An empty or missing query scores [`WORST_SCORE`]. When no
/// candidate qualifies (the empty set included) the result is `f64::NAN`,
/// the no-match sentinel.
pub fn rate_with_threshold<S: AsRef<str>>(set: &[S], query: Option<&str>, threshold: f64) -> f64 {
    let Some(query) = query.filter(|q| !q.is_empty()) else {
        return WORST_SCORE;
    };
    let query = query.to_lowercase();

    set.iter()
        .map(|candidate| score_pair(&query, &candidate.as_ref().to_lowercase()))
        .filter(|score| *score <= threshold)
        .fold(f64::NAN, f64::min)
}

fn score_pair(a: &str, b: &str) -> f64 {
    1.0 - strsim::normalized_levenshtein(a, b)
}
