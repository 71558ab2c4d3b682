//! Prefix n-gram builder for the free-text search index
//!
//! Titles are cleaned in two passes, collapsed, lowercased and split into
//! words; the output is the full word list followed by every per-word
//! prefix of length 3 up to the full word. Duplicates are kept.

/// Punctuation surviving the first cleaning pass (besides letters and whitespace)
const KEPT_PUNCTUATION: [char; 5] = ['-', '|', '(', ')', '\''];

/// Punctuation removed by the second cleaning pass
const STRIPPED_PUNCTUATION: [char; 13] = [
    '-', ':', '|', '!', '(', ')', '@', '#', '$', '%', '^', '&', '*',
];

/// Build the prefix n-grams for one title
///
/// Empty or missing input yields an empty vector. The apostrophe is the
/// only punctuation that survives both passes.
pub fn build_ngrams(value: Option<&str>) -> Vec<String> {
    let Some(raw) = value.filter(|v| !v.is_empty()) else {
        return Vec::new();
    };

    let first_pass: String = raw
        .chars()
        .filter(|c| c.is_alphabetic() || c.is_whitespace() || KEPT_PUNCTUATION.contains(c))
        .collect();
    let cleaned: String = first_pass
        .chars()
        .filter(|c| !STRIPPED_PUNCTUATION.contains(c))
        .collect();
    let lowered = cleaned.to_lowercase();

    let words: Vec<&str> = lowered.split_whitespace().collect();
    let mut ngrams: Vec<String> = words.iter().map(|w| w.to_string()).collect();
    for word in &words {
        let chars: Vec<char> = word.chars().collect();
        for len in 3..=chars.len() {
            ngrams.push(chars[..len].iter().collect());
        }
    }
    ngrams
}

/// Search blob for a movie: title and original-title n-grams joined with spaces
pub fn search_blob(title: &str, original_title: Option<&str>) -> String {
    let mut grams = build_ngrams(Some(title));
    grams.extend(build_ngrams(original_title));
    grams.join(" ")
}
