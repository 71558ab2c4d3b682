//! Title slug helper

/// Reduce a title to its ASCII letters, lowercased
pub fn slug_title(title: &str) -> String {
    title
        .chars()
        .filter(char::is_ascii_alphabetic)
        .collect::<String>()
        .to_lowercase()
}
