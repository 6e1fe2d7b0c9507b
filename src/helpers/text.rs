//! Text helpers for tags and reading time

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref WHITESPACE_RUN: Regex = Regex::new(r"\s+").unwrap();
}

/// Words read per minute when estimating reading time
pub const WORDS_PER_MINUTE: usize = 200;

/// Canonical form of a tag for matching and URLs: lowercase, with every
/// whitespace run replaced by a single `-`
///
/// # Examples
/// ```ignore
/// normalize_tag("Machine  Learning") // -> "machine-learning"
/// ```
pub fn normalize_tag(tag: &str) -> String {
    WHITESPACE_RUN.replace_all(tag, "-").to_lowercase()
}

/// Turn a hyphenated slug into words. Strings that already contain a
/// space are returned as-is.
pub fn humanize(s: &str) -> String {
    if s.contains(' ') {
        return s.to_string();
    }
    s.replace('-', " ")
}

/// Estimated reading time in minutes
pub fn reading_time(text: &str) -> usize {
    // Splitting an empty string still yields one (empty) word
    let words = text.split_whitespace().count().max(1);
    words.div_ceil(WORDS_PER_MINUTE)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_tag() {
        assert_eq!(normalize_tag("AI"), "ai");
        assert_eq!(normalize_tag("a i"), "a-i");
        assert_eq!(normalize_tag("A \t I"), "a-i");
        assert_eq!(normalize_tag("a-i"), "a-i");
        assert_eq!(normalize_tag("snake_case"), "snake_case");
    }

    #[test]
    fn test_humanize() {
        assert_eq!(humanize("machine-learning"), "machine learning");
        assert_eq!(humanize("already spaced-out"), "already spaced-out");
        assert_eq!(humanize("러스트"), "러스트");
    }

    #[test]
    fn test_reading_time() {
        assert_eq!(reading_time(""), 1);
        assert_eq!(reading_time(&"word ".repeat(200)), 1);
        assert_eq!(reading_time(&"word ".repeat(201)), 2);
    }
}
