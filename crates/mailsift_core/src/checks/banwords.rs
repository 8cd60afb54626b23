//! Banned-word checker

use crate::checks::{details_map, extract_local_part};
use crate::loader::{FileLoader, LoadError};
use crate::ValidationResult;
use serde_json::json;
use std::collections::HashSet;
use std::path::Path;
use std::time::Instant;

/// Minimum word length for substring matching; shorter words only match the
/// local part exactly.
const SUBSTRING_MIN_LEN: usize = 3;

/// Flags addresses whose local part is, or contains, a banned word.
pub struct BanWordsCheck {
    words: HashSet<String>,
}

impl BanWordsCheck {
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, LoadError> {
        let words = FileLoader::new().load_from_file(path)?;
        Ok(Self::from_words(words))
    }

    fn from_words(words: Vec<String>) -> Self {
        Self {
            words: words
                .into_iter()
                .map(|word| word.trim().to_lowercase())
                .filter(|word| !word.is_empty())
                .collect(),
        }
    }

    pub fn validate(&self, email: &str) -> ValidationResult {
        let start = Instant::now();

        let local_part = extract_local_part(email);
        let mut found: Vec<String> = Vec::new();

        if self.words.contains(&local_part) {
            found.push(local_part.clone());
        }

        for word in &self.words {
            if word.len() >= SUBSTRING_MIN_LEN
                && local_part.contains(word.as_str())
                && !found.contains(word)
            {
                found.push(word.clone());
            }
        }

        let has_ban_words = !found.is_empty();

        ValidationResult {
            valid: !has_ban_words,
            message: if has_ban_words {
                format!("Contains banned words: {}", found.join(", "))
            } else {
                "No banned words found".to_string()
            },
            details: details_map(json!({
                "local_part": local_part,
                "has_ban_words": has_ban_words,
                "ban_words_count": found.len(),
                "ban_words_found": found,
            })),
            duration: start.elapsed(),
            error: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn check() -> BanWordsCheck {
        BanWordsCheck::from_words(vec![
            "spam".to_string(),
            "scam".to_string(),
            "xx".to_string(),
        ])
    }

    #[test]
    fn substring_match_for_long_words() {
        let result = check().validate("spamlord@example.com");
        assert!(!result.valid);
        assert_eq!(result.details.get("has_ban_words").unwrap(), true);
        assert_eq!(result.details.get("ban_words_count").unwrap(), 1);
    }

    #[test]
    fn short_words_match_exactly_only() {
        // "xx" is below the substring threshold: only an exact local part
        // matches.
        assert!(check().validate("xxl@example.com").valid);
        assert!(!check().validate("xx@example.com").valid);
    }

    #[test]
    fn matches_are_deduplicated() {
        // Local part equal to a word also contains it; reported once.
        let result = check().validate("spam@example.com");
        let found = result.details.get("ban_words_found").unwrap();
        assert_eq!(found, &serde_json::json!(["spam"]));
    }

    #[test]
    fn clean_local_part_passes() {
        let result = check().validate("alice@example.com");
        assert!(result.valid);
        assert_eq!(result.details.get("ban_words_count").unwrap(), 0);
    }
}
