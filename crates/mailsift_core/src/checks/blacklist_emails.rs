//! Address blacklist checker

use crate::checks::details_map;
use crate::filter::{build_filter, Membership, EXACT_THRESHOLD};
use crate::loader::{FileLoader, LoadError};
use crate::ValidationResult;
use serde_json::json;
use std::path::Path;
use std::time::Instant;

/// Flags whole addresses present in the blacklist.
pub struct BlacklistEmailsCheck {
    filter: Box<dyn Membership>,
}

impl BlacklistEmailsCheck {
    /// Load the blacklist and build the membership filter. Lists below the
    /// exact threshold stay on the exact map even when a false-positive rate
    /// was configured.
    pub fn from_file(path: impl AsRef<Path>, false_positive_rate: f64) -> Result<Self, LoadError> {
        let emails = FileLoader::new().load_from_file(path)?;
        Ok(Self {
            filter: build_filter(&emails, false_positive_rate, Some(EXACT_THRESHOLD)),
        })
    }

    #[cfg(test)]
    pub(crate) fn from_emails(emails: &[&str]) -> Self {
        let emails: Vec<String> = emails.iter().map(|e| e.to_string()).collect();
        Self {
            filter: build_filter(&emails, 0.0, Some(EXACT_THRESHOLD)),
        }
    }

    pub fn validate(&self, email: &str) -> ValidationResult {
        let start = Instant::now();

        let email = email.trim().to_lowercase();
        let is_blacklisted = self.filter.contains(&email);

        ValidationResult {
            valid: !is_blacklisted,
            message: if is_blacklisted {
                "Email is blacklisted".to_string()
            } else {
                "Email not in blacklist".to_string()
            },
            details: details_map(json!({
                "email": email,
                "is_blacklisted": is_blacklisted,
            })),
            duration: start.elapsed(),
            error: None,
        }
    }
}
