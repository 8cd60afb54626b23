//! Disposable provider checker

use crate::checks::{details_map, extract_domain};
use crate::filter::{build_filter, Membership};
use crate::loader::{FileLoader, LoadError};
use crate::ValidationResult;
use serde_json::json;
use std::path::Path;
use std::time::Instant;

/// Flags domains belonging to temporary-mailbox providers.
pub struct DisposableCheck {
    filter: Box<dyn Membership>,
}

impl DisposableCheck {
    /// Load the provider list and build the membership filter. A zero
    /// false-positive rate selects the exact map; otherwise a cuckoo filter
    /// is used regardless of list size.
    pub fn from_file(path: impl AsRef<Path>, false_positive_rate: f64) -> Result<Self, LoadError> {
        let domains = FileLoader::new().load_from_file(path)?;
        Ok(Self {
            filter: build_filter(&domains, false_positive_rate, None),
        })
    }

    #[cfg(test)]
    pub(crate) fn from_domains(domains: &[&str]) -> Self {
        let domains: Vec<String> = domains.iter().map(|d| d.to_string()).collect();
        Self {
            filter: build_filter(&domains, 0.0, None),
        }
    }

    pub fn validate(&self, email: &str) -> ValidationResult {
        let start = Instant::now();

        let domain = extract_domain(email);
        let is_disposable = self.filter.contains(&domain);

        ValidationResult {
            valid: !is_disposable,
            message: if is_disposable {
                "Disposable email detected".to_string()
            } else {
                "Not a disposable email".to_string()
            },
            details: details_map(json!({
                "domain": domain,
                "is_disposable": is_disposable,
            })),
            duration: start.elapsed(),
            error: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_listed_domain() {
        let check = DisposableCheck::from_domains(&["mailinator.com"]);
        let result = check.validate("bob@mailinator.com");

        assert!(!result.valid);
        assert_eq!(result.details.get("is_disposable").unwrap(), true);
        assert_eq!(result.details.get("domain").unwrap(), "mailinator.com");
    }

    #[test]
    fn passes_unlisted_domain() {
        let check = DisposableCheck::from_domains(&["mailinator.com"]);
        assert!(check.validate("bob@example.com").valid);
    }

    #[test]
    fn missing_list_file_is_a_construction_error() {
        assert!(DisposableCheck::from_file("/nope/disposable.txt", 0.01).is_err());
    }
}
