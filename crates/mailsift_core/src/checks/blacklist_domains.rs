//! Domain blacklist checker

use crate::checks::{details_map, extract_domain};
use crate::filter::{build_filter, Membership, EXACT_THRESHOLD};
use crate::loader::FileLoader;
use crate::ValidationResult;
use serde_json::json;
use std::path::Path;
use std::time::Instant;
use tracing::warn;

/// Flags domains present in the blacklist.
///
/// Unlike its siblings this checker tolerates a missing or unreadable list
/// file and degrades to an empty blacklist, so every domain passes.
pub struct BlacklistDomainsCheck {
    filter: Box<dyn Membership>,
}

impl BlacklistDomainsCheck {
    pub fn from_file(path: impl AsRef<Path>, false_positive_rate: f64) -> Self {
        let domains = match FileLoader::new().load_from_file(path.as_ref()) {
            Ok(domains) => domains,
            Err(e) => {
                warn!("Domain blacklist unavailable, starting empty: {}", e);
                Vec::new()
            }
        };
        Self {
            filter: build_filter(&domains, false_positive_rate, Some(EXACT_THRESHOLD)),
        }
    }

    #[cfg(test)]
    pub(crate) fn from_domains(domains: &[&str]) -> Self {
        let domains: Vec<String> = domains.iter().map(|d| d.to_string()).collect();
        Self {
            filter: build_filter(&domains, 0.0, Some(EXACT_THRESHOLD)),
        }
    }

    pub fn validate(&self, email: &str) -> ValidationResult {
        let start = Instant::now();

        let domain = extract_domain(email);
        let is_blacklisted = self.filter.contains(&domain);

        ValidationResult {
            valid: !is_blacklisted,
            message: if is_blacklisted {
                "Domain is blacklisted".to_string()
            } else {
                "Domain not in blacklist".to_string()
            },
            details: details_map(json!({
                "domain": domain,
                "is_blacklisted": is_blacklisted,
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
    fn flags_blacklisted_domain() {
        let check = BlacklistDomainsCheck::from_domains(&["bad.example"]);
        assert!(!check.validate("user@bad.example").valid);
        assert!(check.validate("user@good.example").valid);
    }

    #[test]
    fn missing_file_degrades_to_empty_blacklist() {
        let check = BlacklistDomainsCheck::from_file("/nope/blacklist.txt", 0.01);
        assert!(check.validate("user@anything.example").valid);
    }
}
