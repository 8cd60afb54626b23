//! Free provider checker

use crate::checks::{details_map, extract_domain};
use crate::filter::{build_filter, Membership};
use crate::loader::{FileLoader, LoadError};
use crate::ValidationResult;
use serde_json::json;
use std::path::Path;
use std::time::Instant;

/// Flags domains belonging to consumer webmail providers.
pub struct FreeCheck {
    filter: Box<dyn Membership>,
}

impl FreeCheck {
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
        let is_free = self.filter.contains(&domain);

        ValidationResult {
            valid: !is_free,
            message: if is_free {
                "Free email provider".to_string()
            } else {
                "Not a free email provider".to_string()
            },
            details: details_map(json!({
                "domain": domain,
                "is_free": is_free,
            })),
            duration: start.elapsed(),
            error: None,
        }
    }
}
