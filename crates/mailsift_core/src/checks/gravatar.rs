//! Gravatar checker

use crate::checks::details_map;
use crate::ValidationResult;
use serde_json::json;
use std::time::{Duration, Instant};

/// Probes gravatar.com for an avatar registered to the address.
///
/// The `d=404` parameter turns the default-image fallback into a 404, so a
/// 200 means a real account exists.
pub struct GravatarCheck {
    client: reqwest::Client,
}

impl GravatarCheck {
    pub fn new(timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { client })
    }

    pub async fn validate(&self, email: &str) -> ValidationResult {
        let start = Instant::now();

        let email = email.trim().to_lowercase();
        let hash = format!("{:x}", md5::compute(email.as_bytes()));
        let gravatar_url = format!("https://www.gravatar.com/avatar/{}?d=404", hash);

        let response = match self.client.get(&gravatar_url).send().await {
            Ok(response) => response,
            Err(e) => {
                return ValidationResult {
                    valid: false,
                    message: "Failed to check Gravatar".to_string(),
                    details: details_map(json!({
                        "gravatar_url": gravatar_url,
                        "gravatar_hash": hash,
                    })),
                    duration: start.elapsed(),
                    error: Some(e.to_string()),
                }
            }
        };

        let has_gravatar = response.status() == reqwest::StatusCode::OK;
        // Drain the body so the connection can be reused.
        let _ = response.bytes().await;

        ValidationResult {
            valid: has_gravatar,
            message: if has_gravatar {
                "Gravatar account exists".to_string()
            } else {
                "No Gravatar account found".to_string()
            },
            details: details_map(json!({
                "gravatar_url": gravatar_url,
                "gravatar_hash": hash,
                "has_gravatar": has_gravatar,
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

    #[test]
    fn hash_is_md5_of_normalized_address() {
        // Known digest for the canonical Gravatar documentation example.
        let email = "  MyEmailAddress@example.com ".trim().to_lowercase();
        let hash = format!("{:x}", md5::compute(email.as_bytes()));
        assert_eq!(hash, "0bc83cb571cd1c50ba6f3e8a78ef1346");
    }
}
