//! RFC 5322 syntax checker

use crate::checks::details_map;
use crate::ValidationResult;
use email_address::EmailAddress;
use serde_json::json;
use std::str::FromStr;
use std::time::Instant;

/// Validates the address against the RFC 5322 addr-spec grammar.
#[derive(Debug, Default)]
pub struct SyntaxCheck;

impl SyntaxCheck {
    pub fn new() -> Self {
        Self
    }

    pub fn validate(&self, email: &str) -> ValidationResult {
        let start = Instant::now();

        match EmailAddress::from_str(email) {
            Ok(parsed) => ValidationResult {
                valid: true,
                message: "Valid email syntax".to_string(),
                details: details_map(json!({
                    "parsed_address": parsed.to_string(),
                    // Bare addr-spec carries no display name.
                    "display_name": "",
                })),
                duration: start.elapsed(),
                error: None,
            },
            Err(e) => ValidationResult {
                valid: false,
                message: "Invalid email syntax".to_string(),
                details: serde_json::Map::new(),
                duration: start.elapsed(),
                error: Some(e.to_string()),
            },
        }
    }
}
