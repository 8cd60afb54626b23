//! MX record checker

use crate::checks::{details_map, extract_domain};
use crate::dns::DnsResolver;
use crate::ValidationResult;
use serde_json::json;
use std::time::Instant;
use tracing::debug;

/// Verifies that the address's domain is configured to receive mail.
///
/// When no MX record exists, an A/AAAA record still counts per the RFC 5321
/// implicit-MX rule.
pub struct MxCheck {
    resolver: DnsResolver,
}

impl MxCheck {
    pub fn new(resolver: DnsResolver) -> Self {
        Self { resolver }
    }

    pub async fn validate(&self, email: &str) -> ValidationResult {
        let start = Instant::now();
        let domain = extract_domain(email);

        match self.resolver.mx_records(&domain).await {
            Ok(records) if !records.is_empty() => {
                let mut records = records;
                // Best-effort forward resolution; a missing IP is not a
                // failure.
                for record in &mut records {
                    record.ip = self.resolver.resolve_first_ip(&record.host).await;
                }

                let primary = records[0].host.clone();
                let count = records.len();
                ValidationResult {
                    valid: true,
                    message: "Valid MX records found".to_string(),
                    details: details_map(json!({
                        "mx_records": records,
                        "mx_count": count,
                        "primary_mx": primary,
                    })),
                    duration: start.elapsed(),
                    error: None,
                }
            }
            Ok(_) => self.implicit_mx_fallback(&domain, None, start).await,
            Err(e) => {
                debug!("MX lookup failed for {}: {}", domain, e);
                self.implicit_mx_fallback(&domain, Some(e.to_string()), start).await
            }
        }
    }

    /// RFC 5321 fallback: a domain with an address record is its own mail
    /// exchanger.
    async fn implicit_mx_fallback(
        &self,
        domain: &str,
        mx_error: Option<String>,
        start: Instant,
    ) -> ValidationResult {
        match self.resolver.ip_addrs(domain).await {
            Ok(addrs) if !addrs.is_empty() => ValidationResult {
                valid: true,
                message: "No MX record, but domain has A record (implicit MX)".to_string(),
                details: details_map(json!({
                    "implicit_mx": true,
                    "a_records": addrs.len(),
                })),
                duration: start.elapsed(),
                error: None,
            },
            Ok(_) => ValidationResult {
                valid: false,
                message: "No MX or A records found".to_string(),
                details: serde_json::Map::new(),
                duration: start.elapsed(),
                error: mx_error,
            },
            Err(a_error) => ValidationResult {
                valid: false,
                message: "No MX or A records found".to_string(),
                details: serde_json::Map::new(),
                duration: start.elapsed(),
                error: Some(mx_error.unwrap_or_else(|| a_error.to_string())),
            },
        }
    }
}
