//! DNS resolution shared by the MX and SMTP checkers
//!
//! A thin wrapper around hickory-resolver that returns MX hosts sorted by
//! ascending preference and resolves best-effort IPs for exchanger hosts.

use hickory_resolver::config::{ResolverConfig, ResolverOpts};
use hickory_resolver::error::ResolveError;
use hickory_resolver::{AsyncResolver, TokioAsyncResolver};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

/// A mail exchanger for a domain, in resolution order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MxHost {
    pub host: String,
    pub priority: u16,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ip: Option<String>,
}

/// Async resolver with the engine's timeout applied to every query.
#[derive(Clone)]
pub struct DnsResolver {
    resolver: TokioAsyncResolver,
}

impl DnsResolver {
    pub fn new(timeout: Duration) -> Self {
        let mut opts = ResolverOpts::default();
        opts.timeout = timeout;
        opts.attempts = 2;

        Self {
            resolver: AsyncResolver::tokio(ResolverConfig::default(), opts),
        }
    }

    /// Look up the MX records for a domain, sorted by ascending preference.
    /// IPs are not resolved here; see [`resolve_first_ip`](Self::resolve_first_ip).
    pub async fn mx_records(&self, domain: &str) -> Result<Vec<MxHost>, ResolveError> {
        let lookup = self.resolver.mx_lookup(domain).await?;

        let mut records: Vec<MxHost> = lookup
            .iter()
            .map(|mx| MxHost {
                host: mx.exchange().to_utf8().trim_end_matches('.').to_string(),
                priority: mx.preference(),
                ip: None,
            })
            .collect();
        records.sort_by_key(|record| record.priority);

        debug!("Domain {} has {} MX record(s)", domain, records.len());
        Ok(records)
    }

    /// Best-effort forward lookup; returns the first address, if any.
    pub async fn resolve_first_ip(&self, host: &str) -> Option<String> {
        match self.resolver.lookup_ip(host).await {
            Ok(lookup) => lookup.iter().next().map(|ip| ip.to_string()),
            Err(e) => {
                debug!("IP lookup failed for {}: {}", host, e);
                None
            }
        }
    }

    /// A/AAAA lookup for a domain, used for the implicit-MX fallback.
    pub async fn ip_addrs(&self, domain: &str) -> Result<Vec<std::net::IpAddr>, ResolveError> {
        let lookup = self.resolver.lookup_ip(domain).await?;
        Ok(lookup.iter().collect())
    }
}
