//! Result cache for the orchestrator
//!
//! A fixed-capacity concurrent cache keyed by normalized address (plus the
//! canonicalized checker selection when one was requested). Entries carry
//! their own timestamp; a read older than the configured TTL is discarded
//! and treated as a miss. Concurrent misses for the same key are not
//! coalesced — duplicate in-flight work is accepted.

use crate::{CheckResult, CheckerName};
use moka::future::Cache;
use std::sync::Arc;
use std::time::{Duration, SystemTime};
use tracing::debug;

#[derive(Clone)]
pub struct ResultCache {
    entries: Cache<String, Arc<CheckResult>>,
    timeout: Duration,
}

impl ResultCache {
    pub fn new(capacity: u64, timeout: Duration) -> Self {
        Self {
            entries: Cache::new(capacity),
            timeout,
        }
    }

    /// Build the cache key for an address and an optional checker selection.
    ///
    /// An empty selection keys on the address alone; otherwise the selection
    /// is canonicalized (sorted, deduplicated) so equivalent requests share
    /// an entry.
    pub fn key(email: &str, selection: &[CheckerName]) -> String {
        if selection.is_empty() {
            return email.to_string();
        }
        let mut names: Vec<&str> = selection.iter().map(CheckerName::as_str).collect();
        names.sort_unstable();
        names.dedup();
        format!("{}:{}", email, names.join(","))
    }

    /// Fetch a fresh entry, expiring anything older than the TTL.
    pub async fn get(&self, key: &str) -> Option<Arc<CheckResult>> {
        let entry = self.entries.get(key).await?;
        let age = SystemTime::now()
            .duration_since(entry.timestamp)
            .unwrap_or(Duration::ZERO);
        if age < self.timeout {
            debug!("Cache hit for {}", key);
            Some(entry)
        } else {
            debug!("Cache entry for {} expired ({:?} old)", key, age);
            self.entries.invalidate(key).await;
            None
        }
    }

    pub async fn insert(&self, key: String, result: Arc<CheckResult>) {
        self.entries.insert(key, result).await;
    }

    /// Approximate number of live entries; pending evictions may not be
    /// reflected yet.
    pub fn len(&self) -> u64 {
        self.entries.entry_count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::collections::HashMap;

    fn result_stamped_at(timestamp: SystemTime) -> Arc<CheckResult> {
        Arc::new(CheckResult {
            email: "a@x.com".to_string(),
            timestamp,
            duration: Duration::ZERO,
            results: HashMap::new(),
            is_valid: true,
            summary: Some(Default::default()),
        })
    }

    #[test]
    fn key_without_selection_is_the_address() {
        assert_eq!(ResultCache::key("a@x.com", &[]), "a@x.com");
    }

    #[test]
    fn key_canonicalizes_selection() {
        let forward = ResultCache::key("a@x.com", &[CheckerName::Mx, CheckerName::Syntax]);
        let backward = ResultCache::key("a@x.com", &[CheckerName::Syntax, CheckerName::Mx]);
        assert_eq!(forward, backward);
        assert_eq!(forward, "a@x.com:mx,syntax");
    }

    #[tokio::test]
    async fn fresh_entry_round_trips() {
        let cache = ResultCache::new(10, Duration::from_secs(60));
        let result = result_stamped_at(SystemTime::now());

        cache.insert("a@x.com".to_string(), Arc::clone(&result)).await;
        let fetched = cache.get("a@x.com").await.unwrap();
        assert!(Arc::ptr_eq(&fetched, &result));
    }

    #[tokio::test]
    async fn stale_entry_reads_as_miss() {
        let cache = ResultCache::new(10, Duration::from_millis(10));
        let stale = result_stamped_at(SystemTime::now() - Duration::from_secs(60));

        cache.insert("a@x.com".to_string(), stale).await;
        assert!(cache.get("a@x.com").await.is_none());
        // And the expired entry was dropped, not merely skipped.
        assert!(cache.get("a@x.com").await.is_none());
    }
}
