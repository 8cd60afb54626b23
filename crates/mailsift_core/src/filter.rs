//! Membership filters backing the list checkers
//!
//! Two implementations of a set-of-strings abstraction: an exact map with
//! zero false positives that supports enumeration, and a compact cuckoo
//! filter for large lists where a bounded false-positive rate is acceptable.
//! Filters are built single-writer at checker construction and are read-only
//! afterwards, but the interface admits mutation for future use.

use cuckoofilter::CuckooFilter;
use std::collections::hash_map::DefaultHasher;
use std::collections::HashSet;
use std::sync::RwLock;
use thiserror::Error;
use tracing::{debug, warn};

/// Item count below which the blacklist checkers prefer the exact map even
/// when a false-positive rate was configured.
pub const EXACT_THRESHOLD: usize = 1000;

#[derive(Error, Debug)]
pub enum FilterError {
    #[error("failed to add item to cuckoo filter: {0}")]
    Saturated(String),
}

/// Set-of-strings abstraction shared by the list checkers.
pub trait Membership: Send + Sync {
    fn add(&self, item: &str) -> Result<(), FilterError>;
    fn contains(&self, item: &str) -> bool;
    fn len(&self) -> usize;
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
    fn delete(&self, item: &str) -> bool;
    fn clear(&self);
    /// All stored items. Returns empty for the cuckoo backend, which cannot
    /// enumerate.
    fn items(&self) -> Vec<String>;
}

/// Exact membership backed by a hash set. Zero false positives.
#[derive(Debug, Default)]
pub struct ExactFilter {
    items: RwLock<HashSet<String>>,
}

impl ExactFilter {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Membership for ExactFilter {
    fn add(&self, item: &str) -> Result<(), FilterError> {
        self.items.write().unwrap_or_else(|e| e.into_inner()).insert(item.to_string());
        Ok(())
    }

    fn contains(&self, item: &str) -> bool {
        self.items.read().unwrap_or_else(|e| e.into_inner()).contains(item)
    }

    fn len(&self) -> usize {
        self.items.read().unwrap_or_else(|e| e.into_inner()).len()
    }

    fn delete(&self, item: &str) -> bool {
        self.items.write().unwrap_or_else(|e| e.into_inner()).remove(item)
    }

    fn clear(&self) {
        self.items.write().unwrap_or_else(|e| e.into_inner()).clear();
    }

    fn items(&self) -> Vec<String> {
        self.items
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .iter()
            .cloned()
            .collect()
    }
}

/// Approximate membership backed by a cuckoo filter (buckets of four
/// fingerprints). Compact and non-enumerable; `add` fails once displacement
/// gives up.
pub struct ApproxFilter {
    filter: RwLock<CuckooFilter<DefaultHasher>>,
    capacity: usize,
}

impl ApproxFilter {
    /// Create a filter sized for `capacity` items plus a 20% buffer.
    pub fn new(capacity: usize) -> Self {
        let sized = sized_capacity(capacity);
        Self {
            filter: RwLock::new(CuckooFilter::with_capacity(sized)),
            capacity: sized,
        }
    }
}

impl Membership for ApproxFilter {
    fn add(&self, item: &str) -> Result<(), FilterError> {
        self.filter
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .add(item)
            .map_err(|_| FilterError::Saturated(item.to_string()))
    }

    fn contains(&self, item: &str) -> bool {
        self.filter.read().unwrap_or_else(|e| e.into_inner()).contains(item)
    }

    fn len(&self) -> usize {
        self.filter.read().unwrap_or_else(|e| e.into_inner()).len()
    }

    fn delete(&self, item: &str) -> bool {
        self.filter.write().unwrap_or_else(|e| e.into_inner()).delete(item)
    }

    fn clear(&self) {
        // The structure has no reset; recreate with the same geometry.
        *self.filter.write().unwrap_or_else(|e| e.into_inner()) =
            CuckooFilter::with_capacity(self.capacity);
    }

    fn items(&self) -> Vec<String> {
        // Cuckoo filters store fingerprints, not items; enumeration is not
        // possible.
        Vec::new()
    }
}

fn sized_capacity(capacity: usize) -> usize {
    ((capacity as f64) * 1.2).ceil() as usize
}

/// Pick a backend for a list of `item_count` entries.
///
/// A zero `false_positive_rate` always selects the exact map. When
/// `exact_threshold` is given (the blacklist policy), lists below it also
/// stay exact; the disposable and free checkers pass `None` and switch on
/// the rate alone.
pub fn select_backend(
    item_count: usize,
    false_positive_rate: f64,
    exact_threshold: Option<usize>,
) -> Box<dyn Membership> {
    let exact = false_positive_rate == 0.0
        || exact_threshold.is_some_and(|threshold| item_count < threshold);
    if exact {
        debug!("Selected exact map filter for {} items", item_count);
        Box::new(ExactFilter::new())
    } else {
        debug!(
            "Selected cuckoo filter for {} items (target fp rate {})",
            item_count, false_positive_rate
        );
        Box::new(ApproxFilter::new(item_count))
    }
}

/// Build a filter from a list of items, trimming, lowercasing, and skipping
/// empties the way the list checkers expect. Saturated inserts are logged
/// and skipped; the 20% sizing buffer makes them rare.
pub fn build_filter(
    items: &[String],
    false_positive_rate: f64,
    exact_threshold: Option<usize>,
) -> Box<dyn Membership> {
    let filter = select_backend(items.len(), false_positive_rate, exact_threshold);
    for item in items {
        let item = item.trim().to_lowercase();
        if item.is_empty() {
            continue;
        }
        if let Err(e) = filter.add(&item) {
            warn!("Dropping list entry: {}", e);
        }
    }
    filter
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn exact_filter_contract() {
        let filter = ExactFilter::new();
        filter.add("mailinator.com").unwrap();

        assert!(filter.contains("mailinator.com"));
        assert!(!filter.contains("gmail.com"));
        assert_eq!(filter.len(), 1);

        assert!(filter.delete("mailinator.com"));
        assert!(!filter.delete("mailinator.com"));
        assert!(filter.is_empty());
    }

    #[test]
    fn exact_filter_enumerates() {
        let filter = ExactFilter::new();
        filter.add("a.com").unwrap();
        filter.add("b.com").unwrap();

        let mut items = filter.items();
        items.sort();
        assert_eq!(items, vec!["a.com", "b.com"]);

        filter.clear();
        assert!(filter.items().is_empty());
    }

    #[test]
    fn approx_filter_contract() {
        let filter = ApproxFilter::new(100);
        filter.add("mailinator.com").unwrap();

        assert!(filter.contains("mailinator.com"));
        assert_eq!(filter.len(), 1);
        assert!(filter.delete("mailinator.com"));
        assert!(!filter.contains("mailinator.com"));

        // Documented limitation: no enumeration.
        filter.add("x.com").unwrap();
        assert!(filter.items().is_empty());
    }

    #[test]
    fn approx_filter_false_positive_rate_is_bounded() {
        let filter = ApproxFilter::new(10_000);
        for i in 0..10_000 {
            filter.add(&format!("member-{i}.example")).unwrap();
        }

        let mut false_positives = 0u32;
        let probes = 10_000;
        for i in 0..probes {
            if filter.contains(&format!("absent-{i}.example")) {
                false_positives += 1;
            }
        }

        // One-byte fingerprints with four-way buckets stay comfortably under
        // a few percent; allow slack to keep the test deterministic enough.
        assert!(
            (false_positives as f64) / (probes as f64) < 0.05,
            "false positive rate too high: {false_positives}/{probes}"
        );
    }

    #[test]
    fn backend_selection_rules() {
        // Rate 0 always selects the exact map.
        let filter = select_backend(50_000, 0.0, None);
        filter.add("x").unwrap();
        assert_eq!(filter.items(), vec!["x".to_string()]);

        // Small blacklists stay exact even with a rate configured.
        let filter = select_backend(10, 0.01, Some(EXACT_THRESHOLD));
        filter.add("y").unwrap();
        assert!(!filter.items().is_empty());

        // Large lists with a rate go probabilistic (non-enumerable).
        let filter = select_backend(5000, 0.01, Some(EXACT_THRESHOLD));
        filter.add("z").unwrap();
        assert!(filter.items().is_empty());

        // Disposable/free policy: no threshold, the rate alone decides.
        let filter = select_backend(10, 0.01, None);
        filter.add("w").unwrap();
        assert!(filter.items().is_empty());
    }

    #[test]
    fn build_filter_normalizes_items() {
        let items = vec!["  TempMail.ORG ".to_string(), String::new()];
        let filter = build_filter(&items, 0.0, None);
        assert!(filter.contains("tempmail.org"));
        assert_eq!(filter.len(), 1);
    }
}
