use arc_swap::ArcSwap;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;

/// Reference prices for one catalog id, in integer currency units.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CatalogPrice {
    pub lowest: i64,
    /// Rolling average; 0 means unknown.
    pub average: i64,
}

impl CatalogPrice {
    /// Average used as a divisor. 0 (unknown) is floored to 1; this is a
    /// sentinel, never a real price.
    pub fn average_divisor(&self) -> i64 {
        if self.average <= 0 {
            1
        } else {
            self.average
        }
    }
}

/// Immutable view of both feeds. Never edited in place once published.
#[derive(Debug, Clone, Default)]
pub struct PriceSnapshot {
    pub lowest: HashMap<String, i64>,
    pub average: HashMap<String, i64>,
    pub refreshed_at: Option<DateTime<Utc>>,
}

impl PriceSnapshot {
    pub fn new(lowest: HashMap<String, i64>, average: HashMap<String, i64>) -> Self {
        Self {
            lowest,
            average,
            refreshed_at: Some(Utc::now()),
        }
    }

    pub fn lookup(&self, catalog_id: &str) -> Option<CatalogPrice> {
        let lowest = *self.lowest.get(catalog_id)?;
        let average = self.average.get(catalog_id).copied().unwrap_or(0);
        Some(CatalogPrice { lowest, average })
    }

    pub fn is_loaded(&self) -> bool {
        !self.lowest.is_empty()
    }
}

/// Process-wide price reference cache. Refreshes swap the whole snapshot, so a
/// reader holding the previous `Arc` keeps a consistent view.
pub struct PriceCache {
    snapshot: ArcSwap<PriceSnapshot>,
}

impl Default for PriceCache {
    fn default() -> Self {
        Self::new()
    }
}

impl PriceCache {
    pub fn new() -> Self {
        Self {
            snapshot: ArcSwap::from_pointee(PriceSnapshot::default()),
        }
    }

    pub fn with_snapshot(snapshot: PriceSnapshot) -> Self {
        Self {
            snapshot: ArcSwap::from_pointee(snapshot),
        }
    }

    pub fn snapshot(&self) -> Arc<PriceSnapshot> {
        self.snapshot.load_full()
    }

    pub fn lookup(&self, catalog_id: &str) -> Option<CatalogPrice> {
        self.snapshot.load().lookup(catalog_id)
    }

    pub fn replace(&self, snapshot: PriceSnapshot) {
        self.snapshot.store(Arc::new(snapshot));
    }

    pub fn len(&self) -> usize {
        self.snapshot.load().lowest.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn prices(entries: &[(&str, i64)]) -> HashMap<String, i64> {
        entries.iter().map(|(k, v)| (k.to_string(), *v)).collect()
    }

    #[test]
    fn test_lookup_requires_lowest() {
        let cache = PriceCache::with_snapshot(PriceSnapshot::new(
            prices(&[("HYPERION", 900)]),
            prices(&[("HYPERION", 850), ("ONLY_AVERAGE", 10)]),
        ));

        assert_eq!(
            cache.lookup("HYPERION"),
            Some(CatalogPrice { lowest: 900, average: 850 })
        );
        assert_eq!(cache.lookup("ONLY_AVERAGE"), None);
    }

    #[test]
    fn test_missing_average_floors_to_one() {
        let snapshot = PriceSnapshot::new(prices(&[("X", 100)]), HashMap::new());
        let price = snapshot.lookup("X").unwrap();
        assert_eq!(price.average, 0);
        assert_eq!(price.average_divisor(), 1);
    }

    #[test]
    fn test_replace_keeps_old_reader_consistent() {
        let cache = PriceCache::with_snapshot(PriceSnapshot::new(
            prices(&[("A", 1)]),
            HashMap::new(),
        ));
        let held = cache.snapshot();

        cache.replace(PriceSnapshot::new(prices(&[("B", 2)]), HashMap::new()));

        assert!(held.lookup("A").is_some());
        assert!(cache.lookup("A").is_none());
        assert_eq!(cache.lookup("B").map(|p| p.lowest), Some(2));
    }
}
