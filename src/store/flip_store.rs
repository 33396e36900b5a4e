use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

use super::flip::{Flip, FlipFilter};
use crate::core::now_ms;

/// Append-only, time-windowed flip collection. Writes go through `append`;
/// queries only take the read lock.
#[derive(Clone)]
pub struct FlipStore {
    flips: Arc<RwLock<Vec<Flip>>>,
    retention: Duration,
}

impl FlipStore {
    pub fn new(retention: Duration) -> Self {
        Self {
            flips: Arc::new(RwLock::new(Vec::new())),
            retention,
        }
    }

    pub fn retention(&self) -> Duration {
        self.retention
    }

    pub async fn append(&self, flips: Vec<Flip>) -> usize {
        if flips.is_empty() {
            return self.len().await;
        }
        let mut guard = self.flips.write().await;
        guard.extend(flips);
        guard.len()
    }

    pub async fn query(&self, filter: &FlipFilter) -> Vec<Flip> {
        self.query_at(filter, now_ms()).await
    }

    /// Flips detected within the retention window ending at `now`, best profit
    /// first; ties go to the earlier detection, then the listing id.
    pub async fn query_at(&self, filter: &FlipFilter, now: i64) -> Vec<Flip> {
        let window = self.retention.as_millis() as i64;

        let mut matching: Vec<Flip> = {
            let guard = self.flips.read().await;
            guard
                .iter()
                .filter(|flip| now - flip.detected_at <= window)
                .filter(|flip| filter.matches(flip))
                .cloned()
                .collect()
        };

        matching.sort_by(|a, b| {
            b.profit
                .cmp(&a.profit)
                .then(a.detected_at.cmp(&b.detected_at))
                .then_with(|| a.listing_id.cmp(&b.listing_id))
        });
        matching
    }

    /// Physically drops flips detected more than `horizon` before `now`.
    /// Returns how many were removed.
    pub async fn compact(&self, horizon: Duration, now: i64) -> usize {
        let cutoff = now - horizon.as_millis() as i64;
        let mut guard = self.flips.write().await;
        let before = guard.len();
        guard.retain(|flip| flip.detected_at >= cutoff);
        before - guard.len()
    }

    pub async fn len(&self) -> usize {
        self.flips.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const NOW: i64 = 1_700_000_000_000;

    fn flip(id: &str, profit: i64, detected_at: i64) -> Flip {
        Flip {
            listing_id: id.to_string(),
            item_name: "Hyperion".to_string(),
            price: 1_000,
            lowest_bin: 1_000 + profit,
            profit,
            potential_manipulation: false,
            detected_at,
        }
    }

    #[tokio::test]
    async fn test_query_sorts_by_profit_descending() {
        let store = FlipStore::new(Duration::from_secs(100));
        store
            .append(vec![
                flip("a", 500_000, NOW),
                flip("b", 2_000_000, NOW),
                flip("c", 100_000, NOW),
            ])
            .await;

        let profits: Vec<i64> = store
            .query_at(&FlipFilter::default(), NOW)
            .await
            .iter()
            .map(|f| f.profit)
            .collect();
        assert_eq!(profits, vec![2_000_000, 500_000, 100_000]);
    }

    #[tokio::test]
    async fn test_ties_break_on_earlier_detection() {
        let store = FlipStore::new(Duration::from_secs(100));
        store
            .append(vec![
                flip("late", 300_000, NOW - 1_000),
                flip("early", 300_000, NOW - 5_000),
                flip("early-b", 300_000, NOW - 5_000),
            ])
            .await;

        let ids: Vec<String> = store
            .query_at(&FlipFilter::default(), NOW)
            .await
            .into_iter()
            .map(|f| f.listing_id)
            .collect();
        assert_eq!(ids, vec!["early", "early-b", "late"]);
    }

    #[tokio::test]
    async fn test_retention_window_hides_but_keeps() {
        let store = FlipStore::new(Duration::from_secs(100));
        store
            .append(vec![
                flip("fresh", 200_000, NOW - 100_000),
                flip("stale", 900_000, NOW - 100_001),
            ])
            .await;

        let visible = store.query_at(&FlipFilter::default(), NOW).await;
        assert_eq!(visible.len(), 1);
        assert_eq!(visible[0].listing_id, "fresh");
        assert_eq!(store.len().await, 2);
    }

    #[tokio::test]
    async fn test_empty_store_returns_nothing() {
        let store = FlipStore::new(Duration::from_secs(100));
        assert!(store.query(&FlipFilter::default()).await.is_empty());
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn test_query_does_not_mutate() {
        let store = FlipStore::new(Duration::from_secs(100));
        store.append(vec![flip("old", 200_000, NOW - 500_000)]).await;
        store.query_at(&FlipFilter::default(), NOW).await;
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_compact_drops_beyond_horizon() {
        let store = FlipStore::new(Duration::from_secs(100));
        store
            .append(vec![
                flip("kept", 200_000, NOW - 3_000_000),
                flip("dropped", 200_000, NOW - 4_000_000),
            ])
            .await;

        let removed = store.compact(Duration::from_secs(3_600), NOW).await;
        assert_eq!(removed, 1);
        assert_eq!(store.len().await, 1);
    }
}
