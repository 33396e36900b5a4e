use std::collections::HashMap;
use std::time::Duration;
use tokio::sync::Mutex;

use crate::api::Listing;

/// Ids stay remembered this long past their listing's end.
const END_GRACE_MS: i64 = 5 * 60 * 1000;

/// Listing ids already handed to flip evaluation, each with the time after
/// which it can be forgotten. An ended listing never shows up again, so
/// forgetting it cannot produce a second flip.
pub struct SeenListings {
    expiry_by_id: Mutex<HashMap<String, i64>>,
    fallback: Duration,
}

impl SeenListings {
    /// `fallback` bounds how long ids without a known end time are kept.
    pub fn new(fallback: Duration) -> Self {
        Self {
            expiry_by_id: Mutex::new(HashMap::new()),
            fallback,
        }
    }

    pub async fn contains(&self, listing_id: &str) -> bool {
        self.expiry_by_id.lock().await.contains_key(listing_id)
    }

    /// Atomically claims every listing not yet seen and returns the claimed
    /// ones. Concurrent callers offering the same id see it claimed exactly
    /// once between them.
    pub async fn claim<'a>(&self, listings: &[&'a Listing], now: i64) -> Vec<&'a Listing> {
        let fallback_ms = i64::try_from(self.fallback.as_millis()).unwrap_or(i64::MAX);
        let fallback_expiry = now.saturating_add(fallback_ms);
        let mut seen = self.expiry_by_id.lock().await;

        listings
            .iter()
            .copied()
            .filter(|listing| {
                if seen.contains_key(&listing.uuid) {
                    return false;
                }
                let expiry = if listing.end > 0 {
                    listing.end.saturating_add(END_GRACE_MS)
                } else {
                    fallback_expiry
                };
                seen.insert(listing.uuid.clone(), expiry);
                true
            })
            .collect()
    }

    /// Forgets ids whose expiry is before `now`.
    pub async fn prune(&self, now: i64) -> usize {
        let mut seen = self.expiry_by_id.lock().await;
        let before = seen.len();
        seen.retain(|_, expiry| *expiry >= now);
        before - seen.len()
    }

    pub async fn len(&self) -> usize {
        self.expiry_by_id.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const NOW: i64 = 1_700_000_000_000;

    fn listing(id: &str, end: i64) -> Listing {
        Listing {
            uuid: id.to_string(),
            item_name: "Hyperion".to_string(),
            item_lore: String::new(),
            starting_bid: 1,
            bin: true,
            last_updated: 0,
            end,
            tier: String::new(),
        }
    }

    #[tokio::test]
    async fn test_claim_is_idempotent() {
        let seen = SeenListings::new(Duration::from_secs(60));
        let a = listing("a", NOW + 1_000);
        let b = listing("b", NOW + 1_000);

        assert_eq!(seen.claim(&[&a, &b], NOW).await.len(), 2);
        assert!(seen.claim(&[&a], NOW).await.is_empty());
        assert!(seen.contains("b").await);
    }

    #[tokio::test]
    async fn test_duplicate_ids_within_one_batch() {
        let seen = SeenListings::new(Duration::from_secs(60));
        let a = listing("a", NOW);
        let a_again = listing("a", NOW);
        assert_eq!(seen.claim(&[&a, &a_again], NOW).await.len(), 1);
    }

    #[tokio::test]
    async fn test_prune_by_end_time_and_fallback() {
        let seen = SeenListings::new(Duration::from_secs(60));
        let ended = listing("ended", NOW - END_GRACE_MS - 1);
        let running = listing("running", NOW + 10_000);
        let unknown_end = listing("unknown", 0);
        seen.claim(&[&ended, &running, &unknown_end], NOW).await;

        assert_eq!(seen.prune(NOW).await, 1);
        assert!(!seen.contains("ended").await);

        // Later both the running listing and the unknown-end id expire.
        assert_eq!(seen.prune(NOW + 400_000).await, 2);
        assert!(seen.is_empty().await);
    }

    #[tokio::test]
    async fn test_extreme_end_time_saturates() {
        let seen = SeenListings::new(Duration::MAX);
        let good = listing("good", 0);
        let far = listing("far", i64::MAX);

        assert_eq!(seen.claim(&[&good, &far], NOW).await.len(), 2);
        assert_eq!(seen.prune(i64::MAX).await, 0);
        assert_eq!(seen.len().await, 2);
    }
}
