use std::sync::Arc;
use std::time::Duration;
use tokio::time::MissedTickBehavior;

use super::cache::{PriceCache, PriceSnapshot};
use crate::api::PriceSource;
use crate::core::{HealthChecker, PipelineMetrics};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RefreshOutcome {
    pub lowest_ok: bool,
    pub average_ok: bool,
    pub entries: usize,
}

pub struct PriceRefresher {
    source: Arc<dyn PriceSource>,
    cache: Arc<PriceCache>,
    health: HealthChecker,
    metrics: PipelineMetrics,
    refresh_interval: Duration,
}

impl PriceRefresher {
    pub fn new(
        source: Arc<dyn PriceSource>,
        cache: Arc<PriceCache>,
        health: HealthChecker,
        metrics: PipelineMetrics,
        refresh_interval: Duration,
    ) -> Self {
        Self {
            source,
            cache,
            health,
            metrics,
            refresh_interval,
        }
    }

    /// Fetches both feeds concurrently and swaps in a new snapshot. A feed that
    /// fails keeps its previous map.
    pub async fn refresh_once(&self) -> RefreshOutcome {
        let (lowest, average) =
            tokio::join!(self.source.fetch_lowest(), self.source.fetch_average());

        let previous = self.cache.snapshot();

        let lowest_ok = lowest.is_ok();
        let lowest = lowest.unwrap_or_else(|e| {
            tracing::warn!("Lowest BIN feed refresh failed, keeping previous prices: {}", e);
            previous.lowest.clone()
        });

        let average_ok = average.is_ok();
        let average = average.unwrap_or_else(|e| {
            tracing::warn!("Average BIN feed refresh failed, keeping previous prices: {}", e);
            previous.average.clone()
        });

        if lowest_ok || average_ok {
            self.cache.replace(PriceSnapshot::new(lowest, average));
        }

        let entries = self.cache.len();
        self.metrics.price_entries.set(entries as i64);
        self.health
            .update_component("price_feeds", lowest_ok && entries > 0)
            .await;

        tracing::info!(
            lowest_ok,
            average_ok,
            entries,
            "Price reference cache refreshed"
        );

        RefreshOutcome {
            lowest_ok,
            average_ok,
            entries,
        }
    }

    /// Performs the initial refresh, then keeps refreshing in the background.
    pub async fn start(self: Arc<Self>) -> tokio::task::JoinHandle<()> {
        self.refresh_once().await;

        let refresher = self.clone();
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(refresher.refresh_interval);
            interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
            // First tick completes immediately; the initial refresh already ran.
            interval.tick().await;

            loop {
                interval.tick().await;
                refresher.refresh_once().await;
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{ScannerError, ScannerResult};
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct FlakyPrices {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl PriceSource for FlakyPrices {
        async fn fetch_lowest(&self) -> ScannerResult<HashMap<String, i64>> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            if call == 0 {
                Ok(HashMap::from([("HYPERION".to_string(), 1_000)]))
            } else {
                Err(ScannerError::Unsuccessful(0))
            }
        }

        async fn fetch_average(&self) -> ScannerResult<HashMap<String, i64>> {
            Ok(HashMap::from([("HYPERION".to_string(), 900)]))
        }
    }

    #[tokio::test]
    async fn test_failed_feed_keeps_previous_map() {
        let cache = Arc::new(PriceCache::new());
        let refresher = PriceRefresher::new(
            Arc::new(FlakyPrices {
                calls: AtomicUsize::new(0),
            }),
            cache.clone(),
            HealthChecker::new(),
            PipelineMetrics::new().unwrap(),
            Duration::from_secs(60),
        );

        let first = refresher.refresh_once().await;
        assert!(first.lowest_ok && first.average_ok);
        assert_eq!(first.entries, 1);

        let second = refresher.refresh_once().await;
        assert!(!second.lowest_ok);
        assert!(second.average_ok);
        assert_eq!(cache.lookup("HYPERION").map(|p| p.lowest), Some(1_000));
        assert_eq!(cache.lookup("HYPERION").map(|p| p.average), Some(900));
    }
}
