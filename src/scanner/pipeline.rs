use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;
use tokio::task::{JoinHandle, JoinSet};

use super::detector::FlipDetector;
use super::fetcher::{FetchReport, PageFetcher};
use super::seen::SeenListings;
use crate::api::{AuctionPage, Listing};
use crate::core::{now_ms, HealthChecker, PipelineMetrics};
use crate::store::FlipStore;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CycleReport {
    pub last_updated: i64,
    pub fetch: FetchReport,
    pub flips: usize,
    pub seen_pruned: usize,
    pub flips_compacted: usize,
}

/// One full pass over a listing snapshot: fetch every page, run detection on
/// each page as it arrives, then housekeeping.
pub struct FlipPipeline {
    fetcher: PageFetcher,
    detector: Arc<FlipDetector>,
    seen: Arc<SeenListings>,
    store: FlipStore,
    health: HealthChecker,
    metrics: PipelineMetrics,
    store_horizon: Duration,
}

impl FlipPipeline {
    pub fn new(
        fetcher: PageFetcher,
        detector: Arc<FlipDetector>,
        seen: Arc<SeenListings>,
        store: FlipStore,
        health: HealthChecker,
        metrics: PipelineMetrics,
        store_horizon: Duration,
    ) -> Self {
        Self {
            fetcher,
            detector,
            seen,
            store,
            health,
            metrics,
            store_horizon,
        }
    }

    pub fn fetcher(&self) -> &PageFetcher {
        &self.fetcher
    }

    /// Runs a cycle in the background. Cycles are never cancelled; an older
    /// one still finishing while a newer one starts is fine because pages are
    /// independently useful and the seen set keeps them from double counting.
    pub fn spawn_cycle(self: &Arc<Self>, probe: AuctionPage) -> JoinHandle<CycleReport> {
        let pipeline = self.clone();
        tokio::spawn(async move { pipeline.run_cycle(probe).await })
    }

    pub async fn run_cycle(&self, probe: AuctionPage) -> CycleReport {
        let started = Instant::now();
        let last_updated = probe.last_updated;
        let total_pages = probe.total_pages.max(1);
        self.metrics.cycles_started.inc();

        tracing::info!(
            last_updated,
            total_pages,
            "Fetching auction snapshot"
        );

        let (tx, mut rx) = mpsc::channel::<Vec<Listing>>(total_pages as usize);

        let detector = self.detector.clone();
        let consumer = tokio::spawn(async move {
            let mut detections = JoinSet::new();
            while let Some(batch) = rx.recv().await {
                let detector = detector.clone();
                detections.spawn(async move { detector.process_batch(&batch).await.len() });
            }

            let mut flips = 0;
            while let Some(joined) = detections.join_next().await {
                match joined {
                    Ok(count) => flips += count,
                    Err(e) => tracing::error!("Detection task panicked: {}", e),
                }
            }
            flips
        });

        // The probe page belongs to the same snapshot; its listings are
        // already in hand.
        let probe_listings = probe.listings.len();
        self.metrics.listings_received.inc_by(probe_listings as u64);
        self.metrics.listings_malformed.inc_by(probe.malformed as u64);
        if tx.send(probe.listings).await.is_err() {
            tracing::warn!("Detection consumer stopped before the probe page was delivered");
        }

        let fetch = self.fetcher.fetch_all(total_pages, tx).await;

        let flips = consumer.await.unwrap_or_else(|e| {
            tracing::error!("Detection consumer panicked: {}", e);
            0
        });

        let now = now_ms();
        let seen_pruned = self.seen.prune(now).await;
        let flips_compacted = self.store.compact(self.store_horizon, now).await;

        self.metrics.seen_listings.set(self.seen.len().await as i64);
        self.metrics.flip_store_size.set(self.store.len().await as i64);
        self.health.update_component("fetch_cycle_completed", true).await;

        tracing::info!(
            pages_ok = fetch.pages_ok + 1,
            pages_failed = fetch.pages_failed,
            listings = fetch.listings + probe_listings,
            flips,
            seen_pruned,
            flips_compacted,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Auction snapshot processed"
        );

        CycleReport {
            last_updated,
            fetch,
            flips,
            seen_pruned,
            flips_compacted,
        }
    }
}
