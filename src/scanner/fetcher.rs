use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, Semaphore};
use tokio::task::JoinSet;

use crate::api::{AuctionPage, Listing, ListingSource};
use crate::core::{PipelineMetrics, ScannerError, ScannerResult};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FetchReport {
    pub pages_ok: u32,
    pub pages_failed: u32,
    pub listings: usize,
}

#[derive(Debug, Clone)]
pub struct FetcherConfig {
    pub max_in_flight: usize,
    pub page_retries: u32,
    pub retry_backoff: Duration,
}

impl Default for FetcherConfig {
    fn default() -> Self {
        Self {
            max_in_flight: 15,
            page_retries: 2,
            retry_backoff: Duration::from_millis(250),
        }
    }
}

/// Fetches listing pages with a bounded number of requests in flight.
#[derive(Clone)]
pub struct PageFetcher {
    source: Arc<dyn ListingSource>,
    semaphore: Arc<Semaphore>,
    config: FetcherConfig,
    metrics: PipelineMetrics,
}

impl PageFetcher {
    pub fn new(source: Arc<dyn ListingSource>, config: FetcherConfig, metrics: PipelineMetrics) -> Self {
        Self {
            semaphore: Arc::new(Semaphore::new(config.max_in_flight.max(1))),
            source,
            config,
            metrics,
        }
    }

    pub fn source(&self) -> &Arc<dyn ListingSource> {
        &self.source
    }

    /// Fetches one page, retrying up to `page_retries` extra times.
    pub async fn fetch_page(&self, page: u32) -> ScannerResult<AuctionPage> {
        let attempts = self.config.page_retries + 1;
        let mut attempt = 1;

        loop {
            match self.source.fetch_page(page).await {
                Ok(result) => return Ok(result),
                Err(e) if attempt < attempts => {
                    tracing::debug!(page, attempt, "Page fetch failed, retrying: {}", e);
                    attempt += 1;
                    tokio::time::sleep(self.config.retry_backoff).await;
                }
                Err(e) => {
                    return Err(ScannerError::RetriesExhausted {
                        page,
                        attempts,
                        source: Box::new(e),
                    })
                }
            }
        }
    }

    /// Fetches pages `1..total_pages` and forwards each page's listings to
    /// `sink` as soon as that page lands. Returns once every page has
    /// succeeded or exhausted its retries; a failed page contributes nothing.
    pub async fn fetch_all(&self, total_pages: u32, sink: mpsc::Sender<Vec<Listing>>) -> FetchReport {
        let mut tasks = JoinSet::new();

        for page in 1..total_pages {
            let fetcher = self.clone();
            let sink = sink.clone();

            tasks.spawn(async move {
                let permit = fetcher.semaphore.clone().acquire_owned().await.ok();
                let result = fetcher.fetch_page(page).await;
                drop(permit);

                match result {
                    Ok(fetched) => {
                        let count = fetched.listings.len();
                        fetcher.metrics.pages_fetched.inc();
                        fetcher.metrics.listings_received.inc_by(count as u64);
                        fetcher.metrics.listings_malformed.inc_by(fetched.malformed as u64);
                        if sink.send(fetched.listings).await.is_err() {
                            tracing::warn!(page, "Listing consumer gone, dropping page");
                        }
                        Some(count)
                    }
                    Err(e) => {
                        fetcher.metrics.pages_failed.inc();
                        tracing::warn!(page, "Page fetch failed: {}", e);
                        None
                    }
                }
            });
        }
        drop(sink);

        let mut report = FetchReport::default();
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(Some(count)) => {
                    report.pages_ok += 1;
                    report.listings += count;
                }
                Ok(None) => report.pages_failed += 1,
                Err(e) => {
                    report.pages_failed += 1;
                    tracing::error!("Page task panicked: {}", e);
                }
            }
        }

        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::collections::HashSet;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    struct SlowSource {
        in_flight: AtomicUsize,
        peak: AtomicUsize,
        calls: Mutex<Vec<u32>>,
        failing: HashSet<u32>,
    }

    impl SlowSource {
        fn new(failing: &[u32]) -> Self {
            Self {
                in_flight: AtomicUsize::new(0),
                peak: AtomicUsize::new(0),
                calls: Mutex::new(Vec::new()),
                failing: failing.iter().copied().collect(),
            }
        }
    }

    #[async_trait]
    impl ListingSource for SlowSource {
        async fn fetch_page(&self, page: u32) -> ScannerResult<AuctionPage> {
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(now, Ordering::SeqCst);
            self.calls.lock().unwrap().push(page);
            tokio::time::sleep(Duration::from_millis(10)).await;
            self.in_flight.fetch_sub(1, Ordering::SeqCst);

            if self.failing.contains(&page) {
                return Err(ScannerError::Unsuccessful(page));
            }
            Ok(AuctionPage {
                page,
                total_pages: 12,
                listings: vec![Listing {
                    uuid: format!("listing-{}", page),
                    item_name: "Hyperion".to_string(),
                    item_lore: String::new(),
                    starting_bid: 1,
                    bin: true,
                    last_updated: 0,
                    end: 0,
                    tier: String::new(),
                }],
                ..Default::default()
            })
        }
    }

    fn fetcher(source: Arc<SlowSource>, max_in_flight: usize) -> PageFetcher {
        PageFetcher::new(
            source,
            FetcherConfig {
                max_in_flight,
                page_retries: 1,
                retry_backoff: Duration::from_millis(1),
            },
            PipelineMetrics::new().unwrap(),
        )
    }

    #[tokio::test]
    async fn test_fetch_all_bounds_in_flight_and_skips_probe_page() {
        let source = Arc::new(SlowSource::new(&[]));
        let fetcher = fetcher(source.clone(), 3);
        let (tx, mut rx) = mpsc::channel(64);

        let report = fetcher.fetch_all(12, tx).await;
        assert_eq!(report.pages_ok, 11);
        assert_eq!(report.pages_failed, 0);
        assert_eq!(report.listings, 11);
        assert!(source.peak.load(Ordering::SeqCst) <= 3);

        let mut received = 0;
        while let Some(batch) = rx.recv().await {
            received += batch.len();
        }
        assert_eq!(received, 11);
        assert!(!source.calls.lock().unwrap().contains(&0));
    }

    #[tokio::test]
    async fn test_failed_page_does_not_abort_siblings() {
        let source = Arc::new(SlowSource::new(&[4, 7]));
        let fetcher = fetcher(source.clone(), 5);
        let (tx, mut rx) = mpsc::channel(64);

        let report = fetcher.fetch_all(10, tx).await;
        assert_eq!(report.pages_ok, 7);
        assert_eq!(report.pages_failed, 2);

        let mut batches = 0;
        while rx.recv().await.is_some() {
            batches += 1;
        }
        assert_eq!(batches, 7);

        // Each failing page was tried once plus one retry.
        let calls = source.calls.lock().unwrap();
        assert_eq!(calls.iter().filter(|p| **p == 4).count(), 2);
    }

    #[tokio::test]
    async fn test_single_page_snapshot_fetches_nothing() {
        let source = Arc::new(SlowSource::new(&[]));
        let fetcher = fetcher(source.clone(), 5);
        let (tx, mut rx) = mpsc::channel(1);

        let report = fetcher.fetch_all(1, tx).await;
        assert_eq!(report, FetchReport::default());
        assert!(rx.recv().await.is_none());
    }

    #[tokio::test]
    async fn test_fetch_page_reports_exhausted_retries() {
        let source = Arc::new(SlowSource::new(&[2]));
        let fetcher = fetcher(source, 1);
        let err = fetcher.fetch_page(2).await.unwrap_err();
        assert!(matches!(
            err,
            ScannerError::RetriesExhausted { page: 2, attempts: 2, .. }
        ));
    }
}
