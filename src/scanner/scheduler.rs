use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tokio::time::MissedTickBehavior;

use super::pipeline::FlipPipeline;
use crate::core::{HealthChecker, PipelineMetrics};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckOutcome {
    /// The minimum refresh interval has not elapsed; no probe was sent.
    Throttled,
    /// The snapshot has not changed since the last trigger.
    Unchanged,
    Triggered { last_updated: i64, total_pages: u32 },
    ProbeFailed,
}

#[derive(Debug, Clone)]
pub struct SchedulerConfig {
    pub check_interval: Duration,
    pub min_refresh_interval: Duration,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            check_interval: Duration::from_secs(1),
            min_refresh_interval: Duration::from_secs(55),
        }
    }
}

#[derive(Debug, Default)]
struct SchedulerState {
    last_updated: Option<i64>,
    last_trigger: Option<Instant>,
}

/// Decides when a new listing snapshot is worth fetching. The recorded
/// `lastUpdated` moves as soon as a cycle is triggered, so a check overlapping
/// a running cycle sees the snapshot as unchanged.
pub struct RefreshScheduler {
    pipeline: Arc<FlipPipeline>,
    health: HealthChecker,
    metrics: PipelineMetrics,
    config: SchedulerConfig,
    state: Mutex<SchedulerState>,
}

impl RefreshScheduler {
    pub fn new(
        pipeline: Arc<FlipPipeline>,
        health: HealthChecker,
        metrics: PipelineMetrics,
        config: SchedulerConfig,
    ) -> Self {
        Self {
            pipeline,
            health,
            metrics,
            config,
            state: Mutex::new(SchedulerState::default()),
        }
    }

    pub async fn last_updated(&self) -> Option<i64> {
        self.state.lock().await.last_updated
    }

    /// One scheduling decision. Holding the state lock across the probe keeps
    /// two concurrent checks from both triggering on the same snapshot.
    pub async fn check_once(&self) -> CheckOutcome {
        let mut state = self.state.lock().await;

        if let Some(last) = state.last_trigger {
            if last.elapsed() < self.config.min_refresh_interval {
                return CheckOutcome::Throttled;
            }
        }

        let probe = match self.pipeline.fetcher().source().fetch_page(0).await {
            Ok(page) => page,
            Err(e) => {
                self.metrics.probes_failed.inc();
                self.health.update_component("auction_api", false).await;
                tracing::warn!("Snapshot probe failed, retrying next check: {}", e);
                return CheckOutcome::ProbeFailed;
            }
        };
        self.health.update_component("auction_api", true).await;

        if state.last_updated == Some(probe.last_updated) {
            return CheckOutcome::Unchanged;
        }

        let outcome = CheckOutcome::Triggered {
            last_updated: probe.last_updated,
            total_pages: probe.total_pages,
        };
        tracing::debug!(
            previous = ?state.last_updated,
            current = probe.last_updated,
            "Listing snapshot changed"
        );

        state.last_updated = Some(probe.last_updated);
        state.last_trigger = Some(Instant::now());
        drop(state);

        // Fire and forget; a slow cycle never blocks the next check.
        let _cycle = self.pipeline.spawn_cycle(probe);
        outcome
    }

    /// Checks on a fixed ticker forever. Errors are handled inside
    /// `check_once`, so the loop itself never ends.
    pub async fn run(self: Arc<Self>) {
        tracing::info!(
            check_interval_ms = self.config.check_interval.as_millis() as u64,
            min_refresh_ms = self.config.min_refresh_interval.as_millis() as u64,
            "🕑 Refresh scheduler starting"
        );

        let mut interval = tokio::time::interval(self.config.check_interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            interval.tick().await;
            let outcome = self.check_once().await;
            if let CheckOutcome::Triggered { last_updated, total_pages } = outcome {
                tracing::info!(last_updated, total_pages, "Fetch cycle triggered");
            }
        }
    }

    pub fn spawn(self: Arc<Self>) -> tokio::task::JoinHandle<()> {
        tokio::spawn(self.run())
    }
}
