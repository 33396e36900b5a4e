use anyhow::{Context, Result};
use auction_flip_scanner::api::{AuctionClient, PriceFeedClient};
use auction_flip_scanner::catalog::ItemCatalog;
use auction_flip_scanner::core::{logging, Config, HealthChecker, PipelineMetrics};
use auction_flip_scanner::notify::{FlipNotifier, NoopNotifier, WebhookNotifier};
use auction_flip_scanner::pricing::{PriceCache, PriceRefresher};
use auction_flip_scanner::scanner::{
    FetcherConfig, FlipDetector, FlipPipeline, PageFetcher, RefreshScheduler, SchedulerConfig,
    SeenListings,
};
use auction_flip_scanner::server::{self, AppState};
use auction_flip_scanner::store::FlipStore;
use std::sync::Arc;
use std::time::Duration;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration
    let config = Config::from_env()?;

    // Initialize logging
    logging::init_logging(&config.server.log_level);

    tracing::info!("🚀 Auction flip scanner starting...");
    tracing::info!("Version: {}", env!("CARGO_PKG_VERSION"));
    tracing::info!("Auctions endpoint: {}", config.auctions.base_url);

    let metrics = PipelineMetrics::new().context("failed to register metrics")?;
    let health = HealthChecker::new();

    let catalog = match ItemCatalog::from_path(&config.flips.items_path) {
        Ok(catalog) => {
            tracing::info!("📦 Loaded {} catalog entries", catalog.len());
            catalog
        }
        Err(e) => {
            tracing::warn!(
                "Could not load item catalog from {}, only overrides will resolve: {}",
                config.flips.items_path,
                e
            );
            ItemCatalog::default()
        }
    };

    let timeout = config.auctions.request_timeout();
    let auctions = Arc::new(
        AuctionClient::new(&config.auctions).context("failed to build auction client")?,
    );
    let price_feeds = Arc::new(
        PriceFeedClient::new(&config.prices, timeout).context("failed to build price feed client")?,
    );

    // Prices first, so the first cycle has something to compare against
    let prices = Arc::new(PriceCache::new());
    let refresher = Arc::new(PriceRefresher::new(
        price_feeds,
        prices.clone(),
        health.clone(),
        metrics.clone(),
        Duration::from_secs(config.prices.refresh_interval_secs.max(1)),
    ));
    let _price_task = refresher.start().await;
    tracing::info!("💰 Price cache loaded with {} entries", prices.len());

    let seen = Arc::new(SeenListings::new(Duration::from_secs(
        config.flips.seen_fallback_secs,
    )));
    let store = FlipStore::new(config.flips.retention());

    let notifier: Arc<dyn FlipNotifier> = match &config.notify.webhook_url {
        Some(url) => {
            tracing::info!("🔔 Webhook notifications enabled");
            Arc::new(WebhookNotifier::new(url.clone(), timeout)?)
        }
        None => Arc::new(NoopNotifier),
    };

    let detector = Arc::new(FlipDetector::new(
        seen.clone(),
        prices,
        Arc::new(catalog),
        store.clone(),
        notifier,
        metrics.clone(),
        config.flips.min_profit,
    ));

    let fetcher = PageFetcher::new(
        auctions,
        FetcherConfig {
            max_in_flight: config.auctions.max_in_flight,
            page_retries: config.auctions.page_retries,
            ..FetcherConfig::default()
        },
        metrics.clone(),
    );

    let pipeline = Arc::new(FlipPipeline::new(
        fetcher,
        detector,
        seen,
        store.clone(),
        health.clone(),
        metrics.clone(),
        Duration::from_secs(config.flips.store_horizon_secs),
    ));

    let scheduler = Arc::new(RefreshScheduler::new(
        pipeline,
        health.clone(),
        metrics.clone(),
        SchedulerConfig {
            check_interval: config.auctions.check_interval(),
            min_refresh_interval: config.auctions.min_refresh_interval(),
        },
    ));
    let _scheduler_task = scheduler.spawn();

    let state = AppState {
        store,
        health,
        metrics,
    };
    server::serve(state, config.server.port).await;

    Ok(())
}
