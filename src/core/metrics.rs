use prometheus::{Encoder, IntCounter, IntGauge, Opts, Registry, TextEncoder};

/// Pipeline counters exported on `/metrics`.
#[derive(Clone)]
pub struct PipelineMetrics {
    registry: Registry,
    pub cycles_started: IntCounter,
    pub probes_failed: IntCounter,
    pub pages_fetched: IntCounter,
    pub pages_failed: IntCounter,
    pub listings_received: IntCounter,
    pub listings_malformed: IntCounter,
    pub flips_detected: IntCounter,
    pub notifications_failed: IntCounter,
    pub flip_store_size: IntGauge,
    pub seen_listings: IntGauge,
    pub price_entries: IntGauge,
}

impl PipelineMetrics {
    pub fn new() -> prometheus::Result<Self> {
        let registry = Registry::new_custom(Some("flip_scanner".to_string()), None)?;

        let counter = |name: &str, help: &str| -> prometheus::Result<IntCounter> {
            let c = IntCounter::with_opts(Opts::new(name, help))?;
            registry.register(Box::new(c.clone()))?;
            Ok(c)
        };
        let gauge = |name: &str, help: &str| -> prometheus::Result<IntGauge> {
            let g = IntGauge::with_opts(Opts::new(name, help))?;
            registry.register(Box::new(g.clone()))?;
            Ok(g)
        };

        Ok(Self {
            cycles_started: counter("cycles_started_total", "Fetch cycles triggered")?,
            probes_failed: counter("probes_failed_total", "Failed page 0 probes")?,
            pages_fetched: counter("pages_fetched_total", "Pages fetched successfully")?,
            pages_failed: counter("pages_failed_total", "Pages that exhausted retries")?,
            listings_received: counter("listings_received_total", "Listings decoded from pages")?,
            listings_malformed: counter("listings_malformed_total", "Listings dropped while decoding")?,
            flips_detected: counter("flips_detected_total", "Flips appended to the store")?,
            notifications_failed: counter("notifications_failed_total", "Failed outbound notifications")?,
            flip_store_size: gauge("flip_store_size", "Flips currently held in memory")?,
            seen_listings: gauge("seen_listings", "Listing ids in the seen set")?,
            price_entries: gauge("price_entries", "Catalog ids with a lowest reference price")?,
            registry,
        })
    }

    pub fn render(&self) -> String {
        let mut buffer = Vec::new();
        let encoder = TextEncoder::new();
        if let Err(e) = encoder.encode(&self.registry.gather(), &mut buffer) {
            tracing::error!("Failed to encode metrics: {}", e);
            return String::new();
        }
        String::from_utf8(buffer).unwrap_or_default()
    }
}
