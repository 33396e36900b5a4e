use std::sync::Arc;

use super::seen::SeenListings;
use crate::api::Listing;
use crate::catalog::CatalogResolver;
use crate::core::{now_ms, PipelineMetrics};
use crate::notify::FlipNotifier;
use crate::pricing::{CatalogPrice, PriceCache};
use crate::store::{Flip, FlipStore};

/// Deviation from parity, in thousandths, at which the lowest price is no
/// longer trusted (±100%).
const MANIPULATION_BOUND_MILLI: i128 = 1000;

/// True when the lowest reference price is at least double the rolling
/// average, or at or below zero relative to it. Computed in fixed-point
/// thousandths; an unknown average is floored to 1.
pub fn is_manipulation_suspected(price: CatalogPrice) -> bool {
    let ratio_milli = price.lowest as i128 * 1000 / price.average_divisor() as i128;
    let deviation = 1000 - ratio_milli;
    deviation <= -MANIPULATION_BOUND_MILLI || deviation >= MANIPULATION_BOUND_MILLI
}

pub struct FlipDetector {
    seen: Arc<SeenListings>,
    prices: Arc<PriceCache>,
    resolver: Arc<dyn CatalogResolver>,
    store: FlipStore,
    notifier: Arc<dyn FlipNotifier>,
    metrics: PipelineMetrics,
    min_profit: i64,
}

impl FlipDetector {
    pub fn new(
        seen: Arc<SeenListings>,
        prices: Arc<PriceCache>,
        resolver: Arc<dyn CatalogResolver>,
        store: FlipStore,
        notifier: Arc<dyn FlipNotifier>,
        metrics: PipelineMetrics,
        min_profit: i64,
    ) -> Self {
        Self {
            seen,
            prices,
            resolver,
            store,
            notifier,
            metrics,
            min_profit,
        }
    }

    pub fn min_profit(&self) -> i64 {
        self.min_profit
    }

    /// Evaluates one batch (normally a page). Each listing id is evaluated at
    /// most once for the life of its listing; resulting flips are appended to
    /// the store in one step and handed to the notifier without waiting.
    pub async fn process_batch(&self, listings: &[Listing]) -> Vec<Flip> {
        let now = now_ms();

        let fixed_price: Vec<&Listing> = listings.iter().filter(|l| l.bin).collect();
        if fixed_price.is_empty() {
            return Vec::new();
        }

        let claimed = self.seen.claim(&fixed_price, now).await;
        if claimed.is_empty() {
            return Vec::new();
        }

        // One snapshot per batch so every listing sees the same prices.
        let prices = self.prices.snapshot();
        let flips: Vec<Flip> = claimed
            .into_iter()
            .filter_map(|listing| {
                let catalog_id = self.resolver.resolve(&listing.item_name, &listing.item_lore)?;
                let price = prices.lookup(&catalog_id)?;
                self.evaluate(listing, price, now)
            })
            .collect();

        if flips.is_empty() {
            return flips;
        }

        let stored = self.store.append(flips.clone()).await;
        self.metrics.flips_detected.inc_by(flips.len() as u64);
        self.metrics.flip_store_size.set(stored as i64);

        for flip in &flips {
            tracing::info!(
                listing = %flip.listing_id,
                item = %flip.item_name,
                price = flip.price,
                profit = flip.profit,
                manipulation = flip.potential_manipulation,
                "Flip detected"
            );
        }

        let notifier = self.notifier.clone();
        let metrics = self.metrics.clone();
        let outgoing = flips.clone();
        tokio::spawn(async move {
            if let Err(e) = notifier.notify(&outgoing).await {
                metrics.notifications_failed.inc();
                tracing::warn!("Flip notification failed: {}", e);
            }
        });

        flips
    }

    /// Profit check and manipulation flag for one listing against its
    /// reference prices.
    pub fn evaluate(&self, listing: &Listing, price: CatalogPrice, now: i64) -> Option<Flip> {
        if price.lowest <= 0 {
            return None;
        }

        let profit = price.lowest.checked_sub(listing.starting_bid)?;
        if profit < self.min_profit {
            return None;
        }

        Some(Flip {
            listing_id: listing.uuid.clone(),
            item_name: listing.item_name.clone(),
            price: listing.starting_bid,
            lowest_bin: price.lowest,
            profit,
            potential_manipulation: is_manipulation_suspected(price),
            detected_at: now,
        })
    }
}
