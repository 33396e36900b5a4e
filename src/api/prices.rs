use async_trait::async_trait;
use reqwest::Client;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::str::FromStr;
use std::time::Duration;

use crate::core::config::PriceFeedConfig;
use crate::core::{ScannerError, ScannerResult};

/// The two reference feeds, each catalog id -> integer currency units.
#[async_trait]
pub trait PriceSource: Send + Sync {
    async fn fetch_lowest(&self) -> ScannerResult<HashMap<String, i64>>;
    async fn fetch_average(&self) -> ScannerResult<HashMap<String, i64>>;
}

pub struct PriceFeedClient {
    client: Client,
    lowest_bin_url: String,
    average_url: String,
}

impl PriceFeedClient {
    pub fn new(config: &PriceFeedConfig, timeout: Duration) -> ScannerResult<Self> {
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            lowest_bin_url: config.lowest_bin_url.clone(),
            average_url: config.average_url.clone(),
        })
    }

    async fn fetch_feed(&self, url: &str) -> ScannerResult<HashMap<String, i64>> {
        let response = self.client.get(url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ScannerError::Status {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let body = response.text().await?;
        parse_price_feed(&body)
    }
}

#[async_trait]
impl PriceSource for PriceFeedClient {
    async fn fetch_lowest(&self) -> ScannerResult<HashMap<String, i64>> {
        tracing::debug!("Fetching lowest BIN feed");
        self.fetch_feed(&self.lowest_bin_url).await
    }

    async fn fetch_average(&self) -> ScannerResult<HashMap<String, i64>> {
        tracing::debug!("Fetching average lowest BIN feed");
        self.fetch_feed(&self.average_url).await
    }
}

/// Parses a `{ id: number }` feed. Numbers keep their literal text
/// (`arbitrary_precision`), so nothing is rounded through `f64`.
pub fn parse_price_feed(body: &str) -> ScannerResult<HashMap<String, i64>> {
    let raw: HashMap<String, serde_json::Value> = serde_json::from_str(body)?;

    let mut prices = HashMap::with_capacity(raw.len());
    let mut skipped = 0usize;
    for (id, value) in raw {
        let parsed = match &value {
            serde_json::Value::Number(n) => parse_price(&n.to_string()),
            _ => None,
        };
        match parsed {
            Some(price) => {
                prices.insert(id, price);
            }
            None => skipped += 1,
        }
    }

    if skipped > 0 {
        tracing::debug!(skipped, "Skipped unusable price entries");
    }

    Ok(prices)
}

/// Truncates a decimal literal toward zero. Negative or out-of-range values
/// are rejected.
pub fn parse_price(literal: &str) -> Option<i64> {
    let value = Decimal::from_str(literal)
        .or_else(|_| Decimal::from_scientific(literal))
        .ok()?;
    if value.is_sign_negative() && !value.is_zero() {
        return None;
    }
    value.trunc().to_i64()
}
