use async_trait::async_trait;
use num_format::{Locale, ToFormattedString};
use reqwest::Client;
use serde_json::{json, Value};
use std::time::Duration;

use super::FlipNotifier;
use crate::core::{ScannerError, ScannerResult};
use crate::store::Flip;

/// Posts one Discord-style embed per flip.
pub struct WebhookNotifier {
    client: Client,
    url: String,
}

impl WebhookNotifier {
    pub fn new(url: String, timeout: Duration) -> ScannerResult<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client, url })
    }
}

#[async_trait]
impl FlipNotifier for WebhookNotifier {
    async fn notify(&self, flips: &[Flip]) -> ScannerResult<()> {
        let mut first_error = None;

        for flip in flips {
            let result = self.client.post(&self.url).json(&embed(flip)).send().await;
            let outcome = match result {
                Ok(response) if response.status().is_success() => Ok(()),
                Ok(response) => Err(ScannerError::Status {
                    status: response.status().as_u16(),
                    url: "webhook".to_string(),
                }),
                Err(e) => Err(ScannerError::Http(e)),
            };

            if let Err(e) = outcome {
                tracing::warn!(listing = %flip.listing_id, "Webhook delivery failed: {}", e);
                first_error.get_or_insert(e);
            }
        }

        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

pub fn embed(flip: &Flip) -> Value {
    let field = |name: &str, value: String| {
        json!({
            "name": name,
            "value": value,
            "inline": "true",
        })
    };

    json!({
        "content": null,
        "embeds": [{
            "title": "Auction Flip Detected",
            "fields": [
                field("Item:", flip.item_name.clone()),
                field("Profit:", format_coins(flip.profit)),
                field("Lowest BIN:", format_coins(flip.lowest_bin)),
                field("Price:", format_coins(flip.price)),
                field("Potential Manipulation:", flip.potential_manipulation.to_string()),
                field("Auction Id:", flip.listing_id.clone()),
            ],
        }],
        "attachments": [],
    })
}

/// `1234567` -> `"1,234,567"`.
pub fn format_coins(value: i64) -> String {
    value.to_formatted_string(&Locale::en)
}
