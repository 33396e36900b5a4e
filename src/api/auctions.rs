use async_trait::async_trait;
use reqwest::Client;

use super::types::{AuctionPage, Listing, RawAuctionPage};
use crate::core::config::AuctionConfig;
use crate::core::{ScannerError, ScannerResult};

/// Paginated auction listing. Page 0 doubles as the cheap freshness probe.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ListingSource: Send + Sync {
    async fn fetch_page(&self, page: u32) -> ScannerResult<AuctionPage>;
}

pub struct AuctionClient {
    client: Client,
    base_url: String,
}

impl AuctionClient {
    pub fn new(config: &AuctionConfig) -> ScannerResult<Self> {
        let client = Client::builder()
            .timeout(config.request_timeout())
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.clone(),
        })
    }
}

#[async_trait]
impl ListingSource for AuctionClient {
    async fn fetch_page(&self, page: u32) -> ScannerResult<AuctionPage> {
        let response = self
            .client
            .get(&self.base_url)
            .query(&[("page", page)])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ScannerError::Status {
                status: status.as_u16(),
                url: format!("{}?page={}", self.base_url, page),
            });
        }

        let body = response.text().await?;
        decode_page(page, &body)
    }
}

/// Decodes a page body, dropping listings that fail to deserialize.
pub fn decode_page(requested: u32, body: &str) -> ScannerResult<AuctionPage> {
    let raw: RawAuctionPage = serde_json::from_str(body)?;
    if !raw.success {
        return Err(ScannerError::Unsuccessful(requested));
    }

    let mut listings = Vec::with_capacity(raw.auctions.len());
    let mut malformed = 0;
    for value in raw.auctions {
        match serde_json::from_value::<Listing>(value) {
            Ok(listing) => listings.push(listing),
            Err(e) => {
                malformed += 1;
                tracing::debug!(page = requested, "Skipping malformed listing: {}", e);
            }
        }
    }

    if malformed > 0 {
        tracing::warn!(page = requested, malformed, "Dropped malformed listings");
    }

    Ok(AuctionPage {
        page: raw.page,
        total_pages: raw.total_pages,
        total_auctions: raw.total_auctions,
        last_updated: raw.last_updated,
        listings,
        malformed,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_page_skips_malformed_listing() {
        let body = r#"{
            "success": true,
            "page": 3,
            "totalPages": 40,
            "totalAuctions": 39000,
            "lastUpdated": 1700000000000,
            "auctions": [
                {"uuid": "a1", "item_name": "Hyperion", "item_lore": "LEGENDARY", "starting_bid": 900000000, "bin": true, "end": 1700000500000, "coop": ["x"]},
                {"uuid": "a2", "item_name": "Broken", "starting_bid": "not a number"},
                {"uuid": "a3", "item_name": "Aspect of the End", "starting_bid": 50000}
            ]
        }"#;

        let page = decode_page(3, body).unwrap();
        assert_eq!(page.page, 3);
        assert_eq!(page.total_pages, 40);
        assert_eq!(page.last_updated, 1_700_000_000_000);
        assert_eq!(page.malformed, 1);
        assert_eq!(page.listings.len(), 2);
        assert!(page.listings[0].bin);
        assert!(!page.listings[1].bin);
        assert_eq!(page.listings[1].item_lore, "");
    }

    #[test]
    fn test_decode_page_unsuccessful() {
        let body = r#"{"success": false, "cause": "Page not found"}"#;
        assert!(matches!(
            decode_page(99, body),
            Err(ScannerError::Unsuccessful(99))
        ));
    }

    #[test]
    fn test_decode_page_garbage() {
        assert!(matches!(decode_page(0, "<html>"), Err(ScannerError::Decode(_))));
    }
}
