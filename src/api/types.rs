use serde::{Deserialize, Serialize};

/// One auction as reported by the listing source. Unknown fields are ignored.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Listing {
    pub uuid: String,
    pub item_name: String,
    #[serde(default)]
    pub item_lore: String,
    pub starting_bid: i64,
    #[serde(default)]
    pub bin: bool,
    #[serde(default)]
    pub last_updated: i64,
    #[serde(default)]
    pub end: i64,
    #[serde(default)]
    pub tier: String,
}

/// Wire shape of a page. Auctions stay untyped so one bad entry does not
/// poison the whole page.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RawAuctionPage {
    pub success: bool,
    #[serde(default)]
    pub page: u32,
    #[serde(default)]
    pub total_pages: u32,
    #[serde(default)]
    pub total_auctions: u64,
    #[serde(default)]
    pub last_updated: i64,
    #[serde(default)]
    pub auctions: Vec<serde_json::Value>,
}

#[derive(Debug, Clone, Default)]
pub struct AuctionPage {
    pub page: u32,
    pub total_pages: u32,
    pub total_auctions: u64,
    pub last_updated: i64,
    pub listings: Vec<Listing>,
    pub malformed: usize,
}
