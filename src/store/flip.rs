use serde::{Deserialize, Serialize};

/// A fixed-price listing priced below its lowest reference by at least the
/// configured threshold. Immutable once created.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Flip {
    pub listing_id: String,
    pub item_name: String,
    pub price: i64,
    pub lowest_bin: i64,
    pub profit: i64,
    pub potential_manipulation: bool,
    /// Epoch millis.
    pub detected_at: i64,
}

impl Flip {
    pub fn is_cosmetic(&self) -> bool {
        self.item_name.contains("Skin")
    }
}

/// Query filters accepted by the serving layer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub struct FlipFilter {
    pub min_profit: i64,
    /// 0 means unbounded.
    pub max_price: i64,
    pub include_cosmetic: bool,
    pub include_manipulation_suspected: bool,
}

impl FlipFilter {
    pub fn matches(&self, flip: &Flip) -> bool {
        flip.profit > self.min_profit
            && (self.max_price == 0 || flip.price < self.max_price)
            && (self.include_cosmetic || !flip.is_cosmetic())
            && (self.include_manipulation_suspected || !flip.potential_manipulation)
    }
}
