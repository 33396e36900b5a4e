pub mod cache;
pub mod refresher;

pub use cache::{CatalogPrice, PriceCache, PriceSnapshot};
pub use refresher::{PriceRefresher, RefreshOutcome};
