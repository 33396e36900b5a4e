pub mod auctions;
pub mod prices;
pub mod types;

pub use auctions::{decode_page, AuctionClient, ListingSource};
pub use prices::{PriceFeedClient, PriceSource};
pub use types::*;
