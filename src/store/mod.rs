pub mod flip;
pub mod flip_store;

pub use flip::{Flip, FlipFilter};
pub use flip_store::FlipStore;
