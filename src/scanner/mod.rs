pub mod detector;
pub mod fetcher;
pub mod pipeline;
pub mod scheduler;
pub mod seen;

pub use detector::{is_manipulation_suspected, FlipDetector};
pub use fetcher::{FetchReport, FetcherConfig, PageFetcher};
pub use pipeline::{CycleReport, FlipPipeline};
pub use scheduler::{CheckOutcome, RefreshScheduler, SchedulerConfig};
pub use seen::SeenListings;
