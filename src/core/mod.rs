pub mod config;
pub mod error;
pub mod health;
pub mod logging;
pub mod metrics;

pub use config::Config;
pub use error::{ScannerError, ScannerResult};
pub use health::HealthChecker;
pub use metrics::PipelineMetrics;

/// Wall-clock time in epoch milliseconds.
pub fn now_ms() -> i64 {
    chrono::Utc::now().timestamp_millis()
}
