pub mod webhook;

use async_trait::async_trait;

use crate::core::ScannerResult;
use crate::store::Flip;

pub use webhook::WebhookNotifier;

/// Outbound, fire-and-forget delivery of newly detected flips.
#[async_trait]
pub trait FlipNotifier: Send + Sync {
    async fn notify(&self, flips: &[Flip]) -> ScannerResult<()>;
}

/// Used when no webhook is configured.
pub struct NoopNotifier;

#[async_trait]
impl FlipNotifier for NoopNotifier {
    async fn notify(&self, flips: &[Flip]) -> ScannerResult<()> {
        tracing::trace!("Notification disabled, dropping {} flips", flips.len());
        Ok(())
    }
}
