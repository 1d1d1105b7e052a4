//! Report delivery trait

use async_trait::async_trait;

/// A channel the formatted report is delivered to (console, chat, ...)
///
/// Delivery failures are reported to the caller, which logs them; they never
/// affect the checkpoint or the run's outcome.
#[async_trait]
pub trait Reporter: Send + Sync {
    /// Deliver a report
    async fn deliver(&self, text: &str) -> Result<(), crate::Error>;

    /// Channel name (for logging)
    fn name(&self) -> &'static str;
}
