//! Inbound ports. Platform streams push statuses into the application.

use crate::domain::{DomainError, InboundStatus};

/// A live stream of statuses, consumed one at a time.
#[async_trait::async_trait]
pub trait StatusSource: Send {
    /// Wait for the next status.
    ///
    /// `Ok(None)` means the stream ended cleanly. An `Err` is a stream-level failure
    /// (connection dropped, server error) and ends the listening loop.
    async fn next_status(&mut self) -> Result<Option<InboundStatus>, DomainError>;
}

/// Converts a platform status body into the plain text the command parser reads.
pub trait TextExtractor: Send + Sync {
    fn extract_text(&self, status: &InboundStatus) -> String;
}
