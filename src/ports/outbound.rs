//! Outbound ports. Application calls into infrastructure.
//!
//! Implemented by adapters.

use crate::domain::{
    DomainError, InboundStatus, MediaAttachment, MediaId, RecommendationItem, RecommendationQuery,
};

/// Recommendation service client.
#[async_trait::async_trait]
pub trait RecommendationPort: Send + Sync {
    /// Fetch the full, ordered result set for `query`. At most `query.max_results` items.
    async fn recommend(
        &self,
        query: &RecommendationQuery,
    ) -> Result<Vec<RecommendationItem>, DomainError>;
}

/// Platform write API. Posts threaded replies on behalf of the bot account.
#[async_trait::async_trait]
pub trait ReplyPoster: Send + Sync {
    /// Id of the authenticated bot account. Used to skip the bot's own statuses.
    async fn account_id(&self) -> Result<String, DomainError>;

    /// Upload a local file as a media attachment.
    async fn upload_media(&self, media: &MediaAttachment) -> Result<MediaId, DomainError>;

    /// Post `text` as a reply threaded to `to`, optionally with one attachment.
    ///
    /// Adapters post replies with reduced reach (unlisted on Mastodon).
    async fn post_reply(
        &self,
        to: &InboundStatus,
        text: &str,
        media: Option<MediaId>,
    ) -> Result<(), DomainError>;
}
