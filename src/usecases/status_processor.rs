//! Status processor: command parser -> recommendation service -> composer -> image cache.
//!
//! Stateless per call. Recommendation failures are returned to the caller, which
//! decides whether to keep listening.

use crate::domain::{
    CommandParser, DomainError, ProcessResult, RecommendationQuery, ResponseComposer,
};
use crate::ports::RecommendationPort;
use crate::usecases::ImageResolver;
use std::sync::Arc;
use tracing::info;

pub struct StatusProcessor {
    parser: CommandParser,
    composer: ResponseComposer,
    images: ImageResolver,
    recommender: Arc<dyn RecommendationPort>,
}

impl StatusProcessor {
    pub fn new(
        parser: CommandParser,
        composer: ResponseComposer,
        images: ImageResolver,
        recommender: Arc<dyn RecommendationPort>,
    ) -> Self {
        Self {
            parser,
            composer,
            images,
            recommender,
        }
    }

    /// Process one status text into (reply, items, image file).
    pub async fn process_text(&self, text: &str) -> Result<ProcessResult, DomainError> {
        let Some(username) = self.parser.parse(text) else {
            return Ok(ProcessResult::empty());
        };

        info!(
            username = %username,
            base_url = %self.composer.base_url(),
            "recommending games"
        );

        let query = RecommendationQuery::for_user(username.as_str());
        let items = self.recommender.recommend(&query).await?;

        let Some(reply) = self.composer.compose(&items, &username) else {
            info!(username = %username, "unable to create recommendations");
            return Ok(ProcessResult::empty());
        };

        let image_url = items.first().and_then(|item| item.first_image_url());
        let image_file = self.images.find_image_file(image_url).await;

        Ok(ProcessResult {
            reply: Some(reply),
            items,
            image_file,
        })
    }
}
