//! Static recommendation adapter for offline dry runs and tests.
//!
//! Returns the same items for every user without touching the network.

use crate::domain::{DomainError, RecommendationItem, RecommendationQuery};
use crate::ports::RecommendationPort;
use tracing::info;

pub struct StaticRecommendations {
    items: Vec<RecommendationItem>,
}

impl StaticRecommendations {
    pub fn new(items: Vec<RecommendationItem>) -> Self {
        Self { items }
    }

    /// A few well-known games, used by `--offline`.
    pub fn sample() -> Self {
        Self::new(
            ["Brass: Birmingham", "Gloomhaven", "Terraforming Mars", "Ark Nova", "Azul"]
                .into_iter()
                .map(RecommendationItem::new)
                .collect(),
        )
    }
}

#[async_trait::async_trait]
impl RecommendationPort for StaticRecommendations {
    async fn recommend(
        &self,
        query: &RecommendationQuery,
    ) -> Result<Vec<RecommendationItem>, DomainError> {
        info!(user = %query.user, "[STATIC] returning canned recommendations");
        Ok(self.items.iter().take(query.max_results).cloned().collect())
    }
}
