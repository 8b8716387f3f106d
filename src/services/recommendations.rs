use std::sync::Arc;

use tracing::instrument;
use uuid::Uuid;

use crate::{
    db::StoreReader,
    error::AppResult,
    models::{Item, User},
    services::{backfill, candidates, creators, engagement},
};

/// Generates personalized item and creator recommendations.
///
/// Stateless: every call reads the store afresh and owns all of its
/// intermediate sets. Steps run one after another because each read is
/// parameterized by the previous one; dropping the returned future stops
/// further reads.
#[derive(Clone)]
pub struct RecommendationService {
    store: Arc<dyn StoreReader>,
}

impl RecommendationService {
    pub fn new(store: Arc<dyn StoreReader>) -> Self {
        Self { store }
    }

    /// Items from the user's favourite categories, topped up with the
    /// best-rated items overall when those run short
    #[instrument(skip(self))]
    pub async fn recommend_items(&self, user_id: Uuid, limit: usize) -> AppResult<Vec<Item>> {
        if limit == 0 {
            return Ok(Vec::new());
        }
        let store = self.store.as_ref();

        let engagement = engagement::aggregate(store, user_id).await?;
        let pool =
            candidates::select(store, &engagement.affinity_categories, user_id, limit).await?;
        let pool_size = pool.len();
        let personalized = candidates::exclude(pool, &engagement.exclusion_items);

        tracing::debug!(
            candidates = pool_size,
            after_exclusion = personalized.len(),
            "Personalized candidates selected"
        );

        let items = backfill::fill(
            store,
            personalized,
            &engagement.exclusion_items,
            user_id,
            limit,
        )
        .await?;

        tracing::info!(count = items.len(), limit, "Item recommendations generated");
        Ok(items)
    }

    /// Creators the user engages with most, most frequent first
    #[instrument(skip(self))]
    pub async fn recommend_creators(&self, user_id: Uuid, limit: usize) -> AppResult<Vec<User>> {
        let users = creators::rank_creators(self.store.as_ref(), user_id, limit).await?;

        tracing::info!(count = users.len(), limit, "Creator recommendations generated");
        Ok(users)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::reader::MockStoreReader;
    use crate::error::AppError;

    #[tokio::test]
    async fn test_aggregation_failure_stops_pipeline() {
        let mut store = MockStoreReader::new();
        store
            .expect_strong_ratings()
            .returning(|_, _| Err(AppError::StoreUnavailable("refused".to_string())));
        store.expect_bookmarks().times(0);
        store.expect_eligible_items().times(0);

        let service = RecommendationService::new(Arc::new(store));
        let result = service.recommend_items(Uuid::new_v4(), 10).await;
        assert!(matches!(result, Err(AppError::StoreUnavailable(_))));
    }

    #[tokio::test]
    async fn test_zero_limit_reads_nothing() {
        let service = RecommendationService::new(Arc::new(MockStoreReader::new()));

        assert!(service.recommend_items(Uuid::new_v4(), 0).await.unwrap().is_empty());
        assert!(service
            .recommend_creators(Uuid::new_v4(), 0)
            .await
            .unwrap()
            .is_empty());
    }
}
