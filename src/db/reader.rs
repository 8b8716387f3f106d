//! Read-only access to the content store
//!
//! The recommendation engine never writes. Every call here is a single
//! filtered, ordered, limited read against the platform's relational store;
//! the engine composes them and keeps no state between requests.

use uuid::Uuid;

use crate::{
    error::AppResult,
    models::{EngagementSignal, Item, User},
};

/// Ordering applied to eligible-item reads
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemOrdering {
    /// `average_rating` desc, then `view_count` desc
    Quality,
    /// `average_rating` desc only
    Rating,
}

/// Filter for published items not authored by `exclude_owner`
#[derive(Debug, Clone, PartialEq)]
pub struct CandidateQuery {
    pub exclude_owner: Uuid,
    /// Restrict to these categories; `None` means catalog-wide
    pub categories: Option<Vec<Uuid>>,
    pub ordering: ItemOrdering,
    pub limit: usize,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait StoreReader: Send + Sync {
    /// Ratings by `user_id` with `rating >= min_rating`, joined with their item
    async fn strong_ratings(
        &self,
        user_id: Uuid,
        min_rating: i16,
    ) -> AppResult<Vec<EngagementSignal>>;

    /// Bookmarks by `user_id`, joined with their item
    async fn bookmarks(&self, user_id: Uuid) -> AppResult<Vec<EngagementSignal>>;

    /// Live comments by `user_id`, one row per comment, joined with their item
    async fn comments(&self, user_id: Uuid) -> AppResult<Vec<EngagementSignal>>;

    /// Published items matching `query`, ordered as requested.
    ///
    /// Items without a rating sort after every rated item. Ties left by the
    /// ordering keep the store's stable order.
    async fn eligible_items(&self, query: CandidateQuery) -> AppResult<Vec<Item>>;

    /// Batch profile read; result order is unspecified
    async fn users_by_ids(&self, ids: &[Uuid]) -> AppResult<Vec<User>>;

    /// Active users other than `exclude`, most followed first, then by id
    async fn active_users(&self, exclude: Uuid, limit: usize) -> AppResult<Vec<User>>;

    async fn user_by_id(&self, id: Uuid) -> AppResult<Option<User>>;

    /// Backend name for logging
    fn name(&self) -> &'static str;
}
