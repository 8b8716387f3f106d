//! In-memory store reader
//!
//! Holds a catalog, profiles and engagement rows in insertion order and answers
//! the same reads as the PostgreSQL store. Backs fixtures and integration
//! tests.
use std::sync::atomic::{AtomicBool, Ordering};

use uuid::Uuid;

use crate::{
    db::reader::{CandidateQuery, ItemOrdering, StoreReader},
    error::{AppError, AppResult},
    models::{EngagementSignal, Item, SignalKind, User},
    services::ranker,
};

#[derive(Debug, Clone)]
struct StoredSignal {
    user_id: Uuid,
    item_id: Uuid,
    kind: SignalKind,
    rating: Option<i16>,
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    items: Vec<Item>,
    users: Vec<User>,
    signals: Vec<StoredSignal>,
    unavailable: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_item(&mut self, item: Item) -> &mut Self {
        self.items.push(item);
        self
    }

    pub fn add_user(&mut self, user: User) -> &mut Self {
        self.users.push(user);
        self
    }

    /// Records a rating, replacing an earlier one for the same pair
    pub fn rate(&mut self, user_id: Uuid, item_id: Uuid, rating: i16) -> &mut Self {
        self.signals.retain(|s| {
            !(s.kind == SignalKind::Rating && s.user_id == user_id && s.item_id == item_id)
        });
        self.push_signal(user_id, item_id, SignalKind::Rating, Some(rating))
    }

    pub fn bookmark(&mut self, user_id: Uuid, item_id: Uuid) -> &mut Self {
        let exists = self.signals.iter().any(|s| {
            s.kind == SignalKind::Bookmark && s.user_id == user_id && s.item_id == item_id
        });
        if exists {
            return self;
        }
        self.push_signal(user_id, item_id, SignalKind::Bookmark, None)
    }

    pub fn comment(&mut self, user_id: Uuid, item_id: Uuid) -> &mut Self {
        self.push_signal(user_id, item_id, SignalKind::Comment, None)
    }

    /// Drops an item from the catalog while leaving its engagement rows behind
    pub fn remove_item(&mut self, item_id: Uuid) -> &mut Self {
        self.items.retain(|item| item.id != item_id);
        self
    }

    /// Makes every subsequent read fail, as if the database went away
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    fn push_signal(
        &mut self,
        user_id: Uuid,
        item_id: Uuid,
        kind: SignalKind,
        rating: Option<i16>,
    ) -> &mut Self {
        self.signals.push(StoredSignal {
            user_id,
            item_id,
            kind,
            rating,
        });
        self
    }

    fn ensure_available(&self) -> AppResult<()> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(AppError::StoreUnavailable(
                "memory store marked unavailable".to_string(),
            ));
        }
        Ok(())
    }

    fn joined_signals<F>(&self, user_id: Uuid, kind: SignalKind, keep: F) -> Vec<EngagementSignal>
    where
        F: Fn(&StoredSignal) -> bool,
    {
        self.signals
            .iter()
            .filter(|s| s.user_id == user_id && s.kind == kind && keep(*s))
            .map(|s| match self.items.iter().find(|item| item.id == s.item_id) {
                Some(item) => EngagementSignal::new(s.item_id, item.category_id, Some(item.owner_id)),
                None => EngagementSignal::orphaned(Some(s.item_id)),
            })
            .collect()
    }
}

#[async_trait::async_trait]
impl StoreReader for MemoryStore {
    async fn strong_ratings(
        &self,
        user_id: Uuid,
        min_rating: i16,
    ) -> AppResult<Vec<EngagementSignal>> {
        self.ensure_available()?;
        Ok(self.joined_signals(user_id, SignalKind::Rating, |s| {
            s.rating.is_some_and(|r| r >= min_rating)
        }))
    }

    async fn bookmarks(&self, user_id: Uuid) -> AppResult<Vec<EngagementSignal>> {
        self.ensure_available()?;
        Ok(self.joined_signals(user_id, SignalKind::Bookmark, |_| true))
    }

    async fn comments(&self, user_id: Uuid) -> AppResult<Vec<EngagementSignal>> {
        self.ensure_available()?;
        Ok(self.joined_signals(user_id, SignalKind::Comment, |_| true))
    }

    async fn eligible_items(&self, query: CandidateQuery) -> AppResult<Vec<Item>> {
        self.ensure_available()?;

        let mut items: Vec<Item> = self
            .items
            .iter()
            .filter(|item| item.is_eligible_for(query.exclude_owner))
            .filter(|item| match &query.categories {
                Some(categories) => item
                    .category_id
                    .is_some_and(|category| categories.contains(&category)),
                None => true,
            })
            .cloned()
            .collect();

        // sort_by is stable, so insertion order settles remaining ties
        match query.ordering {
            ItemOrdering::Quality => items.sort_by(ranker::by_quality),
            ItemOrdering::Rating => items.sort_by(ranker::by_rating),
        }
        items.truncate(query.limit);

        Ok(items)
    }

    async fn users_by_ids(&self, ids: &[Uuid]) -> AppResult<Vec<User>> {
        self.ensure_available()?;
        Ok(self
            .users
            .iter()
            .filter(|user| ids.contains(&user.id))
            .cloned()
            .collect())
    }

    async fn active_users(&self, exclude: Uuid, limit: usize) -> AppResult<Vec<User>> {
        self.ensure_available()?;

        let mut users: Vec<User> = self
            .users
            .iter()
            .filter(|user| user.is_active && user.id != exclude)
            .cloned()
            .collect();
        users.sort_by(|a, b| {
            b.total_followers
                .cmp(&a.total_followers)
                .then_with(|| a.id.cmp(&b.id))
        });
        users.truncate(limit);

        Ok(users)
    }

    async fn user_by_id(&self, id: Uuid) -> AppResult<Option<User>> {
        self.ensure_available()?;
        Ok(self.users.iter().find(|user| user.id == id).cloned())
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}
