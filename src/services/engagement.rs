use std::collections::{BTreeSet, HashSet};

use uuid::Uuid;

use crate::{db::StoreReader, error::AppResult, models::EngagementSignal};

/// Lowest rating that counts as a strong positive signal
pub const MIN_POSITIVE_RATING: i16 = 4;

/// What a user's ratings and bookmarks say about them
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Engagement {
    /// Categories of items the user rated highly or bookmarked
    pub affinity_categories: BTreeSet<Uuid>,
    /// Items the user already rated highly or bookmarked
    pub exclusion_items: HashSet<Uuid>,
}

impl Engagement {
    fn absorb(&mut self, signals: &[EngagementSignal]) {
        for signal in signals {
            if let Some(category_id) = signal.category_id {
                self.affinity_categories.insert(category_id);
            }
            if let Some(item_id) = signal.item_id {
                self.exclusion_items.insert(item_id);
            }
        }
    }
}

/// Collects affinity categories and already-seen items for `user_id`.
///
/// Signals whose item no longer resolves still exclude that item but add no
/// category. Any failed read fails the whole aggregation.
pub async fn aggregate(store: &dyn StoreReader, user_id: Uuid) -> AppResult<Engagement> {
    let ratings = store.strong_ratings(user_id, MIN_POSITIVE_RATING).await?;
    let bookmarks = store.bookmarks(user_id).await?;

    let mut engagement = Engagement::default();
    engagement.absorb(&ratings);
    engagement.absorb(&bookmarks);

    tracing::debug!(
        user_id = %user_id,
        ratings = ratings.len(),
        bookmarks = bookmarks.len(),
        affinity_categories = engagement.affinity_categories.len(),
        exclusion_items = engagement.exclusion_items.len(),
        "Engagement aggregated"
    );

    Ok(engagement)
}
