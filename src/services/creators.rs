use std::collections::{HashMap, HashSet};

use uuid::Uuid;

use crate::{
    db::StoreReader,
    error::AppResult,
    models::{EngagementSignal, User},
    services::engagement::MIN_POSITIVE_RATING,
};

/// Occurrence counts that remember first-seen order.
///
/// Ranking is by count descending, ties going to whichever id was recorded
/// first. Nothing depends on hash iteration order.
#[derive(Debug, Default)]
pub struct FrequencyTable {
    /// (id, count) in first-seen order
    entries: Vec<(Uuid, usize)>,
    positions: HashMap<Uuid, usize>,
}

impl FrequencyTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, id: Uuid) {
        match self.positions.get(&id) {
            Some(&position) => self.entries[position].1 += 1,
            None => {
                self.positions.insert(id, self.entries.len());
                self.entries.push((id, 1));
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[cfg(test)]
    fn count(&self, id: &Uuid) -> usize {
        self.positions
            .get(id)
            .map(|&position| self.entries[position].1)
            .unwrap_or(0)
    }

    /// The `k` most frequent ids
    pub fn top(&self, k: usize) -> Vec<Uuid> {
        let mut ranked = self.entries.clone();
        // Stable, so equal counts stay in first-seen order
        ranked.sort_by(|a, b| b.1.cmp(&a.1));
        ranked.into_iter().take(k).map(|(id, _)| id).collect()
    }
}

/// Creators behind everything `requester_id` engaged with, in merge order:
/// strong ratings, then bookmarks, then comments. The requester and
/// unresolved owners are dropped.
pub async fn collect_creator_ids(
    store: &dyn StoreReader,
    requester_id: Uuid,
) -> AppResult<FrequencyTable> {
    let ratings = store.strong_ratings(requester_id, MIN_POSITIVE_RATING).await?;
    let bookmarks = store.bookmarks(requester_id).await?;
    let comments = store.comments(requester_id).await?;

    let mut table = FrequencyTable::new();
    ratings
        .iter()
        .chain(bookmarks.iter())
        .chain(comments.iter())
        .filter_map(|signal: &EngagementSignal| signal.owner_id)
        .filter(|owner_id| *owner_id != requester_id)
        .for_each(|owner_id| table.record(owner_id));

    tracing::debug!(
        user_id = %requester_id,
        ratings = ratings.len(),
        bookmarks = bookmarks.len(),
        comments = comments.len(),
        creators = table.entries.len(),
        "Creator signals collected"
    );

    Ok(table)
}

/// Ranks creators for `requester_id` and resolves them to profiles.
///
/// Falls back to the most followed active users when the requester has no
/// engagement at all. Output follows ranked order, not the store's.
pub async fn rank_creators(
    store: &dyn StoreReader,
    requester_id: Uuid,
    limit: usize,
) -> AppResult<Vec<User>> {
    if limit == 0 {
        return Ok(Vec::new());
    }

    let table = collect_creator_ids(store, requester_id).await?;

    if table.is_empty() {
        tracing::debug!(user_id = %requester_id, "No creator signals, using fallback");
        let users = store.active_users(requester_id, limit).await?;
        return Ok(dedup_fallback(users, requester_id, limit));
    }

    let ranked = table.top(limit);
    let users = store.users_by_ids(&ranked).await?;
    Ok(order_by_rank(&ranked, users))
}

/// Arranges a batch read in `ranked` order, dropping ids it did not return
fn order_by_rank(ranked: &[Uuid], users: Vec<User>) -> Vec<User> {
    let mut by_id: HashMap<Uuid, User> = users.into_iter().map(|u| (u.id, u)).collect();
    ranked.iter().filter_map(|id| by_id.remove(id)).collect()
}

fn dedup_fallback(users: Vec<User>, requester_id: Uuid, limit: usize) -> Vec<User> {
    let mut seen = HashSet::new();
    users
        .into_iter()
        .filter(|user| user.id != requester_id && seen.insert(user.id))
        .take(limit)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::reader::MockStoreReader;
    use crate::models::UserRole;
    use chrono::Utc;

    fn user(id: Uuid) -> User {
        User {
            id,
            username: id.to_string(),
            display_name: None,
            avatar_url: None,
            bio: None,
            role: UserRole::User,
            is_active: true,
            total_prompts: 1,
            total_followers: 0,
            created_at: Utc::now(),
        }
    }

    fn by(owner: Uuid) -> EngagementSignal {
        EngagementSignal::new(Uuid::new_v4(), None, Some(owner))
    }

    #[test]
    fn test_frequency_ties_go_to_first_seen() {
        let (a, b, c) = (Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());
        let mut table = FrequencyTable::new();
        for id in [b, a, c, a, c] {
            table.record(id);
        }

        assert_eq!(table.count(&a), 2);
        assert_eq!(table.count(&b), 1);
        // a and c tie at 2, a was seen first
        assert_eq!(table.top(3), vec![a, c, b]);
        assert_eq!(table.top(1), vec![a]);
    }

    #[test]
    fn test_order_by_rank_ignores_batch_order() {
        let (a, b, c) = (Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());
        let batch = vec![user(c), user(a)];

        let ordered = order_by_rank(&[a, b, c], batch);
        let ids: Vec<Uuid> = ordered.iter().map(|u| u.id).collect();
        assert_eq!(ids, vec![a, c]);
    }

    #[tokio::test]
    async fn test_counts_across_all_relations() {
        let requester = Uuid::new_v4();
        let (a, b) = (Uuid::new_v4(), Uuid::new_v4());

        let mut store = MockStoreReader::new();
        store
            .expect_strong_ratings()
            .returning(move |_, _| Ok(vec![by(a), by(a)]));
        store
            .expect_bookmarks()
            .returning(move |_| Ok(vec![by(b)]));
        store
            .expect_comments()
            .returning(move |_| Ok(vec![by(a)]));
        store
            .expect_users_by_ids()
            .withf(move |ids| ids.to_vec() == vec![a, b])
            .times(1)
            .returning(move |_| Ok(vec![user(b), user(a)]));

        let creators = rank_creators(&store, requester, 5).await.unwrap();
        let ids: Vec<Uuid> = creators.iter().map(|u| u.id).collect();
        assert_eq!(ids, vec![a, b]);
    }

    #[tokio::test]
    async fn test_bookmarks_outrank_comments_on_equal_counts() {
        let requester = Uuid::new_v4();
        let (b, c) = (Uuid::new_v4(), Uuid::new_v4());

        let mut store = MockStoreReader::new();
        store.expect_strong_ratings().returning(|_, _| Ok(Vec::new()));
        store
            .expect_bookmarks()
            .returning(move |_| Ok(vec![by(b)]));
        store
            .expect_comments()
            .returning(move |_| Ok(vec![by(c)]));
        store
            .expect_users_by_ids()
            .withf(move |ids| ids.to_vec() == vec![b, c])
            .times(1)
            .returning(move |_| Ok(vec![user(c), user(b)]));

        let creators = rank_creators(&store, requester, 5).await.unwrap();
        let ids: Vec<Uuid> = creators.iter().map(|u| u.id).collect();
        assert_eq!(ids, vec![b, c]);
    }

    #[tokio::test]
    async fn test_self_authored_engagement_is_ignored() {
        let requester = Uuid::new_v4();
        let other = Uuid::new_v4();

        let mut store = MockStoreReader::new();
        store
            .expect_strong_ratings()
            .returning(move |_, _| Ok(vec![by(requester), by(requester)]));
        store
            .expect_bookmarks()
            .returning(move |_| Ok(vec![by(other)]));
        store.expect_comments().returning(|_| Ok(Vec::new()));
        store
            .expect_users_by_ids()
            .withf(move |ids| ids.to_vec() == vec![other])
            .returning(move |_| Ok(vec![user(other)]));

        let creators = rank_creators(&store, requester, 5).await.unwrap();
        assert_eq!(creators.len(), 1);
        assert_eq!(creators[0].id, other);
    }

    #[tokio::test]
    async fn test_no_engagement_uses_fallback() {
        let requester = Uuid::new_v4();
        let (a, b) = (Uuid::new_v4(), Uuid::new_v4());

        let mut store = MockStoreReader::new();
        store.expect_strong_ratings().returning(|_, _| Ok(Vec::new()));
        store.expect_bookmarks().returning(|_| Ok(Vec::new()));
        store.expect_comments().returning(|_| Ok(Vec::new()));
        store.expect_users_by_ids().times(0);
        store
            .expect_active_users()
            .withf(move |exclude, limit| *exclude == requester && *limit == 3)
            .times(1)
            .returning(move |_, _| Ok(vec![user(a), user(a), user(requester), user(b)]));

        let creators = rank_creators(&store, requester, 3).await.unwrap();
        let ids: Vec<Uuid> = creators.iter().map(|u| u.id).collect();
        assert_eq!(ids, vec![a, b]);
    }

    #[tokio::test]
    async fn test_only_self_engagement_uses_fallback() {
        let requester = Uuid::new_v4();

        let mut store = MockStoreReader::new();
        store
            .expect_strong_ratings()
            .returning(move |_, _| Ok(vec![by(requester)]));
        store.expect_bookmarks().returning(|_| Ok(Vec::new()));
        store.expect_comments().returning(|_| Ok(Vec::new()));
        store
            .expect_active_users()
            .times(1)
            .returning(|_, _| Ok(Vec::new()));

        let creators = rank_creators(&store, requester, 5).await.unwrap();
        assert!(creators.is_empty());
    }

    #[tokio::test]
    async fn test_limit_truncates_ranking() {
        let requester = Uuid::new_v4();
        let owners: Vec<Uuid> = (0..4).map(|_| Uuid::new_v4()).collect();
        let signals: Vec<EngagementSignal> = owners.iter().map(|o| by(*o)).collect();
        let expected = owners[..2].to_vec();

        let mut store = MockStoreReader::new();
        store
            .expect_strong_ratings()
            .returning(move |_, _| Ok(signals.clone()));
        store.expect_bookmarks().returning(|_| Ok(Vec::new()));
        store.expect_comments().returning(|_| Ok(Vec::new()));
        let wanted = expected.clone();
        store
            .expect_users_by_ids()
            .withf(move |ids| ids.to_vec() == wanted)
            .returning(|ids| Ok(ids.iter().map(|id| user(*id)).collect()));

        let creators = rank_creators(&store, requester, 2).await.unwrap();
        let ids: Vec<Uuid> = creators.iter().map(|u| u.id).collect();
        assert_eq!(ids, expected);
    }
}
