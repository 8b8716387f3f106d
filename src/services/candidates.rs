use std::collections::{BTreeSet, HashSet};

use uuid::Uuid;

use crate::{
    db::{CandidateQuery, ItemOrdering, StoreReader},
    error::AppResult,
    models::Item,
    services::ranker,
};

/// Reads up to `pool_limit` eligible items, best first.
///
/// With affinity categories the read is restricted to them; without any it
/// covers the whole catalog.
pub async fn select(
    store: &dyn StoreReader,
    affinity_categories: &BTreeSet<Uuid>,
    requester_id: Uuid,
    pool_limit: usize,
) -> AppResult<Vec<Item>> {
    let categories = if affinity_categories.is_empty() {
        None
    } else {
        Some(affinity_categories.iter().copied().collect())
    };

    let mut candidates = store
        .eligible_items(CandidateQuery {
            exclude_owner: requester_id,
            categories,
            ordering: ItemOrdering::Quality,
            limit: pool_limit,
        })
        .await?;

    ranker::rank(&mut candidates);
    Ok(candidates)
}

/// Drops already-seen items, keeping the order of the rest
pub fn exclude(candidates: Vec<Item>, exclusion_items: &HashSet<Uuid>) -> Vec<Item> {
    candidates
        .into_iter()
        .filter(|item| !exclusion_items.contains(&item.id))
        .collect()
}
