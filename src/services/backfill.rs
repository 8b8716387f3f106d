use std::collections::HashSet;

use uuid::Uuid;

use crate::{
    db::{CandidateQuery, ItemOrdering, StoreReader},
    error::AppResult,
    models::Item,
};

/// The fallback read over-fetches by this factor to absorb exclusions
pub const FALLBACK_POOL_FACTOR: usize = 2;

/// Tops `result` up to `limit` with the best-rated eligible items overall.
///
/// Only queries the store when `result` is short. Never adds an excluded item
/// or one already present, and never returns more than `limit` items. A
/// shorter result means the eligible catalog ran out.
pub async fn fill(
    store: &dyn StoreReader,
    mut result: Vec<Item>,
    exclusion_items: &HashSet<Uuid>,
    requester_id: Uuid,
    limit: usize,
) -> AppResult<Vec<Item>> {
    if result.len() >= limit {
        result.truncate(limit);
        return Ok(result);
    }

    let fallback = store
        .eligible_items(CandidateQuery {
            exclude_owner: requester_id,
            categories: None,
            ordering: ItemOrdering::Rating,
            limit: limit * FALLBACK_POOL_FACTOR,
        })
        .await?;

    let before = result.len();
    let result = merge(result, fallback, exclusion_items, limit);

    tracing::debug!(
        user_id = %requester_id,
        personalized = before,
        backfilled = result.len() - before,
        "Backfill applied"
    );

    Ok(result)
}

/// Appends `fallback` items in order, skipping excluded and duplicate ids
pub fn merge(
    mut result: Vec<Item>,
    fallback: Vec<Item>,
    exclusion_items: &HashSet<Uuid>,
    limit: usize,
) -> Vec<Item> {
    let mut present: HashSet<Uuid> = result.iter().map(|item| item.id).collect();

    for item in fallback {
        if result.len() >= limit {
            break;
        }
        if exclusion_items.contains(&item.id) || !present.insert(item.id) {
            continue;
        }
        result.push(item);
    }

    result.truncate(limit);
    result
}
