use std::cmp::Ordering;

use crate::models::Item;

/// Descending by `average_rating`, unrated items last
pub fn by_rating(a: &Item, b: &Item) -> Ordering {
    match (a.average_rating, b.average_rating) {
        (Some(x), Some(y)) => y.total_cmp(&x),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Descending by `average_rating`, then by `view_count`
pub fn by_quality(a: &Item, b: &Item) -> Ordering {
    by_rating(a, b).then_with(|| b.view_count.cmp(&a.view_count))
}

/// Orders candidates best first. Stable: equal items keep their input order.
pub fn rank(candidates: &mut [Item]) {
    candidates.sort_by(by_quality);
}
