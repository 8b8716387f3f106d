use uuid::Uuid;

mod item;
mod user;

pub use item::{Item, ItemStatus};
pub use user::{AuthenticatedUser, User, UserRole};

/// Which relation an engagement signal was read from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignalKind {
    Rating,
    Bookmark,
    Comment,
}

/// A rating, bookmark or comment row joined with its parent item.
///
/// `category_id` and `owner_id` come from the parent item and are `None` when
/// that item no longer resolves.
#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct EngagementSignal {
    pub item_id: Option<Uuid>,
    pub category_id: Option<Uuid>,
    pub owner_id: Option<Uuid>,
}

impl EngagementSignal {
    pub fn new(item_id: Uuid, category_id: Option<Uuid>, owner_id: Option<Uuid>) -> Self {
        Self {
            item_id: Some(item_id),
            category_id,
            owner_id,
        }
    }

    /// Signal whose parent item was deleted
    pub fn orphaned(item_id: Option<Uuid>) -> Self {
        Self {
            item_id,
            category_id: None,
            owner_id: None,
        }
    }
}
