use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::{fmt::Display, str::FromStr};
use uuid::Uuid;

/// Publication state of an item
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ItemStatus {
    Draft,
    Published,
    Archived,
}

impl Display for ItemStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ItemStatus::Draft => write!(f, "draft"),
            ItemStatus::Published => write!(f, "published"),
            ItemStatus::Archived => write!(f, "archived"),
        }
    }
}

impl FromStr for ItemStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "draft" => Ok(ItemStatus::Draft),
            "published" => Ok(ItemStatus::Published),
            "archived" => Ok(ItemStatus::Archived),
            other => Err(format!("unknown item status '{}'", other)),
        }
    }
}

/// A shareable prompt as seen by the recommendation engine
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Item {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub category_id: Option<Uuid>,
    pub status: ItemStatus,
    /// Mean of all ratings, `None` until the first rating arrives
    pub average_rating: Option<f64>,
    pub view_count: i64,
    pub title: String,
    pub description: Option<String>,
    pub slug: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Item {
    /// Whether `requester` may be recommended this item at all
    pub fn is_eligible_for(&self, requester: Uuid) -> bool {
        self.status == ItemStatus::Published && self.owner_id != requester
    }
}
