use chrono::{DateTime, Utc};
use sqlx::{
    postgres::{PgArguments, PgPoolOptions},
    query::QueryAs,
    PgPool, Postgres,
};
use uuid::Uuid;

use crate::{
    db::reader::{CandidateQuery, ItemOrdering, StoreReader},
    error::{AppError, AppResult},
    models::{EngagementSignal, Item, User},
};

/// Creates a PostgreSQL connection pool
///
/// Establishes a pool of database connections for efficient reuse.
/// The pool automatically manages connection lifecycle and limits.
pub async fn create_pool(database_url: &str, max_connections: u32) -> anyhow::Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(max_connections)
        .connect(database_url)
        .await?;

    Ok(pool)
}

const ITEM_COLUMNS: &str = r#"
    id,
    user_id AS owner_id,
    category_id,
    status::text AS status,
    average_rating::float8 AS average_rating,
    view_count::int8 AS view_count,
    title,
    description,
    slug,
    created_at
"#;

const USER_COLUMNS: &str = r#"
    id,
    username,
    display_name,
    avatar_url,
    bio,
    role::text AS role,
    is_active,
    total_prompts::int4 AS total_prompts,
    total_followers::int4 AS total_followers,
    created_at
"#;

#[derive(Debug, sqlx::FromRow)]
struct ItemRow {
    id: Uuid,
    owner_id: Uuid,
    category_id: Option<Uuid>,
    status: String,
    average_rating: Option<f64>,
    view_count: i64,
    title: String,
    description: Option<String>,
    slug: Option<String>,
    created_at: DateTime<Utc>,
}

impl TryFrom<ItemRow> for Item {
    type Error = AppError;

    fn try_from(row: ItemRow) -> Result<Self, Self::Error> {
        Ok(Item {
            id: row.id,
            owner_id: row.owner_id,
            category_id: row.category_id,
            status: row.status.parse().map_err(AppError::Internal)?,
            average_rating: row.average_rating,
            view_count: row.view_count,
            title: row.title,
            description: row.description,
            slug: row.slug,
            created_at: row.created_at,
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
struct UserRow {
    id: Uuid,
    username: String,
    display_name: Option<String>,
    avatar_url: Option<String>,
    bio: Option<String>,
    role: String,
    is_active: bool,
    total_prompts: i32,
    total_followers: i32,
    created_at: DateTime<Utc>,
}

impl TryFrom<UserRow> for User {
    type Error = AppError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        Ok(User {
            id: row.id,
            username: row.username,
            display_name: row.display_name,
            avatar_url: row.avatar_url,
            bio: row.bio,
            role: row.role.parse().map_err(AppError::Internal)?,
            is_active: row.is_active,
            total_prompts: row.total_prompts,
            total_followers: row.total_followers,
            created_at: row.created_at,
        })
    }
}

fn order_clause(ordering: ItemOrdering) -> &'static str {
    match ordering {
        ItemOrdering::Quality => {
            "ORDER BY average_rating DESC NULLS LAST, view_count DESC, created_at ASC, id ASC"
        }
        ItemOrdering::Rating => "ORDER BY average_rating DESC NULLS LAST, created_at ASC, id ASC",
    }
}

/// Store reader backed by the platform's PostgreSQL schema
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

type SignalQuery<'q> = QueryAs<'q, Postgres, EngagementSignal, PgArguments>;

const RATING_SIGNALS_SQL: &str = r#"
    SELECT r.prompt_id AS item_id, p.category_id, p.user_id AS owner_id
    FROM prompt_ratings r
    LEFT JOIN prompts p ON p.id = r.prompt_id
    WHERE r.user_id = $1 AND r.rating >= $2::int4
    ORDER BY r.created_at ASC, r.prompt_id ASC
"#;

const BOOKMARK_SIGNALS_SQL: &str = r#"
    SELECT b.prompt_id AS item_id, p.category_id, p.user_id AS owner_id
    FROM bookmarks b
    LEFT JOIN prompts p ON p.id = b.prompt_id
    WHERE b.user_id = $1
    ORDER BY b.created_at ASC, b.prompt_id ASC
"#;

const COMMENT_SIGNALS_SQL: &str = r#"
    SELECT c.prompt_id AS item_id, p.category_id, p.user_id AS owner_id
    FROM comments c
    LEFT JOIN prompts p ON p.id = c.prompt_id
    WHERE c.user_id = $1 AND c.deleted_at IS NULL
    ORDER BY c.created_at ASC, c.id ASC
"#;

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Runs a bound signal query; every signal query returns oldest rows first
    async fn signals(&self, query: SignalQuery<'_>) -> AppResult<Vec<EngagementSignal>> {
        Ok(query.fetch_all(&self.pool).await?)
    }
}

#[async_trait::async_trait]
impl StoreReader for PgStore {
    async fn strong_ratings(
        &self,
        user_id: Uuid,
        min_rating: i16,
    ) -> AppResult<Vec<EngagementSignal>> {
        self.signals(
            sqlx::query_as(RATING_SIGNALS_SQL)
                .bind(user_id)
                .bind(min_rating),
        )
        .await
    }

    async fn bookmarks(&self, user_id: Uuid) -> AppResult<Vec<EngagementSignal>> {
        self.signals(sqlx::query_as(BOOKMARK_SIGNALS_SQL).bind(user_id))
            .await
    }

    async fn comments(&self, user_id: Uuid) -> AppResult<Vec<EngagementSignal>> {
        self.signals(sqlx::query_as(COMMENT_SIGNALS_SQL).bind(user_id))
            .await
    }

    async fn eligible_items(&self, query: CandidateQuery) -> AppResult<Vec<Item>> {
        let sql = format!(
            r#"
            SELECT {ITEM_COLUMNS}
            FROM prompts
            WHERE status::text = 'published'
              AND user_id <> $1
              AND ($2::uuid[] IS NULL OR category_id = ANY($2))
            {}
            LIMIT $3
            "#,
            order_clause(query.ordering)
        );

        let rows = sqlx::query_as::<_, ItemRow>(&sql)
            .bind(query.exclude_owner)
            .bind(query.categories)
            .bind(query.limit as i64)
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter().map(Item::try_from).collect()
    }

    async fn users_by_ids(&self, ids: &[Uuid]) -> AppResult<Vec<User>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE id = ANY($1)");
        let rows = sqlx::query_as::<_, UserRow>(&sql)
            .bind(ids)
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter().map(User::try_from).collect()
    }

    async fn active_users(&self, exclude: Uuid, limit: usize) -> AppResult<Vec<User>> {
        let sql = format!(
            r#"
            SELECT {USER_COLUMNS}
            FROM users
            WHERE is_active = true AND id <> $1
            ORDER BY total_followers DESC, id ASC
            LIMIT $2
            "#
        );
        let rows = sqlx::query_as::<_, UserRow>(&sql)
            .bind(exclude)
            .bind(limit as i64)
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter().map(User::try_from).collect()
    }

    async fn user_by_id(&self, id: Uuid) -> AppResult<Option<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1");
        let row = sqlx::query_as::<_, UserRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.map(User::try_from).transpose()
    }

    fn name(&self) -> &'static str {
        "postgres"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ItemStatus;

    #[test]
    fn test_quality_order_breaks_ties_on_views() {
        let clause = order_clause(ItemOrdering::Quality);
        assert!(clause.starts_with("ORDER BY average_rating DESC NULLS LAST, view_count DESC"));
    }

    #[test]
    fn test_rating_order_ignores_views() {
        let clause = order_clause(ItemOrdering::Rating);
        assert!(clause.starts_with("ORDER BY average_rating DESC NULLS LAST"));
        assert!(!clause.contains("view_count"));
    }

    #[test]
    fn test_signal_queries_share_shape_and_order() {
        for sql in [RATING_SIGNALS_SQL, BOOKMARK_SIGNALS_SQL, COMMENT_SIGNALS_SQL] {
            assert!(sql.contains("AS item_id, p.category_id, p.user_id AS owner_id"));
            assert!(sql.contains("LEFT JOIN prompts p"));
            assert!(sql.contains("created_at ASC"));
        }
        assert!(RATING_SIGNALS_SQL.contains("r.rating >= $2"));
        assert!(COMMENT_SIGNALS_SQL.contains("deleted_at IS NULL"));
    }

    #[test]
    fn test_item_row_conversion() {
        let row = ItemRow {
            id: Uuid::new_v4(),
            owner_id: Uuid::new_v4(),
            category_id: None,
            status: "published".to_string(),
            average_rating: Some(4.5),
            view_count: 42,
            title: "Refactor this function".to_string(),
            description: None,
            slug: Some("refactor-this-function".to_string()),
            created_at: Utc::now(),
        };

        let item = Item::try_from(row).unwrap();
        assert_eq!(item.status, ItemStatus::Published);
        assert_eq!(item.view_count, 42);
    }

    #[test]
    fn test_item_row_with_unknown_status_is_rejected() {
        let row = ItemRow {
            id: Uuid::new_v4(),
            owner_id: Uuid::new_v4(),
            category_id: None,
            status: "hidden".to_string(),
            average_rating: None,
            view_count: 0,
            title: "x".to_string(),
            description: None,
            slug: None,
            created_at: Utc::now(),
        };

        assert!(matches!(Item::try_from(row), Err(AppError::Internal(_))));
    }
}
