use axum::{
    async_trait,
    extract::{FromRequestParts, Query, State},
    http::request::Parts,
    Extension, Json,
};
use serde::Deserialize;
use std::sync::Arc;

use crate::{
    cached,
    db::CacheKey,
    error::{AppError, AppResult},
    middleware::{CurrentUser, RequestId},
    models::{Item, User},
    routes::AppState,
};

/// Accepted range and default for a `limit` query parameter
#[derive(Debug, Clone, Copy)]
pub struct LimitBounds {
    pub min: i64,
    pub max: i64,
    pub default: i64,
}

pub const ITEM_LIMITS: LimitBounds = LimitBounds {
    min: 1,
    max: 50,
    default: 10,
};

pub const CREATOR_LIMITS: LimitBounds = LimitBounds {
    min: 1,
    max: 20,
    default: 5,
};

impl LimitBounds {
    pub fn resolve(&self, requested: Option<i64>) -> AppResult<usize> {
        let limit = requested.unwrap_or(self.default);
        if limit < self.min || limit > self.max {
            return Err(AppError::InvalidInput(format!(
                "limit must be between {} and {}",
                self.min, self.max
            )));
        }
        Ok(limit as usize)
    }
}

#[derive(Debug, Deserialize)]
pub struct LimitQuery {
    pub limit: Option<i64>,
}

/// The raw `limit` query parameter. A value that is not an integer is
/// rejected as invalid input, the same as one out of range.
#[derive(Debug, Clone, Copy)]
pub struct LimitParam(pub Option<i64>);

#[async_trait]
impl<S> FromRequestParts<S> for LimitParam
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(query) = Query::<LimitQuery>::from_request_parts(parts, state)
            .await
            .map_err(|rejection| AppError::InvalidInput(rejection.body_text()))?;
        Ok(LimitParam(query.limit))
    }
}

/// Handler for item recommendations
pub async fn recommend_items(
    State(state): State<Arc<AppState>>,
    Extension(request_id): Extension<RequestId>,
    CurrentUser(user): CurrentUser,
    LimitParam(requested): LimitParam,
) -> AppResult<Json<Vec<Item>>> {
    let limit = ITEM_LIMITS.resolve(requested)?;

    tracing::info!(
        request_id = %request_id,
        user_id = %user.id,
        limit,
        "Processing item recommendation request"
    );

    let key = CacheKey::ItemRecommendations {
        user_id: user.id,
        limit,
    };
    let items: Vec<Item> = cached!(
        state.cache,
        key,
        state.cache_ttl_secs,
        state.recommendations.recommend_items(user.id, limit)
    )?;

    Ok(Json(items))
}

/// Handler for creator recommendations
pub async fn recommend_creators(
    State(state): State<Arc<AppState>>,
    Extension(request_id): Extension<RequestId>,
    CurrentUser(user): CurrentUser,
    LimitParam(requested): LimitParam,
) -> AppResult<Json<Vec<User>>> {
    let limit = CREATOR_LIMITS.resolve(requested)?;

    tracing::info!(
        request_id = %request_id,
        user_id = %user.id,
        limit,
        "Processing creator recommendation request"
    );

    let key = CacheKey::CreatorRecommendations {
        user_id: user.id,
        limit,
    };
    let creators: Vec<User> = cached!(
        state.cache,
        key,
        state.cache_ttl_secs,
        state.recommendations.recommend_creators(user.id, limit)
    )?;

    Ok(Json(creators))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    fn parts_for(uri: &str) -> Parts {
        Request::builder().uri(uri).body(()).unwrap().into_parts().0
    }

    #[test]
    fn test_limit_param_parses_integer() {
        let mut parts = parts_for("/recommendations/items?limit=7");
        let LimitParam(limit) =
            tokio_test::block_on(LimitParam::from_request_parts(&mut parts, &())).unwrap();
        assert_eq!(limit, Some(7));

        let mut parts = parts_for("/recommendations/items");
        let LimitParam(limit) =
            tokio_test::block_on(LimitParam::from_request_parts(&mut parts, &())).unwrap();
        assert_eq!(limit, None);
    }

    #[test]
    fn test_non_integer_limit_is_invalid_input() {
        let mut parts = parts_for("/recommendations/items?limit=ten");
        let result = tokio_test::block_on(LimitParam::from_request_parts(&mut parts, &()));
        assert!(matches!(result, Err(AppError::InvalidInput(_))));
    }

    #[test]
    fn test_default_limits() {
        assert_eq!(ITEM_LIMITS.resolve(None).unwrap(), 10);
        assert_eq!(CREATOR_LIMITS.resolve(None).unwrap(), 5);
    }

    #[test]
    fn test_limits_inclusive_bounds() {
        assert_eq!(ITEM_LIMITS.resolve(Some(1)).unwrap(), 1);
        assert_eq!(ITEM_LIMITS.resolve(Some(50)).unwrap(), 50);
        assert_eq!(CREATOR_LIMITS.resolve(Some(20)).unwrap(), 20);
    }

    #[test]
    fn test_out_of_range_limits_rejected() {
        assert!(matches!(
            ITEM_LIMITS.resolve(Some(0)),
            Err(AppError::InvalidInput(_))
        ));
        assert!(ITEM_LIMITS.resolve(Some(51)).is_err());
        assert!(CREATOR_LIMITS.resolve(Some(21)).is_err());
        assert!(CREATOR_LIMITS.resolve(Some(-3)).is_err());
    }
}
