//! Bearer token verification
//!
//! Token validity is decided by the external identity provider; this service
//! only asks it who the token belongs to and then loads that user's profile
//! from the store to learn their role.

use std::sync::Arc;

use reqwest::{Client as HttpClient, StatusCode};
use serde::Deserialize;
use uuid::Uuid;

use crate::{
    db::StoreReader,
    error::{AppError, AppResult},
    models::AuthenticatedUser,
};

#[async_trait::async_trait]
pub trait Authenticator: Send + Sync {
    /// Resolves a bearer token to the identity of its owner
    async fn authenticate(&self, token: &str) -> AppResult<AuthenticatedUser>;
}

#[derive(Debug, Deserialize)]
struct IdentityResponse {
    id: Uuid,
}

/// Verifies tokens against a Supabase-compatible `/auth/v1/user` endpoint
#[derive(Clone)]
pub struct SupabaseAuthenticator {
    http_client: HttpClient,
    auth_url: String,
    api_key: String,
    store: Arc<dyn StoreReader>,
}

impl SupabaseAuthenticator {
    pub fn new(auth_url: String, api_key: String, store: Arc<dyn StoreReader>) -> Self {
        Self {
            http_client: HttpClient::new(),
            auth_url: auth_url.trim_end_matches('/').to_string(),
            api_key,
            store,
        }
    }

    async fn identity_of(&self, token: &str) -> AppResult<Uuid> {
        let url = format!("{}/auth/v1/user", self.auth_url);
        let response = self
            .http_client
            .get(&url)
            .header("apikey", &self.api_key)
            .bearer_auth(token)
            .send()
            .await?;

        match response.status() {
            status if status.is_success() => {
                let identity: IdentityResponse = response.json().await?;
                Ok(identity.id)
            }
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(AppError::Unauthorized(
                "Invalid authentication credentials".to_string(),
            )),
            status => {
                tracing::warn!(status = %status, "Identity provider rejected token lookup");
                Err(AppError::Unauthorized(
                    "Could not validate credentials".to_string(),
                ))
            }
        }
    }
}

/// Loads the profile behind a verified identity
pub async fn resolve_profile(store: &dyn StoreReader, user_id: Uuid) -> AppResult<AuthenticatedUser> {
    match store.user_by_id(user_id).await? {
        Some(user) if user.is_active => Ok(AuthenticatedUser::from(&user)),
        Some(_) => Err(AppError::Unauthorized("User is deactivated".to_string())),
        None => Err(AppError::Unauthorized("User profile not found".to_string())),
    }
}

#[async_trait::async_trait]
impl Authenticator for SupabaseAuthenticator {
    async fn authenticate(&self, token: &str) -> AppResult<AuthenticatedUser> {
        let user_id = self.identity_of(token).await?;
        resolve_profile(self.store.as_ref(), user_id).await
    }
}
