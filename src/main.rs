use std::{sync::Arc, time::Duration};

use tracing_subscriber::EnvFilter;

use prompt_recs::{
    config::Config,
    create_router,
    db::{create_pool, create_redis_client, Cache, PgStore, StoreReader},
    services::{RecommendationService, SupabaseAuthenticator},
    AppState,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("prompt_recs=info,tower_http=info")),
        )
        .init();

    let config = Config::from_env()?;

    let pool = create_pool(&config.database_url, config.database_max_connections).await?;
    let store: Arc<dyn StoreReader> = Arc::new(PgStore::new(pool));
    tracing::info!(store = store.name(), "Store reader ready");

    let (cache, cache_handle) = match &config.redis_url {
        Some(url) => {
            let (cache, handle) = Cache::new(create_redis_client(url)?).await;
            tracing::info!("Recommendation cache enabled");
            (Some(cache), Some(handle))
        }
        None => {
            tracing::info!("REDIS_URL not set, recommendation cache disabled");
            (None, None)
        }
    };

    let authenticator = Arc::new(SupabaseAuthenticator::new(
        config.auth_url.clone(),
        config.auth_api_key.clone(),
        store.clone(),
    ));

    let state = Arc::new(AppState {
        recommendations: RecommendationService::new(store),
        authenticator,
        cache,
        cache_ttl_secs: config.recommendation_cache_ttl_secs,
        request_timeout: Duration::from_secs(config.request_timeout_secs),
    });

    let app = create_router(state);

    let address = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&address).await?;
    tracing::info!(address = %address, "Server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    if let Some(handle) = cache_handle {
        handle.shutdown().await;
    }

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
    }
    tracing::info!("Shutdown signal received");
}
