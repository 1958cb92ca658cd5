use std::sync::Arc;

use axum::http::{HeaderValue, Method};
use tower_http::cors::{Any, CorsLayer};

use reelrate_api::{
    create_router,
    db::{self, Cache, DocumentStore},
    init_tracing,
    services::{BackendRecommender, MemoryRatingStore, PgRatingStore, RatingStore, TmdbProvider},
    AppState, Config,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let config = Config::from_env()?;

    let (cache, cache_handle) = match &config.redis_url {
        Some(url) => {
            let (cache, handle) = Cache::new(db::create_redis_client(url)?);
            tracing::info!("Metadata cache enabled");
            (Some(cache), Some(handle))
        }
        None => {
            tracing::warn!("REDIS_URL not set, metadata cache disabled");
            (None, None)
        }
    };

    let ratings: Arc<dyn RatingStore> = match &config.database_url {
        Some(url) => {
            let pool = db::create_pool(url).await?;
            db::run_migrations(&pool).await?;
            tracing::info!("Rating store backed by PostgreSQL");
            Arc::new(PgRatingStore::new(DocumentStore::new(pool)))
        }
        None => {
            tracing::warn!("DATABASE_URL not set, ratings are kept in memory");
            Arc::new(MemoryRatingStore::new())
        }
    };

    let metadata = Arc::new(TmdbProvider::new(
        config.tmdb_api_key.clone(),
        config.tmdb_api_url.clone(),
        cache,
    ));
    let recommender = Arc::new(BackendRecommender::new(config.recommender_url.clone()));

    let state = Arc::new(AppState::new(
        metadata,
        recommender,
        ratings,
        config.default_top_n,
    ));

    let cors = CorsLayer::new()
        .allow_origin(config.cors_origin.parse::<HeaderValue>()?)
        .allow_methods([Method::GET, Method::PUT])
        .allow_headers(Any);

    let app = create_router(state).layer(cors);

    let address = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&address).await?;
    tracing::info!(address = %address, "Server running");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    if let Some(handle) = cache_handle {
        handle.shutdown().await;
    }

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
    }
    tracing::info!("Shutdown signal received");
}
