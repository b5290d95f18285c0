use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use axum::Router;
use tokio::net::TcpListener;
use tracing::info;

use crate::data::repositories::memory::InMemoryBoardStore;
use crate::data::repositories::postgres::post_repository::PostgresPostRepository;
use crate::data::repositories::postgres::vote_repository::PostgresVoteRepository;
use crate::infrastructure::database::{create_pool, run_migrations};
use crate::infrastructure::jwt::JwtVerifier;
use crate::infrastructure::settings::{Settings, StorageBackend};
use crate::presentation::http::middleware::cors::apply_cors;
use crate::presentation::http::middleware::limits::{HttpLimits, apply_limits};
use crate::presentation::http::middleware::trace::apply_trace;
use crate::presentation::{
    AppState, FeedLimits, SharedPostRepository, SharedVoteRepository, http,
};

pub(crate) async fn build_state(settings: &Settings) -> Result<AppState> {
    let (posts, votes): (SharedPostRepository, SharedVoteRepository) =
        match settings.storage_backend {
            StorageBackend::Postgres => {
                let database_url = settings
                    .database_url
                    .as_deref()
                    .context("DATABASE_URL is required for the postgres backend")?;
                let pool = create_pool(database_url, settings.db_max_connections).await?;
                run_migrations(&pool).await?;
                let posts: SharedPostRepository =
                    Arc::new(PostgresPostRepository::new(pool.clone()));
                let votes: SharedVoteRepository = Arc::new(PostgresVoteRepository::new(pool));
                (posts, votes)
            }
            StorageBackend::Memory => {
                info!("using in-memory storage, data is lost on restart");
                let store = Arc::new(InMemoryBoardStore::new());
                let posts: SharedPostRepository = store.clone();
                let votes: SharedVoteRepository = store;
                (posts, votes)
            }
        };

    Ok(AppState::new(
        posts,
        votes,
        JwtVerifier::new(&settings.jwt_secret),
        settings.vote_max_attempts,
        FeedLimits {
            default_limit: settings.feed_default_limit,
            max_limit: settings.feed_max_limit,
        },
    ))
}

pub(crate) fn build_app(settings: &Settings, state: AppState) -> Result<Router> {
    let app = http::router(state);
    let app = apply_limits(
        app,
        HttpLimits {
            body_limit_bytes: settings.http_request_body_limit_bytes,
            concurrency: settings.http_concurrency_limit,
            request_timeout: Duration::from_secs(settings.http_request_timeout_secs),
        },
    );
    let app = apply_trace(app);
    apply_cors(app, &settings.cors_origins)
}

pub(crate) async fn run_http(settings: &Settings, state: AppState) -> Result<()> {
    let app = build_app(settings, state)?;
    let listener = TcpListener::bind(&settings.http_addr)
        .await
        .with_context(|| format!("failed to bind {}", settings.http_addr))?;

    info!("HTTP server listening on {}", settings.http_addr);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    info!("HTTP server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}
