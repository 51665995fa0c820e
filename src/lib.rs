pub mod auth;
pub mod config;
pub mod db;
pub mod errors;
pub mod http;
pub mod middleware;
pub mod models;
pub mod reviews;
pub mod state;

use std::{net::SocketAddr, sync::Arc};

use axum::{Router, middleware as axum_middleware};
use bb8::Pool;
use bb8_redis::RedisConnectionManager;
use config::Config;
use db::{PgStore, RedisQuotaCounter};
use middleware::{
    cors_layer, create_global_rate_limiter, rate_limit_middleware, request_timeout_middleware,
};
use reviews::{QuotaTracker, ReviewService};
use sqlx::postgres::PgPoolOptions;
use state::AppState;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    #[error(transparent)]
    Config(#[from] config::ConfigError),
    #[error("Postgres: {0}")]
    Postgres(#[from] sqlx::Error),
    #[error("Migrations: {0}")]
    Migrations(#[from] sqlx::migrate::MigrateError),
    #[error("Redis: {0}")]
    Redis(#[from] redis::RedisError),
    #[error("Server: {0}")]
    Io(#[from] std::io::Error),
}

pub fn build_app(state: AppState, config: &Config) -> Router {
    let global_rate_limiter = create_global_rate_limiter();
    let request_timeout = config.request_timeout;

    create_http_routes_with_fallback(state)
        .layer(axum_middleware::from_fn(move |req, next| {
            request_timeout_middleware(request_timeout, req, next)
        }))
        .layer(axum_middleware::from_fn(move |req, next| {
            rate_limit_middleware(global_rate_limiter.clone(), req, next)
        }))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors_layer(&config.allowed_origins)),
        )
}

fn create_http_routes_with_fallback(state: AppState) -> Router {
    http::create_http_routes(state).fallback(|| async {
        errors::AppError::NotFound("Route not found".into()).to_response()
    })
}

pub async fn start_server() -> Result<(), StartupError> {
    let config = Config::from_env()?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let postgres = PgPoolOptions::new()
        .max_connections(20)
        .connect(&config.database_url)
        .await?;
    let store = Arc::new(PgStore::new(postgres));

    if config.run_migrations {
        store.run_migrations().await?;
        tracing::info!("Database migrations applied");
    }

    let manager = RedisConnectionManager::new(config.redis_url.clone())?;
    let redis_pool = Pool::builder().build(manager).await?;

    let quota = QuotaTracker::new(Arc::new(RedisQuotaCounter::new(redis_pool)), config.quota);
    let service = ReviewService::new(store.clone(), store, quota);
    let state = AppState::new(service, config.jwt_secret.clone());

    let app = build_app(state, &config);

    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", config.port)).await?;
    tracing::info!("Review service listening on port {}", config.port);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}
