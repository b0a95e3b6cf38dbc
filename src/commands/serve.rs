//! Serve command - Starts the HTTP server.

use std::sync::Arc;

use apalis_sql::postgres::PostgresStorage;
use apalis_sql::sqlx::postgres::PgPoolOptions;

use crate::api::{create_router, AppState};
use crate::cli::args::ServeArgs;
use crate::config::{Config, INVALIDATION_CHANNEL_CAPACITY};
use crate::errors::{AppError, AppResult};
use crate::infra::{Cache, Database};
use crate::jobs::EmailJob;
use crate::policy::RouteAccessPolicy;
use crate::services::{InvalidationBus, JobMailer, Services, ViewCache};

/// Execute the serve command
pub async fn execute(args: ServeArgs, config: Config) -> AppResult<()> {
    tracing::info!("Starting server...");

    let db = Arc::new(
        Database::connect(&config)
            .await
            .map_err(|e| AppError::internal(format!("Database connection failed: {}", e)))?,
    );
    tracing::info!("Database connected");

    let cache = Arc::new(
        Cache::connect(&config)
            .await
            .map_err(|e| AppError::internal(format!("Redis connection failed: {}", e)))?,
    );
    tracing::info!("Redis cache connected");

    // Verification emails go through the apalis queue
    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&config.database_url)
        .await
        .map_err(|e| AppError::internal(format!("Failed to connect job storage: {}", e)))?;
    PostgresStorage::setup(&pool)
        .await
        .map_err(|e| AppError::internal(format!("Failed to setup job storage: {}", e)))?;
    let email_storage: PostgresStorage<EmailJob> = PostgresStorage::new(pool);
    let mailer = Arc::new(JobMailer::new(email_storage, config.app_url.clone()));

    // Lifecycle mutations invalidate the cached admin lists
    let bus = Arc::new(InvalidationBus::new(INVALIDATION_CHANNEL_CAPACITY));
    let views = ViewCache::new(cache.as_ref().clone(), bus.generations());
    views.clone().spawn(bus.subscribe());

    let services = Services::from_connection(db.get_connection(), mailer, bus, config);
    let app_state = AppState::new(&services, db, cache, views, RouteAccessPolicy::default());

    let app = create_router(app_state);

    let addr = format!("{}:{}", args.host, args.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| AppError::internal(format!("Failed to bind to {}: {}", addr, e)))?;

    tracing::info!("Server running on http://{}", addr);

    axum::serve(listener, app)
        .await
        .map_err(|e| AppError::internal(format!("Server error: {}", e)))?;

    Ok(())
}
