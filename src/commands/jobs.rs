//! Jobs command - email queue worker and maintenance.
//!
//! ```bash
//! trading-onboard jobs work    # deliver queued verification emails
//! trading-onboard jobs list    # counts per status
//! trading-onboard jobs clear   # drop failed deliveries
//! ```

use apalis::prelude::*;
use apalis_sql::postgres::PostgresStorage;
use apalis_sql::sqlx::postgres::PgPoolOptions;
use sea_orm::{ConnectionTrait, DatabaseBackend, DatabaseConnection, Statement};

use crate::cli::args::{JobsAction, JobsArgs};
use crate::config::{Config, JOB_WORKER_EMAIL};
use crate::errors::{AppError, AppResult};
use crate::jobs::{email_job_handler, EmailJob};

/// Execute the jobs command
pub async fn execute(args: JobsArgs, config: Config) -> AppResult<()> {
    match args.action {
        JobsAction::Work => run_worker(&config).await,
        JobsAction::List => list_jobs(&config).await,
        JobsAction::Clear => clear_failed_jobs(&config).await,
    }
}

/// Deliver verification emails until Ctrl+C.
async fn run_worker(config: &Config) -> AppResult<()> {
    tracing::info!("Connecting to database for email worker...");

    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&config.database_url)
        .await
        .map_err(|e| AppError::internal(format!("Failed to connect to database: {}", e)))?;

    PostgresStorage::setup(&pool)
        .await
        .map_err(|e| AppError::internal(format!("Failed to setup job storage: {}", e)))?;

    let email_storage: PostgresStorage<EmailJob> = PostgresStorage::new(pool);

    let worker = WorkerBuilder::new(JOB_WORKER_EMAIL)
        .backend(email_storage)
        .build_fn(email_job_handler);

    let monitor = Monitor::new().register(worker);
    tracing::info!(worker = JOB_WORKER_EMAIL, "Email worker started. Press Ctrl+C to stop.");

    tokio::select! {
        result = monitor.run() => {
            if let Err(e) = result {
                tracing::error!("Worker error: {}", e);
                return Err(AppError::internal(format!("Worker failed: {}", e)));
            }
        }
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Received shutdown signal, stopping worker...");
        }
    }

    tracing::info!("Email worker stopped.");
    Ok(())
}

/// Open a plain connection; the queue tables live outside our migrations.
async fn connect(config: &Config) -> AppResult<DatabaseConnection> {
    sea_orm::Database::connect(&config.database_url)
        .await
        .map_err(|e| AppError::internal(format!("Failed to connect to database: {}", e)))
}

fn statement(sql: &str) -> Statement {
    Statement::from_string(DatabaseBackend::Postgres, sql.to_string())
}

/// Whether the apalis schema has been created by a worker yet.
async fn queue_initialized(db: &DatabaseConnection) -> AppResult<bool> {
    let row = db
        .query_one(statement(
            "SELECT EXISTS(SELECT 1 FROM information_schema.schemata WHERE schema_name = 'apalis') as exists",
        ))
        .await
        .map_err(|e| AppError::internal(format!("Query failed: {}", e)))?;

    Ok(row
        .and_then(|r| r.try_get::<bool>("", "exists").ok())
        .unwrap_or(false))
}

async fn list_jobs(config: &Config) -> AppResult<()> {
    let db = connect(config).await?;

    println!("\n=== Email Queue ===");
    if !queue_initialized(&db).await? {
        println!("Queue not initialized. Run 'jobs work' or 'serve' first.");
        return Ok(());
    }

    let rows = db
        .query_all(statement(
            "SELECT status::text as status, COUNT(*)::bigint as count FROM apalis.jobs GROUP BY status ORDER BY status",
        ))
        .await
        .map_err(|e| AppError::internal(format!("Query failed: {}", e)))?;

    if rows.is_empty() {
        println!("No jobs.");
    }
    for row in rows {
        if let (Ok(status), Ok(count)) = (
            row.try_get::<String>("", "status"),
            row.try_get::<i64>("", "count"),
        ) {
            println!("{:<10}{}", format!("{}:", status), count);
        }
    }

    Ok(())
}

async fn clear_failed_jobs(config: &Config) -> AppResult<()> {
    let db = connect(config).await?;

    if !queue_initialized(&db).await? {
        println!("Queue not initialized. Nothing to clear.");
        return Ok(());
    }

    let result = db
        .execute(statement("DELETE FROM apalis.jobs WHERE status = 'Failed'"))
        .await
        .map_err(|e| AppError::internal(format!("Failed to clear jobs: {}", e)))?;

    println!("Cleared {} failed job(s).", result.rows_affected());
    Ok(())
}
