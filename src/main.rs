//! Tasklist HTTP server.
//!
//! Reads configuration from the environment (and `.env` when present),
//! prepares the selected store and serves the task API until Ctrl+C or
//! `SIGTERM`. See [`tasklist::config`] for the recognised variables.

use std::error::Error;
use std::sync::Arc;

use axum::Router;
use diesel::pg::PgConnection;
use diesel::r2d2::{ConnectionManager, Pool};
use mockable::DefaultClock;
use tasklist::{
    config::{AppConfig, StorageMode},
    http::{Server, create_router},
    task::{
        adapters::{
            memory::InMemoryTaskStore,
            postgres::{PostgresTaskStore, ensure_schema},
        },
        ports::TaskStore,
        services::TaskLifecycleService,
    },
    telemetry,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error + Send + Sync>> {
    let dotenv = dotenvy::dotenv();
    telemetry::init();
    if let Err(err) = dotenv {
        tracing::debug!(error = %err, "no .env file loaded");
    }

    let config = AppConfig::from_env()?;
    tracing::info!(storage = %config.storage, "starting tasklist");

    let router = match &config.storage {
        StorageMode::Postgres {
            database_url,
            pool_size,
        } => {
            let manager = ConnectionManager::<PgConnection>::new(database_url.as_str());
            let pool = Pool::builder().max_size(*pool_size).build(manager)?;
            ensure_schema(&pool).await?;
            router_for(PostgresTaskStore::new(pool))
        }
        StorageMode::InMemory => router_for(InMemoryTaskStore::new()),
    };

    Server::new(config.socket_addr()).run(router).await?;
    Ok(())
}

fn router_for<S>(store: S) -> Router
where
    S: TaskStore + 'static,
{
    create_router(TaskLifecycleService::new(
        Arc::new(store),
        Arc::new(DefaultClock),
    ))
}
