use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use staybook_api::{app, worker, AppState, AuthConfig};
use staybook_core::{BookingService, InMemoryStore, StoreSeed};
use staybook_store::app_config::{Config, StorageBackend, StorageConfig};
use staybook_store::DbClient;
use tokio::sync::broadcast;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "staybook_api=debug,staybook_core=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::load().context("Failed to load config")?;
    tracing::info!("Starting Staybook API on port {}", config.server.port);

    let bookings = match config.storage.backend {
        StorageBackend::Postgres => {
            let db = DbClient::new(&config.database)
                .await
                .context("Failed to connect to Postgres")?;
            db.migrate().await.context("Failed to run migrations")?;
            db.booking_service()
        }
        StorageBackend::Memory => memory_service(&config.storage)?,
    };

    // Booking events, consumed by the audit worker
    let (events_tx, events_rx) = broadcast::channel(config.events.channel_capacity);
    tokio::spawn(worker::run_audit_log(events_rx));

    let app_state = AppState {
        bookings,
        events: events_tx,
        auth: AuthConfig {
            secret: config.auth.jwt_secret.clone(),
        },
    };

    let app = app(app_state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

fn memory_service(storage: &StorageConfig) -> anyhow::Result<BookingService> {
    tracing::warn!("Using in-memory storage; bookings are lost on restart");

    let seed = match &storage.seed_file {
        Some(path) => {
            let raw = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read seed file {}", path))?;
            serde_json::from_str::<StoreSeed>(&raw)
                .with_context(|| format!("Invalid seed file {}", path))?
        }
        None => StoreSeed::default(),
    };

    Ok(BookingService::from_store(Arc::new(InMemoryStore::from_seed(seed))))
}
