use std::sync::Arc;

use dotenvy::dotenv;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

use events_server::config::{Config, StoreBackend};
use events_server::db::Database;
use events_server::repository::{EventRepository, InMemoryEventRepository, PgEventRepository};
use events_server::routes::{create_routes, AppState};

#[tokio::main]
async fn main() {
    dotenv().ok();
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let config = Config::from_env();

    let (repo, database): (Arc<dyn EventRepository>, Option<Database>) = match config.store {
        StoreBackend::Postgres => {
            let database = Database::connect(&config.database)
                .await
                .expect("Failed to connect to database");
            database.migrate().await.expect("Failed to run migrations");
            (
                Arc::new(PgEventRepository::new(database.pool().clone())),
                Some(database),
            )
        }
        StoreBackend::Memory => {
            tracing::warn!("Using in-memory event store; data is lost on shutdown");
            (Arc::new(InMemoryEventRepository::new()), None)
        }
    };

    let app = create_routes(AppState::new(repo), &config);

    let addr = config.socket_addr();
    tracing::info!("🚀 Server running at http://{}", addr);

    let listener = TcpListener::bind(addr)
        .await
        .expect("Failed to bind address");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server failed");

    if let Some(database) = database {
        database.close().await;
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = ?e, "Failed to listen for Ctrl+C");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = ?e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
