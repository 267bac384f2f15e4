// src/main.rs
use std::sync::Arc;
use std::time::Duration;

use axum_server::Handle;
use dotenvy::dotenv;
use premiosplatzi::{config::Settings, db, logging, poll::PgPollStore, routes, AppState};
use tokio::signal;
use tracing::info;

/// Resolves on SIGINT or, on Unix, SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => info!("Received SIGINT, shutting down"),
        () = terminate => info!("Received SIGTERM, shutting down"),
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv().ok(); // Load environment variables from .env file
    logging::init();

    let settings = Settings::from_env()?;
    let addr = settings.server.addr();

    let pool = db::create_pool(&settings.database).await?;
    info!("Connected to database");
    db::migrate(&pool).await?;

    if settings.admin_token.is_none() {
        info!("ADMIN_TOKEN not set, admin API disabled");
    }

    let state = AppState::new(Arc::new(PgPollStore::new(pool)), settings)?;
    let app = routes::create_routes(state);

    let handle = Handle::new();
    let shutdown = handle.clone();
    tokio::spawn(async move {
        shutdown_signal().await;
        shutdown.graceful_shutdown(Some(Duration::from_secs(10)));
    });

    info!(%addr, "Listening");
    axum_server::bind(addr)
        .handle(handle)
        .serve(app.into_make_service())
        .await?;

    info!("Server stopped");
    Ok(())
}
