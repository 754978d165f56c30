//! # Job Board API Server
//!
//! Serves account registration (email verification codes), login, and
//! job listings over HTTP.
//!
//! ## Usage
//!
//! ```bash
//! DATABASE_URL=postgresql://localhost/jobboard JWT_SECRET=... cargo run -p jobboard-api
//! ```

use jobboard_api::{
    app,
    config::{Config, LogFormat},
};
use jobboard_shared::{
    db::{
        migrations::run_migrations,
        pool::{close_pool, create_pool, DatabaseConfig},
    },
    registration::PendingSweeper,
};
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env()?;

    init_tracing(config.log_format);

    tracing::info!(
        "Job Board API Server v{} starting...",
        env!("CARGO_PKG_VERSION")
    );

    let pool = create_pool(DatabaseConfig {
        max_connections: config.database.max_connections,
        ..DatabaseConfig::new(config.database.url.clone())
    })
    .await?;
    run_migrations(&pool).await?;

    let bind_address = config.bind_address();
    let sweep_interval = config.registration.sweep_interval_secs;
    let state = app::build_state(config, pool.clone()).await?;

    let shutdown = CancellationToken::new();
    let sweeper = if sweep_interval > 0 {
        let handle = PendingSweeper::new(
            state.registration.clone(),
            Duration::from_secs(sweep_interval),
        )
        .with_shutdown_token(shutdown.clone())
        .spawn();
        Some(handle)
    } else {
        None
    };

    let router = app::build_router(state);
    let listener = tokio::net::TcpListener::bind(&bind_address).await?;
    tracing::info!("Server listening on http://{}", bind_address);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Shutdown signal received, stopping background tasks...");
    shutdown.cancel();
    if let Some(handle) = sweeper {
        if let Err(e) = handle.await {
            tracing::warn!(error = %e, "Pending sweeper task ended abnormally");
        }
    }
    close_pool(pool).await;

    tracing::info!("Server stopped");
    Ok(())
}

fn init_tracing(format: LogFormat) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        "jobboard_api=debug,jobboard_shared=debug,tower_http=debug".into()
    });

    match format {
        LogFormat::Json => tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init(),
        LogFormat::Pretty => tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init(),
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}
