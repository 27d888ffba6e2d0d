mod config;
mod handler;
mod storage;

use std::{sync::Arc, time::Duration};

use anyhow::{Context, Result};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use crate::{config::CONFIG, handler::AppState, storage::UploadDir};

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("signal received, starting graceful shutdown");
}

async fn cleanup_loop(uploads: Arc<UploadDir>, every: Duration) {
    let mut interval = tokio::time::interval(every);
    // the first tick fires immediately
    interval.tick().await;
    loop {
        interval.tick().await;
        match uploads.cleanup().await {
            Ok(0) => {}
            Ok(removed) => tracing::info!(removed, "deleted expired files"),
            Err(error) => tracing::error!(error = %format!("{error:#}"), "failed to clean up uploads"),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info,tower_http=debug".into()),
        ))
        .with(
            tracing_subscriber::fmt::layer()
                .with_file(true)
                .with_line_number(true),
        )
        .init();

    let uploads = Arc::new(
        UploadDir::open(&CONFIG.upload_dir, Duration::from_secs(CONFIG.file_ttl_secs)).await?,
    );

    tokio::spawn(cleanup_loop(
        uploads.clone(),
        Duration::from_secs(CONFIG.cleanup_interval_secs.max(1)),
    ));

    let state = AppState::new(
        uploads,
        CONFIG.max_file_size,
        CONFIG.max_concurrent_tasks,
        CONFIG.file_id_length,
    );
    let router = crate::handler::create_router(state, &CONFIG.allowed_origins);

    let listen_addr = CONFIG
        .listen_addr
        .parse()
        .context("failed to parse listen addr")?;

    tracing::info!(%listen_addr, upload_dir = %CONFIG.upload_dir, "starting http server...");

    axum::Server::bind(&listen_addr)
        .serve(router.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("failed to serve HTTP")?;

    Ok(())
}
