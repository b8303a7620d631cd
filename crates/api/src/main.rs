use std::net::SocketAddr;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use reetr_api::config::ServerConfig;
use reetr_api::router::build_app_router;
use reetr_api::state::AppState;

const DEFAULT_LOG_FILTER: &str = "reetr_api=debug,reetr_backend=debug,tower_http=debug";

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| DEFAULT_LOG_FILTER.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = ServerConfig::from_env();
    let addr = SocketAddr::new(
        config.host.parse().expect("HOST must be an IP address"),
        config.port,
    );
    tracing::info!(%addr, backend = %config.backend_api_url, "Starting admin API");

    let state = AppState::new(config);
    // Drafts live only in memory; keep a handle to report what is lost.
    let drafts = state.drafts.clone();

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    axum::serve(listener, build_app_router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");

    match drafts.count().await {
        0 => tracing::info!("Stopped with no open drafts"),
        open_drafts => tracing::warn!(open_drafts, "Stopped; unsubmitted drafts were discarded"),
    }
}

/// Resolves on Ctrl-C, or SIGTERM on Unix.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl-C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    let signal = tokio::select! {
        () = ctrl_c => "SIGINT",
        () = terminate => "SIGTERM",
    };
    tracing::info!(signal, "Shutting down");
}
