//! API server for the todo task manager
//!
//! Serves the task REST API on `TODO_BIND_ADDR` (default port 8081), backed
//! by PostgreSQL when reachable and in-memory storage otherwise.

mod app;
mod config;
mod routes;
mod state;

use anyhow::Context as _;
use axum::Router;
use tokio_util::sync::CancellationToken;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::app::App;
use crate::config::Config;
use crate::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "todo_api_server=debug,todo_core=info,tower_http=debug".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env();
    let app = App::startup(&config).await;
    tracing::info!("Task storage backend: {}", app.backend());

    let shutdown = CancellationToken::new();
    let app_state = AppState::new(app, shutdown.clone(), config.request_timeout);

    let rest_app = Router::new()
        .merge(routes::health::router())
        .merge(routes::task::router())
        .with_state(app_state.clone())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http());

    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr))?;
    tracing::info!("REST API listening on {}", config.bind_addr);

    axum::serve(listener, rest_app)
        .with_graceful_shutdown(shutdown_signal(shutdown))
        .await
        .context("server error")?;

    app_state.app().shutdown().await?;
    tracing::info!("Server stopped");
    Ok(())
}

/// Resolves on Ctrl+C and cancels in-flight request contexts
async fn shutdown_signal(token: CancellationToken) {
    match tokio::signal::ctrl_c().await {
        Ok(()) => {
            tracing::info!("Shutdown signal received");
            token.cancel();
        }
        Err(err) => {
            tracing::warn!("Unable to listen for shutdown signal: {}", err);
            std::future::pending::<()>().await;
        }
    }
}
