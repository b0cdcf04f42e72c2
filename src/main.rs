//! Hangar - Flight School Dashboard Gateway
//!
//! Sits in front of the dashboard frontend and owns its authentication
//! boundary:
//!
//! - Issues the session and CSRF cookies
//! - Guards the dashboard sections, redirecting to the login page when no
//!   token is present
//! - Forwards guarded requests with a normalized `Authorization` header

use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use hangar::{routes, AppConfig, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "hangar=debug,tower_http=debug".into());
    let json_logs = std::env::var("HANGAR_LOG_FORMAT").is_ok_and(|format| format == "json");

    if json_logs {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }

    tracing::info!("Starting Hangar Gateway v{}", env!("CARGO_PKG_VERSION"));

    // Load configuration
    let app_config = AppConfig::load().map_err(|e| {
        tracing::error!("Failed to load configuration: {}", e);
        anyhow::anyhow!("Configuration error: {}", e)
    })?;

    tracing::info!(
        "Configuration loaded. Server will listen on {}:{}",
        app_config.server.host,
        app_config.server.port
    );

    if app_config.auth.session_token.is_empty() {
        tracing::warn!("HANGAR_AUTH__SESSION_TOKEN is not set; issued token cookies will be empty");
    }
    if app_config.auth.csrf_token.is_empty() {
        tracing::warn!("HANGAR_AUTH__CSRF_TOKEN is not set; issued csrf-token cookies will be empty");
    }

    match &app_config.upstream.url {
        Some(url) => tracing::info!("Forwarding dashboard requests to {}", url),
        None => tracing::warn!("No dashboard frontend configured; unmatched routes will return 404"),
    }

    // Initialize application state
    let state = Arc::new(AppState::new(app_config.clone())?);

    let app = routes::app(state);

    // Start the server
    let addr = app_config.server.socket_addr()?;

    tracing::info!("Listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
