//! Funnel API Server implementation
//!
//! HTTP REST API server using Axum. Serves the period reports and the
//! forecast blocks as JSON for the dashboard front end.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{routing::get, Router};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

use super::handlers;
use crate::config::DashboardSettings;
use crate::sheets::SheetSource;

/// API Server configuration
#[derive(Clone)]
pub struct ApiConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
        }
    }
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub version: String,
    pub settings: Arc<DashboardSettings>,
    pub source: Arc<dyn SheetSource>,
}

impl AppState {
    pub fn new(settings: DashboardSettings, source: Arc<dyn SheetSource>) -> Self {
        Self {
            version: env!("CARGO_PKG_VERSION").to_string(),
            settings: Arc::new(settings),
            source,
        }
    }
}

/// Build the router with all routes and middleware
pub fn build_router(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Health and info endpoints
        .route("/", get(handlers::root))
        .route("/health", get(handlers::health))
        .route("/version", get(handlers::version))
        // Dashboard endpoints
        .route("/api/v1/periods", get(handlers::periods))
        .route("/api/v1/metrics/:period", get(handlers::metrics))
        .route("/api/v1/forecast", get(handlers::forecast))
        // State and middleware
        .with_state(Arc::new(state))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

/// Run the API server
pub async fn run_api_server(config: ApiConfig, state: AppState) -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "funnel_dash=info,tower_http=info".into()),
        )
        .init();

    let periods: Vec<String> = state.settings.periods.iter().map(|p| p.key.clone()).collect();
    let app = build_router(state);

    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;
    info!("Funnel API Server starting on http://{}", addr);
    info!("   Endpoints: /api/v1/periods, /api/v1/metrics/:period, /api/v1/forecast");
    info!("   Periods: {}", periods.join(", "));

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Funnel API Server shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("failed to install SIGTERM handler: {}", e);
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

    info!("Shutdown signal received, stopping server...");
}

#[cfg(test)]
mod tests {
    use super::*;

    // ==================== ApiConfig Tests ====================

    #[test]
    fn test_default_config() {
        let config = ApiConfig::default();
        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.port, 8080);
    }

    #[test]
    fn test_config_address_format() {
        let config = ApiConfig {
            host: "192.168.1.100".to_string(),
            port: 9090,
        };
        let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse().unwrap();
        assert_eq!(addr.port(), 9090);
    }

    // ==================== AppState Tests ====================

    #[test]
    fn test_app_state_uses_crate_version() {
        let state = AppState::new(
            DashboardSettings::default(),
            Arc::new(crate::sheets::XlsxSource::new("unused.xlsx")),
        );
        assert_eq!(state.version, env!("CARGO_PKG_VERSION"));
        assert_eq!(state.settings.periods.len(), 3);
    }
}
