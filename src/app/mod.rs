pub mod error;
pub mod routes;
pub mod state;

use crate::config::AppConfig;
use crate::utils::error::Result;
use axum::{
    http::{header::CONTENT_TYPE, HeaderValue, Method},
    routing::{get, post},
    Router,
};
use routes::{
    chat_handler, count_handler, health_handler, location_handler, register_handler,
    welcome_handler,
};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};

pub use state::AppState;

fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE])
        .max_age(Duration::from_secs(60 * 60));

    if allowed_origins.is_empty() {
        return cors.allow_origin(Any);
    }

    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!("Ignoring invalid CORS origin {}: {}", origin, e);
                None
            }
        })
        .collect();

    cors.allow_origin(AllowOrigin::list(origins))
}

pub fn router(state: Arc<AppState>, allowed_origins: &[String]) -> Router {
    Router::new()
        .route("/api/waitlist", post(register_handler))
        .route("/api/waitlist/count", get(count_handler))
        .route("/api/location", post(location_handler))
        .route("/api/welcome", post(welcome_handler))
        .route("/api/chat", post(chat_handler))
        .route("/api/health", get(health_handler))
        .layer(cors_layer(allowed_origins))
        .with_state(state)
}

/// Serves until Ctrl+C or SIGTERM.
pub async fn serve(listener: TcpListener, app: Router) -> Result<()> {
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

pub async fn run(config: AppConfig) -> Result<()> {
    tracing::info!("Initializing state...");
    let state = AppState::from_config(&config).await?;
    let count = state.registry.count().await?;
    tracing::info!("Waitlist currently has {} signups", count);

    let app = router(state, &config.server.allowed_origins);

    let address = config.bind_address();
    tracing::info!("Binding to {}", address);
    let listener = TcpListener::bind(&address).await?;
    tracing::info!("Server running on {}", address);

    serve(listener, app).await?;

    tracing::info!("Server shut down");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        match tokio::signal::ctrl_c().await {
            Ok(()) => tracing::info!("Received Ctrl+C, shutting down"),
            Err(e) => {
                tracing::error!("Failed to install Ctrl+C handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};

        match signal(SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                tracing::info!("Received terminate signal, shutting down");
            }
            Err(e) => {
                tracing::error!("Failed to install signal handler: {}", e);
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
}
