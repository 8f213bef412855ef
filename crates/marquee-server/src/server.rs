use std::net::SocketAddr;

use axum::{
    Router, middleware,
    routing::{delete, get},
};
use metrics_exporter_prometheus::PrometheusHandle;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;

use crate::handlers::{
    health::health_check,
    invalidate::{invalidate_all, invalidate_collections, invalidate_movie},
    metrics::metrics_handler,
    movies::{
        create_movie, delete_movie, get_movie, list_movies, popular_movies, recommended_movies,
        search_movies, update_movie,
    },
};
use crate::middleware::{LoggingLayer, RequestIdLayer};
use crate::state::AppState;

/// Creates a router with the given application state and metrics handle.
pub fn create_router_with_state(state: AppState, prometheus_handle: PrometheusHandle) -> Router {
    let middleware_stack = ServiceBuilder::new()
        .layer(RequestIdLayer)
        .layer(LoggingLayer);

    // Router for metrics endpoint (different state)
    let metrics_router = Router::new()
        .route("/metrics", get(metrics_handler))
        .with_state(prometheus_handle);

    // Main application router
    let app_router = Router::new()
        .route("/health", get(health_check))
        // Movie routes; fixed segments before the {id} catch-all
        .route("/movies", get(list_movies).post(create_movie))
        .route("/movies/search", get(search_movies))
        .route("/movies/popular", get(popular_movies))
        .route("/movies/recommendations", get(recommended_movies))
        .route(
            "/movies/{id}",
            get(get_movie).put(update_movie).delete(delete_movie),
        )
        // Cache invalidation routes
        .route("/cache", delete(invalidate_all))
        .route("/cache/movies", delete(invalidate_collections))
        .route("/cache/movies/{id}", delete(invalidate_movie))
        .with_state(state);

    // Merge routers and apply middleware
    Router::new()
        .merge(app_router)
        .merge(metrics_router)
        // HTTP metrics middleware
        .layer(middleware::from_fn(
            crate::metrics::http::http_metrics_middleware,
        ))
        .layer(CorsLayer::permissive())
        .layer(middleware_stack)
}

/// Runs the server with the given state and metrics handle.
pub async fn run_server_with_state(
    addr: SocketAddr,
    state: AppState,
    prometheus_handle: PrometheusHandle,
) -> Result<(), std::io::Error> {
    let app = create_router_with_state(state, prometheus_handle);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            },
            Err(e) => {
                tracing::error!(error = %e, "Failed to install signal handler");
                std::future::pending::<()>().await;
            },
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
