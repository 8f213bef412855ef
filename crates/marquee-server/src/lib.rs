//! Marquee Server - HTTP server for the Marquee movie catalog.
//!
//! Axum-based HTTP layer over the catalog service and cache
//! coordinator. The interesting pieces live in [`cache`] (single-flight
//! read-through coordination with tag invalidation) and [`catalog`]
//! (write path with post-write invalidation).

pub mod cache;
pub mod catalog;
pub mod config;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod metrics;
pub mod middleware;
pub mod server;
pub mod state;

pub use cache::{CacheCoordinator, CoordinatorConfig, MokaStore, MokaStoreConfig, TtlPolicy};
pub use catalog::CatalogService;
pub use config::ServerConfig;
pub use error::ApiError;
pub use server::{create_router_with_state, run_server_with_state};
pub use state::AppState;

/// Returns the crate version.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
