#![forbid(unsafe_code)]

//! HTTP read path for arealis boundary and choropleth data.

use axum::routing::get;
use axum::Router;
use std::sync::atomic::AtomicU64;
use std::sync::Arc;

pub mod config;
mod http;
mod pool;

pub use config::ServerConfig;
pub use pool::{PoolError, ReadPool};

pub const CRATE_NAME: &str = "arealis-server";

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ServerConfig>,
    pub pool: Arc<ReadPool>,
    pub request_id_seed: Arc<AtomicU64>,
}

impl AppState {
    #[must_use]
    pub fn new(config: ServerConfig) -> Self {
        let pool = ReadPool::new(config.db_path.clone(), config.pool_size);
        Self {
            config: Arc::new(config),
            pool: Arc::new(pool),
            request_id_seed: Arc::new(AtomicU64::new(1)),
        }
    }
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/healthz", get(http::handlers::healthz_handler))
        .route("/readyz", get(http::handlers::readyz_handler))
        .route("/version", get(http::handlers::version_handler))
        .route("/catalog", get(http::handlers::catalog_handler))
        .route("/boundaries", get(http::boundaries::boundaries_handler))
        .route(
            "/boundaries/:id",
            get(http::boundaries::boundary_by_id_handler),
        )
        .route("/choropleth", get(http::choropleth::choropleth_handler))
        .with_state(state)
}
