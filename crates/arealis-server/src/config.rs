use serde::Serialize;
use std::time::Duration;

pub const CONFIG_SCHEMA_VERSION: &str = "1";

#[derive(Debug, Clone, Serialize)]
pub struct ServerConfig {
    pub bind_addr: String,
    /// SQLite path or URI of the ingested boundary/series database.
    pub db_path: String,
    pub pool_size: usize,
    pub request_timeout: Duration,
    pub sql_timeout: Duration,
    pub slow_query_threshold: Duration,
    /// Gates the `debug=true` echo on /choropleth. Off in production
    /// deployments; the flag is ignored while disabled.
    pub enable_debug_echo: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:8080".to_string(),
            db_path: "arealis.db".to_string(),
            pool_size: 8,
            request_timeout: Duration::from_secs(5),
            sql_timeout: Duration::from_millis(800),
            slow_query_threshold: Duration::from_millis(250),
            enable_debug_echo: false,
        }
    }
}
