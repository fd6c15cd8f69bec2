#![forbid(unsafe_code)]

use arealis_server::{build_router, AppState, ServerConfig};
use std::env;
use std::time::Duration;
use tokio::net::TcpListener;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn env_str(name: &str, default: &str) -> String {
    env::var(name).unwrap_or_else(|_| default.to_string())
}

fn env_bool(name: &str, default: bool) -> bool {
    env::var(name)
        .ok()
        .and_then(|v| match v.as_str() {
            "1" | "true" | "TRUE" | "yes" | "YES" => Some(true),
            "0" | "false" | "FALSE" | "no" | "NO" => Some(false),
            _ => None,
        })
        .unwrap_or(default)
}

fn env_u64(name: &str, default: u64) -> u64 {
    env::var(name)
        .ok()
        .and_then(|v| v.parse::<u64>().ok())
        .unwrap_or(default)
}

fn env_usize(name: &str, default: usize) -> usize {
    env::var(name)
        .ok()
        .and_then(|v| v.parse::<usize>().ok())
        .unwrap_or(default)
}

fn env_duration_ms(name: &str, default_ms: u64) -> Duration {
    Duration::from_millis(env_u64(name, default_ms))
}

fn config_from_env() -> ServerConfig {
    let defaults = ServerConfig::default();
    ServerConfig {
        bind_addr: env_str("AREALIS_BIND_ADDR", &defaults.bind_addr),
        db_path: env_str("AREALIS_DB_PATH", &defaults.db_path),
        pool_size: env_usize("AREALIS_POOL_SIZE", defaults.pool_size),
        request_timeout: env_duration_ms(
            "AREALIS_REQUEST_TIMEOUT_MS",
            defaults.request_timeout.as_millis() as u64,
        ),
        sql_timeout: env_duration_ms(
            "AREALIS_SQL_TIMEOUT_MS",
            defaults.sql_timeout.as_millis() as u64,
        ),
        slow_query_threshold: env_duration_ms(
            "AREALIS_SLOW_QUERY_MS",
            defaults.slow_query_threshold.as_millis() as u64,
        ),
        enable_debug_echo: env_bool("AREALIS_ENABLE_DEBUG_ECHO", defaults.enable_debug_echo),
    }
}

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = config_from_env();
    info!(
        bind_addr = %config.bind_addr,
        db_path = %config.db_path,
        pool_size = config.pool_size,
        debug_echo = config.enable_debug_echo,
        "starting arealis server"
    );

    let bind_addr = config.bind_addr.clone();
    let state = AppState::new(config);
    let app = build_router(state);

    let listener = match TcpListener::bind(&bind_addr).await {
        Ok(listener) => listener,
        Err(e) => {
            error!(bind_addr = %bind_addr, error = %e, "failed to bind");
            std::process::exit(1);
        }
    };
    if let Err(e) = axum::serve(listener, app).await {
        error!(error = %e, "server exited with error");
        std::process::exit(1);
    }
}
