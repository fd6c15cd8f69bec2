use crate::AppState;
use arealis_api::{ApiError, CacheDirectives};
use axum::http::{HeaderMap, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use sha2::{Digest, Sha256};
use std::sync::atomic::Ordering;

pub(crate) fn make_request_id(state: &AppState) -> String {
    let id = state.request_id_seed.fetch_add(1, Ordering::Relaxed);
    format!("req-{id:016x}")
}

pub(crate) fn propagated_request_id(headers: &HeaderMap, state: &AppState) -> String {
    if let Some(raw) = headers.get("x-request-id").and_then(|v| v.to_str().ok()) {
        let trimmed = raw.trim();
        if !trimmed.is_empty() {
            return trimmed.to_string();
        }
    }
    make_request_id(state)
}

pub(crate) fn with_request_id(mut response: Response, request_id: &str) -> Response {
    if let Ok(v) = HeaderValue::from_str(request_id) {
        response.headers_mut().insert("x-request-id", v);
    }
    response
}

pub(crate) fn api_error_response(err: ApiError) -> Response {
    let status =
        StatusCode::from_u16(err.code.http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, Json(err.envelope())).into_response()
}

pub(crate) fn put_cache_headers(
    headers: &mut HeaderMap,
    directives: CacheDirectives,
    etag: Option<&str>,
) {
    if let Ok(value) = HeaderValue::from_str(&directives.header_value()) {
        headers.insert("cache-control", value);
    }
    if let Some(etag) = etag {
        if let Ok(value) = HeaderValue::from_str(etag) {
            headers.insert("etag", value);
        }
    }
}

pub(crate) fn if_none_match(headers: &HeaderMap) -> Option<String> {
    headers
        .get("if-none-match")
        .and_then(|v| v.to_str().ok())
        .map(std::string::ToString::to_string)
}

pub(crate) fn etag_for(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    format!("\"{:x}\"", hasher.finalize())
}

pub(crate) async fn healthz_handler() -> impl IntoResponse {
    (StatusCode::OK, "ok")
}

pub(crate) async fn readyz_handler(
    axum::extract::State(state): axum::extract::State<AppState>,
) -> Response {
    let probe = state
        .pool
        .run(state.config.sql_timeout, |conn| {
            conn.query_row("SELECT 1", [], |row| row.get::<_, i64>(0))
                .map_err(arealis_query::QueryError::from)
        })
        .await;
    match probe {
        Ok(_) => (StatusCode::OK, "ready").into_response(),
        Err(err) => {
            tracing::warn!(error = %err, "readiness probe failed");
            (StatusCode::SERVICE_UNAVAILABLE, "not-ready").into_response()
        }
    }
}

pub(crate) async fn version_handler(
    axum::extract::State(state): axum::extract::State<AppState>,
) -> Response {
    let request_id = make_request_id(&state);
    let payload = json!({
        "name": "arealis",
        "version": env!("CARGO_PKG_VERSION"),
        "config_schema_version": crate::config::CONFIG_SCHEMA_VERSION,
    });
    let mut response = Json(payload).into_response();
    if let Ok(value) = HeaderValue::from_str("public, max-age=30") {
        response.headers_mut().insert("cache-control", value);
    }
    with_request_id(response, &request_id)
}

/// Discovery endpoint: the seven datasets the catalog can resolve.
pub(crate) async fn catalog_handler(
    axum::extract::State(state): axum::extract::State<AppState>,
) -> Response {
    let request_id = make_request_id(&state);
    let datasets: Vec<_> = arealis_model::ALL_DESCRIPTORS
        .iter()
        .map(|d| {
            json!({
                "geography": d.geography,
                "level": d.level,
                "geography_type": d.geography_type_label,
            })
        })
        .collect();
    let mut response = Json(json!({"datasets": datasets})).into_response();
    if let Ok(value) = HeaderValue::from_str("public, max-age=3600") {
        response.headers_mut().insert("cache-control", value);
    }
    with_request_id(response, &request_id)
}
