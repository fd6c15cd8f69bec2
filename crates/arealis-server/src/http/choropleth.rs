use crate::http::handlers::{
    api_error_response, propagated_request_id, put_cache_headers, with_request_id,
};
use crate::AppState;
use arealis_api::{
    as_of_param, assemble_feature_collection, assemble_value_map, directives_for,
    parse_choropleth_params, ApiError,
};
use arealis_model::ResponseMode;
use arealis_query::{
    build_choropleth_sql, choropleth_params, params_debug, query_choropleth, ChoroplethRequest,
};
use axum::extract::{Query, State};
use axum::http::HeaderMap;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use std::collections::HashMap;
use std::time::Instant;
use tokio::time::timeout;
use tracing::{error, info, warn};

pub(crate) async fn choropleth_handler(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
    headers: HeaderMap,
) -> Response {
    let started = Instant::now();
    let request_id = propagated_request_id(&headers, &state);

    let parsed = match parse_choropleth_params(&params) {
        Ok(parsed) => parsed,
        Err(err) => {
            return with_request_id(
                api_error_response(err.with_request_id(request_id.clone())),
                &request_id,
            )
        }
    };

    let descriptor = parsed.descriptor;
    let has_date = parsed.as_of.is_some();
    let request = ChoroplethRequest {
        category: parsed.metric.key.clone(),
        as_of: as_of_param(parsed.as_of),
        mode: parsed.mode,
    };

    let query_request = request.clone();
    let work = state
        .pool
        .run(state.config.sql_timeout, move |conn| {
            query_choropleth(conn, &descriptor, &query_request)
        });
    let rows = match timeout(state.config.request_timeout, work).await {
        Ok(Ok(rows)) => rows,
        Ok(Err(err)) => {
            error!(
                request_id = %request_id,
                table = descriptor.table,
                category = %request.category,
                as_of = request.as_of.as_deref().unwrap_or("latest"),
                error = %err,
                "choropleth query failed"
            );
            return with_request_id(
                api_error_response(ApiError::internal().with_request_id(request_id.clone())),
                &request_id,
            );
        }
        Err(_) => {
            error!(request_id = %request_id, table = descriptor.table, "choropleth query timed out");
            return with_request_id(
                api_error_response(ApiError::internal().with_request_id(request_id.clone())),
                &request_id,
            );
        }
    };

    let elapsed = started.elapsed();
    if elapsed > state.config.slow_query_threshold {
        warn!(
            request_id = %request_id,
            table = descriptor.table,
            category = %request.category,
            elapsed_ms = elapsed.as_millis() as u64,
            "slow choropleth query"
        );
    }
    info!(
        request_id = %request_id,
        table = descriptor.table,
        category = %request.category,
        rows = rows.len(),
        elapsed_ms = elapsed.as_millis() as u64,
        "choropleth served"
    );

    if parsed.debug && state.config.enable_debug_echo {
        let sql = build_choropleth_sql(&descriptor, request.mode);
        let bound = choropleth_params(&descriptor, &request);
        let body = json!({
            "query": sql,
            "params": params_debug(&bound),
            "rows": rows,
        });
        return with_request_id(Json(body).into_response(), &request_id);
    }

    let body = match parsed.mode {
        ResponseMode::Value => assemble_value_map(&rows),
        ResponseMode::Geometry => {
            assemble_feature_collection(&rows, &descriptor, &parsed.metric.key, parsed.simplify)
        }
    };
    let mut response = Json(body).into_response();
    put_cache_headers(
        response.headers_mut(),
        directives_for(parsed.mode, has_date),
        None,
    );
    with_request_id(response, &request_id)
}
