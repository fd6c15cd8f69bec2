use crate::http::handlers::{
    api_error_response, etag_for, if_none_match, propagated_request_id, put_cache_headers,
    with_request_id,
};
use crate::AppState;
use arealis_api::{
    assemble_boundary_collection, assemble_boundary_feature, directives_for,
    parse_boundaries_params, ApiError,
};
use arealis_model::{lookup_candidates, ResponseMode};
use arealis_query::{query_boundaries, query_boundary_by_id};
use axum::body::Body;
use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use serde_json::Value;
use std::collections::HashMap;
use std::time::Instant;
use tokio::time::timeout;
use tracing::{error, info, warn};

fn geometry_response(
    body: &Value,
    request_headers: &HeaderMap,
    request_id: &str,
) -> Result<Response, ApiError> {
    let bytes = serde_json::to_vec(body).map_err(|_| ApiError::internal())?;
    let etag = etag_for(&bytes);
    let directives = directives_for(ResponseMode::Geometry, false);

    if if_none_match(request_headers).as_deref() == Some(etag.as_str()) {
        let mut response = StatusCode::NOT_MODIFIED.into_response();
        put_cache_headers(response.headers_mut(), directives, Some(&etag));
        return Ok(with_request_id(response, request_id));
    }

    let mut response = Response::new(Body::from(bytes));
    response
        .headers_mut()
        .insert("content-type", HeaderValue::from_static("application/json"));
    put_cache_headers(response.headers_mut(), directives, Some(&etag));
    Ok(with_request_id(response, request_id))
}

pub(crate) async fn boundaries_handler(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
    headers: HeaderMap,
) -> Response {
    let started = Instant::now();
    let request_id = propagated_request_id(&headers, &state);

    let parsed = match parse_boundaries_params(&params) {
        Ok(parsed) => parsed,
        Err(err) => {
            return with_request_id(
                api_error_response(err.with_request_id(request_id.clone())),
                &request_id,
            )
        }
    };
    let descriptor = parsed.descriptor;

    let work = state
        .pool
        .run(state.config.sql_timeout, move |conn| {
            query_boundaries(conn, &descriptor)
        });
    let rows = match timeout(state.config.request_timeout, work).await {
        Ok(Ok(rows)) => rows,
        Ok(Err(err)) => {
            error!(request_id = %request_id, table = descriptor.table, error = %err, "boundary query failed");
            return with_request_id(
                api_error_response(ApiError::internal().with_request_id(request_id.clone())),
                &request_id,
            );
        }
        Err(_) => {
            error!(request_id = %request_id, table = descriptor.table, "boundary query timed out");
            return with_request_id(
                api_error_response(ApiError::internal().with_request_id(request_id.clone())),
                &request_id,
            );
        }
    };

    let body = assemble_boundary_collection(&rows, parsed.simplify);
    info!(
        request_id = %request_id,
        table = descriptor.table,
        features = rows.len(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "boundaries served"
    );
    match geometry_response(&body, &headers, &request_id) {
        Ok(response) => response,
        Err(err) => with_request_id(
            api_error_response(err.with_request_id(request_id.clone())),
            &request_id,
        ),
    }
}

pub(crate) async fn boundary_by_id_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(params): Query<HashMap<String, String>>,
    headers: HeaderMap,
) -> Response {
    let request_id = propagated_request_id(&headers, &state);

    let simplify = match parse_boundaries_params(&params) {
        Ok(parsed) => parsed.simplify,
        Err(err) => {
            return with_request_id(
                api_error_response(err.with_request_id(request_id.clone())),
                &request_id,
            )
        }
    };

    for descriptor in lookup_candidates(&id) {
        let lookup_id = id.clone();
        let work = state
            .pool
            .run(state.config.sql_timeout, move |conn| {
                query_boundary_by_id(conn, &descriptor, &lookup_id)
            });
        match timeout(state.config.request_timeout, work).await {
            Ok(Ok(Some(row))) => {
                info!(request_id = %request_id, table = descriptor.table, id = %row.id, "boundary lookup hit");
                let body = assemble_boundary_feature(&row, simplify);
                return match geometry_response(&body, &headers, &request_id) {
                    Ok(response) => response,
                    Err(err) => with_request_id(
                        api_error_response(err.with_request_id(request_id.clone())),
                        &request_id,
                    ),
                };
            }
            Ok(Ok(None)) => {}
            Ok(Err(err)) => {
                // A missing table in one hierarchy should not mask a hit in
                // the next candidate.
                warn!(request_id = %request_id, table = descriptor.table, error = %err, "boundary lookup candidate failed");
            }
            Err(_) => {
                warn!(request_id = %request_id, table = descriptor.table, "boundary lookup candidate timed out");
            }
        }
    }

    with_request_id(
        api_error_response(ApiError::not_found(&id).with_request_id(request_id.clone())),
        &request_id,
    )
}
