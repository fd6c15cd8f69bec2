//! Query-parameter parsing and validation. Everything here runs before any
//! pool checkout; a failure never reaches the datastore.

use crate::errors::ApiError;
use arealis_model::{catalog, registry, DatasetDescriptor, Geography, Level, MetricConfig,
    ResponseMode};
use chrono::NaiveDate;
use std::collections::HashMap;

#[derive(Debug, Clone)]
pub struct BoundariesParams {
    pub descriptor: DatasetDescriptor,
    pub simplify: Option<f64>,
}

#[derive(Debug, Clone)]
pub struct ChoroplethParams {
    pub descriptor: DatasetDescriptor,
    /// Registry-resolved config; its key is the normalized category bound
    /// into the query.
    pub metric: MetricConfig,
    pub as_of: Option<NaiveDate>,
    pub mode: ResponseMode,
    pub simplify: Option<f64>,
    pub debug: bool,
}

pub fn bool_flag(params: &HashMap<String, String>, name: &str) -> bool {
    params
        .get(name)
        .is_some_and(|v| v == "1" || v.eq_ignore_ascii_case("true"))
}

fn parse_descriptor(params: &HashMap<String, String>) -> Result<DatasetDescriptor, ApiError> {
    let geography = match params.get("geography") {
        Some(raw) => Some(
            Geography::parse(raw)
                .map_err(|e| ApiError::invalid_param("geography", raw, &e.to_string()))?,
        ),
        None => None,
    };
    let level = match params.get("level") {
        Some(raw) => Some(
            Level::parse(raw).map_err(|e| ApiError::invalid_param("level", raw, &e.to_string()))?,
        ),
        None => None,
    };
    catalog::resolve(geography, level).map_err(|_| {
        ApiError::invalid_combination(
            params.get("geography").map_or("", String::as_str),
            params.get("level").map_or("", String::as_str),
        )
    })
}

fn parse_date(params: &HashMap<String, String>) -> Result<Option<NaiveDate>, ApiError> {
    match params.get("date") {
        None => Ok(None),
        Some(raw) if raw.trim().is_empty() => Ok(None),
        Some(raw) => NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
            .map(Some)
            .map_err(|_| ApiError::invalid_param("date", raw, "expected YYYY-MM-DD")),
    }
}

fn parse_simplify(params: &HashMap<String, String>) -> Result<Option<f64>, ApiError> {
    match params.get("simplify") {
        None => Ok(None),
        Some(raw) => {
            let tolerance: f64 = raw
                .trim()
                .parse()
                .map_err(|_| ApiError::invalid_param("simplify", raw, "expected a number"))?;
            if !tolerance.is_finite() || tolerance <= 0.0 {
                return Err(ApiError::invalid_param(
                    "simplify",
                    raw,
                    "tolerance must be positive",
                ));
            }
            Ok(Some(tolerance))
        }
    }
}

fn parse_mode(params: &HashMap<String, String>) -> Result<ResponseMode, ApiError> {
    match params.get("format").map(String::as_str) {
        None | Some("map") => Ok(ResponseMode::Value),
        Some("geojson") => Ok(ResponseMode::Geometry),
        Some(other) => Err(ApiError::invalid_param(
            "format",
            other,
            "expected map or geojson",
        )),
    }
}

pub fn parse_boundaries_params(
    params: &HashMap<String, String>,
) -> Result<BoundariesParams, ApiError> {
    Ok(BoundariesParams {
        descriptor: parse_descriptor(params)?,
        simplify: parse_simplify(params)?,
    })
}

pub fn parse_choropleth_params(
    params: &HashMap<String, String>,
) -> Result<ChoroplethParams, ApiError> {
    let descriptor = parse_descriptor(params)?;
    // `category` must be present; an empty value still resolves through the
    // registry (which falls back to unemployment).
    let category = params
        .get("category")
        .ok_or_else(|| ApiError::missing_param("category"))?;
    let metric = registry::resolve(category);
    Ok(ChoroplethParams {
        descriptor,
        metric,
        as_of: parse_date(params)?,
        mode: parse_mode(params)?,
        simplify: parse_simplify(params)?,
        debug: bool_flag(params, "debug"),
    })
}

/// ISO date string bound into the query, if any.
#[must_use]
pub fn as_of_param(as_of: Option<NaiveDate>) -> Option<String> {
    as_of.map(|d| d.format("%Y-%m-%d").to_string())
}
