// SPDX-License-Identifier: Apache-2.0

#![forbid(unsafe_code)]

//! Query construction and execution for the arealis read path.
//!
//! SQL text is assembled only from `DatasetDescriptor` fields, which come
//! from the boundary catalog's closed enumeration. Everything request-shaped
//! (category, as-of date, lookup ids) is bound as a parameter.

use arealis_model::{DatasetDescriptor, ResponseMode};
use rusqlite::{params_from_iter, types::Value, Connection};
use serde::{Deserialize, Serialize};

pub const CRATE_NAME: &str = "arealis-query";

#[derive(Debug)]
pub struct QueryError(pub String);

impl std::fmt::Display for QueryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
impl std::error::Error for QueryError {}

impl From<rusqlite::Error> for QueryError {
    fn from(e: rusqlite::Error) -> Self {
        Self(e.to_string())
    }
}

/// One choropleth request against a resolved dataset.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChoroplethRequest {
    /// Normalized metric category (registry output).
    pub category: String,
    /// ISO-8601 as-of date; absent means "most recent observation".
    pub as_of: Option<String>,
    pub mode: ResponseMode,
}

/// A raw boundary row, no metric join.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BoundaryRow {
    pub id: String,
    pub name: String,
    pub geometry: serde_json::Value,
}

/// One boundary with its resolved metric value. `value` is None when no
/// eligible observation exists for the boundary — "no data", distinct from
/// zero. `geometry` is None in value mode.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedRow {
    pub id: String,
    pub name: String,
    pub geometry: Option<serde_json::Value>,
    pub value: Option<f64>,
    pub units: Option<String>,
    pub observation_date: Option<String>,
}

fn trimmed(alias: &str, column: &str) -> String {
    // FIPS-style ids are numeric in some source tables and padded text in
    // others; every comparison goes through trimmed text.
    format!("TRIM(CAST({alias}.{column} AS TEXT))")
}

fn valid_geometry_guard(d: &DatasetDescriptor) -> String {
    format!(
        "b.{g} IS NOT NULL AND json_valid(b.{g})",
        g = d.geometry_column
    )
}

#[must_use]
pub fn build_boundaries_sql(d: &DatasetDescriptor) -> String {
    format!(
        "SELECT {id} AS id, b.{name} AS name, b.{geom} AS geometry \
         FROM {table} b \
         WHERE {guard} \
         ORDER BY id ASC",
        id = trimmed("b", d.id_column),
        name = d.name_column,
        geom = d.geometry_column,
        table = d.table,
        guard = valid_geometry_guard(d),
    )
}

#[must_use]
pub fn build_boundary_by_id_sql(d: &DatasetDescriptor) -> String {
    format!(
        "SELECT {id} AS id, b.{name} AS name, b.{geom} AS geometry \
         FROM {table} b \
         WHERE {guard} AND {id} = TRIM(?1) \
         LIMIT 1",
        id = trimmed("b", d.id_column),
        name = d.name_column,
        geom = d.geometry_column,
        table = d.table,
        guard = valid_geometry_guard(d),
    )
}

/// Builds the two-stage choropleth statement.
///
/// Stage one (`picked`) ranks every eligible observation per trimmed
/// geography id, newest `observation_date` first; rank 1 is the as-of
/// resolution. Equal dates are broken by the highest observation id, i.e.
/// the most recently ingested fact — MAX(value) would be wrong here, these
/// are point observations, not aggregates. Stage two left-joins boundaries
/// so regions without data still appear, value NULL.
///
/// Parameters: ?1 geography type label, ?2 category, ?3 as-of date or NULL.
#[must_use]
pub fn build_choropleth_sql(d: &DatasetDescriptor, mode: ResponseMode) -> String {
    let geometry_select = match mode {
        ResponseMode::Geometry => format!("b.{} AS geometry", d.geometry_column),
        ResponseMode::Value => "NULL AS geometry".to_string(),
    };
    format!(
        "WITH picked AS ( \
           SELECT {sid} AS geography_id, \
                  o.value AS value, \
                  s.units AS units, \
                  o.observation_date AS observation_date, \
                  ROW_NUMBER() OVER ( \
                    PARTITION BY {sid} \
                    ORDER BY o.observation_date DESC, o.id DESC \
                  ) AS pick \
           FROM metric_series s \
           JOIN metric_observations o ON o.series_id = s.series_id \
           WHERE s.geography_type = ?1 \
             AND s.category = ?2 \
             AND s.is_active = 1 \
             AND (?3 IS NULL OR o.observation_date <= ?3) \
         ) \
         SELECT {bid} AS id, \
                b.{name} AS name, \
                {geometry_select}, \
                p.value AS value, \
                p.units AS units, \
                p.observation_date AS observation_date \
         FROM {table} b \
         LEFT JOIN picked p ON p.geography_id = {bid} AND p.pick = 1 \
         WHERE {guard} \
         ORDER BY id ASC",
        sid = trimmed("s", "geography_id"),
        bid = trimmed("b", d.id_column),
        name = d.name_column,
        table = d.table,
        guard = valid_geometry_guard(d),
    )
}

#[must_use]
pub fn choropleth_params(d: &DatasetDescriptor, req: &ChoroplethRequest) -> Vec<Value> {
    vec![
        Value::Text(d.geography_type_label.to_string()),
        Value::Text(req.category.clone()),
        match &req.as_of {
            Some(date) => Value::Text(date.clone()),
            None => Value::Null,
        },
    ]
}

/// JSON rendering of bound parameters, for the debug echo.
#[must_use]
pub fn params_debug(params: &[Value]) -> serde_json::Value {
    params
        .iter()
        .map(|p| match p {
            Value::Null => serde_json::Value::Null,
            Value::Integer(i) => serde_json::Value::from(*i),
            Value::Real(r) => serde_json::Value::from(*r),
            Value::Text(t) => serde_json::Value::from(t.clone()),
            Value::Blob(b) => serde_json::Value::from(format!("<{} bytes>", b.len())),
        })
        .collect()
}

fn parse_geometry(raw: String) -> Result<serde_json::Value, QueryError> {
    serde_json::from_str(&raw).map_err(|e| QueryError(format!("stored geometry is not JSON: {e}")))
}

pub fn query_boundaries(
    conn: &Connection,
    d: &DatasetDescriptor,
) -> Result<Vec<BoundaryRow>, QueryError> {
    let sql = build_boundaries_sql(d);
    let mut stmt = conn.prepare_cached(&sql)?;
    let mapped = stmt.query_map([], |row| {
        Ok((
            row.get::<_, String>(0)?,
            row.get::<_, Option<String>>(1)?,
            row.get::<_, String>(2)?,
        ))
    })?;
    let mut rows = Vec::new();
    for item in mapped {
        let (id, name, geometry) = item?;
        rows.push(BoundaryRow {
            id,
            name: name.unwrap_or_default(),
            geometry: parse_geometry(geometry)?,
        });
    }
    Ok(rows)
}

pub fn query_boundary_by_id(
    conn: &Connection,
    d: &DatasetDescriptor,
    id: &str,
) -> Result<Option<BoundaryRow>, QueryError> {
    let sql = build_boundary_by_id_sql(d);
    let mut stmt = conn.prepare_cached(&sql)?;
    let mut rows = stmt.query([id])?;
    let Some(row) = rows.next()? else {
        return Ok(None);
    };
    Ok(Some(BoundaryRow {
        id: row.get::<_, String>(0)?,
        name: row.get::<_, Option<String>>(1)?.unwrap_or_default(),
        geometry: parse_geometry(row.get::<_, String>(2)?)?,
    }))
}

pub fn query_choropleth(
    conn: &Connection,
    d: &DatasetDescriptor,
    req: &ChoroplethRequest,
) -> Result<Vec<ResolvedRow>, QueryError> {
    let sql = build_choropleth_sql(d, req.mode);
    let params = choropleth_params(d, req);
    let mut stmt = conn.prepare_cached(&sql)?;
    let mapped = stmt.query_map(params_from_iter(params.iter()), |row| {
        Ok((
            row.get::<_, String>(0)?,
            row.get::<_, Option<String>>(1)?,
            row.get::<_, Option<String>>(2)?,
            row.get::<_, Option<f64>>(3)?,
            row.get::<_, Option<String>>(4)?,
            row.get::<_, Option<String>>(5)?,
        ))
    })?;
    let mut rows = Vec::new();
    for item in mapped {
        let (id, name, geometry, value, units, observation_date) = item?;
        let geometry = match geometry {
            Some(raw) => Some(parse_geometry(raw)?),
            None => None,
        };
        rows.push(ResolvedRow {
            id,
            name: name.unwrap_or_default(),
            geometry,
            value,
            units,
            observation_date,
        });
    }
    Ok(rows)
}

#[cfg(test)]
mod query_tests;
