// SPDX-License-Identifier: Apache-2.0

//! Response assembly: pure transforms from executed rows to wire shapes.

use arealis_model::{simplify_geojson, DatasetDescriptor};
use arealis_query::{BoundaryRow, ResolvedRow};
use serde_json::{json, Map, Value};

/// Simplification is transport-side best effort: a geometry the simplifier
/// cannot handle ships as stored.
fn transport_geometry(geometry: &Value, simplify: Option<f64>) -> Value {
    match simplify {
        Some(tolerance) => {
            simplify_geojson(geometry, tolerance).unwrap_or_else(|_| geometry.clone())
        }
        None => geometry.clone(),
    }
}

/// Compact `{id: value|null}` mapping. Keys are the trimmed ids the join
/// matched on, so the map corresponds exactly to the boundary set.
#[must_use]
pub fn assemble_value_map(rows: &[ResolvedRow]) -> Value {
    let mut map = Map::with_capacity(rows.len());
    for row in rows {
        map.insert(row.id.clone(), json!(row.value));
    }
    Value::Object(map)
}

/// Full-geometry FeatureCollection for a choropleth. Properties echo the
/// requested geography/level/metric so the response is self-describing no
/// matter which table served it.
#[must_use]
pub fn assemble_feature_collection(
    rows: &[ResolvedRow],
    descriptor: &DatasetDescriptor,
    metric: &str,
    simplify: Option<f64>,
) -> Value {
    let features: Vec<Value> = rows
        .iter()
        .map(|row| {
            json!({
                "type": "Feature",
                "geometry": row.geometry.as_ref().map(|g| transport_geometry(g, simplify)),
                "properties": {
                    "name": row.name,
                    "id": row.id,
                    "geography": descriptor.geography,
                    "level": descriptor.level,
                    "value": row.value,
                    "units": row.units,
                    "metric": metric,
                    "date": row.observation_date,
                }
            })
        })
        .collect();
    json!({"type": "FeatureCollection", "features": features})
}

fn boundary_feature(row: &BoundaryRow, simplify: Option<f64>) -> Value {
    json!({
        "type": "Feature",
        "geometry": transport_geometry(&row.geometry, simplify),
        "properties": {
            "name": row.name,
            "id": row.id,
        }
    })
}

/// Raw boundary FeatureCollection, `{name, id}` properties only.
#[must_use]
pub fn assemble_boundary_collection(rows: &[BoundaryRow], simplify: Option<f64>) -> Value {
    let features: Vec<Value> = rows.iter().map(|r| boundary_feature(r, simplify)).collect();
    json!({"type": "FeatureCollection", "features": features})
}

/// Single-feature response for id lookups.
#[must_use]
pub fn assemble_boundary_feature(row: &BoundaryRow, simplify: Option<f64>) -> Value {
    boundary_feature(row, simplify)
}
