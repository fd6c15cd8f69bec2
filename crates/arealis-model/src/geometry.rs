// SPDX-License-Identifier: Apache-2.0

//! GeoJSON geometry bridging for boundary polygons.
//!
//! Boundary tables store geometry as GeoJSON text. Responses pass it through
//! unchanged unless the caller asks for transport simplification, in which
//! case rings are reduced with Douglas-Peucker and re-serialized.

use geo::{Coord, LineString, MultiPolygon, Polygon, Simplify};
use serde_json::{json, Value};
use std::fmt::{Display, Formatter};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeometryError(pub String);

impl Display for GeometryError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::error::Error for GeometryError {}

/// A boundary geometry: one polygon or several.
#[derive(Debug, Clone, PartialEq)]
pub enum Geometry {
    Polygon(Polygon<f64>),
    MultiPolygon(MultiPolygon<f64>),
}

fn parse_ring(ring: &Value) -> Result<LineString<f64>, GeometryError> {
    let positions = ring
        .as_array()
        .ok_or_else(|| GeometryError("ring is not an array".to_string()))?;
    let mut coords = Vec::with_capacity(positions.len());
    for position in positions {
        let pair = position
            .as_array()
            .ok_or_else(|| GeometryError("position is not an array".to_string()))?;
        let x = pair
            .first()
            .and_then(Value::as_f64)
            .ok_or_else(|| GeometryError("position missing longitude".to_string()))?;
        let y = pair
            .get(1)
            .and_then(Value::as_f64)
            .ok_or_else(|| GeometryError("position missing latitude".to_string()))?;
        coords.push(Coord { x, y });
    }
    Ok(LineString::from(coords))
}

fn parse_polygon(rings: &Value) -> Result<Polygon<f64>, GeometryError> {
    let rings = rings
        .as_array()
        .ok_or_else(|| GeometryError("polygon coordinates are not an array".to_string()))?;
    let exterior = rings
        .first()
        .ok_or_else(|| GeometryError("polygon missing exterior ring".to_string()))?;
    let exterior = parse_ring(exterior)?;
    let mut interiors = Vec::new();
    for ring in &rings[1..] {
        interiors.push(parse_ring(ring)?);
    }
    Ok(Polygon::new(exterior, interiors))
}

impl Geometry {
    /// Parses a GeoJSON geometry object of type Polygon or MultiPolygon.
    pub fn from_geojson(value: &Value) -> Result<Self, GeometryError> {
        let kind = value
            .get("type")
            .and_then(Value::as_str)
            .ok_or_else(|| GeometryError("geometry missing type".to_string()))?;
        let coordinates = value
            .get("coordinates")
            .ok_or_else(|| GeometryError("geometry missing coordinates".to_string()))?;
        match kind {
            "Polygon" => Ok(Self::Polygon(parse_polygon(coordinates)?)),
            "MultiPolygon" => {
                let polygons = coordinates
                    .as_array()
                    .ok_or_else(|| GeometryError("coordinates are not an array".to_string()))?;
                let mut parsed = Vec::with_capacity(polygons.len());
                for polygon in polygons {
                    parsed.push(parse_polygon(polygon)?);
                }
                Ok(Self::MultiPolygon(MultiPolygon(parsed)))
            }
            other => Err(GeometryError(format!("unsupported geometry type: {other}"))),
        }
    }

    #[must_use]
    pub fn to_geojson(&self) -> Value {
        match self {
            Self::Polygon(polygon) => json!({
                "type": "Polygon",
                "coordinates": polygon_coords(polygon),
            }),
            Self::MultiPolygon(mp) => json!({
                "type": "MultiPolygon",
                "coordinates": mp.0.iter().map(polygon_coords).collect::<Vec<_>>(),
            }),
        }
    }

    /// Reduces ring vertex counts with Douglas-Peucker. Endpoints are kept,
    /// so rings stay closed.
    #[must_use]
    pub fn simplified(&self, tolerance: f64) -> Self {
        match self {
            Self::Polygon(polygon) => Self::Polygon(simplify_polygon(polygon, tolerance)),
            Self::MultiPolygon(mp) => Self::MultiPolygon(MultiPolygon(
                mp.0.iter().map(|p| simplify_polygon(p, tolerance)).collect(),
            )),
        }
    }
}

fn simplify_polygon(polygon: &Polygon<f64>, tolerance: f64) -> Polygon<f64> {
    let exterior = polygon.exterior().simplify(&tolerance);
    let interiors: Vec<LineString<f64>> = polygon
        .interiors()
        .iter()
        .map(|ring| ring.simplify(&tolerance))
        .collect();
    Polygon::new(exterior, interiors)
}

fn ring_coords(ring: &LineString<f64>) -> Vec<Vec<f64>> {
    ring.coords().map(|c| vec![c.x, c.y]).collect()
}

fn polygon_coords(polygon: &Polygon<f64>) -> Vec<Vec<Vec<f64>>> {
    let mut rings = vec![ring_coords(polygon.exterior())];
    for interior in polygon.interiors() {
        rings.push(ring_coords(interior));
    }
    rings
}

/// Parses a geometry, simplifies it, and re-serializes. Used on the response
/// path when the caller supplies a tolerance.
pub fn simplify_geojson(value: &Value, tolerance: f64) -> Result<Value, GeometryError> {
    Ok(Geometry::from_geojson(value)?.simplified(tolerance).to_geojson())
}
