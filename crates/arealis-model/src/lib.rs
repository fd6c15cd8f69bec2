#![forbid(unsafe_code)]

//! Domain vocabulary for the arealis geospatial metric engine.

pub mod catalog;
pub mod geography;
pub mod geometry;
pub mod registry;

pub use catalog::{lookup_candidates, CatalogError, DatasetDescriptor, ALL_DESCRIPTORS};
pub use geography::{Geography, Level, ParseError, ResponseMode};
pub use geometry::{simplify_geojson, Geometry, GeometryError};
pub use registry::{format_value, is_percentage_key, MetricConfig};

pub const CRATE_NAME: &str = "arealis-model";
