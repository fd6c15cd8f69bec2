#![forbid(unsafe_code)]

//! Wire contract for the arealis read path.

pub mod cache;
pub mod errors;
pub mod params;
pub mod responses;

pub use cache::{directives_for, CacheDirectives};
pub use errors::{ApiError, ApiErrorCode};
pub use params::{
    as_of_param, bool_flag, parse_boundaries_params, parse_choropleth_params, BoundariesParams,
    ChoroplethParams,
};
pub use responses::{
    assemble_boundary_collection, assemble_boundary_feature, assemble_feature_collection,
    assemble_value_map,
};

pub const CRATE_NAME: &str = "arealis-api";
