//! Boundary catalog: the closed mapping from (geography, level) to the
//! physical dataset serving it.
//!
//! The descriptor is the only place table and column identifiers come from.
//! SQL text is assembled exclusively from these values, never from request
//! parameters, so identifier injection is impossible by construction.

use crate::geography::{Geography, Level};
use serde::Serialize;
use std::fmt::{Display, Formatter};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogError {
    InvalidCombination { geography: Geography, level: Level },
}

impl Display for CatalogError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidCombination { geography, level } => {
                write!(f, "invalid combination: {geography}/{level}")
            }
        }
    }
}

impl std::error::Error for CatalogError {}

/// Physical identity of one boundary dataset. Column names differ per table
/// (the Canadian tables name their geometry column `geom`); everything
/// downstream is schema-agnostic through this struct.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DatasetDescriptor {
    pub geography: Geography,
    pub level: Level,
    pub table: &'static str,
    pub id_column: &'static str,
    pub name_column: &'static str,
    pub geometry_column: &'static str,
    /// Label the series store uses in `geography_type`, e.g. "State".
    pub geography_type_label: &'static str,
}

const US_COUNTIES: DatasetDescriptor = DatasetDescriptor {
    geography: Geography::Us,
    level: Level::County,
    table: "us_counties",
    id_column: "fips",
    name_column: "name",
    geometry_column: "geometry",
    geography_type_label: "County",
};

const US_STATES: DatasetDescriptor = DatasetDescriptor {
    geography: Geography::Us,
    level: Level::State,
    table: "us_states",
    id_column: "fips",
    name_column: "name",
    geometry_column: "geometry",
    geography_type_label: "State",
};

const US_CBSAS: DatasetDescriptor = DatasetDescriptor {
    geography: Geography::Us,
    level: Level::Cbsa,
    table: "us_cbsas",
    id_column: "cbsa_code",
    name_column: "cbsa_title",
    geometry_column: "geometry",
    geography_type_label: "Cbsa",
};

const US_CSAS: DatasetDescriptor = DatasetDescriptor {
    geography: Geography::Us,
    level: Level::Csa,
    table: "us_csas",
    id_column: "csa_code",
    name_column: "csa_title",
    geometry_column: "geometry",
    geography_type_label: "Csa",
};

const US_METRO_DIVISIONS: DatasetDescriptor = DatasetDescriptor {
    geography: Geography::Us,
    level: Level::Metdiv,
    table: "us_metro_divisions",
    id_column: "metdiv_code",
    name_column: "metdiv_title",
    geometry_column: "geometry",
    geography_type_label: "MetroDivision",
};

const CA_PROVINCES: DatasetDescriptor = DatasetDescriptor {
    geography: Geography::Canada,
    level: Level::Province,
    table: "ca_provinces",
    id_column: "pruid",
    name_column: "prname",
    geometry_column: "geom",
    geography_type_label: "Province",
};

const CA_CENSUS_DIVISIONS: DatasetDescriptor = DatasetDescriptor {
    geography: Geography::Canada,
    level: Level::CensusDivision,
    table: "ca_census_divisions",
    id_column: "cduid",
    name_column: "cdname",
    geometry_column: "geom",
    geography_type_label: "CensusDivision",
};

pub const ALL_DESCRIPTORS: [DatasetDescriptor; 7] = [
    US_COUNTIES,
    US_STATES,
    US_CBSAS,
    US_CSAS,
    US_METRO_DIVISIONS,
    CA_PROVINCES,
    CA_CENSUS_DIVISIONS,
];

/// Resolves a dataset descriptor. Level defaults per geography (county for
/// US, province for Canada); both absent means US counties.
pub fn resolve(
    geography: Option<Geography>,
    level: Option<Level>,
) -> Result<DatasetDescriptor, CatalogError> {
    let geography = geography.unwrap_or(Geography::Us);
    let level = level.unwrap_or(match geography {
        Geography::Us => Level::County,
        Geography::Canada => Level::Province,
    });
    match (geography, level) {
        (Geography::Us, Level::County) => Ok(US_COUNTIES),
        (Geography::Us, Level::State) => Ok(US_STATES),
        (Geography::Us, Level::Cbsa) => Ok(US_CBSAS),
        (Geography::Us, Level::Csa) => Ok(US_CSAS),
        (Geography::Us, Level::Metdiv) => Ok(US_METRO_DIVISIONS),
        (Geography::Canada, Level::Province) => Ok(CA_PROVINCES),
        (Geography::Canada, Level::CensusDivision) => Ok(CA_CENSUS_DIVISIONS),
        (geography, level) => Err(CatalogError::InvalidCombination { geography, level }),
    }
}

/// Candidate datasets for a single-feature lookup, in fixed priority order.
///
/// Id shapes: 5-digit numeric ids are US county FIPS first, then CBSA and
/// metro-division codes; 2-digit numeric ids are US state FIPS, then
/// Canadian province ids; 4-digit numeric ids are Canadian census
/// divisions. Everything else falls through to the Canadian tables.
#[must_use]
pub fn lookup_candidates(id: &str) -> Vec<DatasetDescriptor> {
    let id = id.trim();
    let numeric = !id.is_empty() && id.chars().all(|c| c.is_ascii_digit());
    if numeric {
        match id.len() {
            5 => return vec![US_COUNTIES, US_CBSAS, US_METRO_DIVISIONS],
            2 => return vec![US_STATES, CA_PROVINCES],
            4 => return vec![CA_CENSUS_DIVISIONS],
            _ => {}
        }
    }
    vec![CA_PROVINCES, CA_CENSUS_DIVISIONS]
}
