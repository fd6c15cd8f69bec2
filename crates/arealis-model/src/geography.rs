use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError(pub String);

impl Display for ParseError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::error::Error for ParseError {}

/// Top-level national scope of a boundary hierarchy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Geography {
    Us,
    Canada,
}

impl Geography {
    /// Parses a request token. Anything outside the two known geographies is
    /// rejected here, before any catalog lookup.
    pub fn parse(input: &str) -> Result<Self, ParseError> {
        match input.trim().to_ascii_lowercase().as_str() {
            "us" => Ok(Self::Us),
            "canada" => Ok(Self::Canada),
            other => Err(ParseError(format!("unknown geography: {other}"))),
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Us => "US",
            Self::Canada => "CANADA",
        }
    }
}

impl Display for Geography {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Administrative granularity within a geography.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Level {
    County,
    State,
    Cbsa,
    Csa,
    Metdiv,
    Province,
    CensusDivision,
}

impl Level {
    pub fn parse(input: &str) -> Result<Self, ParseError> {
        match input.trim().to_ascii_lowercase().as_str() {
            "county" => Ok(Self::County),
            "state" => Ok(Self::State),
            "cbsa" => Ok(Self::Cbsa),
            "csa" => Ok(Self::Csa),
            "metdiv" => Ok(Self::Metdiv),
            "province" => Ok(Self::Province),
            "census_division" => Ok(Self::CensusDivision),
            other => Err(ParseError(format!("unknown level: {other}"))),
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::County => "county",
            Self::State => "state",
            Self::Cbsa => "cbsa",
            Self::Csa => "csa",
            Self::Metdiv => "metdiv",
            Self::Province => "province",
            Self::CensusDivision => "census_division",
        }
    }
}

impl Display for Level {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Shape of a choropleth response: full polygons or a compact id -> value map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseMode {
    Geometry,
    Value,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn geography_parse_is_case_and_whitespace_insensitive() {
        assert_eq!(Geography::parse("US").unwrap(), Geography::Us);
        assert_eq!(Geography::parse(" canada ").unwrap(), Geography::Canada);
        assert_eq!(Geography::parse("Us").unwrap(), Geography::Us);
    }

    #[test]
    fn geography_parse_rejects_unknown_scopes() {
        assert!(Geography::parse("EU").is_err());
        assert!(Geography::parse("").is_err());
        assert!(Geography::parse("usa").is_err());
    }

    #[test]
    fn level_parse_covers_all_seven() {
        for token in [
            "county",
            "state",
            "cbsa",
            "csa",
            "metdiv",
            "province",
            "census_division",
        ] {
            assert_eq!(Level::parse(token).unwrap().as_str(), token);
        }
        assert!(Level::parse("tract").is_err());
    }
}
