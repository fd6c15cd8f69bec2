// SPDX-License-Identifier: Apache-2.0

//! Metric registry: display and formatting rules per metric category.
//!
//! Lookups never fail. Categories ingested into the series store ahead of a
//! registry deployment still resolve to a synthesized config, so read paths
//! keep working without a release.

use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricConfig {
    pub key: String,
    pub display_name: String,
    pub frequency: String,
    pub is_percentage: bool,
    pub decimals: u8,
    pub description: String,
}

struct RegisteredMetric {
    key: &'static str,
    display_name: &'static str,
    frequency: &'static str,
    is_percentage: bool,
    decimals: u8,
    description: &'static str,
}

const REGISTERED: &[RegisteredMetric] = &[
    RegisteredMetric {
        key: "unemployment",
        display_name: "Unemployment Rate",
        frequency: "Monthly",
        is_percentage: true,
        decimals: 1,
        description: "Share of the labor force that is jobless and seeking work",
    },
    RegisteredMetric {
        key: "labor_force",
        display_name: "Labor Force",
        frequency: "Monthly",
        is_percentage: false,
        decimals: 0,
        description: "Count of employed plus unemployed persons",
    },
    RegisteredMetric {
        key: "median_household_income",
        display_name: "Median Household Income",
        frequency: "Annual",
        is_percentage: false,
        decimals: 0,
        description: "Median pre-tax income across households",
    },
    RegisteredMetric {
        key: "population",
        display_name: "Population",
        frequency: "Annual",
        is_percentage: false,
        decimals: 0,
        description: "Resident population estimate",
    },
    RegisteredMetric {
        key: "median_home_price",
        display_name: "Median Home Price",
        frequency: "Monthly",
        is_percentage: false,
        decimals: 0,
        description: "Median sale price of closed residential transactions",
    },
    RegisteredMetric {
        key: "home_price_index",
        display_name: "Home Price Index",
        frequency: "Monthly",
        is_percentage: false,
        decimals: 1,
        description: "Repeat-sales house price index",
    },
    RegisteredMetric {
        key: "rent_index",
        display_name: "Rent Index",
        frequency: "Monthly",
        is_percentage: false,
        decimals: 1,
        description: "Observed asking-rent index",
    },
    RegisteredMetric {
        key: "rental_vacancy_rate",
        display_name: "Rental Vacancy Rate",
        frequency: "Quarterly",
        is_percentage: true,
        decimals: 1,
        description: "Share of rental inventory vacant and for rent",
    },
    RegisteredMetric {
        key: "housing_permits",
        display_name: "Housing Permits",
        frequency: "Monthly",
        is_percentage: false,
        decimals: 0,
        description: "New privately-owned housing units authorized",
    },
];

/// Percentage detection for categories the registry has never seen.
#[must_use]
pub fn is_percentage_key(key: &str) -> bool {
    key.contains("rate") || key.contains("percent")
}

fn normalize(key: &str) -> String {
    key.trim().to_lowercase()
}

/// Resolves a metric category to its config. Total: empty input falls back
/// to the unemployment config, an unregistered key synthesizes one from the
/// key itself.
#[must_use]
pub fn resolve(key: &str) -> MetricConfig {
    let normalized = normalize(key);
    let lookup = if normalized.is_empty() {
        "unemployment"
    } else {
        normalized.as_str()
    };
    if let Some(m) = REGISTERED.iter().find(|m| m.key == lookup) {
        return MetricConfig {
            key: m.key.to_string(),
            display_name: m.display_name.to_string(),
            frequency: m.frequency.to_string(),
            is_percentage: m.is_percentage,
            decimals: m.decimals,
            description: m.description.to_string(),
        };
    }
    MetricConfig {
        display_name: normalized.to_uppercase().replace('_', " "),
        frequency: "Monthly".to_string(),
        is_percentage: is_percentage_key(&normalized),
        decimals: 1,
        description: String::new(),
        key: normalized,
    }
}

/// Formats a resolved value for display. Missing or non-finite values render
/// as "N/A".
#[must_use]
pub fn format_value(value: Option<f64>, config: &MetricConfig) -> String {
    match value {
        Some(v) if v.is_finite() => {
            let formatted = format!("{v:.prec$}", prec = config.decimals as usize);
            if config.is_percentage {
                format!("{formatted}%")
            } else {
                formatted
            }
        }
        _ => "N/A".to_string(),
    }
}
