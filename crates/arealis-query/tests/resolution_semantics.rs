//! Execution semantics against in-memory SQLite fixtures: as-of resolution,
//! join totality, id normalization, and tie-breaking.

use arealis_model::catalog;
use arealis_model::{Geography, Level, ResponseMode};
use arealis_query::{
    query_boundaries, query_boundary_by_id, query_choropleth, ChoroplethRequest,
};
use rusqlite::Connection;

const GEOM: &str =
    r#"{"type":"Polygon","coordinates":[[[0.0,0.0],[1.0,0.0],[1.0,1.0],[0.0,1.0],[0.0,0.0]]]}"#;

fn fixture_conn() -> Connection {
    let conn = Connection::open_in_memory().unwrap();
    conn.execute_batch(
        "CREATE TABLE us_states (fips TEXT, name TEXT, geometry TEXT);
         CREATE TABLE us_counties (fips TEXT, name TEXT, geometry TEXT);
         CREATE TABLE ca_provinces (pruid TEXT, prname TEXT, geom TEXT);
         CREATE TABLE metric_series (
             id INTEGER PRIMARY KEY,
             series_id TEXT NOT NULL,
             geography_id TEXT NOT NULL,
             geography_type TEXT NOT NULL,
             category TEXT NOT NULL,
             series_name TEXT,
             frequency TEXT,
             units TEXT,
             is_active INTEGER NOT NULL DEFAULT 1
         );
         CREATE TABLE metric_observations (
             id INTEGER PRIMARY KEY,
             series_id TEXT NOT NULL,
             observation_date TEXT NOT NULL,
             value REAL
         );",
    )
    .unwrap();
    conn
}

fn add_state(conn: &Connection, fips: &str, name: &str) {
    conn.execute(
        "INSERT INTO us_states (fips, name, geometry) VALUES (?1, ?2, ?3)",
        [fips, name, GEOM],
    )
    .unwrap();
}

fn add_series(conn: &Connection, series_id: &str, geography_id: &str, category: &str) {
    conn.execute(
        "INSERT INTO metric_series \
         (series_id, geography_id, geography_type, category, series_name, frequency, units, is_active) \
         VALUES (?1, ?2, 'State', ?3, ?1, 'Monthly', '%', 1)",
        [series_id, geography_id, category],
    )
    .unwrap();
}

fn add_observation(conn: &Connection, series_id: &str, date: &str, value: f64) {
    conn.execute(
        "INSERT INTO metric_observations (series_id, observation_date, value) VALUES (?1, ?2, ?3)",
        rusqlite::params![series_id, date, value],
    )
    .unwrap();
}

fn value_request(category: &str, as_of: Option<&str>) -> ChoroplethRequest {
    ChoroplethRequest {
        category: category.to_string(),
        as_of: as_of.map(str::to_string),
        mode: ResponseMode::Value,
    }
}

fn us_states_descriptor() -> arealis_model::DatasetDescriptor {
    catalog::resolve(Some(Geography::Us), Some(Level::State)).unwrap()
}

fn value_for<'a>(
    rows: &'a [arealis_query::ResolvedRow],
    id: &str,
) -> &'a arealis_query::ResolvedRow {
    rows.iter().find(|r| r.id == id).unwrap()
}

#[test]
fn every_boundary_appears_exactly_once() {
    let conn = fixture_conn();
    for (fips, name) in [("06", "California"), ("48", "Texas"), ("36", "New York")] {
        add_state(&conn, fips, name);
    }
    add_series(&conn, "UNRATE-CA", "06", "unemployment");
    add_observation(&conn, "UNRATE-CA", "2024-01-01", 4.0);

    let rows = query_choropleth(
        &conn,
        &us_states_descriptor(),
        &value_request("unemployment", None),
    )
    .unwrap();

    assert_eq!(rows.len(), 3);
    assert_eq!(value_for(&rows, "06").value, Some(4.0));
    assert_eq!(value_for(&rows, "48").value, None);
    assert_eq!(value_for(&rows, "36").value, None);
}

#[test]
fn as_of_picks_the_latest_observation_not_after_the_date() {
    let conn = fixture_conn();
    add_state(&conn, "06", "California");
    add_series(&conn, "UNRATE-CA", "06", "unemployment");
    add_observation(&conn, "UNRATE-CA", "2024-01-01", 4.0);
    add_observation(&conn, "UNRATE-CA", "2024-02-01", 4.2);
    add_observation(&conn, "UNRATE-CA", "2024-03-01", 4.5);

    let d = us_states_descriptor();
    let at = |date: Option<&str>| {
        let rows = query_choropleth(&conn, &d, &value_request("unemployment", date)).unwrap();
        (rows[0].value, rows[0].observation_date.clone())
    };

    // Exact hit.
    assert_eq!(
        at(Some("2024-02-01")),
        (Some(4.2), Some("2024-02-01".to_string()))
    );
    // Strictly between two observations resolves backward, never forward.
    assert_eq!(at(Some("2024-02-15")).0, Some(4.2));
    // Before the first observation there is nothing to resolve.
    assert_eq!(at(Some("2023-12-31")).0, None);
    // No date means globally latest.
    assert_eq!(at(None).0, Some(4.5));
    // A future date limits nothing.
    assert_eq!(at(Some("2030-01-01")).0, Some(4.5));
}

#[test]
fn padded_ids_match_under_trimmed_text_equality() {
    let conn = fixture_conn();
    add_state(&conn, "06037 ", "Los Angeles County");
    add_series(&conn, "UNRATE-LA", "06037", "unemployment");
    add_observation(&conn, "UNRATE-LA", "2024-01-01", 5.1);

    let rows = query_choropleth(
        &conn,
        &us_states_descriptor(),
        &value_request("unemployment", None),
    )
    .unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].id, "06037");
    assert_eq!(rows[0].value, Some(5.1));

    // And the reverse padding on the series side.
    let conn = fixture_conn();
    add_state(&conn, "06037", "Los Angeles County");
    add_series(&conn, "UNRATE-LA", " 06037 ", "unemployment");
    add_observation(&conn, "UNRATE-LA", "2024-01-01", 5.1);
    let rows = query_choropleth(
        &conn,
        &us_states_descriptor(),
        &value_request("unemployment", None),
    )
    .unwrap();
    assert_eq!(rows[0].value, Some(5.1));
}

#[test]
fn equal_dates_resolve_to_the_highest_observation_id() {
    let conn = fixture_conn();
    add_state(&conn, "06", "California");

    // Two revisions of the same series on one date: the later insert wins.
    add_series(&conn, "UNRATE-CA", "06", "unemployment");
    add_observation(&conn, "UNRATE-CA", "2024-01-01", 4.0);
    add_observation(&conn, "UNRATE-CA", "2024-01-01", 4.1);

    let d = us_states_descriptor();
    let rows = query_choropleth(&conn, &d, &value_request("unemployment", None)).unwrap();
    assert_eq!(rows[0].value, Some(4.1));

    // Two distinct series for the same geography and date: still the most
    // recently ingested observation.
    add_series(&conn, "UNRATE-CA-ALT", "06", "unemployment");
    add_observation(&conn, "UNRATE-CA-ALT", "2024-01-01", 4.3);
    let rows = query_choropleth(&conn, &d, &value_request("unemployment", None)).unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].value, Some(4.3));
}

#[test]
fn unknown_category_yields_all_null_not_an_error() {
    let conn = fixture_conn();
    add_state(&conn, "06", "California");
    add_series(&conn, "UNRATE-CA", "06", "unemployment");
    add_observation(&conn, "UNRATE-CA", "2024-01-01", 4.0);

    let rows = query_choropleth(
        &conn,
        &us_states_descriptor(),
        &value_request("not_a_real_category", None),
    )
    .unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].value, None);
}

#[test]
fn inactive_series_do_not_contribute() {
    let conn = fixture_conn();
    add_state(&conn, "06", "California");
    add_series(&conn, "UNRATE-CA", "06", "unemployment");
    add_observation(&conn, "UNRATE-CA", "2024-01-01", 4.0);
    conn.execute("UPDATE metric_series SET is_active = 0", [])
        .unwrap();

    let rows = query_choropleth(
        &conn,
        &us_states_descriptor(),
        &value_request("unemployment", None),
    )
    .unwrap();
    assert_eq!(rows[0].value, None);
}

#[test]
fn series_for_other_levels_do_not_leak_in() {
    let conn = fixture_conn();
    add_state(&conn, "06", "California");
    // A county series sharing the id prefix must not resolve for states.
    conn.execute(
        "INSERT INTO metric_series \
         (series_id, geography_id, geography_type, category, is_active) \
         VALUES ('UNRATE-CTY', '06', 'County', 'unemployment', 1)",
        [],
    )
    .unwrap();
    add_observation(&conn, "UNRATE-CTY", "2024-01-01", 9.9);

    let rows = query_choropleth(
        &conn,
        &us_states_descriptor(),
        &value_request("unemployment", None),
    )
    .unwrap();
    assert_eq!(rows[0].value, None);
}

#[test]
fn invalid_geometries_are_excluded_not_nulled() {
    let conn = fixture_conn();
    add_state(&conn, "06", "California");
    conn.execute(
        "INSERT INTO us_states (fips, name, geometry) VALUES ('48', 'Texas', NULL)",
        [],
    )
    .unwrap();
    conn.execute(
        "INSERT INTO us_states (fips, name, geometry) VALUES ('36', 'New York', 'not json')",
        [],
    )
    .unwrap();

    let d = us_states_descriptor();
    let boundaries = query_boundaries(&conn, &d).unwrap();
    assert_eq!(boundaries.len(), 1);
    assert_eq!(boundaries[0].id, "06");

    let rows = query_choropleth(&conn, &d, &value_request("unemployment", None)).unwrap();
    assert_eq!(rows.len(), 1);
}

#[test]
fn geometry_mode_carries_parsed_geometry_and_value_mode_does_not() {
    let conn = fixture_conn();
    add_state(&conn, "06", "California");

    let d = us_states_descriptor();
    let geometry_rows = query_choropleth(
        &conn,
        &d,
        &ChoroplethRequest {
            category: "unemployment".to_string(),
            as_of: None,
            mode: ResponseMode::Geometry,
        },
    )
    .unwrap();
    let geometry = geometry_rows[0].geometry.as_ref().unwrap();
    assert_eq!(geometry["type"], "Polygon");

    let value_rows = query_choropleth(&conn, &d, &value_request("unemployment", None)).unwrap();
    assert!(value_rows[0].geometry.is_none());
}

#[test]
fn boundary_lookup_by_id_trims_and_misses_cleanly() {
    let conn = fixture_conn();
    add_state(&conn, "06", "California");

    let d = us_states_descriptor();
    let hit = query_boundary_by_id(&conn, &d, " 06 ").unwrap().unwrap();
    assert_eq!(hit.name, "California");

    assert!(query_boundary_by_id(&conn, &d, "99").unwrap().is_none());
}

#[test]
fn two_states_one_series_scenario() {
    let conn = fixture_conn();
    add_state(&conn, "06", "California");
    add_state(&conn, "48", "Texas");
    add_series(&conn, "UNRATE-CA", "06", "unemployment");
    add_observation(&conn, "UNRATE-CA", "2024-01-01", 4.0);
    add_observation(&conn, "UNRATE-CA", "2024-02-01", 4.2);

    let d = us_states_descriptor();
    let rows =
        query_choropleth(&conn, &d, &value_request("unemployment", Some("2024-01-15"))).unwrap();
    assert_eq!(value_for(&rows, "06").value, Some(4.0));
    assert_eq!(value_for(&rows, "48").value, None);

    let rows = query_choropleth(&conn, &d, &value_request("unemployment", None)).unwrap();
    assert_eq!(value_for(&rows, "06").value, Some(4.2));
    assert_eq!(value_for(&rows, "48").value, None);
}
