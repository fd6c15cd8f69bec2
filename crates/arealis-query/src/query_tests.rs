use super::*;
use arealis_model::catalog;
use arealis_model::{Geography, Level};

fn us_states() -> DatasetDescriptor {
    catalog::resolve(Some(Geography::Us), Some(Level::State)).unwrap()
}

fn ca_provinces() -> DatasetDescriptor {
    catalog::resolve(Some(Geography::Canada), Some(Level::Province)).unwrap()
}

#[test]
fn choropleth_sql_is_a_windowed_left_join() {
    let sql = build_choropleth_sql(&us_states(), ResponseMode::Geometry);
    assert!(sql.contains("ROW_NUMBER() OVER"));
    assert!(sql.contains("PARTITION BY"));
    assert!(sql.contains("observation_date DESC, o.id DESC"));
    assert!(sql.contains("LEFT JOIN picked"));
    assert!(sql.contains("?1") && sql.contains("?2") && sql.contains("?3"));
}

#[test]
fn value_mode_projects_null_geometry() {
    let value_sql = build_choropleth_sql(&us_states(), ResponseMode::Value);
    assert!(value_sql.contains("NULL AS geometry"));
    assert!(!value_sql.contains("b.geometry AS geometry"));

    let geometry_sql = build_choropleth_sql(&us_states(), ResponseMode::Geometry);
    assert!(geometry_sql.contains("b.geometry AS geometry"));
}

#[test]
fn descriptor_column_names_flow_into_sql() {
    let sql = build_boundaries_sql(&ca_provinces());
    assert!(sql.contains("ca_provinces"));
    assert!(sql.contains("b.pruid"));
    assert!(sql.contains("b.prname"));
    assert!(sql.contains("b.geom IS NOT NULL"));
}

#[test]
fn ids_are_compared_as_trimmed_text() {
    let sql = build_choropleth_sql(&us_states(), ResponseMode::Value);
    assert!(sql.contains("TRIM(CAST(b.fips AS TEXT))"));
    assert!(sql.contains("TRIM(CAST(s.geography_id AS TEXT))"));
}

#[test]
fn request_data_only_appears_as_bound_parameters() {
    let d = us_states();
    let req = ChoroplethRequest {
        category: "unemployment'; DROP TABLE us_states;--".to_string(),
        as_of: Some("2024-01-15".to_string()),
        mode: ResponseMode::Value,
    };
    let sql = build_choropleth_sql(&d, req.mode);
    assert!(!sql.contains("DROP TABLE"));
    assert!(!sql.contains("2024-01-15"));

    let params = choropleth_params(&d, &req);
    assert_eq!(params.len(), 3);
    assert_eq!(params[0], Value::Text("State".to_string()));
    assert_eq!(params[1], Value::Text(req.category.clone()));
    assert_eq!(params[2], Value::Text("2024-01-15".to_string()));
}

#[test]
fn missing_as_of_binds_null() {
    let req = ChoroplethRequest {
        category: "unemployment".to_string(),
        as_of: None,
        mode: ResponseMode::Value,
    };
    let params = choropleth_params(&us_states(), &req);
    assert_eq!(params[2], Value::Null);
}

#[test]
fn params_render_for_the_debug_echo() {
    let rendered = params_debug(&[
        Value::Text("State".to_string()),
        Value::Integer(3),
        Value::Real(1.5),
        Value::Null,
    ]);
    assert_eq!(
        rendered,
        serde_json::json!(["State", 3, 1.5, null])
    );
}
