use citadin_core::{
    extract_series, observations_to_frame, shape_employment, shape_indices, Frame, IndexRecord,
    NumericValue, Payload, ResultsEnvelope, SeriesRequest, SourceErrorKind, YearValue,
};
use serde_json::json;

const SDES_HEADER: &str =
    "COG_COMMUNE - Code de la zone;Libellé de la variable;Libellé du sous-champ";

fn series(csv: &str, variable: &str, subfield: Option<&str>) -> Vec<YearValue> {
    let frame = Frame::from_delimited(csv, b';').expect("valid csv");
    let request =
        SeriesRequest::new("69123", variable, subfield.map(str::to_owned)).expect("valid request");
    extract_series(&frame, &request).expect("series")
}

#[test]
fn sdes_reference_example_renders_integers_and_floats() {
    let csv = format!("{SDES_HEADER};A2019;A2020\n69123;X;;10;10.5\n");
    let envelope = ResultsEnvelope::new(series(&csv, "X", None));

    assert_eq!(
        serde_json::to_value(envelope).expect("serializable"),
        json!({"results": [{"year": 2019, "value": 10}, {"year": 2020, "value": 10.5}]})
    );
}

#[test]
fn sdes_extraction_is_idempotent() {
    let csv = format!("{SDES_HEADER};A2021;A2020\n69123;X;;1;2\n");
    let frame = Frame::from_delimited(&csv, b';').expect("valid csv");
    let request = SeriesRequest::new("69123", "X", None).expect("valid request");

    let first = extract_series(&frame, &request).expect("first");
    let second = extract_series(&frame, &request).expect("second");
    assert_eq!(first, second);
    assert_eq!(first.iter().map(|item| item.year).collect::<Vec<_>>(), vec![2020, 2021]);
}

#[test]
fn sdes_ignores_columns_that_only_look_like_years() {
    let csv = format!("{SDES_HEADER};A20;AB2020;A2020;A20201\n69123;X;;1;2;3;4\n");
    assert_eq!(
        series(&csv, "X", None),
        vec![YearValue {
            year: 2020,
            value: Some(NumericValue::Integer(3)),
        }]
    );
}

#[test]
fn sdes_blank_and_non_numeric_values_are_missing() {
    let csv = format!("{SDES_HEADER};A2018;A2019;A2020\n69123;X;;;n/a; 7.25 \n");
    let values = series(&csv, "X", None)
        .into_iter()
        .map(|item| item.value)
        .collect::<Vec<_>>();
    assert_eq!(values, vec![None, None, Some(NumericValue::Float(7.25))]);
}

#[test]
fn sdes_bom_prefixed_header_still_matches() {
    let csv = format!("\u{feff}{SDES_HEADER};A2020\n69123;X;;5\n");
    assert_eq!(series(&csv, "X", None).len(), 1);
}

#[test]
fn sdes_blank_subfield_is_not_a_filter() {
    let csv = format!("{SDES_HEADER};A2020\n69123;X;Diesel;5\n");
    assert_eq!(series(&csv, "X", Some("   ")).len(), 1);
    assert!(series(&csv, "X", Some("Essence")).is_empty());
}

#[test]
fn sdes_missing_columns_fail_with_schema_error() {
    let frame = Frame::from_delimited("CODGEO;A2020\n69123;1\n", b';').expect("valid csv");
    let request = SeriesRequest::new("69123", "X", None).expect("valid request");
    let error = extract_series(&frame, &request).expect_err("schema mismatch");
    assert_eq!(error.kind(), SourceErrorKind::Schema);
}

#[test]
fn indices_keep_complete_items_sorted_by_date() {
    let payload = Payload::from_body(
        &json!({
            "type": "FeatureCollection",
            "features": [
                {"properties": {"date_maj": "2025-02-03T00:00:00Z", "code_qual": 4}},
                {"properties": {"date_maj": "2025-02-01T00:00:00.000Z", "code_qual": 2}},
                {"properties": {"code_qual": 1}},
                {"properties": {"date_maj": "2025-02-02"}}
            ]
        })
        .to_string(),
    );

    assert_eq!(
        shape_indices(&payload),
        vec![
            IndexRecord {
                date: String::from("2025-02-01"),
                code_qual: json!(2),
            },
            IndexRecord {
                date: String::from("2025-02-03"),
                code_qual: json!(4),
            },
        ]
    );
}

#[test]
fn indices_from_raw_text_are_empty() {
    let payload = Payload::from_body("<html>Service Unavailable</html>");
    assert!(matches!(payload, Payload::Raw(_)));
    assert!(shape_indices(&payload).is_empty());
}

#[test]
fn indices_behind_a_byte_order_mark_are_still_shaped() {
    let body = format!(
        "\u{feff}{}",
        json!({"features": [{"properties": {"date_maj": "2025-02-01", "code_qual": 3}}]})
    );
    assert_eq!(shape_indices(&Payload::from_body(&body)).len(), 1);
}

#[test]
fn melodi_zero_observations_give_empty_table() {
    let envelope = shape_employment(observations_to_frame(&json!({"observations": []})), true);
    assert_eq!(
        serde_json::to_value(envelope).expect("serializable"),
        json!({"data": [], "count": 0})
    );
}

#[test]
fn melodi_rows_without_measure_column_are_all_kept() {
    let frame = observations_to_frame(&json!({
        "observations": [
            {"dimensions": {"GEO": "COM-69123", "SEX": "M"}, "measures": {"OBS_VALUE_NIVEAU": 3}},
            {"dimensions": {"GEO": "COM-69123", "SEX": "_T"}, "measures": {"OBS_VALUE_NIVEAU": 9}}
        ]
    }));

    let envelope = shape_employment(frame, true);
    assert_eq!(envelope.count, 2);
    assert_eq!(envelope.data[0]["SEX"], json!("Homme"));
    assert_eq!(envelope.data[1]["SEX"], json!("Total"));
}
