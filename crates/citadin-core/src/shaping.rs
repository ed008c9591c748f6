//! Reduction of adapter output to the public response contracts.

use serde_json::Value;

use crate::decode::decode_employment;
use crate::domain::{calendar_date_of, IndexRecord};
use crate::envelope::TabularEnvelope;
use crate::frame::Frame;
use crate::payload::Payload;

/// Measure kept by the employment endpoint.
pub const EMPLOYMENT_MEASURE: &str = "NBEMP";

/// Atmo payload to `{date, code_qual}` records sorted by date.
///
/// Objects are read through `features[*].properties`, arrays element by
/// element. Items lacking a non-null `date_maj` or `code_qual` are skipped.
/// Raw payloads give no records.
pub fn shape_indices(payload: &Payload) -> Vec<IndexRecord> {
    let Some(json) = payload.as_json() else {
        return Vec::new();
    };

    let items: Vec<&Value> = match json {
        Value::Object(_) => json
            .get("features")
            .and_then(Value::as_array)
            .map(|features| {
                features
                    .iter()
                    .filter_map(|feature| feature.get("properties"))
                    .collect()
            })
            .unwrap_or_default(),
        Value::Array(rows) => rows.iter().collect(),
        _ => Vec::new(),
    };

    let mut records = items
        .into_iter()
        .filter_map(|item| {
            let date_maj = item.get("date_maj").filter(|value| !value.is_null())?;
            let code_qual = item.get("code_qual").filter(|value| !value.is_null())?;
            let raw_date = match date_maj {
                Value::String(text) => text.clone(),
                other => other.to_string(),
            };
            Some(IndexRecord {
                date: calendar_date_of(&raw_date),
                code_qual: code_qual.clone(),
            })
        })
        .collect::<Vec<_>>();
    records.sort_by(|left, right| left.date.cmp(&right.date));

    records
}

/// Employment frame to `{data, count}`, keeping `NBEMP` rows only.
///
/// The measure filter applies only when the frame has an `RP_MEASURE`
/// column.
pub fn shape_employment(mut frame: Frame, decode: bool) -> TabularEnvelope {
    if frame.has_column("RP_MEASURE") {
        frame.retain_rows(|row| row.text("RP_MEASURE").as_deref() == Some(EMPLOYMENT_MEASURE));
    }
    if decode {
        decode_employment(&mut frame);
    }

    TabularEnvelope::new(frame.to_records())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::observations_to_frame;
    use serde_json::json;

    #[test]
    fn features_are_filtered_and_sorted_by_date() {
        let payload = Payload::Parsed(json!({
            "features": [
                {"properties": {"date_maj": "2025-01-03T10:00:00Z", "code_qual": 3}},
                {"properties": {"date_maj": null, "code_qual": 1}},
                {"properties": {"date_maj": "2025-01-01", "code_qual": null}},
                {"properties": {"date_maj": "2025-01-02T00:00:00+01:00", "code_qual": "2"}},
                {"geometry": {}}
            ]
        }));

        assert_eq!(
            shape_indices(&payload),
            vec![
                IndexRecord { date: String::from("2025-01-02"), code_qual: json!("2") },
                IndexRecord { date: String::from("2025-01-03"), code_qual: json!(3) },
            ]
        );
    }

    #[test]
    fn array_payloads_keep_upstream_order_on_ties() {
        let payload = Payload::Parsed(json!([
            {"date_maj": "2025-01-02", "code_qual": "b"},
            {"date_maj": "2025-01-01", "code_qual": "a"},
            {"date_maj": "2025-01-02", "code_qual": "c"}
        ]));

        let codes = shape_indices(&payload)
            .into_iter()
            .map(|record| record.code_qual)
            .collect::<Vec<_>>();
        assert_eq!(codes, vec![json!("a"), json!("b"), json!("c")]);
    }

    #[test]
    fn unparseable_dates_fall_back_to_text() {
        let payload = Payload::Parsed(json!([{"date_maj": "20250101Tlate", "code_qual": 1}]));
        assert_eq!(shape_indices(&payload)[0].date, "20250101");
    }

    #[test]
    fn raw_and_scalar_payloads_shape_to_nothing() {
        assert!(shape_indices(&Payload::Raw(String::from("<html>"))).is_empty());
        assert!(shape_indices(&Payload::Parsed(json!("text"))).is_empty());
        assert!(shape_indices(&Payload::Parsed(json!({"type": "FeatureCollection"}))).is_empty());
    }

    #[test]
    fn employment_keeps_nbemp_rows_and_decodes() {
        let frame = observations_to_frame(&json!({
            "observations": [
                {"dimensions": {"GEO": "COM-69123", "RP_MEASURE": "NBEMP", "SEX": "F"},
                 "measures": {"OBS_VALUE_NIVEAU": {"value": 10}}},
                {"dimensions": {"GEO": "COM-69123", "RP_MEASURE": "OTHER", "SEX": "M"},
                 "measures": {"OBS_VALUE_NIVEAU": {"value": 20}}}
            ]
        }));

        let decoded = shape_employment(frame.clone(), true);
        assert_eq!(decoded.count, 1);
        assert_eq!(decoded.data[0]["SEX"], json!("Femme"));

        let coded = shape_employment(frame, false);
        assert_eq!(coded.data[0]["SEX"], json!("F"));
    }

    #[test]
    fn employment_without_observations_is_empty() {
        let envelope = shape_employment(observations_to_frame(&json!({})), true);
        assert_eq!(
            serde_json::to_value(envelope).expect("serializable"),
            json!({"data": [], "count": 0})
        );
    }
}
