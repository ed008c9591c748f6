use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One Atmo index observation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexRecord {
    /// Calendar date of the upstream `date_maj`, `YYYY-MM-DD`.
    pub date: String,
    /// Quality code exactly as the upstream sent it.
    pub code_qual: Value,
}

/// A number rendered as an integer when it has no fractional part.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NumericValue {
    Integer(i64),
    Float(f64),
}

impl NumericValue {
    /// `None` for NaN and infinities.
    pub fn from_f64(value: f64) -> Option<Self> {
        if !value.is_finite() {
            return None;
        }

        let in_i64_range = value >= i64::MIN as f64 && value < i64::MAX as f64;
        if value.fract() == 0.0 && in_i64_range {
            Some(Self::Integer(value as i64))
        } else {
            Some(Self::Float(value))
        }
    }
}

/// One yearly observation of an SDES variable.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct YearValue {
    pub year: i32,
    /// `None` when the upstream cell is blank or non-numeric.
    pub value: Option<NumericValue>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn whole_numbers_serialize_without_fraction() {
        let record = YearValue {
            year: 2020,
            value: NumericValue::from_f64(1000.0),
        };
        assert_eq!(
            serde_json::to_value(record).expect("serializable"),
            json!({"year": 2020, "value": 1000})
        );
    }

    #[test]
    fn fractional_numbers_stay_floats() {
        assert_eq!(NumericValue::from_f64(10.5), Some(NumericValue::Float(10.5)));
        assert_eq!(NumericValue::from_f64(-3.0), Some(NumericValue::Integer(-3)));
    }

    #[test]
    fn non_finite_numbers_are_missing() {
        assert_eq!(NumericValue::from_f64(f64::NAN), None);
        assert_eq!(NumericValue::from_f64(f64::INFINITY), None);

        let record = YearValue { year: 2019, value: None };
        assert_eq!(
            serde_json::to_value(record).expect("serializable"),
            json!({"year": 2019, "value": null})
        );
    }
}
