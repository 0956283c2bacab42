//! Value types shared by every clinical aggregate.

use cda_model::Timestamp;
use chrono::{DateTime, FixedOffset, NaiveDate};
use serde::{Deserialize, Deserializer, Serialize};

/// Coded text as supplied by the caller.
///
/// Any subset of fields may be present. Codes and systems are not validated.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct CodableText {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    /// Code system OID.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code_system: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code_system_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code_system_version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub translations: Option<Vec<CodableText>>,
}

impl CodableText {
    /// Text that carries only an original-text rendering.
    pub fn text(original_text: impl Into<String>) -> Self {
        Self {
            original_text: Some(original_text.into()),
            ..Self::default()
        }
    }

    /// Code and display name in the given system.
    pub fn coded(code: &str, code_system: &str, display_name: &str) -> Self {
        Self {
            code: Some(code.to_string()),
            code_system: Some(code_system.to_string()),
            display_name: Some(display_name.to_string()),
            ..Self::default()
        }
    }
}

/// Externally supplied identifier. When present it replaces the generated GUID.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct SourceIdentifier {
    pub root: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extension: Option<String>,
}

/// Quantity with optional UCUM units. Numeric values are kept in their written form.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct Quantity {
    #[serde(deserialize_with = "number_or_string")]
    pub value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub units: Option<String>,
}

impl Quantity {
    pub fn new(value: impl Into<String>, units: Option<&str>) -> Self {
        Self {
            value: value.into(),
            units: units.map(str::to_string),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct QuantityRange {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub low: Option<Quantity>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub high: Option<Quantity>,
}

/// Date or date-time. Date-times keep their original UTC offset.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum CdaDateTime {
    DateTime(DateTime<FixedOffset>),
    Date(NaiveDate),
}

impl CdaDateTime {
    pub fn to_timestamp(self) -> Timestamp {
        match self {
            CdaDateTime::DateTime(dt) => Timestamp::from_datetime(dt),
            CdaDateTime::Date(date) => Timestamp::from_date(date),
        }
    }
}

/// Time interval with optional bounds and width.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct CdaInterval {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub low: Option<CdaDateTime>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub high: Option<CdaDateTime>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<Quantity>,
}

/// A structured "none known" style assertion.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct Statement {
    pub value: CodableText,
}

/// Keeps the written digits of a JSON number, so `1.50` stays `1.50`.
fn number_or_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::Number(n) => Ok(n.to_string()),
        serde_json::Value::String(s) => Ok(s),
        other => Err(serde::de::Error::custom(format!(
            "expected a number or string, found {other}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quantity_accepts_numbers_and_strings() {
        let q: Quantity = serde_json::from_str(r#"{"value": 72.5, "units": "kg"}"#).expect("parse");
        assert_eq!(q, Quantity::new("72.5", Some("kg")));

        let q: Quantity = serde_json::from_str(r#"{"value": "0.50"}"#).expect("parse");
        assert_eq!(q.value, "0.50");
    }

    #[test]
    fn test_quantity_keeps_trailing_zeros_of_numbers() {
        for written in ["1.50", "0.10", "5.0", "120"] {
            let json = format!(r#"{{"value": {written}, "units": "mmol/L"}}"#);
            let q: Quantity = serde_json::from_str(&json).expect("parse");
            assert_eq!(q.value, written);
        }
    }

    #[test]
    fn test_quantity_rejects_non_scalar_value() {
        let err = serde_json::from_str::<Quantity>(r#"{"value": [1]}"#);
        assert!(err.is_err());
    }

    #[test]
    fn test_date_time_accepts_date_and_offset_date_time() {
        let d: CdaDateTime = serde_json::from_str(r#""2024-03-09""#).expect("date");
        assert_eq!(d.to_timestamp().as_str(), "20240309");

        let dt: CdaDateTime =
            serde_json::from_str(r#""2024-03-09T08:30:00+10:00""#).expect("datetime");
        assert_eq!(dt.to_timestamp().as_str(), "20240309083000+1000");
    }

    #[test]
    fn test_codable_text_rejects_unknown_fields() {
        let err = serde_json::from_str::<CodableText>(r#"{"code":"1","colour":"red"}"#);
        assert!(err.is_err());
    }
}
