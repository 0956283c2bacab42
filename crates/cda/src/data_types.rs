//! HL7 v3 data types carried by CDA nodes.
//!
//! Key types:
//! - [`ConceptDescriptor`]: coded value (`CD`), compared structurally.
//! - [`Identifier`]: instance identifier (`II`).
//! - [`Timestamp`] and [`Interval`]: `TS` and `IVL_TS`.
//! - [`PhysicalQuantity`] and [`QuantityInterval`]: `PQ` and `IVL_PQ`.
//! - [`AnyValue`]: the polymorphic `value` of an observation.
//!
//! No validation of code values or code systems happens here; whatever the caller supplies is
//! written out unchanged.

use crate::constants::CodingSystem;
use cda_uuid::Guid;
use chrono::{DateTime, FixedOffset, NaiveDate};
use serde::Serialize;

/// Coded concept descriptor (`CD`).
///
/// Equality is structural: two descriptors with the same code, system, display name, version,
/// original text, qualifiers and translations are equal regardless of where they came from.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct ConceptDescriptor {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code_system: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code_system_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code_system_version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub original_text: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub qualifiers: Vec<Qualifier>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub translations: Vec<ConceptDescriptor>,
}

impl ConceptDescriptor {
    /// Builds a descriptor from a code in a known coding system.
    pub fn coded(code: &str, system: CodingSystem, display_name: &str) -> Self {
        Self {
            code: Some(code.to_string()),
            code_system: Some(system.oid().to_string()),
            code_system_name: Some(system.name().to_string()),
            display_name: Some(display_name.to_string()),
            ..Self::default()
        }
    }

    /// Builds a descriptor that only carries original text.
    pub fn original_text_only(text: &str) -> Self {
        Self {
            original_text: Some(text.to_string()),
            ..Self::default()
        }
    }

    /// Returns `true` when the descriptor carries nothing worth writing.
    pub fn is_empty(&self) -> bool {
        self.code.is_none()
            && self.display_name.is_none()
            && self.original_text.is_none()
            && self.qualifiers.is_empty()
            && self.translations.is_empty()
    }
}

/// A `qualifier` pair on a concept descriptor, e.g. laterality on an anatomical site.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Qualifier {
    pub name: ConceptDescriptor,
    pub value: ConceptDescriptor,
}

/// Instance identifier (`II`).
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct Identifier {
    pub root: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extension: Option<String>,
}

impl Identifier {
    pub fn new(root: impl Into<String>, extension: Option<String>) -> Self {
        Self {
            root: root.into(),
            extension,
        }
    }

    /// Identifier whose root is a freshly generated GUID.
    pub fn from_guid(guid: Guid) -> Self {
        Self {
            root: guid.to_string(),
            extension: None,
        }
    }
}

/// Point in time (`TS`), held in HL7 string form (`YYYYMMDD[HHMMSS[+ZZZZ]]`).
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Timestamp(String);

impl Timestamp {
    /// Wraps an already formatted HL7 timestamp.
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// Day precision.
    pub fn from_date(date: NaiveDate) -> Self {
        Self(date.format("%Y%m%d").to_string())
    }

    /// Second precision with the original UTC offset.
    pub fn from_datetime(value: DateTime<FixedOffset>) -> Self {
        Self(value.format("%Y%m%d%H%M%S%z").to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Time interval (`IVL_TS`).
///
/// `value` expresses a single point as an interval; `low`/`high` bound a range.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Interval {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<Timestamp>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub low: Option<Timestamp>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub high: Option<Timestamp>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<PhysicalQuantity>,
}

impl Interval {
    pub fn point(value: Timestamp) -> Self {
        Self {
            value: Some(value),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.value.is_none() && self.low.is_none() && self.high.is_none() && self.width.is_none()
    }
}

/// `effectiveTime` of a clinical statement: either a plain `TS` or an `IVL_TS`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EffectiveTime {
    Timestamp(Timestamp),
    Interval(Interval),
}

/// Physical quantity (`PQ`). The value is passed through verbatim.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct PhysicalQuantity {
    pub value: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
}

/// Quantity range (`IVL_PQ`).
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct QuantityInterval {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub low: Option<PhysicalQuantity>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub high: Option<PhysicalQuantity>,
}

/// Polymorphic observation `value`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "type", content = "value")]
pub enum AnyValue {
    #[serde(rename = "CD")]
    Coded(ConceptDescriptor),
    #[serde(rename = "PQ")]
    Quantity(PhysicalQuantity),
    #[serde(rename = "IVL_PQ")]
    QuantityRange(QuantityInterval),
    #[serde(rename = "ST")]
    Text(String),
    #[serde(rename = "TS")]
    Timestamp(Timestamp),
}

impl AnyValue {
    /// The `xsi:type` written on the `value` element.
    pub fn xsi_type(&self) -> &'static str {
        match self {
            AnyValue::Coded(_) => "CD",
            AnyValue::Quantity(_) => "PQ",
            AnyValue::QuantityRange(_) => "IVL_PQ",
            AnyValue::Text(_) => "ST",
            AnyValue::Timestamp(_) => "TS",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_concept_descriptor_equality_is_structural() {
        let a = ConceptDescriptor::coded("101.20113", CodingSystem::Nctis, "Adverse Reactions");
        let b = ConceptDescriptor::coded("101.20113", CodingSystem::Nctis, "Adverse Reactions");
        assert_eq!(a, b);

        let mut c = b.clone();
        c.original_text = Some("allergies".to_string());
        assert_ne!(a, c);
    }

    #[test]
    fn test_concept_descriptor_is_empty() {
        assert!(ConceptDescriptor::default().is_empty());
        assert!(!ConceptDescriptor::original_text_only("left knee").is_empty());
    }

    #[test]
    fn test_timestamp_formats() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 9).expect("valid date");
        assert_eq!(Timestamp::from_date(date).as_str(), "20240309");

        let dt = DateTime::parse_from_rfc3339("2024-03-09T14:05:00+10:00").expect("valid");
        assert_eq!(Timestamp::from_datetime(dt).as_str(), "20240309140500+1000");
    }

    #[test]
    fn test_identifier_from_guid_uses_root_only() {
        let id = Identifier::from_guid(Guid::from_u128(1));
        assert_eq!(id.root, "00000000-0000-0000-0000-000000000001");
        assert_eq!(id.extension, None);
    }

    #[test]
    fn test_any_value_xsi_types() {
        assert_eq!(AnyValue::Text("x".into()).xsi_type(), "ST");
        assert_eq!(
            AnyValue::QuantityRange(QuantityInterval::default()).xsi_type(),
            "IVL_PQ"
        );
    }
}
