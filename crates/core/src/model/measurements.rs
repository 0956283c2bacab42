use super::common::{CdaDateTime, Quantity, SourceIdentifier};
use cda_model::StrucDocText;
use serde::{Deserialize, Serialize};

/// Body weight and height observations.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct BodyMeasurements {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body_weight: Option<Measurement>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body_height: Option<Measurement>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_narrative: Option<StrucDocText>,
}

/// A measurement is only written when it carries a quantity.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct Measurement {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<SourceIdentifier>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quantity: Option<Quantity>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub observation_time: Option<CdaDateTime>,
}
