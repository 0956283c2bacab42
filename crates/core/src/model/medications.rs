use super::common::{CodableText, SourceIdentifier, Statement};
use cda_model::StrucDocText;
use serde::{Deserialize, Serialize};

/// Medicines the subject of care is taking, or was taking at discharge.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct Medications {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub medications: Option<Vec<MedicationItem>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exclusion_statement: Option<Statement>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_narrative: Option<StrucDocText>,
}

/// A single medicine and what happened to it.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct MedicationItem {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<SourceIdentifier>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub medicine: Option<CodableText>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub directions: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub clinical_indication: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    /// A code of `01` marks the medicine as ceased.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub change_type: Option<CodableText>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub change_status: Option<CodableText>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub change_reason: Option<String>,
}
