use super::common::{CdaDateTime, CdaInterval, CodableText, SourceIdentifier, Statement};
use cda_model::StrucDocText;
use serde::{Deserialize, Serialize};

/// Past problems, diagnoses, procedures and other history.
///
/// Problems and procedures each have their own exclusion statement; uncategorised items have
/// none.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct MedicalHistory {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub problem_diagnoses: Option<Vec<ProblemDiagnosis>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub procedures: Option<Vec<Procedure>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub medical_history_items: Option<Vec<MedicalHistoryItem>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub problem_diagnosis_exclusion_statement: Option<Statement>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub procedure_exclusion_statement: Option<Statement>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_narrative: Option<StrucDocText>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ProblemDiagnosis {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<SourceIdentifier>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub identification: Option<CodableText>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub onset_date: Option<CdaDateTime>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remission_date: Option<CdaDateTime>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct Procedure {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<SourceIdentifier>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub procedure: Option<CodableText>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub procedure_date_time: Option<CdaDateTime>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

/// Free-text history item that fits neither problems nor procedures.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct MedicalHistoryItem {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<SourceIdentifier>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub item_description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_time_interval: Option<CdaInterval>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}
