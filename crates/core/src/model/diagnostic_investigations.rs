//! Pathology, imaging and other diagnostic results.
//!
//! Each result kind carries its own optional narrative override, because each becomes its own
//! nested section under Diagnostic Investigations.

use super::common::{CdaDateTime, CodableText, Quantity, QuantityRange, SourceIdentifier};
use cda_model::StrucDocText;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct DiagnosticInvestigations {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pathology_test_results: Option<Vec<PathologyTestResult>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub imaging_examination_results: Option<Vec<ImagingExaminationResult>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub other_test_results: Option<Vec<OtherTestResult>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_narrative: Option<StrucDocText>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct PathologyTestResult {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<SourceIdentifier>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub test_result_name: Option<CodableText>,
    /// Its code becomes the status of every result-group organizer under this result.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub overall_test_result_status: Option<CodableText>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub observation_date_time: Option<CdaDateTime>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result_groups: Option<Vec<PathologyResultGroup>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pathological_diagnoses: Option<Vec<CodableText>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conclusion: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_narrative: Option<StrucDocText>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct PathologyResultGroup {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<SourceIdentifier>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result_group_name: Option<CodableText>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub results: Option<Vec<IndividualPathologyTestResult>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub specimen: Option<SpecimenDetail>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct IndividualPathologyTestResult {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<SourceIdentifier>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result_name: Option<CodableText>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<ResultValue>,
    /// Normal/abnormal flag. Only written alongside a value.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub normal_status: Option<CodableText>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference_ranges: Option<Vec<ReferenceRangeDetail>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comments: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference_range_guidance: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ImagingExaminationResult {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<SourceIdentifier>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub examination_result_name: Option<CodableText>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modality: Option<CodableText>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub anatomical_sites: Option<Vec<AnatomicalSite>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub overall_result_status: Option<CodableText>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub observation_date_time: Option<CdaDateTime>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub examination_procedure: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result_groups: Option<Vec<ImagingResultGroup>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub findings: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_narrative: Option<StrucDocText>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ImagingResultGroup {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<SourceIdentifier>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result_group_name: Option<CodableText>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub results: Option<Vec<ImagingResult>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub anatomical_site: Option<AnatomicalSite>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ImagingResult {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<SourceIdentifier>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result_name: Option<CodableText>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<ResultValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub normal_status: Option<CodableText>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference_ranges: Option<Vec<ReferenceRangeDetail>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comments: Option<Vec<String>>,
}

/// A report that is neither pathology nor imaging, e.g. an ECG.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct OtherTestResult {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<SourceIdentifier>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub report_name: Option<CodableText>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub report_status: Option<CodableText>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub report_date: Option<CdaDateTime>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub report_content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_narrative: Option<StrucDocText>,
}

/// Value of an individual result.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ResultValue {
    Quantity(Quantity),
    QuantityRange(QuantityRange),
    Coded(CodableText),
    Text(String),
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ReferenceRangeDetail {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meaning: Option<CodableText>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub range: Option<QuantityRange>,
}

/// Body location; name, side and description contribute independently.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AnatomicalSite {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name_of_location: Option<CodableText>,
    /// Laterality.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub side: Option<CodableText>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct PhysicalDetail {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<Quantity>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub volume: Option<Quantity>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct SpecimenDetail {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub collection_procedure: Option<CodableText>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub collection_date_time: Option<CdaDateTime>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub anatomical_sites: Option<Vec<AnatomicalSite>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tissue_type: Option<CodableText>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub specimen_identifier: Option<SourceIdentifier>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_specimen_identifier: Option<SourceIdentifier>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub container_identifier: Option<SourceIdentifier>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub physical_description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub physical_details: Option<Vec<PhysicalDetail>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_time_received: Option<CdaDateTime>,
}
