//! Static terminology table.
//!
//! Every section, entry and relationship code the builders emit is looked up here by
//! [`CodeKey`]; no code literals appear in the builders themselves. The table is a single
//! process-wide constant, indexed once on first use and never mutated.
//!
//! A row may be scoped to one [`DocumentType`]. Lookups prefer the scoped row and fall back to
//! the unscoped default, so a document variant changes only the literal codes it overrides.

use cda_model::{CodingSystem, ConceptDescriptor};
use cda_types::NonEmptyText;
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use crate::CoreError;

/// Change-type code meaning the medicine was ceased.
pub const CEASED_CHANGE_TYPE_CODE: &str = "01";

/// Document variants that select alternate literal codes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum DocumentType {
    DischargeSummary,
    #[default]
    SpecialistLetter,
    SharedHealthSummary,
}

impl DocumentType {
    pub const ALL: [DocumentType; 3] = [
        DocumentType::DischargeSummary,
        DocumentType::SpecialistLetter,
        DocumentType::SharedHealthSummary,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            DocumentType::DischargeSummary => "discharge-summary",
            DocumentType::SpecialistLetter => "specialist-letter",
            DocumentType::SharedHealthSummary => "shared-health-summary",
        }
    }
}

impl fmt::Display for DocumentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DocumentType {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        DocumentType::ALL
            .into_iter()
            .find(|d| d.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| CoreError::UnknownDocumentType(wanted.to_string()))
    }
}

/// Symbolic key for every code the builders emit.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CodeKey {
    AdverseReactionsSection,
    MedicationsSection,
    MedicalHistorySection,
    DiagnosticInvestigationsSection,
    PathologyTestResultSection,
    ImagingExaminationResultSection,
    OtherTestResultSection,
    VitalSignsSection,

    ProblemDiagnosisExclusion,
    AdverseReactionExclusion,
    ProcedureExclusion,
    MedicationExclusion,

    AdverseReaction,
    ReactionEvent,
    Manifestation,

    ClinicalIndication,
    MedicationComment,
    ChangeType,
    ChangeStatus,
    ChangeReason,

    ProblemDiagnosis,
    ProblemDiagnosisComment,
    Procedure,
    ProcedureComment,
    UncategorisedMedicalHistoryItem,
    MedicalHistoryItemComment,

    OverallTestResultStatus,
    PathologicalDiagnosis,
    PathologyConclusion,
    ResultComment,
    ReferenceRangeGuidance,
    Specimen,
    DateTimeReceived,
    AnatomicalSite,
    Laterality,
    Modality,
    ExaminationProcedure,
    ImagingFindings,

    BodyWeight,
    BodyHeight,
}

impl CodeKey {
    pub const ALL: [CodeKey; 40] = [
        CodeKey::AdverseReactionsSection,
        CodeKey::MedicationsSection,
        CodeKey::MedicalHistorySection,
        CodeKey::DiagnosticInvestigationsSection,
        CodeKey::PathologyTestResultSection,
        CodeKey::ImagingExaminationResultSection,
        CodeKey::OtherTestResultSection,
        CodeKey::VitalSignsSection,
        CodeKey::ProblemDiagnosisExclusion,
        CodeKey::AdverseReactionExclusion,
        CodeKey::ProcedureExclusion,
        CodeKey::MedicationExclusion,
        CodeKey::AdverseReaction,
        CodeKey::ReactionEvent,
        CodeKey::Manifestation,
        CodeKey::ClinicalIndication,
        CodeKey::MedicationComment,
        CodeKey::ChangeType,
        CodeKey::ChangeStatus,
        CodeKey::ChangeReason,
        CodeKey::ProblemDiagnosis,
        CodeKey::ProblemDiagnosisComment,
        CodeKey::Procedure,
        CodeKey::ProcedureComment,
        CodeKey::UncategorisedMedicalHistoryItem,
        CodeKey::MedicalHistoryItemComment,
        CodeKey::OverallTestResultStatus,
        CodeKey::PathologicalDiagnosis,
        CodeKey::PathologyConclusion,
        CodeKey::ResultComment,
        CodeKey::ReferenceRangeGuidance,
        CodeKey::Specimen,
        CodeKey::DateTimeReceived,
        CodeKey::AnatomicalSite,
        CodeKey::Laterality,
        CodeKey::Modality,
        CodeKey::ExaminationProcedure,
        CodeKey::ImagingFindings,
        CodeKey::BodyWeight,
        CodeKey::BodyHeight,
    ];
}

/// One row of the terminology table.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CodeEntry {
    pub key: CodeKey,
    /// `None` for the default row; `Some` for a document-specific override.
    pub document_type: Option<DocumentType>,
    pub code: &'static str,
    pub system: CodingSystem,
    pub display_name: &'static str,
}

impl CodeEntry {
    /// Concept descriptor carrying this row's code, system and display name.
    pub fn concept(&self) -> ConceptDescriptor {
        ConceptDescriptor::coded(self.code, self.system, self.display_name)
    }

    /// Display name as a section title.
    pub fn title(&self) -> NonEmptyText {
        NonEmptyText::new(self.display_name).expect("terminology display names are non-empty")
    }
}

const fn row(
    key: CodeKey,
    code: &'static str,
    system: CodingSystem,
    display_name: &'static str,
) -> CodeEntry {
    CodeEntry {
        key,
        document_type: None,
        code,
        system,
        display_name,
    }
}

const fn override_row(
    key: CodeKey,
    document_type: DocumentType,
    code: &'static str,
    system: CodingSystem,
    display_name: &'static str,
) -> CodeEntry {
    CodeEntry {
        key,
        document_type: Some(document_type),
        code,
        system,
        display_name,
    }
}

use CodingSystem::{Loinc, Nctis, Snomed};

static TABLE: &[CodeEntry] = &[
    // Sections
    row(CodeKey::AdverseReactionsSection, "101.20113", Nctis, "Adverse Reactions"),
    row(CodeKey::MedicationsSection, "101.16022", Nctis, "Medications"),
    override_row(
        CodeKey::MedicationsSection,
        DocumentType::DischargeSummary,
        "101.16146",
        Nctis,
        "Current Medications On Discharge",
    ),
    row(CodeKey::MedicalHistorySection, "101.16117", Nctis, "Medical History"),
    row(CodeKey::DiagnosticInvestigationsSection, "101.20117", Nctis, "Diagnostic Investigations"),
    row(CodeKey::PathologyTestResultSection, "102.16144", Nctis, "Pathology Test Result"),
    row(CodeKey::ImagingExaminationResultSection, "102.16145", Nctis, "Imaging Examination Result"),
    row(CodeKey::OtherTestResultSection, "102.16029", Nctis, "Other Test Result"),
    row(CodeKey::VitalSignsSection, "8716-3", Loinc, "Vital signs"),
    // Exclusion statements
    row(CodeKey::ProblemDiagnosisExclusion, "103.16302.120.1.1", Nctis, "Problem/Diagnosis Exclusion Statement"),
    row(CodeKey::AdverseReactionExclusion, "103.16302.120.1.2", Nctis, "Adverse Reactions Exclusion Statement"),
    row(CodeKey::ProcedureExclusion, "103.16302.120.1.3", Nctis, "Procedures Exclusion Statement"),
    row(CodeKey::MedicationExclusion, "103.16302.120.1.4", Nctis, "Medications Exclusion Statement"),
    // Adverse reactions
    row(CodeKey::AdverseReaction, "102.16510", Nctis, "Adverse Reaction"),
    row(CodeKey::ReactionEvent, "102.16513", Nctis, "Reaction Event"),
    row(CodeKey::Manifestation, "102.16518", Nctis, "Manifestation"),
    // Medications
    row(CodeKey::ClinicalIndication, "103.10141", Nctis, "Clinical Indication"),
    row(CodeKey::MedicationComment, "103.16044", Nctis, "Additional Comments"),
    row(CodeKey::ChangeType, "103.16593", Nctis, "Change Type"),
    row(CodeKey::ChangeStatus, "103.16595", Nctis, "Change Status"),
    row(CodeKey::ChangeReason, "103.10177", Nctis, "Change Reason"),
    // Medical history
    row(CodeKey::ProblemDiagnosis, "282291009", Snomed, "Diagnosis interpretation"),
    row(CodeKey::ProblemDiagnosisComment, "103.16545", Nctis, "Problem/Diagnosis Comment"),
    row(CodeKey::Procedure, "71388002", Snomed, "Procedure"),
    row(CodeKey::ProcedureComment, "103.15595", Nctis, "Procedure Comment"),
    row(CodeKey::UncategorisedMedicalHistoryItem, "102.16627", Nctis, "Uncategorised Medical History Item"),
    row(CodeKey::MedicalHistoryItemComment, "103.16630", Nctis, "Medical History Item Comment"),
    // Diagnostic investigations
    row(CodeKey::OverallTestResultStatus, "308.18051", Nctis, "Overall Test Result Status"),
    row(CodeKey::PathologicalDiagnosis, "102.15504", Nctis, "Pathological Diagnosis"),
    row(CodeKey::PathologyConclusion, "103.16616", Nctis, "Conclusion"),
    row(CodeKey::ResultComment, "281296001", Snomed, "result comments"),
    row(CodeKey::ReferenceRangeGuidance, "103.16475", Nctis, "Reference Range Guidance"),
    row(CodeKey::Specimen, "102.16156", Nctis, "Specimen"),
    row(CodeKey::DateTimeReceived, "103.11014", Nctis, "Date and Time of Receipt"),
    row(CodeKey::AnatomicalSite, "102.16096", Nctis, "Anatomical Site"),
    row(CodeKey::Laterality, "272741003", Snomed, "with laterality"),
    row(CodeKey::Modality, "103.16589", Nctis, "Modality"),
    row(CodeKey::ExaminationProcedure, "103.16511", Nctis, "Examination Procedure"),
    row(CodeKey::ImagingFindings, "103.16503", Nctis, "Findings"),
    // Body measurements
    row(CodeKey::BodyWeight, "29463-7", Loinc, "Body weight"),
    row(CodeKey::BodyHeight, "8302-2", Loinc, "Body height"),
];

type IndexKey = (CodeKey, Option<DocumentType>);

static INDEX: LazyLock<HashMap<IndexKey, &'static CodeEntry>> = LazyLock::new(|| {
    TABLE
        .iter()
        .map(|entry| ((entry.key, entry.document_type), entry))
        .collect()
});

/// Every row of the table, in declaration order.
pub fn entries() -> &'static [CodeEntry] {
    TABLE
}

/// Look up the row for `key`, preferring an override for `document_type`.
pub fn lookup(key: CodeKey, document_type: DocumentType) -> &'static CodeEntry {
    INDEX
        .get(&(key, Some(document_type)))
        .or_else(|| INDEX.get(&(key, None)))
        .copied()
        .expect("terminology table has a default row for every code key")
}

/// Shorthand for `lookup(key, document_type).concept()`.
pub fn concept(key: CodeKey, document_type: DocumentType) -> ConceptDescriptor {
    lookup(key, document_type).concept()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_every_code_key_has_a_default_row() {
        for key in CodeKey::ALL {
            assert!(
                INDEX.contains_key(&(key, None)),
                "missing default row for {key:?}"
            );
        }
    }

    #[test]
    fn test_table_rows_are_unique_per_key_and_document_type() {
        assert_eq!(INDEX.len(), TABLE.len());
    }

    #[test]
    fn test_default_codes_are_unique() {
        let codes: HashSet<_> = TABLE
            .iter()
            .filter(|e| e.document_type.is_none())
            .map(|e| e.code)
            .collect();
        assert_eq!(codes.len(), CodeKey::ALL.len());
    }

    #[test]
    fn test_every_coding_system_has_table_rows() {
        let used: HashSet<_> = TABLE.iter().map(|e| e.system).collect();
        for system in CodingSystem::ALL {
            assert!(used.contains(&system), "no rows for {system:?}");
        }
    }

    #[test]
    fn test_display_names_are_valid_titles() {
        for entry in entries() {
            assert_eq!(entry.title().as_str(), entry.display_name);
        }
    }

    #[test]
    fn test_medications_section_varies_by_document_type() {
        let discharge = lookup(CodeKey::MedicationsSection, DocumentType::DischargeSummary);
        assert_eq!(discharge.code, "101.16146");
        assert_eq!(discharge.display_name, "Current Medications On Discharge");

        for doc in [DocumentType::SpecialistLetter, DocumentType::SharedHealthSummary] {
            let entry = lookup(CodeKey::MedicationsSection, doc);
            assert_eq!(entry.code, "101.16022");
            assert_eq!(entry.display_name, "Medications");
        }
    }

    #[test]
    fn test_adverse_reactions_section_code() {
        let cd = concept(CodeKey::AdverseReactionsSection, DocumentType::default());
        assert_eq!(cd.code.as_deref(), Some("101.20113"));
        assert_eq!(cd.code_system.as_deref(), Some(CodingSystem::Nctis.oid()));
        assert_eq!(cd.display_name.as_deref(), Some("Adverse Reactions"));
    }

    #[test]
    fn test_document_type_round_trips_through_str() {
        for doc in DocumentType::ALL {
            assert_eq!(doc.as_str().parse::<DocumentType>().expect("parse"), doc);
        }
    }
}
