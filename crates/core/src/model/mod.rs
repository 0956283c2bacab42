//! Clinical domain aggregates consumed by the section builders.
//!
//! These are plain, read-only data holders. Every nested optional is an explicit `Option` and
//! every list is `Option<Vec<_>>`, so "absent" and "empty" stay distinguishable. All types
//! deserialize from JSON or YAML with unknown keys rejected.

pub mod adverse_reactions;
pub mod common;
pub mod diagnostic_investigations;
pub mod measurements;
pub mod medical_history;
pub mod medications;

pub use adverse_reactions::{AdverseReactions, Reaction, ReactionEvent};
pub use common::{
    CdaDateTime, CdaInterval, CodableText, Quantity, QuantityRange, SourceIdentifier, Statement,
};
pub use diagnostic_investigations::{
    AnatomicalSite, DiagnosticInvestigations, ImagingExaminationResult, ImagingResult,
    ImagingResultGroup, IndividualPathologyTestResult, OtherTestResult, PathologyResultGroup,
    PathologyTestResult, PhysicalDetail, ReferenceRangeDetail, ResultValue, SpecimenDetail,
};
pub use measurements::{BodyMeasurements, Measurement};
pub use medical_history::{MedicalHistory, MedicalHistoryItem, ProblemDiagnosis, Procedure};
pub use medications::{MedicationItem, Medications};
