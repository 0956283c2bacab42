//! Decoding aggregates from JSON or YAML and rendering the resulting section.
//!
//! This is the edge the CLI drives: text in, one [`SectionKind`] chosen by the caller, a
//! rendered component out. Schema mismatches report the path of the failing field.

use std::fmt;
use std::str::FromStr;

use cda_model::Component;
use serde::de::DeserializeOwned;

use crate::model::{
    AdverseReactions, BodyMeasurements, DiagnosticInvestigations, ImagingExaminationResult,
    MedicalHistory, Medications, OtherTestResult, PathologyTestResult,
};
use crate::narrative::NarrativeGenerator;
use crate::transform::CdaTransformer;
use crate::{CoreError, CoreResult};

/// Text encoding of an input aggregate.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum InputFormat {
    #[default]
    Json,
    Yaml,
}

impl FromStr for InputFormat {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "yaml" | "yml" => Ok(Self::Yaml),
            other => Err(CoreError::UnknownInputFormat(other.to_string())),
        }
    }
}

/// Encoding of a rendered section.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Xml,
    Json,
}

/// Which builder an input document is fed to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SectionKind {
    AdverseReactions,
    Medications,
    MedicalHistory,
    DiagnosticInvestigations,
    PathologyTestResult,
    ImagingExaminationResult,
    OtherTestResult,
    BodyMeasurements,
}

impl SectionKind {
    pub const ALL: [SectionKind; 8] = [
        SectionKind::AdverseReactions,
        SectionKind::Medications,
        SectionKind::MedicalHistory,
        SectionKind::DiagnosticInvestigations,
        SectionKind::PathologyTestResult,
        SectionKind::ImagingExaminationResult,
        SectionKind::OtherTestResult,
        SectionKind::BodyMeasurements,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            SectionKind::AdverseReactions => "adverse-reactions",
            SectionKind::Medications => "medications",
            SectionKind::MedicalHistory => "medical-history",
            SectionKind::DiagnosticInvestigations => "diagnostic-investigations",
            SectionKind::PathologyTestResult => "pathology-test-result",
            SectionKind::ImagingExaminationResult => "imaging-examination-result",
            SectionKind::OtherTestResult => "other-test-result",
            SectionKind::BodyMeasurements => "body-measurements",
        }
    }
}

impl fmt::Display for SectionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SectionKind {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase().replace('_', "-");
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == wanted)
            .ok_or_else(|| CoreError::UnknownSectionKind(s.to_string()))
    }
}

/// Deserialize an aggregate, reporting the failing field path on mismatch.
///
/// # Arguments
///
/// * `kind` - Section kind, used only to label errors.
/// * `text` - JSON or YAML text.
/// * `format` - Which of the two `text` is.
///
/// # Errors
///
/// Returns `CoreError::InvalidInput` if `text` is blank, or `CoreError::SchemaMismatch` if it
/// does not match the aggregate's schema. Unknown fields are rejected.
pub fn parse_aggregate<T: DeserializeOwned>(
    kind: SectionKind,
    text: &str,
    format: InputFormat,
) -> CoreResult<T> {
    if text.trim().is_empty() {
        return Err(CoreError::InvalidInput(format!("{kind} input is empty")));
    }

    match format {
        InputFormat::Json => {
            let mut deserializer = serde_json::Deserializer::from_str(text);
            let parsed = serde_path_to_error::deserialize(&mut deserializer)
                .map_err(|err| schema_mismatch(kind, err))?;
            deserializer.end().map_err(|err| CoreError::SchemaMismatch {
                kind: kind.as_str(),
                path: "<root>".into(),
                message: err.to_string(),
            })?;
            Ok(parsed)
        }
        InputFormat::Yaml => {
            let deserializer = serde_yaml::Deserializer::from_str(text);
            serde_path_to_error::deserialize(deserializer).map_err(|err| schema_mismatch(kind, err))
        }
    }
}

fn schema_mismatch<E: fmt::Display>(
    kind: SectionKind,
    err: serde_path_to_error::Error<E>,
) -> CoreError {
    let path = err.path().to_string();
    let source = err.into_inner();
    let path = if path.is_empty() || path == "." {
        "<root>".to_string()
    } else {
        path
    };
    CoreError::SchemaMismatch {
        kind: kind.as_str(),
        path,
        message: source.to_string(),
    }
}

/// Decode `text` as the aggregate for `kind` and run the matching builder.
///
/// Medications use the transformer's configured document type.
///
/// # Errors
///
/// Returns any error from [`parse_aggregate`].
pub fn build_section(
    transformer: &CdaTransformer,
    kind: SectionKind,
    text: &str,
    format: InputFormat,
    narrative: &dyn NarrativeGenerator,
) -> CoreResult<Component> {
    let component = match kind {
        SectionKind::AdverseReactions => {
            let aggregate: AdverseReactions = parse_aggregate(kind, text, format)?;
            transformer.adverse_reactions_component(Some(&aggregate), narrative)
        }
        SectionKind::Medications => {
            let aggregate: Medications = parse_aggregate(kind, text, format)?;
            transformer.medications_component(
                Some(&aggregate),
                narrative,
                transformer.config().document_type(),
            )
        }
        SectionKind::MedicalHistory => {
            let aggregate: MedicalHistory = parse_aggregate(kind, text, format)?;
            transformer.medical_history_component(Some(&aggregate), narrative)
        }
        SectionKind::DiagnosticInvestigations => {
            let aggregate: DiagnosticInvestigations = parse_aggregate(kind, text, format)?;
            transformer.diagnostic_investigations_component(Some(&aggregate), narrative)
        }
        SectionKind::PathologyTestResult => {
            let aggregate: PathologyTestResult = parse_aggregate(kind, text, format)?;
            transformer.pathology_test_result_component(Some(&aggregate), narrative)
        }
        SectionKind::ImagingExaminationResult => {
            let aggregate: ImagingExaminationResult = parse_aggregate(kind, text, format)?;
            transformer.imaging_examination_result_component(Some(&aggregate), narrative)
        }
        SectionKind::OtherTestResult => {
            let aggregate: OtherTestResult = parse_aggregate(kind, text, format)?;
            transformer.other_test_result_component(Some(&aggregate), narrative)
        }
        SectionKind::BodyMeasurements => {
            let aggregate: BodyMeasurements = parse_aggregate(kind, text, format)?;
            transformer.body_measurements_component(Some(&aggregate), narrative)
        }
    };

    tracing::debug!(%kind, "section built from input");
    component.ok_or_else(|| CoreError::InvalidInput(format!("{kind} produced no section")))
}

/// Serialise a built component.
///
/// # Errors
///
/// Returns `CoreError::Render` if XML writing fails, or `CoreError::Serialization` for JSON.
pub fn render_component(component: &Component, format: OutputFormat) -> CoreResult<String> {
    match format {
        OutputFormat::Xml => Ok(cda_model::write_component_xml(component)?),
        OutputFormat::Json => {
            serde_json::to_string_pretty(component).map_err(CoreError::Serialization)
        }
    }
}

impl FromStr for OutputFormat {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "xml" => Ok(Self::Xml),
            "json" => Ok(Self::Json),
            other => Err(CoreError::UnknownOutputFormat(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::narrative::BasicNarrativeGenerator;
    use crate::transform::test_support::transformer;

    const REACTIONS_JSON: &str = r#"{
        "adverse_substance_reactions": [
            {
                "substance_or_agent": { "original_text": "Penicillin" },
                "reaction_event": {
                    "manifestations": [
                        { "original_text": "Hives" },
                        { "original_text": "Wheeze" }
                    ]
                }
            }
        ]
    }"#;

    #[test]
    fn test_section_kind_parsing_accepts_snake_and_kebab_case() {
        assert_eq!(
            "adverse-reactions".parse::<SectionKind>().expect("kind"),
            SectionKind::AdverseReactions
        );
        assert_eq!(
            "Body_Measurements".parse::<SectionKind>().expect("kind"),
            SectionKind::BodyMeasurements
        );
        assert!(matches!(
            "allergies".parse::<SectionKind>(),
            Err(CoreError::UnknownSectionKind(_))
        ));
        for kind in SectionKind::ALL {
            assert_eq!(kind.to_string().parse::<SectionKind>().expect("kind"), kind);
        }
    }

    #[test]
    fn test_input_format_parsing() {
        assert_eq!("YML".parse::<InputFormat>().expect("format"), InputFormat::Yaml);
        assert_eq!("json".parse::<InputFormat>().expect("format"), InputFormat::Json);
        assert!("toml".parse::<InputFormat>().is_err());
    }

    #[test]
    fn test_output_format_parsing_reports_output_error() {
        assert_eq!(" XML ".parse::<OutputFormat>().expect("format"), OutputFormat::Xml);
        assert_eq!("json".parse::<OutputFormat>().expect("format"), OutputFormat::Json);
        match "yaml".parse::<OutputFormat>() {
            Err(CoreError::UnknownOutputFormat(value)) => assert_eq!(value, "yaml"),
            other => panic!("expected unknown output format, got {other:?}"),
        }
    }

    #[test]
    fn test_build_section_keeps_written_quantity_digits() {
        let json = r#"{"body_weight": {"quantity": {"value": 72.50, "units": "kg"}}}"#;
        let component = build_section(
            &transformer(),
            SectionKind::BodyMeasurements,
            json,
            InputFormat::Json,
            &BasicNarrativeGenerator,
        )
        .expect("section");
        let rendered = render_component(&component, OutputFormat::Xml).expect("xml");
        assert!(rendered.contains("value=\"72.50\""), "{rendered}");
    }

    #[test]
    fn test_build_section_from_json() {
        let component = build_section(
            &transformer(),
            SectionKind::AdverseReactions,
            REACTIONS_JSON,
            InputFormat::Json,
            &BasicNarrativeGenerator,
        )
        .expect("section");
        assert_eq!(component.section.code.code.as_deref(), Some("101.20113"));
        assert_eq!(component.section.entries.len(), 1);
    }

    #[test]
    fn test_build_section_from_yaml() {
        let yaml = "body_weight:\n  quantity:\n    value: 72.5\n    units: kg\n";
        let component = build_section(
            &transformer(),
            SectionKind::BodyMeasurements,
            yaml,
            InputFormat::Yaml,
            &BasicNarrativeGenerator,
        )
        .expect("section");
        assert_eq!(component.section.entries.len(), 1);
    }

    #[test]
    fn test_schema_mismatch_reports_field_path() {
        let json = r#"{ "medications": [ { "medicine": { "original_text": "Amoxil" }, "dose": 5 } ] }"#;
        let err = build_section(
            &transformer(),
            SectionKind::Medications,
            json,
            InputFormat::Json,
            &BasicNarrativeGenerator,
        )
        .expect_err("unknown field must be rejected");

        match err {
            CoreError::SchemaMismatch { kind, path, .. } => {
                assert_eq!(kind, "medications");
                assert!(path.starts_with("medications[0]"), "path was {path}");
            }
            other => panic!("expected schema mismatch, got {other:?}"),
        }
    }

    #[test]
    fn test_blank_input_is_rejected() {
        let err = parse_aggregate::<Medications>(SectionKind::Medications, "  \n", InputFormat::Yaml)
            .expect_err("blank input");
        assert!(matches!(err, CoreError::InvalidInput(_)));
    }

    #[test]
    fn test_render_component_as_xml_and_json() {
        let component = build_section(
            &transformer(),
            SectionKind::AdverseReactions,
            REACTIONS_JSON,
            InputFormat::Json,
            &BasicNarrativeGenerator,
        )
        .expect("section");

        let xml = render_component(&component, OutputFormat::Xml).expect("xml");
        assert!(xml.contains(r#"<code code="101.20113""#));
        assert!(xml.contains("Wheeze"));

        let json = render_component(&component, OutputFormat::Json).expect("json");
        let value: serde_json::Value = serde_json::from_str(&json).expect("valid json");
        assert!(value.get("section").is_some());
    }
}
