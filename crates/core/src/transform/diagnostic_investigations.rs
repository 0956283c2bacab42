use cda_model::{Component, Entry, EntryRelationship, Observation, RelationshipType};

use super::result_group::organizer_status;
use super::{resolve_narrative, CdaTransformer};
use crate::helpers;
use crate::model::{
    CodableText, DiagnosticInvestigations, ImagingExaminationResult, OtherTestResult,
    PathologyTestResult, SourceIdentifier,
};
use crate::narrative::NarrativeGenerator;
use crate::terminology::CodeKey;

impl CdaTransformer {
    /// Build the Diagnostic Investigations section.
    ///
    /// The section has no entries of its own. Each result becomes a nested section component,
    /// pathology results first, then imaging results, then other test results, each group in
    /// input order.
    ///
    /// # Arguments
    ///
    /// * `aggregate` - Diagnostic investigations, or `None` to omit the section.
    /// * `narrative` - Generator used for this section and for any nested result without its
    ///   own custom narrative.
    ///
    /// # Returns
    ///
    /// `None` when `aggregate` is `None`; otherwise the section component.
    pub fn diagnostic_investigations_component(
        &self,
        aggregate: Option<&DiagnosticInvestigations>,
        narrative: &dyn NarrativeGenerator,
    ) -> Option<Component> {
        let aggregate = aggregate?;

        let mut components = Vec::new();
        components.extend(
            aggregate
                .pathology_test_results
                .iter()
                .flatten()
                .filter_map(|r| self.pathology_test_result_component(Some(r), narrative)),
        );
        components.extend(
            aggregate
                .imaging_examination_results
                .iter()
                .flatten()
                .filter_map(|r| self.imaging_examination_result_component(Some(r), narrative)),
        );
        components.extend(
            aggregate
                .other_test_results
                .iter()
                .flatten()
                .filter_map(|r| self.other_test_result_component(Some(r), narrative)),
        );

        let text = resolve_narrative(
            "diagnostic_investigations",
            aggregate.custom_narrative.as_ref(),
            || narrative.diagnostic_investigations_narrative(aggregate),
        );

        tracing::debug!(
            components = components.len(),
            "built diagnostic investigations section"
        );
        Some(self.section(
            CodeKey::DiagnosticInvestigationsSection,
            self.document_type(),
            text,
            Vec::new(),
            components,
        ))
    }

    /// Build a Pathology Test Result section holding a single result entry.
    ///
    /// The entry's relationships are written in a fixed order: overall status, result-group
    /// organizers, pathological diagnoses, conclusion. Every organizer takes its status from
    /// the overall test result status.
    ///
    /// # Returns
    ///
    /// `None` when `result` is `None`; otherwise the section component.
    pub fn pathology_test_result_component(
        &self,
        result: Option<&PathologyTestResult>,
        narrative: &dyn NarrativeGenerator,
    ) -> Option<Component> {
        let result = result?;

        let status = organizer_status(result.overall_test_result_status.as_ref());
        let groups = result.result_groups.iter().flatten().map(|group| {
            Some(EntryRelationship::new(
                RelationshipType::Component,
                self.pathology_result_group(group, &status),
            ))
        });
        let diagnoses = result.pathological_diagnoses.iter().flatten().map(|d| {
            self.coded_relationship(CodeKey::PathologicalDiagnosis, RelationshipType::Component, Some(d))
        });

        let mut obs = self.result_entry_observation(result.test_result_name.as_ref(), result.id.as_ref());
        obs.effective_time = helpers::point_in_time(result.observation_date_time);
        obs.entry_relationships = helpers::collect_relationships(
            std::iter::once(self.coded_relationship(
                CodeKey::OverallTestResultStatus,
                RelationshipType::Component,
                result.overall_test_result_status.as_ref(),
            ))
            .chain(groups)
            .chain(diagnoses)
            .chain(std::iter::once(self.comment_relationship(
                CodeKey::PathologyConclusion,
                result.conclusion.as_deref(),
            ))),
        );

        let text = resolve_narrative("pathology_test_result", result.custom_narrative.as_ref(), || {
            narrative.pathology_test_result_narrative(result)
        });

        Some(self.section(
            CodeKey::PathologyTestResultSection,
            self.document_type(),
            text,
            vec![Entry::new(obs)],
            Vec::new(),
        ))
    }

    /// Build an Imaging Examination Result section holding a single result entry.
    ///
    /// Relationship order: modality, anatomical sites, overall status, examination procedure,
    /// result-group organizers, findings.
    ///
    /// # Returns
    ///
    /// `None` when `result` is `None`; otherwise the section component.
    pub fn imaging_examination_result_component(
        &self,
        result: Option<&ImagingExaminationResult>,
        narrative: &dyn NarrativeGenerator,
    ) -> Option<Component> {
        let result = result?;

        let status = organizer_status(result.overall_result_status.as_ref());
        let sites = result
            .anatomical_sites
            .iter()
            .flatten()
            .map(|site| self.anatomical_site_relationship(site));
        let groups = result.result_groups.iter().flatten().map(|group| {
            Some(EntryRelationship::new(
                RelationshipType::Component,
                self.imaging_result_group(group, &status),
            ))
        });

        let mut obs = self.result_entry_observation(result.examination_result_name.as_ref(), result.id.as_ref());
        obs.effective_time = helpers::point_in_time(result.observation_date_time);
        obs.entry_relationships = helpers::collect_relationships(
            std::iter::once(self.coded_relationship(
                CodeKey::Modality,
                RelationshipType::Component,
                result.modality.as_ref(),
            ))
            .chain(sites)
            .chain([
                self.coded_relationship(
                    CodeKey::OverallTestResultStatus,
                    RelationshipType::Component,
                    result.overall_result_status.as_ref(),
                ),
                self.comment_relationship(
                    CodeKey::ExaminationProcedure,
                    result.examination_procedure.as_deref(),
                ),
            ])
            .chain(groups)
            .chain(std::iter::once(
                self.comment_relationship(CodeKey::ImagingFindings, result.findings.as_deref()),
            )),
        );

        let text = resolve_narrative(
            "imaging_examination_result",
            result.custom_narrative.as_ref(),
            || narrative.imaging_examination_result_narrative(result),
        );

        Some(self.section(
            CodeKey::ImagingExaminationResultSection,
            self.document_type(),
            text,
            vec![Entry::new(obs)],
            Vec::new(),
        ))
    }

    /// Build an Other Test Result section. The report content is the entry's text value.
    ///
    /// # Returns
    ///
    /// `None` when `result` is `None`; otherwise the section component.
    pub fn other_test_result_component(
        &self,
        result: Option<&OtherTestResult>,
        narrative: &dyn NarrativeGenerator,
    ) -> Option<Component> {
        let result = result?;

        let mut obs = self.result_entry_observation(result.report_name.as_ref(), result.id.as_ref());
        obs.effective_time = helpers::point_in_time(result.report_date);
        obs.values.extend(helpers::text_value(result.report_content.as_deref()));
        obs.entry_relationships = helpers::collect_relationships([self.coded_relationship(
            CodeKey::OverallTestResultStatus,
            RelationshipType::Component,
            result.report_status.as_ref(),
        )]);

        let text = resolve_narrative("other_test_result", result.custom_narrative.as_ref(), || {
            narrative.other_test_result_narrative(result)
        });

        Some(self.section(
            CodeKey::OtherTestResultSection,
            self.document_type(),
            text,
            vec![Entry::new(obs)],
            Vec::new(),
        ))
    }

    /// Entry observation coded by the result's own name rather than a fixed table code.
    fn result_entry_observation(
        &self,
        name: Option<&CodableText>,
        id: Option<&SourceIdentifier>,
    ) -> Observation {
        let mut obs = Observation::new(name.map(helpers::concept_descriptor).unwrap_or_default());
        obs.ids = self.identifiers(id);
        obs
    }

    /// Observation carrying a coded value, or `None` when the value is absent or empty.
    fn coded_relationship(
        &self,
        key: CodeKey,
        type_code: RelationshipType,
        value: Option<&CodableText>,
    ) -> Option<EntryRelationship> {
        let value = helpers::coded_value(value)?;
        let mut obs = self.observation(key);
        obs.values.push(value);
        Some(EntryRelationship::new(type_code, obs))
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::{observation, transformer, value_text};
    use super::*;
    use crate::model::{AnatomicalSite, ImagingResultGroup, PathologyResultGroup};
    use crate::narrative::BasicNarrativeGenerator;
    use cda_model::{ClinicalStatement, StrucDocText};

    fn pathology(name: &str) -> PathologyTestResult {
        PathologyTestResult {
            test_result_name: Some(CodableText::text(name)),
            ..PathologyTestResult::default()
        }
    }

    fn imaging(name: &str) -> ImagingExaminationResult {
        ImagingExaminationResult {
            examination_result_name: Some(CodableText::text(name)),
            ..ImagingExaminationResult::default()
        }
    }

    fn entry_name(component: &Component) -> Option<String> {
        observation(&component.section.entries[0].statement)
            .code
            .original_text
            .clone()
    }

    #[test]
    fn test_absent_aggregate_builds_nothing() {
        let t = transformer();
        assert!(t
            .diagnostic_investigations_component(None, &BasicNarrativeGenerator)
            .is_none());
        assert!(t
            .pathology_test_result_component(None, &BasicNarrativeGenerator)
            .is_none());
        assert!(t
            .imaging_examination_result_component(None, &BasicNarrativeGenerator)
            .is_none());
        assert!(t
            .other_test_result_component(None, &BasicNarrativeGenerator)
            .is_none());
    }

    #[test]
    fn test_nested_components_ordered_pathology_imaging_other() {
        let aggregate = DiagnosticInvestigations {
            pathology_test_results: Some(vec![pathology("FBC"), pathology("UEC"), pathology("LFT")]),
            imaging_examination_results: Some(vec![imaging("Chest X-ray"), imaging("CT Head")]),
            other_test_results: Some(vec![OtherTestResult {
                report_name: Some(CodableText::text("ECG")),
                ..OtherTestResult::default()
            }]),
            custom_narrative: None,
        };
        let component = transformer()
            .diagnostic_investigations_component(Some(&aggregate), &BasicNarrativeGenerator)
            .expect("section");

        assert_eq!(component.section.code.code.as_deref(), Some("101.20117"));
        assert!(component.section.entries.is_empty());

        let codes: Vec<_> = component
            .section
            .components
            .iter()
            .map(|c| c.section.code.code.clone().unwrap_or_default())
            .collect();
        assert_eq!(
            codes,
            vec!["102.16144", "102.16144", "102.16144", "102.16145", "102.16145", "102.16029"]
        );

        let names: Vec<_> = component
            .section
            .components
            .iter()
            .map(|c| entry_name(c).unwrap_or_default())
            .collect();
        assert_eq!(names, vec!["FBC", "UEC", "LFT", "Chest X-ray", "CT Head", "ECG"]);
    }

    #[test]
    fn test_empty_aggregate_still_builds_section() {
        let component = transformer()
            .diagnostic_investigations_component(
                Some(&DiagnosticInvestigations::default()),
                &BasicNarrativeGenerator,
            )
            .expect("section");
        assert!(component.section.components.is_empty());
    }

    #[test]
    fn test_pathology_relationships_and_status_propagation() {
        let result = PathologyTestResult {
            id: Some(SourceIdentifier {
                root: "1.2.36.1".into(),
                extension: Some("LAB-77".into()),
            }),
            overall_test_result_status: Some(CodableText::coded("final", "1.2.36.1.2001.1001.101.104.16501", "Final")),
            result_groups: Some(vec![
                PathologyResultGroup {
                    result_group_name: Some(CodableText::text("Electrolytes")),
                    ..PathologyResultGroup::default()
                },
                PathologyResultGroup {
                    result_group_name: Some(CodableText::text("Renal function")),
                    ..PathologyResultGroup::default()
                },
            ]),
            pathological_diagnoses: Some(vec![CodableText::text("Acute kidney injury")]),
            conclusion: Some("Repeat in one week".into()),
            ..pathology("UEC")
        };
        let component = transformer()
            .pathology_test_result_component(Some(&result), &BasicNarrativeGenerator)
            .expect("section");
        let obs = observation(&component.section.entries[0].statement);

        assert_eq!(obs.ids[0].root, "1.2.36.1");
        assert_eq!(obs.ids[0].extension.as_deref(), Some("LAB-77"));

        let kinds: Vec<_> = obs
            .entry_relationships
            .iter()
            .map(|r| match &r.statement {
                ClinicalStatement::Observation(o) => o.code.code.clone().unwrap_or_default(),
                ClinicalStatement::Act(a) => a.code.code.clone().unwrap_or_default(),
                ClinicalStatement::Organizer(o) => format!("organizer:{}", o.status_code),
                other => panic!("unexpected statement {other:?}"),
            })
            .collect();
        assert_eq!(
            kinds,
            vec![
                "308.18051",
                "organizer:final",
                "organizer:final",
                "102.15504",
                "103.16616"
            ]
        );
    }

    #[test]
    fn test_organizer_status_defaults_to_completed() {
        let result = PathologyTestResult {
            result_groups: Some(vec![PathologyResultGroup::default()]),
            ..pathology("FBC")
        };
        let component = transformer()
            .pathology_test_result_component(Some(&result), &BasicNarrativeGenerator)
            .expect("section");
        let obs = observation(&component.section.entries[0].statement);

        assert_eq!(obs.entry_relationships.len(), 1);
        let organizer = obs.entry_relationships[0]
            .statement
            .as_organizer()
            .expect("organizer");
        assert_eq!(organizer.status_code, "completed");
    }

    #[test]
    fn test_imaging_relationship_order() {
        let result = ImagingExaminationResult {
            modality: Some(CodableText::text("X-ray")),
            anatomical_sites: Some(vec![AnatomicalSite {
                description: Some("left wrist".into()),
                ..AnatomicalSite::default()
            }]),
            overall_result_status: Some(CodableText::coded("final", "x", "Final")),
            examination_procedure: Some("AP and lateral views".into()),
            result_groups: Some(vec![ImagingResultGroup::default()]),
            findings: Some("No fracture".into()),
            ..imaging("Wrist X-ray")
        };
        let component = transformer()
            .imaging_examination_result_component(Some(&result), &BasicNarrativeGenerator)
            .expect("section");
        let obs = observation(&component.section.entries[0].statement);

        let kinds: Vec<_> = obs
            .entry_relationships
            .iter()
            .map(|r| {
                let code = match &r.statement {
                    ClinicalStatement::Observation(o) => o.code.code.clone(),
                    ClinicalStatement::Act(a) => a.code.code.clone(),
                    ClinicalStatement::Organizer(o) => Some(format!("organizer:{}", o.status_code)),
                    other => panic!("unexpected statement {other:?}"),
                };
                (r.type_code, code.unwrap_or_default())
            })
            .collect();
        assert_eq!(
            kinds,
            vec![
                (RelationshipType::Component, "103.16589".to_string()),
                (RelationshipType::Subject, "102.16096".to_string()),
                (RelationshipType::Component, "308.18051".to_string()),
                (RelationshipType::Component, "103.16511".to_string()),
                (RelationshipType::Component, "organizer:final".to_string()),
                (RelationshipType::Component, "103.16503".to_string()),
            ]
        );
    }

    #[test]
    fn test_other_test_result_report_content_is_value() {
        let result = OtherTestResult {
            report_name: Some(CodableText::text("ECG")),
            report_content: Some("Sinus rhythm".into()),
            ..OtherTestResult::default()
        };
        let component = transformer()
            .other_test_result_component(Some(&result), &BasicNarrativeGenerator)
            .expect("section");
        let obs = observation(&component.section.entries[0].statement);

        assert_eq!(value_text(obs).as_deref(), Some("Sinus rhythm"));
        assert!(obs.entry_relationships.is_empty());
        assert!(obs.effective_time.is_none());
    }

    #[test]
    fn test_nested_result_keeps_its_own_custom_narrative() {
        let custom = StrucDocText::paragraph("Reported by Dr Chen");
        let aggregate = DiagnosticInvestigations {
            pathology_test_results: Some(vec![PathologyTestResult {
                custom_narrative: Some(custom.clone()),
                ..pathology("FBC")
            }]),
            imaging_examination_results: Some(vec![imaging("CT Head")]),
            ..DiagnosticInvestigations::default()
        };
        let component = transformer()
            .diagnostic_investigations_component(Some(&aggregate), &BasicNarrativeGenerator)
            .expect("section");

        assert_eq!(component.section.components[0].section.text, custom);
        assert_eq!(
            component.section.components[1].section.text,
            BasicNarrativeGenerator.imaging_examination_result_narrative(&imaging("CT Head"))
        );
    }
}
