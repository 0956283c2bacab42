//! Result-group organizers shared by pathology and imaging results.

use cda_model::constants::DEFAULT_ORGANIZER_STATUS;
use cda_model::{
    ActClass, ActMood, AnyValue, ClinicalStatement, Observation, Organizer, ReferenceRange,
};

use super::CdaTransformer;
use crate::helpers;
use crate::model::{
    CodableText, ImagingResult, ImagingResultGroup, IndividualPathologyTestResult,
    PathologyResultGroup, ReferenceRangeDetail, ResultValue, SourceIdentifier,
};
use crate::terminology::CodeKey;

/// The fields pathology and imaging results have in common.
struct ResultFields<'a> {
    id: Option<&'a SourceIdentifier>,
    name: Option<&'a CodableText>,
    value: Option<&'a ResultValue>,
    normal_status: Option<&'a CodableText>,
    reference_ranges: Option<&'a Vec<ReferenceRangeDetail>>,
    comments: Option<&'a Vec<String>>,
    guidance: Option<&'a str>,
}

impl<'a> From<&'a IndividualPathologyTestResult> for ResultFields<'a> {
    fn from(r: &'a IndividualPathologyTestResult) -> Self {
        Self {
            id: r.id.as_ref(),
            name: r.result_name.as_ref(),
            value: r.value.as_ref(),
            normal_status: r.normal_status.as_ref(),
            reference_ranges: r.reference_ranges.as_ref(),
            comments: r.comments.as_ref(),
            guidance: r.reference_range_guidance.as_deref(),
        }
    }
}

impl<'a> From<&'a ImagingResult> for ResultFields<'a> {
    fn from(r: &'a ImagingResult) -> Self {
        Self {
            id: r.id.as_ref(),
            name: r.result_name.as_ref(),
            value: r.value.as_ref(),
            normal_status: r.normal_status.as_ref(),
            reference_ranges: r.reference_ranges.as_ref(),
            comments: r.comments.as_ref(),
            guidance: None,
        }
    }
}

/// Organizer status taken from the owning result's overall status code.
///
/// Never derived from the individual results. Falls back to `completed`.
pub(super) fn organizer_status(overall: Option<&CodableText>) -> String {
    overall
        .and_then(|s| helpers::non_blank(s.code.as_deref()))
        .unwrap_or(DEFAULT_ORGANIZER_STATUS)
        .to_string()
}

/// Observation value for a result, or `None` when the result carries nothing to write.
fn result_value(value: &ResultValue) -> Option<AnyValue> {
    match value {
        ResultValue::Quantity(q) => helpers::physical_quantity(q).map(AnyValue::Quantity),
        ResultValue::QuantityRange(r) => helpers::quantity_interval(r).map(AnyValue::QuantityRange),
        ResultValue::Coded(c) => helpers::coded_value(Some(c)),
        ResultValue::Text(t) => helpers::text_value(Some(t)),
    }
}

/// A range without any valued bound is dropped, meaning and all.
fn reference_range(detail: &ReferenceRangeDetail) -> Option<ReferenceRange> {
    let range = detail.range.as_ref().and_then(helpers::quantity_interval)?;
    Some(ReferenceRange {
        meaning: detail
            .meaning
            .as_ref()
            .map(helpers::concept_descriptor)
            .filter(|cd| !cd.is_empty()),
        value: AnyValue::QuantityRange(range),
    })
}

impl CdaTransformer {
    /// BATTERY organizer for a pathology result group.
    ///
    /// Children are one observation per individual result, in input order, followed by the
    /// group's specimen when it describes anything.
    pub(super) fn pathology_result_group(
        &self,
        group: &PathologyResultGroup,
        status: &str,
    ) -> Organizer {
        let mut components: Vec<ClinicalStatement> = group
            .results
            .iter()
            .flatten()
            .map(|r| self.result_observation(r.into()).into())
            .collect();
        components.extend(
            group
                .specimen
                .as_ref()
                .and_then(|s| self.specimen_observation(s))
                .map(ClinicalStatement::from),
        );
        self.result_group_organizer(group.id.as_ref(), group.result_group_name.as_ref(), status, components)
    }

    /// BATTERY organizer for an imaging result group, followed by its anatomical site.
    pub(super) fn imaging_result_group(&self, group: &ImagingResultGroup, status: &str) -> Organizer {
        let mut components: Vec<ClinicalStatement> = group
            .results
            .iter()
            .flatten()
            .map(|r| self.result_observation(r.into()).into())
            .collect();
        components.extend(
            group
                .anatomical_site
                .as_ref()
                .and_then(|site| self.anatomical_site_observation(site))
                .map(ClinicalStatement::from),
        );
        self.result_group_organizer(group.id.as_ref(), group.result_group_name.as_ref(), status, components)
    }

    fn result_group_organizer(
        &self,
        id: Option<&SourceIdentifier>,
        name: Option<&CodableText>,
        status: &str,
        components: Vec<ClinicalStatement>,
    ) -> Organizer {
        Organizer {
            class_code: ActClass::Battery,
            mood_code: ActMood::Event,
            ids: self.identifiers(id),
            code: name.map(helpers::concept_descriptor).unwrap_or_default(),
            status_code: status.to_string(),
            components,
        }
    }

    fn result_observation(&self, fields: ResultFields<'_>) -> Observation {
        let mut obs = Observation::new(fields.name.map(helpers::concept_descriptor).unwrap_or_default());
        obs.ids = self.identifiers(fields.id);

        if let Some(value) = fields.value.and_then(result_value) {
            obs.values.push(value);
            obs.interpretation_codes.extend(
                fields
                    .normal_status
                    .map(helpers::concept_descriptor)
                    .filter(|cd| !cd.is_empty()),
            );
        }

        obs.reference_ranges = fields
            .reference_ranges
            .into_iter()
            .flatten()
            .filter_map(reference_range)
            .collect();

        let comments = fields
            .comments
            .into_iter()
            .flatten()
            .map(|c| self.comment_relationship(CodeKey::ResultComment, Some(c.as_str())));
        let guidance =
            self.comment_relationship(CodeKey::ReferenceRangeGuidance, fields.guidance);
        obs.entry_relationships =
            helpers::collect_relationships(comments.chain(std::iter::once(guidance)));

        obs
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::{observation, transformer};
    use super::*;
    use crate::model::{AnatomicalSite, Quantity, QuantityRange, SpecimenDetail};
    use cda_model::RelationshipType;

    fn potassium() -> IndividualPathologyTestResult {
        IndividualPathologyTestResult {
            result_name: Some(CodableText::coded("2823-3", "2.16.840.1.113883.6.1", "Potassium")),
            value: Some(ResultValue::Quantity(Quantity::new("5.9", Some("mmol/L")))),
            normal_status: Some(CodableText::coded("H", "2.16.840.1.113883.5.83", "High")),
            reference_ranges: Some(vec![
                ReferenceRangeDetail {
                    meaning: Some(CodableText::text("Normal")),
                    range: Some(QuantityRange {
                        low: Some(Quantity::new("3.5", Some("mmol/L"))),
                        high: Some(Quantity::new("5.2", Some("mmol/L"))),
                    }),
                },
                ReferenceRangeDetail {
                    meaning: Some(CodableText::text("Critical")),
                    range: Some(QuantityRange {
                        low: None,
                        high: Some(Quantity::new("6.5", Some("mmol/L"))),
                    }),
                },
            ]),
            ..IndividualPathologyTestResult::default()
        }
    }

    #[test]
    fn test_organizer_status_comes_from_owning_result() {
        assert_eq!(organizer_status(None), "completed");
        assert_eq!(organizer_status(Some(&CodableText::text("final"))), "completed");
        assert_eq!(
            organizer_status(Some(&CodableText::coded("aborted", "x", "Aborted"))),
            "aborted"
        );
    }

    #[test]
    fn test_result_with_value_and_ordered_reference_ranges() {
        let group = PathologyResultGroup {
            result_group_name: Some(CodableText::text("Electrolytes")),
            results: Some(vec![potassium()]),
            ..PathologyResultGroup::default()
        };
        let organizer = transformer().pathology_result_group(&group, "active");

        assert_eq!(organizer.class_code, ActClass::Battery);
        assert_eq!(organizer.status_code, "active");
        assert_eq!(organizer.ids.len(), 1);
        assert_eq!(organizer.components.len(), 1);

        let obs = observation(&organizer.components[0]);
        assert_eq!(obs.values[0].xsi_type(), "PQ");
        assert_eq!(obs.interpretation_codes[0].code.as_deref(), Some("H"));
        let meanings: Vec<_> = obs
            .reference_ranges
            .iter()
            .map(|r| r.meaning.as_ref().and_then(|m| m.original_text.clone()))
            .collect();
        assert_eq!(
            meanings,
            vec![Some("Normal".to_string()), Some("Critical".to_string())]
        );
        assert!(obs.entry_relationships.is_empty());
    }

    #[test]
    fn test_interpretation_requires_value() {
        let result = IndividualPathologyTestResult {
            value: None,
            ..potassium()
        };
        let group = PathologyResultGroup {
            results: Some(vec![result]),
            ..PathologyResultGroup::default()
        };
        let organizer = transformer().pathology_result_group(&group, "completed");
        let obs = observation(&organizer.components[0]);
        assert!(obs.values.is_empty());
        assert!(obs.interpretation_codes.is_empty());
        assert_eq!(obs.reference_ranges.len(), 2);
    }

    #[test]
    fn test_empty_range_value_is_not_written_and_has_no_interpretation() {
        let result = IndividualPathologyTestResult {
            value: Some(ResultValue::QuantityRange(QuantityRange::default())),
            reference_ranges: Some(vec![ReferenceRangeDetail {
                meaning: Some(CodableText::text("Normal")),
                range: Some(QuantityRange::default()),
            }]),
            ..potassium()
        };
        let group = PathologyResultGroup {
            results: Some(vec![result]),
            ..PathologyResultGroup::default()
        };
        let organizer = transformer().pathology_result_group(&group, "completed");
        let obs = observation(&organizer.components[0]);

        assert!(obs.values.is_empty());
        assert!(obs.interpretation_codes.is_empty());
        assert!(obs.reference_ranges.is_empty());
    }

    #[test]
    fn test_blank_quantity_value_counts_as_absent() {
        let result = IndividualPathologyTestResult {
            value: Some(ResultValue::Quantity(Quantity::new("  ", Some("mmol/L")))),
            ..potassium()
        };
        let group = PathologyResultGroup {
            results: Some(vec![result]),
            ..PathologyResultGroup::default()
        };
        let organizer = transformer().pathology_result_group(&group, "completed");
        let obs = observation(&organizer.components[0]);

        assert!(obs.values.is_empty());
        assert!(obs.interpretation_codes.is_empty());
        assert_eq!(obs.reference_ranges.len(), 2);
    }

    #[test]
    fn test_one_sided_range_value_keeps_interpretation() {
        let result = IndividualPathologyTestResult {
            value: Some(ResultValue::QuantityRange(QuantityRange {
                low: None,
                high: Some(Quantity::new("0.10", Some("mg/L"))),
            })),
            ..potassium()
        };
        let group = PathologyResultGroup {
            results: Some(vec![result]),
            ..PathologyResultGroup::default()
        };
        let organizer = transformer().pathology_result_group(&group, "completed");
        let obs = observation(&organizer.components[0]);

        assert_eq!(obs.values[0].xsi_type(), "IVL_PQ");
        assert_eq!(obs.interpretation_codes.len(), 1);
    }

    #[test]
    fn test_comments_and_guidance_only_when_non_empty() {
        let result = IndividualPathologyTestResult {
            comments: Some(vec!["Haemolysed sample".into(), "  ".into()]),
            reference_range_guidance: Some("Adult range".into()),
            ..potassium()
        };
        let group = PathologyResultGroup {
            results: Some(vec![result]),
            ..PathologyResultGroup::default()
        };
        let organizer = transformer().pathology_result_group(&group, "completed");
        let obs = observation(&organizer.components[0]);

        let acts: Vec<_> = obs
            .entry_relationships
            .iter()
            .map(|r| {
                assert_eq!(r.type_code, RelationshipType::Component);
                let act = r.statement.as_act().expect("act");
                (act.code.code.clone(), act.text.clone())
            })
            .collect();
        assert_eq!(
            acts,
            vec![
                (Some("281296001".to_string()), Some("Haemolysed sample".to_string())),
                (Some("103.16475".to_string()), Some("Adult range".to_string())),
            ]
        );
    }

    #[test]
    fn test_pathology_group_appends_specimen() {
        let group = PathologyResultGroup {
            results: Some(vec![potassium(), potassium()]),
            specimen: Some(SpecimenDetail {
                collection_procedure: Some(CodableText::text("Venepuncture")),
                ..SpecimenDetail::default()
            }),
            ..PathologyResultGroup::default()
        };
        let organizer = transformer().pathology_result_group(&group, "completed");

        assert_eq!(organizer.components.len(), 3);
        assert_eq!(
            observation(&organizer.components[2]).code.code.as_deref(),
            Some("102.16156")
        );
    }

    #[test]
    fn test_imaging_group_appends_anatomical_site() {
        let group = ImagingResultGroup {
            results: Some(vec![ImagingResult {
                result_name: Some(CodableText::text("Fracture")),
                value: Some(ResultValue::Text("Not seen".into())),
                ..ImagingResult::default()
            }]),
            anatomical_site: Some(AnatomicalSite {
                description: Some("left wrist".into()),
                ..AnatomicalSite::default()
            }),
            ..ImagingResultGroup::default()
        };
        let organizer = transformer().imaging_result_group(&group, "completed");

        assert_eq!(organizer.components.len(), 2);
        let result = observation(&organizer.components[0]);
        assert_eq!(result.values, vec![AnyValue::Text("Not seen".into())]);
        let site = observation(&organizer.components[1]);
        assert_eq!(site.code.code.as_deref(), Some("102.16096"));
    }
}
