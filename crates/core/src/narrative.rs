//! Section narrative generation.
//!
//! Builders ask a [`NarrativeGenerator`] for the section `text` only when the aggregate carries no
//! `custom_narrative`. Each aggregate has its own distinctly named method.
//!
//! [`BasicNarrativeGenerator`] renders plain tables and paragraphs. Callers with a house style
//! supply their own implementation.

use cda_model::{StrucDocTable, StrucDocText};

use crate::model::{
    AdverseReactions, BodyMeasurements, CdaDateTime, CodableText, DiagnosticInvestigations,
    ImagingExaminationResult, Measurement, MedicalHistory, Medications, OtherTestResult,
    PathologyTestResult, Quantity, QuantityRange, ReferenceRangeDetail, ResultValue, Statement,
};

/// Produces human-readable section text from the same aggregate the entries came from.
pub trait NarrativeGenerator {
    fn adverse_reactions_narrative(&self, aggregate: &AdverseReactions) -> StrucDocText;
    fn medications_narrative(&self, aggregate: &Medications) -> StrucDocText;
    fn medical_history_narrative(&self, aggregate: &MedicalHistory) -> StrucDocText;
    fn diagnostic_investigations_narrative(
        &self,
        aggregate: &DiagnosticInvestigations,
    ) -> StrucDocText;
    fn pathology_test_result_narrative(&self, result: &PathologyTestResult) -> StrucDocText;
    fn imaging_examination_result_narrative(
        &self,
        result: &ImagingExaminationResult,
    ) -> StrucDocText;
    fn other_test_result_narrative(&self, result: &OtherTestResult) -> StrucDocText;
    fn body_measurements_narrative(&self, aggregate: &BodyMeasurements) -> StrucDocText;
}

/// Table-based narrative with no styling.
#[derive(Clone, Copy, Debug, Default)]
pub struct BasicNarrativeGenerator;

/// Best human-readable rendering of coded text: display name, then original text, then code.
pub fn label(text: &CodableText) -> String {
    [&text.display_name, &text.original_text, &text.code]
        .into_iter()
        .flatten()
        .map(|s| s.trim())
        .find(|s| !s.is_empty())
        .unwrap_or_default()
        .to_string()
}

fn opt_label(text: Option<&CodableText>) -> String {
    text.map(label).unwrap_or_default()
}

fn format_date_time(value: Option<CdaDateTime>) -> String {
    match value {
        Some(CdaDateTime::DateTime(dt)) => dt.format("%d %b %Y %H:%M").to_string(),
        Some(CdaDateTime::Date(date)) => date.format("%d %b %Y").to_string(),
        None => String::new(),
    }
}

fn format_quantity(q: &Quantity) -> String {
    match q.units.as_deref() {
        Some(units) => format!("{} {units}", q.value),
        None => q.value.clone(),
    }
}

fn format_range(range: &QuantityRange) -> String {
    match (&range.low, &range.high) {
        (Some(low), Some(high)) => format!("{} - {}", format_quantity(low), format_quantity(high)),
        (Some(low), None) => format!(">= {}", format_quantity(low)),
        (None, Some(high)) => format!("<= {}", format_quantity(high)),
        (None, None) => String::new(),
    }
}

fn format_value(value: Option<&ResultValue>) -> String {
    match value {
        Some(ResultValue::Quantity(q)) => format_quantity(q),
        Some(ResultValue::QuantityRange(r)) => format_range(r),
        Some(ResultValue::Coded(c)) => label(c),
        Some(ResultValue::Text(t)) => t.clone(),
        None => String::new(),
    }
}

fn format_reference_ranges(ranges: Option<&Vec<ReferenceRangeDetail>>) -> String {
    ranges
        .into_iter()
        .flatten()
        .filter_map(|r| r.range.as_ref().map(format_range))
        .collect::<Vec<_>>()
        .join("; ")
}

fn statement_text(statement: Option<&Statement>, fallback: &str) -> String {
    statement
        .map(|s| label(&s.value))
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| fallback.to_string())
}

fn table(headers: &[&str], rows: Vec<Vec<String>>) -> StrucDocTable {
    StrucDocTable {
        caption: None,
        headers: headers.iter().map(|h| h.to_string()).collect(),
        rows,
    }
}

impl NarrativeGenerator for BasicNarrativeGenerator {
    fn adverse_reactions_narrative(&self, aggregate: &AdverseReactions) -> StrucDocText {
        let reactions = aggregate.adverse_substance_reactions.as_deref().unwrap_or_default();
        if reactions.is_empty() {
            return StrucDocText::paragraph(statement_text(
                aggregate.exclusion_statement.as_ref(),
                "No adverse reactions recorded.",
            ));
        }

        let rows = reactions
            .iter()
            .map(|r| {
                let event = r.reaction_event.as_ref();
                let manifestations = event
                    .and_then(|e| e.manifestations.as_ref())
                    .into_iter()
                    .flatten()
                    .map(label)
                    .collect::<Vec<_>>()
                    .join(", ");
                vec![
                    opt_label(r.substance_or_agent.as_ref()),
                    opt_label(event.and_then(|e| e.reaction_type.as_ref())),
                    manifestations,
                ]
            })
            .collect();
        StrucDocText::table(table(&["Substance/Agent", "Reaction Type", "Manifestations"], rows))
    }

    fn medications_narrative(&self, aggregate: &Medications) -> StrucDocText {
        let items = aggregate.medications.as_deref().unwrap_or_default();
        if items.is_empty() {
            return StrucDocText::paragraph(statement_text(
                aggregate.exclusion_statement.as_ref(),
                "No medications recorded.",
            ));
        }

        let rows = items
            .iter()
            .map(|m| {
                vec![
                    opt_label(m.medicine.as_ref()),
                    m.directions.clone().unwrap_or_default(),
                    m.clinical_indication.clone().unwrap_or_default(),
                    opt_label(m.change_type.as_ref()),
                    opt_label(m.change_status.as_ref()),
                    m.change_reason.clone().unwrap_or_default(),
                    m.comment.clone().unwrap_or_default(),
                ]
            })
            .collect();
        StrucDocText::table(table(
            &[
                "Medicine",
                "Directions",
                "Clinical Indication",
                "Change Type",
                "Change Status",
                "Change Reason",
                "Comment",
            ],
            rows,
        ))
    }

    fn medical_history_narrative(&self, aggregate: &MedicalHistory) -> StrucDocText {
        let mut rows = Vec::new();
        for p in aggregate.problem_diagnoses.iter().flatten() {
            let dates = match (p.onset_date, p.remission_date) {
                (Some(_), Some(_)) => format!(
                    "{} to {}",
                    format_date_time(p.onset_date),
                    format_date_time(p.remission_date)
                ),
                _ => format_date_time(p.onset_date.or(p.remission_date)),
            };
            rows.push(vec![
                opt_label(p.identification.as_ref()),
                dates,
                p.comment.clone().unwrap_or_default(),
            ]);
        }
        for p in aggregate.procedures.iter().flatten() {
            rows.push(vec![
                opt_label(p.procedure.as_ref()),
                format_date_time(p.procedure_date_time),
                p.comment.clone().unwrap_or_default(),
            ]);
        }
        for item in aggregate.medical_history_items.iter().flatten() {
            let interval = item.date_time_interval.as_ref();
            let dates = match (interval.and_then(|i| i.low), interval.and_then(|i| i.high)) {
                (Some(low), Some(high)) => format!(
                    "{} to {}",
                    format_date_time(Some(low)),
                    format_date_time(Some(high))
                ),
                (low, high) => format_date_time(low.or(high)),
            };
            rows.push(vec![
                item.item_description.clone().unwrap_or_default(),
                dates,
                item.comment.clone().unwrap_or_default(),
            ]);
        }

        let mut text = StrucDocText::default();
        if !rows.is_empty() {
            text = StrucDocText::table(table(&["Item", "Date", "Comment"], rows));
        }
        let no_problems = aggregate.problem_diagnoses.as_deref().unwrap_or_default().is_empty();
        if no_problems {
            if let Some(statement) = &aggregate.problem_diagnosis_exclusion_statement {
                text.blocks.push(cda_model::NarrativeBlock::Paragraph(label(&statement.value)));
            }
        }
        let no_procedures = aggregate.procedures.as_deref().unwrap_or_default().is_empty();
        if no_procedures {
            if let Some(statement) = &aggregate.procedure_exclusion_statement {
                text.blocks.push(cda_model::NarrativeBlock::Paragraph(label(&statement.value)));
            }
        }
        if text.is_empty() {
            text = StrucDocText::paragraph("No medical history recorded.");
        }
        text
    }

    fn diagnostic_investigations_narrative(
        &self,
        aggregate: &DiagnosticInvestigations,
    ) -> StrucDocText {
        let mut items = Vec::new();
        items.extend(
            aggregate
                .pathology_test_results
                .iter()
                .flatten()
                .map(|r| format!("Pathology: {}", opt_label(r.test_result_name.as_ref()))),
        );
        items.extend(
            aggregate
                .imaging_examination_results
                .iter()
                .flatten()
                .map(|r| format!("Imaging: {}", opt_label(r.examination_result_name.as_ref()))),
        );
        items.extend(
            aggregate
                .other_test_results
                .iter()
                .flatten()
                .map(|r| format!("Other: {}", opt_label(r.report_name.as_ref()))),
        );

        if items.is_empty() {
            return StrucDocText::paragraph("No diagnostic investigations recorded.");
        }
        StrucDocText {
            blocks: vec![cda_model::NarrativeBlock::List(items)],
        }
    }

    fn pathology_test_result_narrative(&self, result: &PathologyTestResult) -> StrucDocText {
        let mut rows = Vec::new();
        for group in result.result_groups.iter().flatten() {
            let group_name = opt_label(group.result_group_name.as_ref());
            for r in group.results.iter().flatten() {
                rows.push(vec![
                    group_name.clone(),
                    opt_label(r.result_name.as_ref()),
                    format_value(r.value.as_ref()),
                    format_reference_ranges(r.reference_ranges.as_ref()),
                    opt_label(r.normal_status.as_ref()),
                ]);
            }
        }

        let mut text = StrucDocText::paragraph(format!(
            "{} ({})",
            opt_label(result.test_result_name.as_ref()),
            format_date_time(result.observation_date_time)
        ));
        if !rows.is_empty() {
            text.blocks.push(cda_model::NarrativeBlock::Table(table(
                &["Group", "Result", "Value", "Reference Range", "Flag"],
                rows,
            )));
        }
        if let Some(conclusion) = result.conclusion.as_deref().filter(|c| !c.trim().is_empty()) {
            text.blocks
                .push(cda_model::NarrativeBlock::Paragraph(format!("Conclusion: {conclusion}")));
        }
        text
    }

    fn imaging_examination_result_narrative(
        &self,
        result: &ImagingExaminationResult,
    ) -> StrucDocText {
        let mut text = StrucDocText::paragraph(format!(
            "{} ({})",
            opt_label(result.examination_result_name.as_ref()),
            format_date_time(result.observation_date_time)
        ));

        let rows: Vec<Vec<String>> = result
            .result_groups
            .iter()
            .flatten()
            .flat_map(|g| g.results.iter().flatten())
            .map(|r| {
                vec![
                    opt_label(r.result_name.as_ref()),
                    format_value(r.value.as_ref()),
                    format_reference_ranges(r.reference_ranges.as_ref()),
                ]
            })
            .collect();
        if !rows.is_empty() {
            text.blocks.push(cda_model::NarrativeBlock::Table(table(
                &["Result", "Value", "Reference Range"],
                rows,
            )));
        }
        if let Some(findings) = result.findings.as_deref().filter(|f| !f.trim().is_empty()) {
            text.blocks
                .push(cda_model::NarrativeBlock::Paragraph(format!("Findings: {findings}")));
        }
        text
    }

    fn other_test_result_narrative(&self, result: &OtherTestResult) -> StrucDocText {
        let mut text = StrucDocText::paragraph(format!(
            "{} ({})",
            opt_label(result.report_name.as_ref()),
            format_date_time(result.report_date)
        ));
        if let Some(content) = result.report_content.as_deref().filter(|c| !c.trim().is_empty()) {
            text.blocks
                .push(cda_model::NarrativeBlock::Paragraph(content.to_string()));
        }
        text
    }

    fn body_measurements_narrative(&self, aggregate: &BodyMeasurements) -> StrucDocText {
        fn row(name: &str, m: Option<&Measurement>) -> Option<Vec<String>> {
            let m = m?;
            let quantity = m.quantity.as_ref().filter(|q| !q.value.trim().is_empty())?;
            Some(vec![
                name.to_string(),
                format_quantity(quantity),
                format_date_time(m.observation_time),
            ])
        }

        let rows: Vec<_> = [
            row("Body weight", aggregate.body_weight.as_ref()),
            row("Body height", aggregate.body_height.as_ref()),
        ]
        .into_iter()
        .flatten()
        .collect();

        if rows.is_empty() {
            return StrucDocText::paragraph("No measurements recorded.");
        }
        StrucDocText::table(table(&["Measurement", "Value", "Date"], rows))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{MedicationItem, Reaction, ReactionEvent};
    use cda_model::NarrativeBlock;

    #[test]
    fn test_label_prefers_display_name_then_original_text_then_code() {
        let mut text = CodableText::coded("91936005", "2.16.840.1.113883.6.96", "Penicillin");
        text.original_text = Some("penicillin allergy".into());
        assert_eq!(label(&text), "Penicillin");

        text.display_name = Some("  ".into());
        assert_eq!(label(&text), "penicillin allergy");

        text.original_text = None;
        assert_eq!(label(&text), "91936005");
        assert_eq!(label(&CodableText::default()), "");
    }

    #[test]
    fn test_adverse_reactions_narrative_lists_reactions() {
        let aggregate = AdverseReactions {
            adverse_substance_reactions: Some(vec![Reaction {
                id: None,
                substance_or_agent: Some(CodableText::text("Penicillin")),
                reaction_event: Some(ReactionEvent {
                    reaction_type: None,
                    manifestations: Some(vec![
                        CodableText::text("Rash"),
                        CodableText::text("Wheeze"),
                    ]),
                }),
            }]),
            ..AdverseReactions::default()
        };

        let text = BasicNarrativeGenerator.adverse_reactions_narrative(&aggregate);
        match &text.blocks[0] {
            NarrativeBlock::Table(t) => {
                assert_eq!(t.rows, vec![vec!["Penicillin", "", "Rash, Wheeze"]]);
            }
            other => panic!("expected table, got {other:?}"),
        }
    }

    #[test]
    fn test_medications_narrative_uses_exclusion_statement_when_empty() {
        let aggregate = Medications {
            medications: Some(Vec::<MedicationItem>::new()),
            exclusion_statement: Some(Statement {
                value: CodableText::text("None known"),
            }),
            custom_narrative: None,
        };

        let text = BasicNarrativeGenerator.medications_narrative(&aggregate);
        assert_eq!(text, StrucDocText::paragraph("None known"));
    }

    #[test]
    fn test_body_measurements_narrative_skips_missing_quantities() {
        let aggregate = BodyMeasurements {
            body_weight: Some(Measurement {
                id: None,
                quantity: Some(Quantity::new("72.5", Some("kg"))),
                observation_time: None,
            }),
            body_height: Some(Measurement::default()),
            custom_narrative: None,
        };

        let text = BasicNarrativeGenerator.body_measurements_narrative(&aggregate);
        match &text.blocks[0] {
            NarrativeBlock::Table(t) => assert_eq!(t.rows, vec![vec!["Body weight", "72.5 kg", ""]]),
            other => panic!("expected table, got {other:?}"),
        }
    }
}
