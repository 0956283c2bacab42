use cda_model::{Component, Entry};

use super::{applicable_exclusion, resolve_narrative, CdaTransformer};
use crate::helpers;
use crate::model::{MedicalHistory, MedicalHistoryItem, ProblemDiagnosis, Procedure};
use crate::narrative::NarrativeGenerator;
use crate::terminology::CodeKey;

impl CdaTransformer {
    /// Build the Medical History section.
    ///
    /// Entries are written problems first, then procedures, then uncategorised items, each list in
    /// input order. Problems and procedures each fall back to their own exclusion statement when
    /// their list is absent or empty.
    ///
    /// # Returns
    ///
    /// `None` when `aggregate` is `None`; otherwise the section component.
    pub fn medical_history_component(
        &self,
        aggregate: Option<&MedicalHistory>,
        narrative: &dyn NarrativeGenerator,
    ) -> Option<Component> {
        let aggregate = aggregate?;
        let mut entries = Vec::new();

        entries.extend(
            aggregate
                .problem_diagnoses
                .iter()
                .flatten()
                .map(|problem| self.problem_diagnosis_entry(problem)),
        );
        if let Some(statement) = applicable_exclusion(
            aggregate.problem_diagnoses.as_ref(),
            aggregate.problem_diagnosis_exclusion_statement.as_ref(),
        ) {
            tracing::trace!("medical history: emitting problem/diagnosis exclusion statement");
            entries.push(self.exclusion_entry(CodeKey::ProblemDiagnosisExclusion, statement));
        }

        entries.extend(
            aggregate
                .procedures
                .iter()
                .flatten()
                .map(|procedure| self.procedure_entry(procedure)),
        );
        if let Some(statement) = applicable_exclusion(
            aggregate.procedures.as_ref(),
            aggregate.procedure_exclusion_statement.as_ref(),
        ) {
            tracing::trace!("medical history: emitting procedure exclusion statement");
            entries.push(self.exclusion_entry(CodeKey::ProcedureExclusion, statement));
        }

        entries.extend(
            aggregate
                .medical_history_items
                .iter()
                .flatten()
                .map(|item| self.medical_history_item_entry(item)),
        );

        let text = resolve_narrative("medical_history", aggregate.custom_narrative.as_ref(), || {
            narrative.medical_history_narrative(aggregate)
        });

        tracing::debug!(entries = entries.len(), "built medical history section");
        Some(self.section(
            CodeKey::MedicalHistorySection,
            self.document_type(),
            text,
            entries,
            Vec::new(),
        ))
    }

    fn problem_diagnosis_entry(&self, problem: &ProblemDiagnosis) -> Entry {
        let mut obs = self.identified_observation(CodeKey::ProblemDiagnosis, problem.id.as_ref());
        obs.values.extend(helpers::coded_value(problem.identification.as_ref()));
        obs.effective_time = helpers::bounded_interval(problem.onset_date, problem.remission_date);
        obs.entry_relationships = helpers::collect_relationships([
            self.comment_relationship(CodeKey::ProblemDiagnosisComment, problem.comment.as_deref()),
        ]);
        Entry::new(obs)
    }

    fn procedure_entry(&self, procedure: &Procedure) -> Entry {
        let mut obs = self.identified_observation(CodeKey::Procedure, procedure.id.as_ref());
        obs.values.extend(helpers::coded_value(procedure.procedure.as_ref()));
        obs.effective_time = helpers::point_in_time(procedure.procedure_date_time);
        obs.entry_relationships = helpers::collect_relationships([
            self.comment_relationship(CodeKey::ProcedureComment, procedure.comment.as_deref()),
        ]);
        Entry::new(obs)
    }

    fn medical_history_item_entry(&self, item: &MedicalHistoryItem) -> Entry {
        let mut obs =
            self.identified_observation(CodeKey::UncategorisedMedicalHistoryItem, item.id.as_ref());
        obs.values.extend(helpers::text_value(item.item_description.as_deref()));
        obs.effective_time = item.date_time_interval.as_ref().and_then(helpers::interval);
        obs.entry_relationships = helpers::collect_relationships([
            self.comment_relationship(CodeKey::MedicalHistoryItemComment, item.comment.as_deref()),
        ]);
        Entry::new(obs)
    }
}
