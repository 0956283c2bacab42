use cda_model::{
    ActMood, Component, Consumable, Entry, EntryRelationship, RelationshipType,
    SubstanceAdministration,
};

use cda_types::NonEmptyText;

use super::{applicable_exclusion, resolve_narrative, CdaTransformer};
use crate::helpers;
use crate::model::{MedicationItem, Medications};
use crate::narrative::NarrativeGenerator;
use crate::terminology::{CodeKey, DocumentType, CEASED_CHANGE_TYPE_CODE};

impl CdaTransformer {
    /// Build the medications section for the given document variant.
    ///
    /// Discharge summaries use the "Current Medications On Discharge" section code; other
    /// documents use "Medications". Structure is identical across variants.
    ///
    /// # Arguments
    ///
    /// * `aggregate` - Medications, or `None` to omit the section.
    /// * `narrative` - Generator used when the aggregate has no custom narrative.
    /// * `document_type` - Selects the section code.
    ///
    /// # Returns
    ///
    /// `None` when `aggregate` is `None`; otherwise the section component.
    pub fn medications_component(
        &self,
        aggregate: Option<&Medications>,
        narrative: &dyn NarrativeGenerator,
        document_type: DocumentType,
    ) -> Option<Component> {
        let aggregate = aggregate?;

        let mut entries: Vec<Entry> = aggregate
            .medications
            .iter()
            .flatten()
            .map(|item| Entry::new(self.medication_administration(item)))
            .collect();

        if let Some(statement) = applicable_exclusion(
            aggregate.medications.as_ref(),
            aggregate.exclusion_statement.as_ref(),
        ) {
            tracing::trace!("medications: emitting exclusion statement");
            entries.push(self.exclusion_entry(CodeKey::MedicationExclusion, statement));
        }

        let text = resolve_narrative("medications", aggregate.custom_narrative.as_ref(), || {
            narrative.medications_narrative(aggregate)
        });

        tracing::debug!(
            entries = entries.len(),
            document_type = %document_type,
            "built medications section"
        );
        Some(self.section(
            CodeKey::MedicationsSection,
            document_type,
            text,
            entries,
            Vec::new(),
        ))
    }

    fn medication_administration(&self, item: &MedicationItem) -> SubstanceAdministration {
        let entry_relationships = helpers::collect_relationships([
            self.clinical_indication_relationship(item),
            self.comment_relationship(CodeKey::MedicationComment, item.comment.as_deref()),
            self.change_type_relationship(item),
        ]);

        SubstanceAdministration {
            mood_code: ActMood::Event,
            ids: self.identifiers(item.id.as_ref()),
            negation_ind: medication_negation(item),
            text: NonEmptyText::from_optional(item.directions.as_deref())
                .map(NonEmptyText::into_string),
            consumable: Consumable {
                manufactured_material: item
                    .medicine
                    .as_ref()
                    .map(helpers::concept_descriptor)
                    .unwrap_or_default(),
            },
            entry_relationships,
        }
    }

    fn clinical_indication_relationship(&self, item: &MedicationItem) -> Option<EntryRelationship> {
        let value = helpers::text_value(item.clinical_indication.as_deref())?;
        let mut obs = self.observation(CodeKey::ClinicalIndication);
        obs.values.push(value);
        Some(EntryRelationship::new(RelationshipType::Reason, obs))
    }

    /// Change type with change status and change reason nested beneath it.
    ///
    /// Built when any of the three is present; the change-type value itself is only written
    /// when a change type was supplied. An item with none of them gets no change-type
    /// observation at all, rather than an empty one.
    fn change_type_relationship(&self, item: &MedicationItem) -> Option<EntryRelationship> {
        let change_type = helpers::coded_value(item.change_type.as_ref());

        let status = helpers::coded_value(item.change_status.as_ref()).map(|value| {
            let mut obs = self.observation(CodeKey::ChangeStatus);
            obs.values.push(value);
            EntryRelationship::new(RelationshipType::Refers, obs)
        });
        let reason = helpers::text_value(item.change_reason.as_deref()).map(|value| {
            let mut obs = self.observation(CodeKey::ChangeReason);
            obs.values.push(value);
            EntryRelationship::new(RelationshipType::Reason, obs)
        });
        let nested = helpers::collect_relationships([status, reason]);

        if change_type.is_none() && nested.is_empty() {
            return None;
        }

        let mut obs = self.observation(CodeKey::ChangeType);
        obs.values.extend(change_type);
        obs.entry_relationships = nested;
        Some(EntryRelationship::new(RelationshipType::Component, obs))
    }
}

/// `Some(true)` only for a ceased medicine; absent otherwise.
///
/// The change-type code must equal the ceased code exactly. Padded codes do not match.
fn medication_negation(item: &MedicationItem) -> Option<bool> {
    let ceased = item
        .change_type
        .as_ref()
        .is_some_and(|t| t.code.as_deref() == Some(CEASED_CHANGE_TYPE_CODE));
    ceased.then_some(true)
}
