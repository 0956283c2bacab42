use cda_model::{
    Component, Entry, EntryRelationship, Participant, ParticipationType, RelationshipType,
};

use super::{applicable_exclusion, resolve_narrative, CdaTransformer};
use crate::helpers;
use crate::model::{AdverseReactions, Reaction, ReactionEvent};
use crate::narrative::NarrativeGenerator;
use crate::terminology::CodeKey;

impl CdaTransformer {
    /// Build the Adverse Reactions section.
    ///
    /// One entry per reaction, in input order. When there are no reactions the exclusion
    /// statement, if any, becomes a single synthetic entry.
    ///
    /// # Arguments
    ///
    /// * `aggregate` - Adverse reactions, or `None` to omit the section.
    /// * `narrative` - Generator used when the aggregate has no custom narrative.
    ///
    /// # Returns
    ///
    /// `None` when `aggregate` is `None`; otherwise the section component.
    pub fn adverse_reactions_component(
        &self,
        aggregate: Option<&AdverseReactions>,
        narrative: &dyn NarrativeGenerator,
    ) -> Option<Component> {
        let aggregate = aggregate?;

        let mut entries: Vec<Entry> = aggregate
            .adverse_substance_reactions
            .iter()
            .flatten()
            .map(|reaction| self.adverse_reaction_entry(reaction))
            .collect();

        if let Some(statement) = applicable_exclusion(
            aggregate.adverse_substance_reactions.as_ref(),
            aggregate.exclusion_statement.as_ref(),
        ) {
            tracing::trace!("adverse reactions: emitting exclusion statement");
            entries.push(self.exclusion_entry(CodeKey::AdverseReactionExclusion, statement));
        }

        let text = resolve_narrative(
            "adverse_reactions",
            aggregate.custom_narrative.as_ref(),
            || narrative.adverse_reactions_narrative(aggregate),
        );

        tracing::debug!(entries = entries.len(), "built adverse reactions section");
        Some(self.section(
            CodeKey::AdverseReactionsSection,
            self.document_type(),
            text,
            entries,
            Vec::new(),
        ))
    }

    fn adverse_reaction_entry(&self, reaction: &Reaction) -> Entry {
        let mut obs = self.identified_observation(CodeKey::AdverseReaction, reaction.id.as_ref());

        if let Some(substance) = reaction.substance_or_agent.as_ref() {
            obs.participants.push(Participant {
                type_code: ParticipationType::Consumable,
                playing_entity_code: helpers::concept_descriptor(substance),
            });
        }

        obs.entry_relationships = helpers::collect_relationships([reaction
            .reaction_event
            .as_ref()
            .and_then(|event| self.reaction_event_relationship(event))]);

        Entry::new(obs)
    }

    /// `None` when the event has neither a reaction type nor any manifestation.
    fn reaction_event_relationship(&self, event: &ReactionEvent) -> Option<EntryRelationship> {
        let reaction_type = helpers::coded_value(event.reaction_type.as_ref());
        let manifestations: Vec<EntryRelationship> = event
            .manifestations
            .iter()
            .flatten()
            .map(|manifestation| {
                let mut obs = self.observation(CodeKey::Manifestation);
                obs.values.extend(helpers::coded_value(Some(manifestation)));
                EntryRelationship::new(RelationshipType::Manifestation, obs)
            })
            .collect();

        if reaction_type.is_none() && manifestations.is_empty() {
            return None;
        }

        let mut obs = self.observation(CodeKey::ReactionEvent);
        obs.values.extend(reaction_type);
        obs.entry_relationships = manifestations;
        Some(EntryRelationship::new(RelationshipType::Cause, obs))
    }
}
