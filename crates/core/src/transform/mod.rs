//! Section/entry builders.
//!
//! [`CdaTransformer`] exposes one distinctly named method per clinical aggregate. Every method
//! takes the aggregate as an `Option` and returns `None` when it is absent, so the document
//! assembler can omit the section entirely. When the aggregate is present a section is always
//! returned, even when it has no entries.
//!
//! Builders are synchronous and hold no state between calls. The only shared collaborator is
//! the identifier generator, which must be safe for concurrent use.

mod adverse_reactions;
mod anatomical_site;
mod diagnostic_investigations;
mod measurements;
mod medical_history;
mod medications;
mod result_group;
mod specimen;

use std::sync::Arc;

use cda_model::{
    Act, Component, ConceptDescriptor, Entry, EntryRelationship, Identifier, Observation,
    RelationshipType, Section, StrucDocText,
};
use cda_types::NonEmptyText;
use cda_uuid::{IdGenerator, RandomIdGenerator};

use crate::config::CoreConfig;
use crate::helpers;
use crate::model::{SourceIdentifier, Statement};
use crate::terminology::{self, CodeKey, DocumentType};

pub use anatomical_site::anatomical_site_descriptor;

/// Maps clinical aggregates to CDA section components.
#[derive(Clone, Debug)]
pub struct CdaTransformer {
    config: CoreConfig,
    ids: Arc<dyn IdGenerator>,
}

impl CdaTransformer {
    /// Create a transformer with an explicit identifier generator.
    ///
    /// # Arguments
    ///
    /// * `config` - Configuration resolved at startup.
    /// * `ids` - Generator for statement identifiers; shared across threads.
    pub fn new(config: CoreConfig, ids: Arc<dyn IdGenerator>) -> Self {
        Self { config, ids }
    }

    /// Create a transformer that generates random (UUID v4) identifiers.
    pub fn with_random_ids(config: CoreConfig) -> Self {
        Self::new(config, Arc::new(RandomIdGenerator))
    }

    pub fn config(&self) -> &CoreConfig {
        &self.config
    }

    fn document_type(&self) -> DocumentType {
        self.config.document_type()
    }

    fn concept(&self, key: CodeKey) -> ConceptDescriptor {
        terminology::concept(key, self.document_type())
    }

    fn identifiers(&self, source: Option<&SourceIdentifier>) -> Vec<Identifier> {
        helpers::identifiers(source, self.ids.as_ref())
    }

    /// Observation with the given code and a fresh identifier.
    fn observation(&self, key: CodeKey) -> Observation {
        self.identified_observation(key, None)
    }

    fn identified_observation(
        &self,
        key: CodeKey,
        source: Option<&SourceIdentifier>,
    ) -> Observation {
        let mut obs = Observation::new(self.concept(key));
        obs.ids = self.identifiers(source);
        obs
    }

    fn section(
        &self,
        key: CodeKey,
        document_type: DocumentType,
        text: StrucDocText,
        entries: Vec<Entry>,
        components: Vec<Component>,
    ) -> Component {
        let row = terminology::lookup(key, document_type);
        Component {
            section: Section {
                id: Identifier::from_guid(self.ids.next_guid()),
                code: row.concept(),
                title: row.title(),
                text,
                entries,
                components,
            },
        }
    }

    /// COMP act holding free text, or `None` when the text is blank.
    fn comment_relationship(&self, key: CodeKey, text: Option<&str>) -> Option<EntryRelationship> {
        let text = NonEmptyText::from_optional(text)?;
        let mut act = Act::new(self.concept(key));
        act.ids = self.identifiers(None);
        act.text = Some(text.into_string());
        Some(EntryRelationship::new(RelationshipType::Component, act))
    }

    /// The synthetic "none known" entry for a concern.
    fn exclusion_entry(&self, key: CodeKey, statement: &Statement) -> Entry {
        let mut obs = self.observation(key);
        obs.values.extend(helpers::coded_value(Some(&statement.value)));
        Entry::new(obs)
    }
}

/// Returns the exclusion statement only when the finding list is absent or empty.
fn applicable_exclusion<'a, T>(
    findings: Option<&Vec<T>>,
    statement: Option<&'a Statement>,
) -> Option<&'a Statement> {
    let has_findings = findings.is_some_and(|f| !f.is_empty());
    if has_findings {
        None
    } else {
        statement
    }
}

/// A caller-supplied narrative always wins; the generator runs only without one.
fn resolve_narrative(
    section: &'static str,
    custom: Option<&StrucDocText>,
    generate: impl FnOnce() -> StrucDocText,
) -> StrucDocText {
    match custom {
        Some(text) => {
            tracing::trace!(section, "using custom narrative");
            text.clone()
        }
        None => {
            tracing::trace!(section, "generating narrative");
            generate()
        }
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use cda_model::ClinicalStatement;
    use cda_uuid::SequentialIdGenerator;

    pub fn transformer() -> CdaTransformer {
        CdaTransformer::new(CoreConfig::default(), Arc::new(SequentialIdGenerator::new()))
    }

    pub fn observation(statement: &ClinicalStatement) -> &Observation {
        statement.as_observation().expect("observation")
    }

    /// Original text of an observation's first coded value.
    pub fn value_text(obs: &Observation) -> Option<String> {
        match obs.values.first() {
            Some(cda_model::AnyValue::Coded(cd)) => cd.original_text.clone(),
            Some(cda_model::AnyValue::Text(t)) => Some(t.clone()),
            _ => None,
        }
    }
}
