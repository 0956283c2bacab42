use cda_model::{
    AnyValue, ConceptDescriptor, EntryRelationship, Observation, Qualifier, RelationshipType,
};

use super::CdaTransformer;
use crate::helpers;
use crate::model::AnatomicalSite;
use crate::terminology::{self, CodeKey, DocumentType};

/// Concept descriptor for a body location.
///
/// The named location becomes the primary code, the side becomes a "with laterality" qualifier
/// and the free-text description becomes original text. Each part is optional and applied
/// independently.
///
/// # Returns
///
/// `None` when the site carries none of the three.
pub fn anatomical_site_descriptor(
    site: &AnatomicalSite,
    document_type: DocumentType,
) -> Option<ConceptDescriptor> {
    let mut cd = site
        .name_of_location
        .as_ref()
        .map(helpers::concept_descriptor)
        .unwrap_or_default();

    if let Some(side) = site
        .side
        .as_ref()
        .map(helpers::concept_descriptor)
        .filter(|side| !side.is_empty())
    {
        cd.qualifiers.push(Qualifier {
            name: terminology::concept(CodeKey::Laterality, document_type),
            value: side,
        });
    }

    if let Some(description) = helpers::non_blank(site.description.as_deref()) {
        cd.original_text = Some(description.to_string());
    }

    (!cd.is_empty()).then_some(cd)
}

impl CdaTransformer {
    pub(super) fn anatomical_site(&self, site: &AnatomicalSite) -> Option<ConceptDescriptor> {
        anatomical_site_descriptor(site, self.document_type())
    }

    /// Anatomical Site observation carrying the site as its value.
    pub(super) fn anatomical_site_observation(&self, site: &AnatomicalSite) -> Option<Observation> {
        let cd = self.anatomical_site(site)?;
        let mut obs = self.observation(CodeKey::AnatomicalSite);
        obs.values.push(AnyValue::Coded(cd));
        Some(obs)
    }

    pub(super) fn anatomical_site_relationship(
        &self,
        site: &AnatomicalSite,
    ) -> Option<EntryRelationship> {
        self.anatomical_site_observation(site)
            .map(|obs| EntryRelationship::new(RelationshipType::Subject, obs))
    }
}
