use cda_model::{
    AnyValue, EffectiveTime, EntryRelationship, Identifier, Interval, Observation,
    RelationshipType, Specimen, SpecimenPlayingEntity,
};

use super::CdaTransformer;
use crate::helpers;
use crate::model::{CdaDateTime, SourceIdentifier, SpecimenDetail};
use crate::terminology::CodeKey;

impl CdaTransformer {
    /// Observation describing a specimen, or `None` when the detail carries nothing.
    ///
    /// Collection time is written as a point interval (`IVL_TS` with `@value`).
    pub(super) fn specimen_observation(&self, detail: &SpecimenDetail) -> Option<Observation> {
        let method = detail
            .collection_procedure
            .as_ref()
            .map(helpers::concept_descriptor)
            .filter(|cd| !cd.is_empty());
        let target_sites: Vec<_> = detail
            .anatomical_sites
            .iter()
            .flatten()
            .filter_map(|site| self.anatomical_site(site))
            .collect();
        let specimen = specimen_node(detail);
        let received = detail.date_time_received;

        if method.is_none()
            && detail.collection_date_time.is_none()
            && target_sites.is_empty()
            && specimen.is_none()
            && received.is_none()
        {
            tracing::trace!("specimen detail is empty; skipping");
            return None;
        }

        let mut obs = self.observation(CodeKey::Specimen);
        obs.method_codes.extend(method);
        obs.effective_time = detail
            .collection_date_time
            .map(|t| EffectiveTime::Interval(Interval::point(t.to_timestamp())));
        obs.target_site_codes = target_sites;
        obs.specimens.extend(specimen);
        obs.entry_relationships =
            helpers::collect_relationships([received.map(|t| self.date_time_received(t))]);

        Some(obs)
    }

    fn date_time_received(&self, received: CdaDateTime) -> EntryRelationship {
        let mut obs = self.observation(CodeKey::DateTimeReceived);
        obs.values.push(AnyValue::Timestamp(received.to_timestamp()));
        EntryRelationship::new(RelationshipType::Subject, obs)
    }
}

fn source_identifier(source: Option<&SourceIdentifier>) -> Option<Identifier> {
    source.map(|s| {
        Identifier::new(
            s.root.clone(),
            helpers::non_blank(s.extension.as_deref()).map(str::to_string),
        )
    })
}

/// The `specimen` node, emitted only when the detail identifies or describes the specimen itself.
fn specimen_node(detail: &SpecimenDetail) -> Option<Specimen> {
    let tissue_type = detail
        .tissue_type
        .as_ref()
        .map(helpers::concept_descriptor)
        .filter(|cd| !cd.is_empty());
    let details = detail.physical_details.as_deref().unwrap_or_default();
    let quantities: Vec<_> = details
        .iter()
        .flat_map(|d| [d.weight.as_ref(), d.volume.as_ref()])
        .flatten()
        .filter_map(helpers::physical_quantity)
        .collect();
    let desc = helpers::non_blank(detail.physical_description.as_deref())
        .map(str::to_string)
        .or_else(|| {
            let parts: Vec<_> = details
                .iter()
                .filter_map(|d| helpers::non_blank(d.description.as_deref()))
                .collect();
            (!parts.is_empty()).then(|| parts.join("; "))
        });

    let ids: Vec<_> = source_identifier(detail.specimen_identifier.as_ref())
        .into_iter()
        .collect();
    let parent_id = source_identifier(detail.parent_specimen_identifier.as_ref());
    let container_id = source_identifier(detail.container_identifier.as_ref());

    let described = tissue_type.is_some() || desc.is_some() || !details.is_empty();
    if ids.is_empty() && parent_id.is_none() && container_id.is_none() && !described {
        return None;
    }

    let playing_entity = described.then(|| SpecimenPlayingEntity {
        code: tissue_type,
        quantities,
        desc,
    });

    Some(Specimen {
        ids,
        playing_entity,
        parent_id,
        container_id,
    })
}
