use cda_model::{AnyValue, Component, Entry};

use super::{resolve_narrative, CdaTransformer};
use crate::helpers;
use crate::model::{BodyMeasurements, Measurement};
use crate::narrative::NarrativeGenerator;
use crate::terminology::CodeKey;

impl CdaTransformer {
    /// Build the vital signs section holding body weight and body height.
    ///
    /// Weight is written before height. A measurement without a quantity value is skipped.
    ///
    /// # Returns
    ///
    /// `None` when `aggregate` is `None`; otherwise the section component.
    pub fn body_measurements_component(
        &self,
        aggregate: Option<&BodyMeasurements>,
        narrative: &dyn NarrativeGenerator,
    ) -> Option<Component> {
        let aggregate = aggregate?;

        let entries: Vec<Entry> = [
            (CodeKey::BodyWeight, aggregate.body_weight.as_ref()),
            (CodeKey::BodyHeight, aggregate.body_height.as_ref()),
        ]
        .into_iter()
        .filter_map(|(key, measurement)| self.measurement_entry(key, measurement?))
        .collect();

        let text = resolve_narrative("body_measurements", aggregate.custom_narrative.as_ref(), || {
            narrative.body_measurements_narrative(aggregate)
        });

        tracing::debug!(entries = entries.len(), "built body measurements section");
        Some(self.section(
            CodeKey::VitalSignsSection,
            self.document_type(),
            text,
            entries,
            Vec::new(),
        ))
    }

    fn measurement_entry(&self, key: CodeKey, measurement: &Measurement) -> Option<Entry> {
        let Some(quantity) = measurement
            .quantity
            .as_ref()
            .and_then(helpers::physical_quantity)
        else {
            tracing::trace!(?key, "measurement has no quantity value; skipping");
            return None;
        };
        let mut obs = self.identified_observation(key, measurement.id.as_ref());
        obs.effective_time = helpers::point_in_time(measurement.observation_time);
        obs.values.push(AnyValue::Quantity(quantity));
        Some(Entry::new(obs))
    }
}
