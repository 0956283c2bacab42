//! Primitive conversions shared by every builder.
//!
//! Concept descriptors, identifiers, timestamps, quantities and the optional-relationship
//! accumulator. Nothing here knows about clinical sections.

use cda_model::{
    AnyValue, ConceptDescriptor, EffectiveTime, EntryRelationship, Identifier, Interval,
    PhysicalQuantity, QuantityInterval,
};
use cda_types::NonEmptyText;
use cda_uuid::IdGenerator;

use crate::model::{CdaDateTime, CdaInterval, CodableText, Quantity, QuantityRange, SourceIdentifier};

/// Trimmed text, or `None` when absent or blank.
pub fn non_blank(text: Option<&str>) -> Option<&str> {
    text.map(str::trim).filter(|t| !t.is_empty())
}

fn owned(text: &Option<String>) -> Option<String> {
    NonEmptyText::from_optional(text.as_deref()).map(NonEmptyText::into_string)
}

/// Converts caller-supplied coded text to a concept descriptor.
///
/// Blank fields are dropped. Translations convert recursively; a translation that ends up
/// empty is skipped.
pub fn concept_descriptor(text: &CodableText) -> ConceptDescriptor {
    ConceptDescriptor {
        code: owned(&text.code),
        code_system: owned(&text.code_system),
        code_system_name: owned(&text.code_system_name),
        code_system_version: owned(&text.code_system_version),
        display_name: owned(&text.display_name),
        original_text: owned(&text.original_text),
        qualifiers: Vec::new(),
        translations: text
            .translations
            .iter()
            .flatten()
            .map(concept_descriptor)
            .filter(|cd| !cd.is_empty())
            .collect(),
    }
}

/// Coded value for an observation, or `None` when the text carries nothing.
pub fn coded_value(text: Option<&CodableText>) -> Option<AnyValue> {
    text.map(concept_descriptor)
        .filter(|cd| !cd.is_empty())
        .map(AnyValue::Coded)
}

/// String value for an observation, or `None` when blank.
pub fn text_value(text: Option<&str>) -> Option<AnyValue> {
    NonEmptyText::from_optional(text).map(|t| AnyValue::Text(t.into_string()))
}

/// The single identifier of a clinical statement.
///
/// A source identifier replaces the generated one; the generator is not consulted in that case.
pub fn identifiers(source: Option<&SourceIdentifier>, ids: &dyn IdGenerator) -> Vec<Identifier> {
    let id = match source {
        Some(s) => Identifier::new(s.root.clone(), owned(&s.extension)),
        None => Identifier::from_guid(ids.next_guid()),
    };
    vec![id]
}

pub fn point_in_time(value: Option<CdaDateTime>) -> Option<EffectiveTime> {
    value.map(|v| EffectiveTime::Timestamp(v.to_timestamp()))
}

/// `IVL_TS` with the given bounds, or `None` when both are absent.
pub fn bounded_interval(
    low: Option<CdaDateTime>,
    high: Option<CdaDateTime>,
) -> Option<EffectiveTime> {
    if low.is_none() && high.is_none() {
        return None;
    }
    Some(EffectiveTime::Interval(Interval {
        value: None,
        low: low.map(CdaDateTime::to_timestamp),
        high: high.map(CdaDateTime::to_timestamp),
        width: None,
    }))
}

pub fn interval(source: &CdaInterval) -> Option<EffectiveTime> {
    let interval = Interval {
        value: None,
        low: source.low.map(CdaDateTime::to_timestamp),
        high: source.high.map(CdaDateTime::to_timestamp),
        width: source.width.as_ref().and_then(physical_quantity),
    };
    (!interval.is_empty()).then_some(EffectiveTime::Interval(interval))
}

/// `PQ` for a quantity, or `None` when its value is blank.
pub fn physical_quantity(q: &Quantity) -> Option<PhysicalQuantity> {
    let value = NonEmptyText::from_optional(Some(q.value.as_str()))?;
    Some(PhysicalQuantity {
        value: value.into_string(),
        unit: owned(&q.units),
    })
}

/// `IVL_PQ` for a range, or `None` when neither bound carries a value.
pub fn quantity_interval(range: &QuantityRange) -> Option<QuantityInterval> {
    let interval = QuantityInterval {
        low: range.low.as_ref().and_then(physical_quantity),
        high: range.high.as_ref().and_then(physical_quantity),
    };
    (interval.low.is_some() || interval.high.is_some()).then_some(interval)
}

/// Keeps the relationships that were actually built, in order.
pub fn collect_relationships<I>(candidates: I) -> Vec<EntryRelationship>
where
    I: IntoIterator<Item = Option<EntryRelationship>>,
{
    candidates.into_iter().flatten().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use cda_model::{Observation, RelationshipType};
    use cda_uuid::SequentialIdGenerator;

    #[test]
    fn test_concept_descriptor_drops_blank_fields_and_empty_translations() {
        let text = CodableText {
            code: Some("195967001".into()),
            code_system: Some("2.16.840.1.113883.6.96".into()),
            display_name: Some("Asthma".into()),
            original_text: Some("  ".into()),
            translations: Some(vec![CodableText::default(), CodableText::text("asthma")]),
            ..CodableText::default()
        };

        let cd = concept_descriptor(&text);
        assert_eq!(cd.code.as_deref(), Some("195967001"));
        assert_eq!(cd.original_text, None);
        assert_eq!(cd.translations, vec![ConceptDescriptor::original_text_only("asthma")]);
    }

    #[test]
    fn test_coded_value_is_none_for_empty_text() {
        assert_eq!(coded_value(None), None);
        assert_eq!(coded_value(Some(&CodableText::default())), None);
        assert!(coded_value(Some(&CodableText::text("Rash"))).is_some());
    }

    #[test]
    fn test_text_value_trims_and_drops_blank() {
        assert_eq!(text_value(Some("  ")), None);
        assert_eq!(text_value(Some(" Nil ")), Some(AnyValue::Text("Nil".into())));
    }

    #[test]
    fn test_quantity_interval_needs_a_valued_bound() {
        assert_eq!(quantity_interval(&QuantityRange::default()), None);

        let blank_bounds = QuantityRange {
            low: Some(Quantity::new(" ", Some("mmol/L"))),
            high: None,
        };
        assert_eq!(quantity_interval(&blank_bounds), None);

        let upper_only = QuantityRange {
            low: None,
            high: Some(Quantity::new("6.5", Some("mmol/L"))),
        };
        let interval = quantity_interval(&upper_only).expect("interval");
        assert_eq!(interval.low, None);
        assert_eq!(interval.high.map(|q| q.value).as_deref(), Some("6.5"));
    }

    #[test]
    fn test_identifiers_prefers_source_identifier() {
        let ids = SequentialIdGenerator::new();
        let source = SourceIdentifier {
            root: "1.2.36.1.2001.1005.41".into(),
            extension: Some("ABC-1".into()),
        };

        let from_source = identifiers(Some(&source), &ids);
        assert_eq!(
            from_source,
            vec![Identifier::new("1.2.36.1.2001.1005.41", Some("ABC-1".into()))]
        );

        let generated = identifiers(None, &ids);
        assert_eq!(generated.len(), 1);
        assert_eq!(generated[0].root, "00000000-0000-0000-0000-000000000001");
    }

    #[test]
    fn test_bounded_interval_requires_a_bound() {
        assert_eq!(bounded_interval(None, None), None);

        let low = "2020-01-02".parse().map(CdaDateTime::Date).expect("date");
        match bounded_interval(Some(low), None) {
            Some(EffectiveTime::Interval(i)) => {
                assert_eq!(i.low.as_ref().map(|t| t.as_str()), Some("20200102"));
                assert_eq!(i.high, None);
            }
            other => panic!("expected interval, got {other:?}"),
        }
    }

    #[test]
    fn test_collect_relationships_filters_absent_and_keeps_order() {
        let make = |code: &str| {
            Some(EntryRelationship::new(
                RelationshipType::Component,
                Observation::new(ConceptDescriptor::original_text_only(code)),
            ))
        };
        let built = collect_relationships([make("a"), None, make("b")]);

        let codes: Vec<_> = built
            .iter()
            .map(|r| {
                r.statement
                    .as_observation()
                    .and_then(|o| o.code.original_text.clone())
                    .expect("observation")
            })
            .collect();
        assert_eq!(codes, vec!["a", "b"]);
    }
}
