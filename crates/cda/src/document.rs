//! CDA document-object tree.
//!
//! Every node is owned by its parent: the output is a strict tree with no shared sub-nodes.
//! Optional elements are `Option`/`Vec` so that absent content is simply not written; the
//! builders never create placeholder nodes.

use crate::data_types::{AnyValue, ConceptDescriptor, EffectiveTime, Identifier, PhysicalQuantity};
use crate::narrative::StrucDocText;
use cda_types::NonEmptyText;
use serde::Serialize;

/// `@classCode` of an act.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum ActClass {
    #[serde(rename = "OBS")]
    Observation,
    #[serde(rename = "ACT")]
    Act,
    #[serde(rename = "SBADM")]
    SubstanceAdministration,
    #[serde(rename = "BATTERY")]
    Battery,
}

impl ActClass {
    pub fn as_str(self) -> &'static str {
        match self {
            ActClass::Observation => "OBS",
            ActClass::Act => "ACT",
            ActClass::SubstanceAdministration => "SBADM",
            ActClass::Battery => "BATTERY",
        }
    }
}

/// `@moodCode` of an act.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum ActMood {
    #[serde(rename = "EVN")]
    Event,
}

impl ActMood {
    pub fn as_str(self) -> &'static str {
        match self {
            ActMood::Event => "EVN",
        }
    }
}

/// `@typeCode` of an `entryRelationship`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum RelationshipType {
    #[serde(rename = "CAUS")]
    Cause,
    #[serde(rename = "MFST")]
    Manifestation,
    #[serde(rename = "RSON")]
    Reason,
    #[serde(rename = "COMP")]
    Component,
    #[serde(rename = "SUBJ")]
    Subject,
    #[serde(rename = "REFR")]
    Refers,
}

impl RelationshipType {
    pub fn as_str(self) -> &'static str {
        match self {
            RelationshipType::Cause => "CAUS",
            RelationshipType::Manifestation => "MFST",
            RelationshipType::Reason => "RSON",
            RelationshipType::Component => "COMP",
            RelationshipType::Subject => "SUBJ",
            RelationshipType::Refers => "REFR",
        }
    }
}

/// `@typeCode` of a `participant`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum ParticipationType {
    #[serde(rename = "CSM")]
    Consumable,
}

impl ParticipationType {
    pub fn as_str(self) -> &'static str {
        match self {
            ParticipationType::Consumable => "CSM",
        }
    }
}

/// Top-level wrapper the document assembler merges into `structuredBody`.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Component {
    pub section: Section,
}

/// A document section.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Section {
    pub id: Identifier,
    pub code: ConceptDescriptor,
    pub title: NonEmptyText,
    pub text: StrucDocText,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub entries: Vec<Entry>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub components: Vec<Component>,
}

/// A structured entry holding exactly one clinical statement.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Entry {
    pub statement: ClinicalStatement,
}

impl Entry {
    pub fn new(statement: impl Into<ClinicalStatement>) -> Self {
        Self {
            statement: statement.into(),
        }
    }
}

/// The four statement kinds an entry or entry relationship may carry.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ClinicalStatement {
    Observation(Box<Observation>),
    Act(Box<Act>),
    SubstanceAdministration(Box<SubstanceAdministration>),
    Organizer(Box<Organizer>),
}

impl ClinicalStatement {
    /// Identifiers of the wrapped statement.
    pub fn ids(&self) -> &[Identifier] {
        match self {
            ClinicalStatement::Observation(o) => &o.ids,
            ClinicalStatement::Act(a) => &a.ids,
            ClinicalStatement::SubstanceAdministration(s) => &s.ids,
            ClinicalStatement::Organizer(o) => &o.ids,
        }
    }

    pub fn as_observation(&self) -> Option<&Observation> {
        match self {
            ClinicalStatement::Observation(o) => Some(o),
            _ => None,
        }
    }

    pub fn as_act(&self) -> Option<&Act> {
        match self {
            ClinicalStatement::Act(a) => Some(a),
            _ => None,
        }
    }

    pub fn as_substance_administration(&self) -> Option<&SubstanceAdministration> {
        match self {
            ClinicalStatement::SubstanceAdministration(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_organizer(&self) -> Option<&Organizer> {
        match self {
            ClinicalStatement::Organizer(o) => Some(o),
            _ => None,
        }
    }
}

impl From<Observation> for ClinicalStatement {
    fn from(value: Observation) -> Self {
        ClinicalStatement::Observation(Box::new(value))
    }
}

impl From<Act> for ClinicalStatement {
    fn from(value: Act) -> Self {
        ClinicalStatement::Act(Box::new(value))
    }
}

impl From<SubstanceAdministration> for ClinicalStatement {
    fn from(value: SubstanceAdministration) -> Self {
        ClinicalStatement::SubstanceAdministration(Box::new(value))
    }
}

impl From<Organizer> for ClinicalStatement {
    fn from(value: Organizer) -> Self {
        ClinicalStatement::Organizer(Box::new(value))
    }
}

/// Nested clinical statement.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct EntryRelationship {
    pub type_code: RelationshipType,
    pub statement: ClinicalStatement,
}

impl EntryRelationship {
    pub fn new(type_code: RelationshipType, statement: impl Into<ClinicalStatement>) -> Self {
        Self {
            type_code,
            statement: statement.into(),
        }
    }
}

/// `observation` (class OBS).
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Observation {
    pub mood_code: ActMood,
    pub ids: Vec<Identifier>,
    pub code: ConceptDescriptor,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub effective_time: Option<EffectiveTime>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub values: Vec<AnyValue>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub interpretation_codes: Vec<ConceptDescriptor>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub method_codes: Vec<ConceptDescriptor>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub target_site_codes: Vec<ConceptDescriptor>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub specimens: Vec<Specimen>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub participants: Vec<Participant>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub entry_relationships: Vec<EntryRelationship>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub reference_ranges: Vec<ReferenceRange>,
}

impl Observation {
    /// An event-mood observation with the given code and nothing else.
    pub fn new(code: ConceptDescriptor) -> Self {
        Self {
            mood_code: ActMood::Event,
            ids: Vec::new(),
            code,
            effective_time: None,
            values: Vec::new(),
            interpretation_codes: Vec::new(),
            method_codes: Vec::new(),
            target_site_codes: Vec::new(),
            specimens: Vec::new(),
            participants: Vec::new(),
            entry_relationships: Vec::new(),
            reference_ranges: Vec::new(),
        }
    }
}

/// `act` (class ACT).
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Act {
    pub mood_code: ActMood,
    pub ids: Vec<Identifier>,
    pub code: ConceptDescriptor,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

impl Act {
    pub fn new(code: ConceptDescriptor) -> Self {
        Self {
            mood_code: ActMood::Event,
            ids: Vec::new(),
            code,
            text: None,
        }
    }
}

/// `substanceAdministration` (class SBADM).
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SubstanceAdministration {
    pub mood_code: ActMood,
    pub ids: Vec<Identifier>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub negation_ind: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    pub consumable: Consumable,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub entry_relationships: Vec<EntryRelationship>,
}

/// `consumable/manufacturedProduct/manufacturedMaterial`.
///
/// CDA requires a consumable on every substance administration; a medication without a medicine
/// code is written with an empty descriptor (`nullFlavor="NI"`).
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct Consumable {
    pub manufactured_material: ConceptDescriptor,
}

/// `organizer` (class BATTERY).
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Organizer {
    pub class_code: ActClass,
    pub mood_code: ActMood,
    pub ids: Vec<Identifier>,
    pub code: ConceptDescriptor,
    pub status_code: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub components: Vec<ClinicalStatement>,
}

/// `participant` carrying a coded playing entity.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Participant {
    pub type_code: ParticipationType,
    pub playing_entity_code: ConceptDescriptor,
}

/// `referenceRange/observationRange`.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ReferenceRange {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meaning: Option<ConceptDescriptor>,
    pub value: AnyValue,
}

/// `specimen/specimenRole`.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct Specimen {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub ids: Vec<Identifier>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub playing_entity: Option<SpecimenPlayingEntity>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<Identifier>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub container_id: Option<Identifier>,
}

/// `specimenPlayingEntity`: what the specimen physically is.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct SpecimenPlayingEntity {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<ConceptDescriptor>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub quantities: Vec<PhysicalQuantity>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub desc: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::CodingSystem;

    #[test]
    fn test_statement_accessors_match_variant() {
        let statement: ClinicalStatement = Observation::new(ConceptDescriptor::coded(
            "102.16510",
            CodingSystem::Nctis,
            "Adverse Reaction",
        ))
        .into();

        assert!(statement.as_observation().is_some());
        assert!(statement.as_act().is_none());
        assert!(statement.as_organizer().is_none());
        assert!(statement.ids().is_empty());
    }

    #[test]
    fn test_serializes_without_empty_collections() {
        let obs = Observation::new(ConceptDescriptor::coded(
            "102.16518",
            CodingSystem::Nctis,
            "Manifestation",
        ));
        let json = serde_json::to_value(&obs).expect("serialize");

        assert_eq!(json["mood_code"], "EVN");
        assert!(json.get("values").is_none());
        assert!(json.get("entry_relationships").is_none());
    }
}
