//! CDA output model.
//!
//! This crate defines the document-object tree the section builders emit: `Component` →
//! `Section` → `Entry` → clinical statements (`Observation`, `Act`, `SubstanceAdministration`,
//! `Organizer`) and their nested `EntryRelationship`s, together with the HL7 data types those
//! nodes carry and a writer that serialises a tree as a CDA XML fragment.
//!
//! Clinical meaning (which codes go where) lives in `cda-core`. This crate handles structure
//! and wire format only.

pub mod constants;
pub mod data_types;
pub mod document;
pub mod narrative;
pub mod xml;

use thiserror::Error;

pub use constants::CodingSystem;
pub use data_types::{
    AnyValue, ConceptDescriptor, EffectiveTime, Identifier, Interval, PhysicalQuantity,
    Qualifier, QuantityInterval, Timestamp,
};
pub use document::{
    Act, ActClass, ActMood, ClinicalStatement, Component, Consumable, Entry, EntryRelationship,
    Observation, Organizer, Participant, ParticipationType, ReferenceRange, RelationshipType,
    Section, Specimen, SpecimenPlayingEntity, SubstanceAdministration,
};
pub use narrative::{NarrativeBlock, StrucDocTable, StrucDocText};

/// Errors returned by the `cda-model` crate.
#[derive(Debug, Error)]
pub enum CdaError {
    #[error("failed to write XML: {0}")]
    XmlWrite(String),

    #[error("rendered XML is not valid UTF-8")]
    InvalidText,
}

/// Result type for CDA model operations.
pub type CdaResult<T> = Result<T, CdaError>;

/// Render a section component as an indented CDA XML fragment.
pub fn write_component_xml(component: &Component) -> CdaResult<String> {
    xml::component_to_xml(component)
}
