//! # CDA Core
//!
//! Builds HL7 CDA sections and entries from clinical aggregates.
//!
//! Each clinical concern (adverse reactions, medications, medical history, diagnostic
//! investigations, body measurements) has its own builder on [`CdaTransformer`]. Builders are
//! pure: an absent aggregate yields no section, and a present one always yields a section whose
//! code and title come from the static terminology table in [`terminology`].
//!
//! **No document assembly**: headers, authors and the `ClinicalDocument` wrapper belong to the
//! caller. This crate stops at the `component` element.

pub mod config;
mod error;
pub mod helpers;
pub mod input;
pub mod model;
pub mod narrative;
pub mod terminology;
pub mod transform;

pub use config::CoreConfig;
pub use error::{CoreError, CoreResult};
pub use input::{InputFormat, OutputFormat, SectionKind};
pub use narrative::{BasicNarrativeGenerator, NarrativeGenerator};
pub use terminology::DocumentType;
pub use transform::CdaTransformer;
