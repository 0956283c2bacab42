//! GUID and identifier-generation utilities.
//!
//! Every clinical statement emitted by the CDA builders carries an `id`. When the caller does
//! not supply a source identifier, the builders allocate a fresh GUID through an
//! [`IdGenerator`].
//!
//! GUIDs render as `8-4-4-4-12` upper-case hexadecimal groups, e.g.
//! `550E8400-E29B-41D4-A716-446655440000`, since HL7 v3 expects upper-case UUID roots.
//!
//! ## Generators
//! - [`RandomIdGenerator`] allocates RFC 4122 version 4 GUIDs. This is what documents use.
//! - [`SequentialIdGenerator`] hands out predictable GUIDs from an atomic counter. Two builds of
//!   the same input with fresh sequential generators produce identical trees, which is what
//!   structural-equality tests rely on.
//!
//! Both generators are `Send + Sync`; a single instance may be shared by concurrent document
//! builds.

mod service;

pub use service::{Guid, IdGenerator, RandomIdGenerator, SequentialIdGenerator};
