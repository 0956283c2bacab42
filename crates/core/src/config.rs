//! Core runtime configuration.
//!
//! Configuration is resolved once at process startup and then passed into the transformer.
//! Builders never read process-wide environment variables themselves, so two documents built
//! concurrently always see the same settings.

use crate::terminology::DocumentType;
use crate::CoreResult;

/// Core configuration resolved at startup.
#[derive(Clone, Debug)]
pub struct CoreConfig {
    document_type: DocumentType,
}

impl CoreConfig {
    /// Create a new `CoreConfig`.
    ///
    /// # Arguments
    ///
    /// * `document_type` - Document variant used for code lookups when a builder is not given
    ///   one explicitly.
    pub fn new(document_type: DocumentType) -> Self {
        Self { document_type }
    }

    pub fn document_type(&self) -> DocumentType {
        self.document_type
    }
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self::new(DocumentType::default())
    }
}

/// Resolve the document type from an optional environment value.
///
/// Blank or missing values fall back to [`DocumentType::default`]. Values are matched
/// case-insensitively against the kebab-case names (`discharge-summary`, `specialist-letter`,
/// `shared-health-summary`).
///
/// # Errors
///
/// Returns [`crate::CoreError::UnknownDocumentType`] if the value is present but not recognised.
pub fn document_type_from_env_value(value: Option<String>) -> CoreResult<DocumentType> {
    let value = value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty());
    let parsed = value.map(|v| v.parse::<DocumentType>()).transpose()?;

    Ok(parsed.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::CoreError;

    #[test]
    fn test_document_type_from_env_value_defaults_when_missing_or_blank() {
        assert_eq!(
            document_type_from_env_value(None).expect("default"),
            DocumentType::SpecialistLetter
        );
        assert_eq!(
            document_type_from_env_value(Some("   ".into())).expect("default"),
            DocumentType::SpecialistLetter
        );
    }

    #[test]
    fn test_document_type_from_env_value_parses_known_values() {
        assert_eq!(
            document_type_from_env_value(Some(" Discharge-Summary ".into())).expect("parse"),
            DocumentType::DischargeSummary
        );
    }

    #[test]
    fn test_document_type_from_env_value_rejects_unknown() {
        let err = document_type_from_env_value(Some("referral".into()))
            .expect_err("should reject unknown document type");
        assert!(matches!(err, CoreError::UnknownDocumentType(ref v) if v == "referral"));
    }
}
