//! Trimmed, non-blank text shared by the CDA crates.
//!
//! Caller-supplied free text (comments, directions, quantity values, section titles) is only
//! written when it holds something other than whitespace. [`NonEmptyText`] is the one place
//! that rule lives: construction trims, and blank input is refused.

/// Why a piece of text was refused.
#[derive(Debug, thiserror::Error)]
pub enum TextError {
    #[error("text is blank")]
    Blank,
}

/// Text with surrounding whitespace removed and at least one character left.
///
/// Section titles carry this type so a blank title cannot reach the XML writer. The section
/// builders use [`NonEmptyText::from_optional`] for optional free text, which makes `""` and
/// `"   "` behave exactly like a missing field.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NonEmptyText(String);

impl NonEmptyText {
    /// Trims `input` and wraps what is left.
    ///
    /// # Errors
    ///
    /// Returns [`TextError::Blank`] when nothing but whitespace was given.
    pub fn new(input: impl AsRef<str>) -> Result<Self, TextError> {
        match input.as_ref().trim() {
            "" => Err(TextError::Blank),
            trimmed => Ok(Self(trimmed.to_owned())),
        }
    }

    /// Optional free text, with blank treated as absent.
    pub fn from_optional(input: Option<&str>) -> Option<Self> {
        Self::new(input?).ok()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl std::fmt::Display for NonEmptyText {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for NonEmptyText {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Written as a plain string in the JSON rendering of a section.
impl serde::Serialize for NonEmptyText {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.0)
    }
}
