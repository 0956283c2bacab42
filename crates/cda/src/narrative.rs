//! Section narrative block (`StrucDoc.Text`).
//!
//! This is the human-readable half of a section. Callers may supply one as an override, or a
//! narrative generator renders one from the same aggregate the structured entries came from.

use serde::{Deserialize, Serialize};

/// Narrative `text` of a section, as an ordered list of blocks.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StrucDocText {
    #[serde(default)]
    pub blocks: Vec<NarrativeBlock>,
}

impl StrucDocText {
    pub fn paragraph(text: impl Into<String>) -> Self {
        Self {
            blocks: vec![NarrativeBlock::Paragraph(text.into())],
        }
    }

    pub fn table(table: StrucDocTable) -> Self {
        Self {
            blocks: vec![NarrativeBlock::Table(table)],
        }
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }
}

/// A single narrative block.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NarrativeBlock {
    Paragraph(String),
    List(Vec<String>),
    Table(StrucDocTable),
}

/// Narrative table with an optional caption, a header row and body rows.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StrucDocTable {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub caption: Option<String>,
    #[serde(default)]
    pub headers: Vec<String>,
    #[serde(default)]
    pub rows: Vec<Vec<String>>,
}
