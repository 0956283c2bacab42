use super::common::{CodableText, SourceIdentifier, Statement};
use cda_model::StrucDocText;
use serde::{Deserialize, Serialize};

/// Adverse reactions recorded for the subject of care.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AdverseReactions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub adverse_substance_reactions: Option<Vec<Reaction>>,
    /// Used only when no reactions are listed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exclusion_statement: Option<Statement>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_narrative: Option<StrucDocText>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct Reaction {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<SourceIdentifier>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub substance_or_agent: Option<CodableText>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reaction_event: Option<ReactionEvent>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ReactionEvent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reaction_type: Option<CodableText>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub manifestations: Option<Vec<CodableText>>,
}
