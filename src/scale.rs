//! Answer scale vocabularies
//!
//! Rounds 1-2 use a five-point agreement scale; round 3 uses a fixed
//! MoSCoW prioritization scale. A `ScaleKey` is the symbolic name for a
//! 1-5 position and is always consistent with its numeric value by
//! construction.

use serde::{Deserialize, Serialize};

/// Which vocabulary a round's answers are drawn from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScaleKind {
    /// Five-point agreement scale (rounds 1-2)
    Agreement,
    /// MoSCoW prioritization scale (round 3)
    Moscow,
}

/// Symbolic name for a 1-5 scale position
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScaleKey {
    StronglyDisagree,
    Disagree,
    Neutral,
    Agree,
    StronglyAgree,
    Na,
    Nice,
    Could,
    Should,
    Must,
}

impl ScaleKind {
    /// Resolve the key for a 1-5 position, or None outside the range
    pub fn key(&self, scale: u8) -> Option<ScaleKey> {
        match (self, scale) {
            (ScaleKind::Agreement, 1) => Some(ScaleKey::StronglyDisagree),
            (ScaleKind::Agreement, 2) => Some(ScaleKey::Disagree),
            (ScaleKind::Agreement, 3) => Some(ScaleKey::Neutral),
            (ScaleKind::Agreement, 4) => Some(ScaleKey::Agree),
            (ScaleKind::Agreement, 5) => Some(ScaleKey::StronglyAgree),
            (ScaleKind::Moscow, 1) => Some(ScaleKey::Na),
            (ScaleKind::Moscow, 2) => Some(ScaleKey::Nice),
            (ScaleKind::Moscow, 3) => Some(ScaleKey::Could),
            (ScaleKind::Moscow, 4) => Some(ScaleKey::Should),
            (ScaleKind::Moscow, 5) => Some(ScaleKey::Must),
            _ => None,
        }
    }

    /// Built-in label for a 1-5 position, used when the model did not
    /// supply a tailored label set
    pub fn default_label(&self, scale: u8) -> &'static str {
        match (self, scale) {
            (ScaleKind::Agreement, 1) => "Strongly disagree",
            (ScaleKind::Agreement, 2) => "Disagree",
            (ScaleKind::Agreement, 3) => "Neutral",
            (ScaleKind::Agreement, 4) => "Agree",
            (ScaleKind::Agreement, 5) => "Strongly agree",
            (ScaleKind::Moscow, 1) => "N/A",
            (ScaleKind::Moscow, 2) => "Nice to have",
            (ScaleKind::Moscow, 3) => "Could have",
            (ScaleKind::Moscow, 4) => "Should have",
            (ScaleKind::Moscow, 5) => "Must have",
            _ => "",
        }
    }

    /// The default position synthesized for questions the user has not
    /// answered yet: agree-neutral for agreement, could-have for MoSCoW
    pub fn default_scale(&self) -> u8 {
        3
    }
}

impl ScaleKey {
    /// Snake-case wire name for this key
    pub fn as_str(&self) -> &'static str {
        match self {
            ScaleKey::StronglyDisagree => "strongly_disagree",
            ScaleKey::Disagree => "disagree",
            ScaleKey::Neutral => "neutral",
            ScaleKey::Agree => "agree",
            ScaleKey::StronglyAgree => "strongly_agree",
            ScaleKey::Na => "na",
            ScaleKey::Nice => "nice",
            ScaleKey::Could => "could",
            ScaleKey::Should => "should",
            ScaleKey::Must => "must",
        }
    }
}

impl std::fmt::Display for ScaleKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
