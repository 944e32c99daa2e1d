//! Ideation session state
//!
//! A session is ephemeral: created when the workflow opens, mutated in
//! place by transitions and answer selections, and dropped when the
//! workflow is cancelled or hands its report to the caller. Nothing is
//! persisted between instances.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::answers::RoundState;
use crate::scale::ScaleKind;

/// Position in the strictly linear workflow state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// Gathering the initial idea text
    Input,
    /// Answering the foundations round
    Round1,
    /// Answering the execution round
    Round2,
    /// Prioritizing focus items
    Round3,
    /// Plan generated; report available
    GeneratingPlan,
}

/// One of the three question/answer cycles
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Round {
    One,
    Two,
    Three,
}

impl Round {
    /// Zero-based storage index
    pub fn index(&self) -> usize {
        match self {
            Round::One => 0,
            Round::Two => 1,
            Round::Three => 2,
        }
    }

    /// The answer vocabulary this round uses
    pub fn scale_kind(&self) -> ScaleKind {
        match self {
            Round::One | Round::Two => ScaleKind::Agreement,
            Round::Three => ScaleKind::Moscow,
        }
    }

    /// The phase during which this round is answered
    pub fn phase(&self) -> Phase {
        match self {
            Round::One => Phase::Round1,
            Round::Two => Phase::Round2,
            Round::Three => Phase::Round3,
        }
    }
}

impl std::fmt::Display for Round {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Round::One => write!(f, "round 1"),
            Round::Two => write!(f, "round 2"),
            Round::Three => write!(f, "round 3"),
        }
    }
}

/// Focus mode for the round-3 items, selected during round 2
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FocusType {
    /// Concrete functional deliverables
    Functional,
    /// Unconventional, ambitious ideas
    Wild,
    /// Service offerings around the idea
    Services,
    /// A blend of all three
    Combined,
}

/// State owned exclusively by one workflow invocation
#[derive(Debug, Clone)]
pub struct Session {
    /// Session id, also the rate-limiter key
    pub id: Uuid,
    /// Current state-machine position
    pub phase: Phase,
    /// Sanitized idea text; empty until the input phase is left
    pub idea: String,
    /// Round-3 focus mode, set during round 2
    pub focus: Option<FocusType>,
    rounds: [RoundState; 3],
}

impl Session {
    /// Open a fresh session in the input phase
    pub fn new() -> Self {
        Self {
            id: Uuid::now_v7(),
            phase: Phase::Input,
            idea: String::new(),
            focus: None,
            rounds: [RoundState::default(), RoundState::default(), RoundState::default()],
        }
    }

    pub fn round(&self, round: Round) -> &RoundState {
        &self.rounds[round.index()]
    }

    pub fn round_mut(&mut self, round: Round) -> &mut RoundState {
        &mut self.rounds[round.index()]
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_session_starts_at_input() {
        let session = Session::new();
        assert_eq!(session.phase, Phase::Input);
        assert!(session.idea.is_empty());
        assert!(session.focus.is_none());
        assert!(session.round(Round::One).questions.is_empty());
    }

    #[test]
    fn test_round_scale_kinds() {
        assert_eq!(Round::One.scale_kind(), ScaleKind::Agreement);
        assert_eq!(Round::Two.scale_kind(), ScaleKind::Agreement);
        assert_eq!(Round::Three.scale_kind(), ScaleKind::Moscow);
    }

    #[test]
    fn test_round_indices_distinct() {
        let mut session = Session::new();
        session.round_mut(Round::Two).questions.push("Q".to_string());

        assert!(session.round(Round::One).questions.is_empty());
        assert_eq!(session.round(Round::Two).questions.len(), 1);
        assert!(session.round(Round::Three).questions.is_empty());
    }

    #[test]
    fn test_session_ids_unique() {
        assert_ne!(Session::new().id, Session::new().id);
    }
}
