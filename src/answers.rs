//! Answer store - per-round merged answer records
//!
//! Recording an answer rebuilds the whole per-round sequence: the updated
//! index gets a fresh record, every other index carries its existing
//! record forward or gets a synthesized default. The answer sequence is
//! therefore always either empty or exactly question-length, so partial
//! states never leak into its shape. Which indices were explicitly
//! answered is tracked separately for the completeness gates.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::WorkflowError;
use crate::parser::QuestionPackage;
use crate::scale::{ScaleKey, ScaleKind};

/// One question's resolved answer
///
/// `key` and `scale` are mutually consistent by construction: the key is
/// always derived from the scale through the round's vocabulary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerRecord {
    pub question: String,
    pub key: ScaleKey,
    pub label: String,
    pub scale: u8,
}

/// Questions, model-supplied scale labels, and merged answers for one round
#[derive(Debug, Clone, Default)]
pub struct RoundState {
    /// Ordered question texts
    pub questions: Vec<String>,
    /// Per-question label sets; an empty inner vec means the model
    /// supplied none and the built-in vocabulary applies
    pub scale_labels: Vec<Vec<String>>,
    /// Merged answer records, index-aligned with `questions`
    pub answers: Vec<AnswerRecord>,
    /// Which indices the user explicitly answered
    answered: Vec<bool>,
}

impl RoundState {
    /// Populate this round from a freshly parsed package, clearing any
    /// previous answers
    pub fn apply_package(&mut self, package: QuestionPackage) {
        debug!(question_count = package.questions.len(), "applying question package");
        let count = package.questions.len();
        self.questions = package.questions;
        self.scale_labels = if package.scale_labels.is_empty() {
            vec![Vec::new(); count]
        } else {
            package.scale_labels
        };
        self.answers.clear();
        self.answered = vec![false; count];
    }

    /// Record an answer at `index`, rebuilding the full merged sequence
    pub fn record_answer(
        &mut self,
        kind: ScaleKind,
        index: usize,
        scale: u8,
    ) -> Result<&[AnswerRecord], WorkflowError> {
        if index >= self.questions.len() {
            return Err(WorkflowError::Validation(format!(
                "question index {} out of range (round has {} questions)",
                index,
                self.questions.len()
            )));
        }
        kind.key(scale).ok_or_else(|| {
            WorkflowError::Validation(format!("scale value {scale} outside 1-5"))
        })?;

        let mut merged = Vec::with_capacity(self.questions.len());
        let mut answered = vec![false; self.questions.len()];

        for (i, question) in self.questions.iter().enumerate() {
            let record = if i == index {
                self.build_record(kind, i, question, scale)
            } else if let Some(existing) = self.answers.get(i) {
                existing.clone()
            } else {
                self.build_record(kind, i, question, kind.default_scale())
            };
            answered[i] = i == index || self.answered.get(i).copied().unwrap_or(false);
            merged.push(record);
        }

        debug!(index, scale, answered = answered.iter().filter(|a| **a).count(), "recorded answer");
        self.answers = merged;
        self.answered = answered;
        Ok(&self.answers)
    }

    fn build_record(&self, kind: ScaleKind, index: usize, question: &str, scale: u8) -> AnswerRecord {
        // scale is validated by the caller, so key() cannot miss here
        let key = kind.key(scale).unwrap_or(ScaleKey::Neutral);
        AnswerRecord {
            question: question.to_string(),
            key,
            label: self.resolve_label(kind, index, scale),
            scale,
        }
    }

    /// Resolve the label for a position: model-supplied set if present for
    /// this question, built-in vocabulary otherwise
    fn resolve_label(&self, kind: ScaleKind, index: usize, scale: u8) -> String {
        if let Some(labels) = self.scale_labels.get(index)
            && labels.len() == 5
        {
            return labels[(scale - 1) as usize].clone();
        }
        kind.default_label(scale).to_string()
    }

    /// Number of explicitly answered questions
    pub fn answered_count(&self) -> usize {
        self.answered.iter().filter(|a| **a).count()
    }

    /// Check the completeness gate: `required` questions, all explicitly
    /// answered
    pub fn is_complete(&self, required: usize) -> bool {
        self.questions.len() == required && self.answered_count() == required
    }

    /// Explicitly answered (index, record) pairs in question order
    pub fn answered_pairs(&self) -> impl Iterator<Item = (usize, &AnswerRecord)> {
        self.answers
            .iter()
            .enumerate()
            .filter(|(i, _)| self.answered.get(*i).copied().unwrap_or(false))
    }
}
