//! Prompt compiler
//!
//! Deterministically renders the generation request string for each round
//! from accumulated session fields. Four pure entry points, one per
//! generation step; no live connection is ever passed in.

mod embedded;

use handlebars::Handlebars;
use serde::Serialize;
use tracing::debug;

use crate::answers::AnswerRecord;
use crate::error::WorkflowError;
use crate::session::FocusType;

/// One answered statement as the templates consume it
#[derive(Debug, Clone, Serialize)]
struct AnswerLine {
    question: String,
    label: String,
    scale: u8,
}

impl From<&AnswerRecord> for AnswerLine {
    fn from(record: &AnswerRecord) -> Self {
        Self {
            question: record.question.clone(),
            label: record.label.clone(),
            scale: record.scale,
        }
    }
}

#[derive(Serialize)]
struct Round1Context<'a> {
    idea: &'a str,
    language: &'a str,
}

#[derive(Serialize)]
struct Round2Context<'a> {
    idea: &'a str,
    language: &'a str,
    round1: Vec<AnswerLine>,
}

#[derive(Serialize)]
struct Round3Context<'a> {
    idea: &'a str,
    language: &'a str,
    round1: Vec<AnswerLine>,
    round2: Vec<AnswerLine>,
    focus_instruction: &'static str,
}

#[derive(Serialize)]
struct PlanContext<'a> {
    idea: &'a str,
    language: &'a str,
    round1: Vec<AnswerLine>,
    round2: Vec<AnswerLine>,
    round3: Vec<AnswerLine>,
}

/// Focus-mode instruction injected into the round-3 template
fn focus_instruction(focus: FocusType) -> &'static str {
    match focus {
        FocusType::Functional => {
            "concrete functional deliverables - features or capabilities that could be built"
        }
        FocusType::Wild => "wild ideas - unconventional, ambitious directions the idea could take",
        FocusType::Services => "service offerings - ways to deliver the idea as a service",
        FocusType::Combined => {
            "a combined view - mix functional deliverables, wild ideas, and service offerings"
        }
    }
}

/// Renders the four generation prompts from embedded templates
pub struct PromptCompiler {
    hbs: Handlebars<'static>,
}

impl PromptCompiler {
    /// Register the embedded templates; fails only on a malformed template
    pub fn new() -> Result<Self, WorkflowError> {
        let mut hbs = Handlebars::new();
        // Prompts are plain text, not HTML
        hbs.register_escape_fn(handlebars::no_escape);

        for (name, template) in [
            ("round1", embedded::ROUND1),
            ("round2", embedded::ROUND2),
            ("round3", embedded::ROUND3),
            ("plan", embedded::PLAN),
        ] {
            hbs.register_template_string(name, template)
                .map_err(|e| WorkflowError::Template(format!("{name}: {e}")))?;
        }

        Ok(Self { hbs })
    }

    pub fn round1(&self, idea: &str, language: &str) -> Result<String, WorkflowError> {
        self.render("round1", &Round1Context { idea, language })
    }

    pub fn round2(
        &self,
        idea: &str,
        language: &str,
        round1: &[AnswerRecord],
    ) -> Result<String, WorkflowError> {
        self.render(
            "round2",
            &Round2Context {
                idea,
                language,
                round1: lines(round1),
            },
        )
    }

    pub fn round3(
        &self,
        idea: &str,
        language: &str,
        round1: &[AnswerRecord],
        round2: &[AnswerRecord],
        focus: FocusType,
    ) -> Result<String, WorkflowError> {
        self.render(
            "round3",
            &Round3Context {
                idea,
                language,
                round1: lines(round1),
                round2: lines(round2),
                focus_instruction: focus_instruction(focus),
            },
        )
    }

    pub fn plan(
        &self,
        idea: &str,
        language: &str,
        round1: &[AnswerRecord],
        round2: &[AnswerRecord],
        round3: &[AnswerRecord],
    ) -> Result<String, WorkflowError> {
        self.render(
            "plan",
            &PlanContext {
                idea,
                language,
                round1: lines(round1),
                round2: lines(round2),
                round3: lines(round3),
            },
        )
    }

    fn render<T: Serialize>(&self, name: &str, context: &T) -> Result<String, WorkflowError> {
        debug!(template = name, "rendering prompt");
        self.hbs
            .render(name, context)
            .map_err(|e| WorkflowError::Template(format!("{name}: {e}")))
    }
}

fn lines(records: &[AnswerRecord]) -> Vec<AnswerLine> {
    records.iter().map(AnswerLine::from).collect()
}
