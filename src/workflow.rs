//! Phase controller - the workflow state machine
//!
//! Sequences the five phases, gates every transition on completeness of
//! the current round, and runs the transition pipeline: guard checks,
//! prompt compilation, generation call, response parsing, round
//! population. A transition either fully completes (phase advances, next
//! round populated) or fully fails (phase unchanged, one error surfaced);
//! there is no partial-success state and no automatic retry.
//!
//! At most one generation call is outstanding at any time, enforced by an
//! in-flight flag set before the call and cleared on every exit path.
//! There is no cancellation primitive: if the caller drops the workflow
//! mid-call, the in-flight request runs to completion and its result is
//! discarded with the workflow value. Known limitation, not a guarantee
//! of resource cleanup.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::config::WorkflowConfig;
use crate::error::WorkflowError;
use crate::generate::{CallContext, GenerationRequest, TextGenerator};
use crate::guard::{FeatureGate, Guard, RateLimiter, TextSanitizer, TokenBudget};
use crate::parser::{self, QuestionPackage};
use crate::prompts::PromptCompiler;
use crate::report;
use crate::session::{FocusType, Phase, Round, Session};

/// One step the caller can feed into [`IdeaWorkflow::advance`]
#[derive(Debug, Clone)]
pub enum WorkflowInput {
    /// Submit the initial idea text (input phase only)
    Idea(String),
    /// Record a scale selection for the current round
    Answer { round: Round, index: usize, scale: u8 },
    /// Choose the round-3 focus mode (during round 2)
    Focus(FocusType),
    /// Advance to the next phase
    Next,
}

/// Result of a successful advance: the (possibly unchanged) phase and the
/// active round's questions, so the host can render without re-querying
#[derive(Debug, Clone)]
pub struct AdvanceOutcome {
    pub phase: Phase,
    pub questions: Vec<String>,
}

/// The ideation workflow engine
///
/// Owns one ephemeral [`Session`] exclusively; dropping the workflow
/// discards all state.
pub struct IdeaWorkflow {
    session: Session,
    config: WorkflowConfig,
    guard: Guard,
    compiler: PromptCompiler,
    generator: Arc<dyn TextGenerator>,
    in_flight: bool,
    report: Option<String>,
}

impl IdeaWorkflow {
    pub fn new(
        generator: Arc<dyn TextGenerator>,
        gate: Arc<dyn FeatureGate>,
        limiter: Arc<dyn RateLimiter>,
        budget: Arc<dyn TokenBudget>,
        sanitizer: Arc<dyn TextSanitizer>,
        config: WorkflowConfig,
    ) -> Result<Self, WorkflowError> {
        let guard = Guard::new(gate, limiter, budget, sanitizer, config.clone());
        let compiler = PromptCompiler::new()?;
        let session = Session::new();
        info!(session_id = %session.id, "workflow opened");
        Ok(Self {
            session,
            config,
            guard,
            compiler,
            generator,
            in_flight: false,
            report: None,
        })
    }

    pub fn phase(&self) -> Phase {
        self.session.phase
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// The terminal artifact: plan text plus the appended session summary.
    /// Available once the plan call has resolved.
    pub fn report(&self) -> Option<&str> {
        self.report.as_deref()
    }

    /// Single entry point for every caller interaction
    pub async fn advance(
        &mut self,
        ctx: &CallContext,
        input: WorkflowInput,
    ) -> Result<AdvanceOutcome, WorkflowError> {
        match input {
            WorkflowInput::Idea(text) => self.begin(ctx, &text).await,
            WorkflowInput::Answer { round, index, scale } => {
                self.record_answer(round, index, scale)?;
                Ok(self.outcome())
            }
            WorkflowInput::Focus(focus) => {
                self.set_focus(focus)?;
                Ok(self.outcome())
            }
            WorkflowInput::Next => match self.session.phase {
                Phase::Round1 => self.next_from_round1(ctx).await,
                Phase::Round2 => self.next_from_round2(ctx).await,
                Phase::Round3 => self.generate_plan(ctx).await,
                Phase::Input => Err(WorkflowError::Validation(
                    "submit the idea text to leave the input phase".to_string(),
                )),
                Phase::GeneratingPlan => Err(WorkflowError::Validation(
                    "the workflow is already complete".to_string(),
                )),
            },
        }
    }

    /// Record a scale selection for the round currently being answered
    pub fn record_answer(
        &mut self,
        round: Round,
        index: usize,
        scale: u8,
    ) -> Result<(), WorkflowError> {
        if self.session.phase != round.phase() {
            return Err(WorkflowError::Validation(format!(
                "cannot answer {round} while in phase {:?}",
                self.session.phase
            )));
        }
        let kind = round.scale_kind();
        self.session
            .round_mut(round)
            .record_answer(kind, index, scale)?;
        Ok(())
    }

    /// Choose the round-3 focus mode; selected during round 2, consumed
    /// when compiling the round-3 prompt
    pub fn set_focus(&mut self, focus: FocusType) -> Result<(), WorkflowError> {
        if self.session.phase != Phase::Round2 {
            return Err(WorkflowError::Validation(
                "focus is selected during round 2".to_string(),
            ));
        }
        debug!(?focus, "focus selected");
        self.session.focus = Some(focus);
        Ok(())
    }

    /// input -> round1
    async fn begin(&mut self, ctx: &CallContext, raw_idea: &str) -> Result<AdvanceOutcome, WorkflowError> {
        if self.session.phase != Phase::Input {
            return Err(WorkflowError::Validation(
                "idea text is only accepted in the input phase".to_string(),
            ));
        }

        let session_key = self.session.id.to_string();
        let sanitized = self.guard.admit_idea(ctx, &session_key, raw_idea)?;
        let prompt = self.compiler.round1(&sanitized, &ctx.language)?;
        let content = self
            .generate_checked(ctx, prompt, self.config.generation.max_tokens)
            .await?;
        let package = self.parse_round(&content, 1)?;

        // All checks passed: mutate the session and advance
        self.session.idea = sanitized;
        self.session.round_mut(Round::One).apply_package(package);
        self.session.phase = Phase::Round1;
        info!(session_id = %self.session.id, "advanced to round 1");
        Ok(self.outcome())
    }

    /// round1 -> round2
    async fn next_from_round1(&mut self, ctx: &CallContext) -> Result<AdvanceOutcome, WorkflowError> {
        if !self.session.round(Round::One).is_complete(5) {
            return Err(WorkflowError::Validation(
                "round 1 requires 5 questions and 5 answers".to_string(),
            ));
        }

        let session_key = self.session.id.to_string();
        self.guard.admit_call(ctx, &session_key)?;
        let prompt = self.compiler.round2(
            &self.session.idea,
            &ctx.language,
            &self.session.round(Round::One).answers,
        )?;
        let content = self
            .generate_checked(ctx, prompt, self.config.generation.max_tokens)
            .await?;
        let package = self.parse_round(&content, 2)?;

        self.session.round_mut(Round::Two).apply_package(package);
        self.session.phase = Phase::Round2;
        info!(session_id = %self.session.id, "advanced to round 2");
        Ok(self.outcome())
    }

    /// round2 -> round3
    async fn next_from_round2(&mut self, ctx: &CallContext) -> Result<AdvanceOutcome, WorkflowError> {
        if !self.session.round(Round::Two).is_complete(5) {
            return Err(WorkflowError::Validation(
                "round 2 requires 5 questions and 5 answers".to_string(),
            ));
        }
        let focus = self.session.focus.ok_or_else(|| {
            WorkflowError::Validation("select a focus before leaving round 2".to_string())
        })?;

        let session_key = self.session.id.to_string();
        self.guard.admit_call(ctx, &session_key)?;
        let prompt = self.compiler.round3(
            &self.session.idea,
            &ctx.language,
            &self.session.round(Round::One).answers,
            &self.session.round(Round::Two).answers,
            focus,
        )?;
        let content = self
            .generate_checked(ctx, prompt, self.config.generation.max_tokens)
            .await?;
        // Round 3 accepts 1-10 items and always answers on the fixed
        // MoSCoW vocabulary, so any model-supplied labels are discarded
        let mut package = parser::parse(&content).ok_or(WorkflowError::MalformedResponse)?;
        package.scale_labels = Vec::new();

        self.session.round_mut(Round::Three).apply_package(package);
        self.session.phase = Phase::Round3;
        info!(session_id = %self.session.id, "advanced to round 3");
        Ok(self.outcome())
    }

    /// round3 -> generating_plan
    ///
    /// Round 3 allows partial completion: a single prioritized item is
    /// enough. The plan prompt still carries the full merged answer
    /// sequences, defaults included.
    async fn generate_plan(&mut self, ctx: &CallContext) -> Result<AdvanceOutcome, WorkflowError> {
        if self.session.round(Round::Three).answered_count() == 0 {
            return Err(WorkflowError::Validation(
                "prioritize at least one round 3 item".to_string(),
            ));
        }

        let session_key = self.session.id.to_string();
        self.guard.admit_call(ctx, &session_key)?;
        let prompt = self.compiler.plan(
            &self.session.idea,
            &ctx.language,
            &self.session.round(Round::One).answers,
            &self.session.round(Round::Two).answers,
            &self.session.round(Round::Three).answers,
        )?;
        let plan_text = self
            .generate_checked(ctx, prompt, self.config.generation.plan_max_tokens)
            .await?;

        self.report = Some(report::assemble(&plan_text, &self.session));
        self.session.phase = Phase::GeneratingPlan;
        info!(session_id = %self.session.id, "plan generated, workflow complete");
        Ok(self.outcome())
    }

    /// Budget check, single in-flight generation call, empty-response
    /// check, usage recording
    async fn generate_checked(
        &mut self,
        ctx: &CallContext,
        prompt: String,
        max_tokens: u32,
    ) -> Result<String, WorkflowError> {
        if self.in_flight {
            return Err(WorkflowError::Validation(
                "a generation call is already in flight".to_string(),
            ));
        }

        let estimated = self.guard.check_budget(ctx, &prompt)?;

        let request = GenerationRequest {
            prompt,
            function: self.config.generation.feature.clone(),
            user_id: ctx.user_id.clone(),
            tier: ctx.tier.clone(),
            max_tokens,
        };

        self.in_flight = true;
        let result = self.generator.generate(request).await;
        self.in_flight = false;

        let output = result.map_err(|e| {
            warn!(error = %e, "generation call failed");
            WorkflowError::Provider(e)
        })?;

        if output.content.trim().is_empty() {
            warn!("provider returned blank content");
            return Err(WorkflowError::EmptyResponse);
        }

        self.guard.record_usage(ctx, estimated, &output.content);
        Ok(output.content)
    }

    /// Parse a question round that must contain exactly 5 entries
    fn parse_round(&self, content: &str, round_number: u8) -> Result<QuestionPackage, WorkflowError> {
        let package = parser::parse(content).ok_or(WorkflowError::MalformedResponse)?;
        if package.questions.len() != 5 {
            warn!(
                round_number,
                count = package.questions.len(),
                "round package must contain exactly 5 questions"
            );
            return Err(WorkflowError::MalformedResponse);
        }
        Ok(package)
    }

    fn outcome(&self) -> AdvanceOutcome {
        let questions = match self.session.phase {
            Phase::Round1 => self.session.round(Round::One).questions.clone(),
            Phase::Round2 => self.session.round(Round::Two).questions.clone(),
            Phase::Round3 => self.session.round(Round::Three).questions.clone(),
            Phase::Input | Phase::GeneratingPlan => Vec::new(),
        };
        AdvanceOutcome {
            phase: self.session.phase,
            questions,
        }
    }
}
