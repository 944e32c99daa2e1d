//! Idea Builder - guided multi-round ideation workflow engine
//!
//! A five-phase state machine that refines a free-text idea into a
//! structured plan through three question/answer rounds against a
//! text-generation provider. The engine owns prompt compilation,
//! defensive parsing of the provider's output, answer merging, and final
//! report assembly; transport, rendering, persistence, export, and
//! billing belong to the host application and are reached only through
//! injected trait objects.
//!
//! # Core Concepts
//!
//! - **Strictly forward phases**: `input -> round1 -> round2 -> round3 ->
//!   generating_plan`, with every transition gated on completeness
//! - **All-or-nothing transitions**: a failed transition leaves the
//!   session in its pre-call state and may be retried explicitly
//! - **Untrusted output**: generated text is parsed defensively; any
//!   shape violation fails the whole package
//! - **Injected context**: tier, language, and identity arrive as explicit
//!   parameters on every call, never from ambient state
//!
//! # Modules
//!
//! - [`workflow`] - phase controller and the `advance` surface
//! - [`guard`] - preflight checks and external collaborator traits
//! - [`prompts`] - Handlebars prompt compilation
//! - [`parser`] - question-package extraction from raw generated text
//! - [`answers`] - per-round merged answer records
//! - [`report`] - final plan + session summary assembly
//! - [`config`] - policy configuration and loading

pub mod answers;
pub mod config;
pub mod error;
pub mod generate;
pub mod guard;
pub mod parser;
pub mod prompts;
pub mod report;
pub mod scale;
pub mod session;
pub mod workflow;

// Re-export commonly used types
pub use answers::{AnswerRecord, RoundState};
pub use config::{GenerationConfig, LimitsConfig, WorkflowConfig};
pub use error::WorkflowError;
pub use generate::{
    CallContext, GenerateError, GenerationOutput, GenerationRequest, TextGenerator,
};
pub use guard::{BudgetDecision, FeatureGate, Guard, RateLimiter, TextSanitizer, TokenBudget};
pub use parser::QuestionPackage;
pub use prompts::PromptCompiler;
pub use scale::{ScaleKey, ScaleKind};
pub use session::{FocusType, Phase, Round, Session};
pub use workflow::{AdvanceOutcome, IdeaWorkflow, WorkflowInput};
