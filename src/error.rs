//! Workflow error taxonomy
//!
//! Every variant is recoverable from the caller's perspective: a failed
//! transition leaves the session in its pre-call state and the same
//! transition may be retried explicitly. Nothing here is fatal to the
//! process, only to the single transition attempt.

use thiserror::Error;

use crate::generate::GenerateError;

/// Errors surfaced by workflow transitions
#[derive(Debug, Clone, Error)]
pub enum WorkflowError {
    /// Input failed validation (idea too short, unsafe text, bad index,
    /// transition attempted out of order)
    #[error("invalid input: {0}")]
    Validation(String),

    /// The ideation feature is not enabled for the caller's tier
    #[error("feature '{feature}' is not available on the '{tier}' tier")]
    UpgradeRequired { tier: String, feature: String },

    /// Too many generation attempts within the rolling window
    #[error("rate limit exceeded, try again later")]
    RateLimited,

    /// The estimated prompt does not fit the caller's token allowance
    #[error("token budget exceeded: {0}")]
    BudgetExceeded(String),

    /// The provider returned successfully but with blank content
    #[error("provider returned an empty response")]
    EmptyResponse,

    /// The provider's output could not be parsed into a question package
    #[error("could not parse a question package from the response")]
    MalformedResponse,

    /// The generation call itself failed
    #[error("generation call failed: {0}")]
    Provider(#[from] GenerateError),

    /// A prompt template failed to render
    #[error("prompt template error: {0}")]
    Template(String),
}

impl WorkflowError {
    /// Check if this failure should be rendered as an upgrade prompt
    /// rather than a transient error
    pub fn is_upgrade_required(&self) -> bool {
        matches!(self, WorkflowError::UpgradeRequired { .. })
    }

    /// Check if retrying the same transition could plausibly succeed
    /// without the caller changing anything
    pub fn is_retryable(&self) -> bool {
        match self {
            WorkflowError::RateLimited => true,
            WorkflowError::EmptyResponse => true,
            WorkflowError::MalformedResponse => true,
            WorkflowError::Provider(_) => true,
            WorkflowError::Validation(_) => false,
            WorkflowError::UpgradeRequired { .. } => false,
            WorkflowError::BudgetExceeded(_) => false,
            WorkflowError::Template(_) => false,
        }
    }
}
