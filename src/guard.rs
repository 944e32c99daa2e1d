//! Preflight guard - checks run before any generation call is issued
//!
//! All checks are synchronous preconditions. None mutates session state
//! on failure; any failure aborts the round transition and the phase does
//! not advance. The collaborators behind the checks (feature gate, rate
//! limiter, budget service, sanitizer) are external and injected as trait
//! objects.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, warn};

use crate::config::WorkflowConfig;
use crate::error::WorkflowError;
use crate::generate::CallContext;

/// Per-tier feature availability
pub trait FeatureGate: Send + Sync {
    fn is_available(&self, tier: &str, feature: &str) -> bool;
}

/// Rolling-window call-rate limiter keyed by session
pub trait RateLimiter: Send + Sync {
    fn is_allowed(&self, key: &str, max_calls: u32, window: Duration) -> bool;
}

/// Outcome of a budget validation
#[derive(Debug, Clone)]
pub struct BudgetDecision {
    pub allowed: bool,
    pub reason: Option<String>,
}

/// Token estimation and allowance accounting
pub trait TokenBudget: Send + Sync {
    fn estimate_tokens(&self, text: &str) -> u64;

    fn validate(&self, user_id: &str, tier: &str, estimated_tokens: u64) -> BudgetDecision;

    /// Fire-and-forget usage recording, called only after a non-empty
    /// response
    fn record_usage(&self, user_id: &str, prompt_tokens: u64, response_tokens: u64);
}

/// Free-text validation and truncation
///
/// `Err` carries the underlying validation reason verbatim.
pub trait TextSanitizer: Send + Sync {
    fn sanitize(&self, text: &str, max_len: usize) -> Result<String, String>;
}

/// Runs the ordered preflight checks against the injected collaborators
pub struct Guard {
    gate: Arc<dyn FeatureGate>,
    limiter: Arc<dyn RateLimiter>,
    budget: Arc<dyn TokenBudget>,
    sanitizer: Arc<dyn TextSanitizer>,
    config: WorkflowConfig,
}

impl Guard {
    pub fn new(
        gate: Arc<dyn FeatureGate>,
        limiter: Arc<dyn RateLimiter>,
        budget: Arc<dyn TokenBudget>,
        sanitizer: Arc<dyn TextSanitizer>,
        config: WorkflowConfig,
    ) -> Self {
        Self {
            gate,
            limiter,
            budget,
            sanitizer,
            config,
        }
    }

    /// Checks for leaving the input phase, in order: minimum length,
    /// feature tier, rate limit, sanitization. Returns the sanitized idea.
    pub fn admit_idea(
        &self,
        ctx: &CallContext,
        session_key: &str,
        raw_idea: &str,
    ) -> Result<String, WorkflowError> {
        let min = self.config.limits.min_idea_chars;
        if raw_idea.chars().count() < min {
            debug!(len = raw_idea.chars().count(), min, "idea below minimum length");
            return Err(WorkflowError::Validation(format!(
                "idea must be at least {min} characters"
            )));
        }

        self.admit_call(ctx, session_key)?;

        self.sanitizer
            .sanitize(raw_idea, self.config.limits.max_idea_chars)
            .map_err(|reason| {
                warn!(%reason, "idea rejected by sanitizer");
                WorkflowError::Validation(reason)
            })
    }

    /// Checks for any round transition: feature tier, then rate limit.
    /// Fails closed with no generation call issued.
    pub fn admit_call(&self, ctx: &CallContext, session_key: &str) -> Result<(), WorkflowError> {
        let feature = &self.config.generation.feature;
        if !self.gate.is_available(&ctx.tier, feature) {
            debug!(tier = %ctx.tier, %feature, "feature gate closed");
            return Err(WorkflowError::UpgradeRequired {
                tier: ctx.tier.clone(),
                feature: feature.clone(),
            });
        }

        let window = Duration::from_millis(self.config.limits.window_ms);
        if !self
            .limiter
            .is_allowed(session_key, self.config.limits.max_calls, window)
        {
            warn!(%session_key, "rate limit exceeded");
            return Err(WorkflowError::RateLimited);
        }

        Ok(())
    }

    /// Estimate the prompt's token cost and verify it fits the caller's
    /// remaining allowance. Returns the estimate for later usage recording.
    pub fn check_budget(&self, ctx: &CallContext, prompt: &str) -> Result<u64, WorkflowError> {
        let estimated = self.budget.estimate_tokens(prompt);
        let decision = self.budget.validate(&ctx.user_id, &ctx.tier, estimated);
        if !decision.allowed {
            let reason = decision
                .reason
                .unwrap_or_else(|| "token budget exceeded".to_string());
            warn!(estimated, %reason, "budget check failed");
            return Err(WorkflowError::BudgetExceeded(reason));
        }
        debug!(estimated, "budget check passed");
        Ok(estimated)
    }

    /// Record usage after a non-empty response (fire-and-forget)
    pub fn record_usage(&self, ctx: &CallContext, prompt_tokens: u64, response: &str) {
        let response_tokens = self.budget.estimate_tokens(response);
        self.budget
            .record_usage(&ctx.user_id, prompt_tokens, response_tokens);
    }
}


#[cfg(test)]
mod tests {
    use super::stub::*;
    use super::*;

    fn guard_with(allowance: u64) -> Guard {
        Guard::new(
            Arc::new(PaidTiersGate),
            Arc::new(CountingLimiter::new()),
            Arc::new(FixedBudget::with_allowance(allowance)),
            Arc::new(BasicSanitizer),
            WorkflowConfig::default(),
        )
    }

    fn ctx(tier: &str) -> CallContext {
        CallContext::new("user-1", tier, "English")
    }

    const IDEA: &str = "A mobile app that turns meeting transcripts into content calendars.";

    #[test]
    fn test_short_idea_rejected_before_other_checks() {
        let guard = guard_with(1_000);
        // Even on a gated tier, the length check fires first
        let err = guard.admit_idea(&ctx("free"), "s1", "too short").unwrap_err();
        assert!(matches!(err, WorkflowError::Validation(_)));
    }

    #[test]
    fn test_feature_gate_reported_distinctly() {
        let guard = guard_with(1_000);
        let err = guard.admit_idea(&ctx("free"), "s1", IDEA).unwrap_err();
        assert!(err.is_upgrade_required());
    }

    #[test]
    fn test_rate_limit_fails_closed() {
        let config = WorkflowConfig {
            limits: crate::config::LimitsConfig {
                max_calls: 2,
                ..Default::default()
            },
            ..Default::default()
        };
        let guard = Guard::new(
            Arc::new(PaidTiersGate),
            Arc::new(CountingLimiter::new()),
            Arc::new(FixedBudget::with_allowance(1_000)),
            Arc::new(BasicSanitizer),
            config,
        );

        assert!(guard.admit_call(&ctx("pro"), "s1").is_ok());
        assert!(guard.admit_call(&ctx("pro"), "s1").is_ok());
        let err = guard.admit_call(&ctx("pro"), "s1").unwrap_err();
        assert!(matches!(err, WorkflowError::RateLimited));
    }

    #[test]
    fn test_sanitizer_reason_surfaced_verbatim() {
        let guard = guard_with(1_000);
        let unsafe_idea = format!("{IDEA} <script>alert(1)</script>");
        let err = guard.admit_idea(&ctx("pro"), "s1", &unsafe_idea).unwrap_err();
        assert!(err.to_string().contains("unsafe markup detected"));
    }

    #[test]
    fn test_sanitized_idea_returned() {
        let guard = guard_with(1_000);
        let padded = format!("   {IDEA}   ");
        let sanitized = guard.admit_idea(&ctx("pro"), "s1", &padded).unwrap();
        assert_eq!(sanitized, IDEA);
    }

    #[test]
    fn test_budget_failure_carries_service_reason() {
        let guard = guard_with(1);
        let err = guard
            .check_budget(&ctx("pro"), "a prompt well beyond one token")
            .unwrap_err();
        match err {
            WorkflowError::BudgetExceeded(reason) => assert!(reason.contains("tokens")),
            other => panic!("expected BudgetExceeded, got {other:?}"),
        }
    }

    #[test]
    fn test_budget_pass_returns_estimate() {
        let guard = guard_with(1_000);
        let estimate = guard.check_budget(&ctx("pro"), "12345678").unwrap();
        assert_eq!(estimate, 2);
    }
}
