//! Integration tests for the ideation workflow
//!
//! These drive the public surface end to end with scripted provider
//! responses and simple in-process collaborators.

use std::sync::Arc;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use ideabuilder::{
    BudgetDecision, CallContext, FeatureGate, FocusType, GenerateError, GenerationOutput,
    GenerationRequest, IdeaWorkflow, Phase, RateLimiter, Round, TextGenerator, TextSanitizer,
    TokenBudget, WorkflowConfig, WorkflowError, WorkflowInput,
};

// =============================================================================
// Test collaborators
// =============================================================================

struct ScriptedGenerator {
    responses: Mutex<Vec<Result<GenerationOutput, GenerateError>>>,
}

impl ScriptedGenerator {
    fn with_texts(texts: Vec<String>) -> Self {
        Self {
            responses: Mutex::new(
                texts
                    .into_iter()
                    .map(|content| Ok(GenerationOutput { content }))
                    .collect(),
            ),
        }
    }
}

#[async_trait]
impl TextGenerator for ScriptedGenerator {
    async fn generate(&self, _request: GenerationRequest) -> Result<GenerationOutput, GenerateError> {
        let mut queue = self.responses.lock().unwrap();
        if queue.is_empty() {
            return Err(GenerateError::new("no more scripted responses"));
        }
        queue.remove(0)
    }
}

/// Gate that denies the "free" tier
struct PaidGate;

impl FeatureGate for PaidGate {
    fn is_available(&self, tier: &str, _feature: &str) -> bool {
        tier != "free"
    }
}

/// Limiter allowing a fixed number of calls
struct BudgetedLimiter {
    calls: Mutex<u32>,
}

impl BudgetedLimiter {
    fn new() -> Self {
        Self { calls: Mutex::new(0) }
    }
}

impl RateLimiter for BudgetedLimiter {
    fn is_allowed(&self, _key: &str, max_calls: u32, _window: Duration) -> bool {
        let mut calls = self.calls.lock().unwrap();
        *calls += 1;
        *calls <= max_calls
    }
}

/// Budget estimating ~4 chars per token, recording usage calls
struct RecordingBudget {
    recorded: Mutex<Vec<(u64, u64)>>,
}

impl RecordingBudget {
    fn new() -> Self {
        Self {
            recorded: Mutex::new(Vec::new()),
        }
    }
}

impl TokenBudget for RecordingBudget {
    fn estimate_tokens(&self, text: &str) -> u64 {
        (text.len() as u64).div_ceil(4)
    }

    fn validate(&self, _user_id: &str, _tier: &str, _estimated_tokens: u64) -> BudgetDecision {
        BudgetDecision {
            allowed: true,
            reason: None,
        }
    }

    fn record_usage(&self, _user_id: &str, prompt_tokens: u64, response_tokens: u64) {
        self.recorded.lock().unwrap().push((prompt_tokens, response_tokens));
    }
}

struct TrimSanitizer;

impl TextSanitizer for TrimSanitizer {
    fn sanitize(&self, text: &str, max_len: usize) -> Result<String, String> {
        Ok(text.trim().chars().take(max_len).collect())
    }
}

// =============================================================================
// Scripted provider output
// =============================================================================

fn shape_b_package() -> String {
    let entries: Vec<String> = (1..=5)
        .map(|i| {
            format!(
                r#"{{"text": "Round one statement {i}", "scaleLabels": ["Not at all", "Slightly", "Somewhat", "Mostly", "Completely"]}}"#
            )
        })
        .collect();
    format!("```json\n{{\"questions\": [{}]}}\n```", entries.join(","))
}

fn shape_a_package(prefix: &str) -> String {
    let entries: Vec<String> = (1..=5).map(|i| format!("\"{prefix} {i}\"")).collect();
    format!(r#"{{"questions": [{}]}}"#, entries.join(","))
}

const PLAN_TEXT: &str = "## Overview\nA complete plan for the idea.\n## Timeline\nSix months.";

/// Route engine tracing through the test harness; honors RUST_LOG
fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn workflow(texts: Vec<String>) -> (IdeaWorkflow, Arc<RecordingBudget>) {
    init_tracing();
    let budget = Arc::new(RecordingBudget::new());
    let workflow = IdeaWorkflow::new(
        Arc::new(ScriptedGenerator::with_texts(texts)),
        Arc::new(PaidGate),
        Arc::new(BudgetedLimiter::new()),
        budget.clone(),
        Arc::new(TrimSanitizer),
        WorkflowConfig::default(),
    )
    .unwrap();
    (workflow, budget)
}

fn ctx(tier: &str) -> CallContext {
    CallContext::new("user-7", tier, "English")
}

// =============================================================================
// End-to-end scenario
// =============================================================================

#[tokio::test]
async fn test_full_workflow_to_report() {
    let idea = "Turn my meeting notes into content plans";
    assert_eq!(idea.len(), 40);

    let (mut workflow, budget) = workflow(vec![
        shape_b_package(),
        shape_a_package("Round two statement"),
        shape_a_package("Focus item"),
        PLAN_TEXT.to_string(),
    ]);
    let ctx = ctx("pro");

    // input -> round1 via a Shape-B package of 5
    let outcome = workflow
        .advance(&ctx, WorkflowInput::Idea(idea.to_string()))
        .await
        .unwrap();
    assert_eq!(outcome.phase, Phase::Round1);
    assert_eq!(outcome.questions.len(), 5);

    // Answer all 5 with scale 3; model-supplied labels resolve
    for i in 0..5 {
        workflow
            .advance(&ctx, WorkflowInput::Answer { round: Round::One, index: i, scale: 3 })
            .await
            .unwrap();
    }
    assert_eq!(
        workflow.session().round(Round::One).answers[0].label,
        "Somewhat"
    );

    // round1 -> round2 via a Shape-A package of 5
    let outcome = workflow.advance(&ctx, WorkflowInput::Next).await.unwrap();
    assert_eq!(outcome.phase, Phase::Round2);

    for i in 0..5 {
        workflow
            .advance(&ctx, WorkflowInput::Answer { round: Round::Two, index: i, scale: 5 })
            .await
            .unwrap();
    }
    workflow
        .advance(&ctx, WorkflowInput::Focus(FocusType::Combined))
        .await
        .unwrap();

    // round2 -> round3
    let outcome = workflow.advance(&ctx, WorkflowInput::Next).await.unwrap();
    assert_eq!(outcome.phase, Phase::Round3);
    assert_eq!(outcome.questions.len(), 5);

    // Partial completion: 2 of 5 prioritized
    workflow
        .advance(&ctx, WorkflowInput::Answer { round: Round::Three, index: 0, scale: 5 })
        .await
        .unwrap();
    workflow
        .advance(&ctx, WorkflowInput::Answer { round: Round::Three, index: 1, scale: 2 })
        .await
        .unwrap();

    // round3 -> generating_plan
    let outcome = workflow.advance(&ctx, WorkflowInput::Next).await.unwrap();
    assert_eq!(outcome.phase, Phase::GeneratingPlan);

    let report = workflow.report().unwrap();

    // Plan text first, appended summary after
    assert!(report.starts_with(PLAN_TEXT));
    assert!(report.contains(idea));

    // 12 answered pairs: 5 + 5 + 2
    assert_eq!(report.matches("Answer:").count(), 12);
    assert!(report.contains("Round one statement 1"));
    assert!(report.contains("Round two statement 5"));
    assert!(report.contains("Focus item 2"));
    assert!(!report.contains("Focus item 3"));
    assert!(report.contains("Must have (5/5)"));
    assert!(report.contains("Nice to have (2/5)"));

    // Usage recorded once per non-empty response
    assert_eq!(budget.recorded.lock().unwrap().len(), 4);
}

// =============================================================================
// Failure paths
// =============================================================================

#[tokio::test]
async fn test_short_idea_always_fails_validation() {
    let (mut workflow, _) = workflow(vec![shape_b_package()]);
    let ctx = ctx("pro");

    let err = workflow
        .advance(&ctx, WorkflowInput::Idea("only 29 characters long idea!".to_string()))
        .await
        .unwrap_err();

    assert!(matches!(err, WorkflowError::Validation(_)));
    assert_eq!(workflow.phase(), Phase::Input);
}

#[tokio::test]
async fn test_free_tier_gets_upgrade_required() {
    let (mut workflow, _) = workflow(vec![shape_b_package()]);
    let ctx = ctx("free");

    let err = workflow
        .advance(
            &ctx,
            WorkflowInput::Idea("Turn my meeting notes into content plans".to_string()),
        )
        .await
        .unwrap_err();

    assert!(err.is_upgrade_required());
    assert_eq!(workflow.phase(), Phase::Input);
}

#[tokio::test]
async fn test_rate_limit_fails_closed_without_generation() {
    init_tracing();
    let config = WorkflowConfig {
        limits: ideabuilder::LimitsConfig {
            max_calls: 1,
            ..Default::default()
        },
        ..Default::default()
    };
    let mut workflow = IdeaWorkflow::new(
        Arc::new(ScriptedGenerator::with_texts(vec![
            shape_b_package(),
            shape_a_package("Round two statement"),
        ])),
        Arc::new(PaidGate),
        Arc::new(BudgetedLimiter::new()),
        Arc::new(RecordingBudget::new()),
        Arc::new(TrimSanitizer),
        config,
    )
    .unwrap();
    let ctx = ctx("pro");

    workflow
        .advance(
            &ctx,
            WorkflowInput::Idea("Turn my meeting notes into content plans".to_string()),
        )
        .await
        .unwrap();
    for i in 0..5 {
        workflow
            .advance(&ctx, WorkflowInput::Answer { round: Round::One, index: i, scale: 4 })
            .await
            .unwrap();
    }

    let err = workflow.advance(&ctx, WorkflowInput::Next).await.unwrap_err();
    assert!(matches!(err, WorkflowError::RateLimited));
    assert_eq!(workflow.phase(), Phase::Round1);
}

#[tokio::test]
async fn test_malformed_round2_preserves_round1_state() {
    let (mut workflow, _) = workflow(vec![
        shape_b_package(),
        "the model rambled and returned no JSON".to_string(),
        shape_a_package("Round two statement"),
    ]);
    let ctx = ctx("pro");

    workflow
        .advance(
            &ctx,
            WorkflowInput::Idea("Turn my meeting notes into content plans".to_string()),
        )
        .await
        .unwrap();
    for i in 0..5 {
        workflow
            .advance(&ctx, WorkflowInput::Answer { round: Round::One, index: i, scale: 2 })
            .await
            .unwrap();
    }
    let round1_before = workflow.session().round(Round::One).answers.clone();

    let err = workflow.advance(&ctx, WorkflowInput::Next).await.unwrap_err();
    assert!(matches!(err, WorkflowError::MalformedResponse));
    assert_eq!(workflow.phase(), Phase::Round1);
    assert_eq!(workflow.session().round(Round::One).answers, round1_before);
    assert!(workflow.session().round(Round::Two).questions.is_empty());

    // The same transition can be retried and succeed
    let outcome = workflow.advance(&ctx, WorkflowInput::Next).await.unwrap();
    assert_eq!(outcome.phase, Phase::Round2);
}

#[tokio::test]
async fn test_round3_advances_with_single_answer_but_rounds_1_2_do_not() {
    let (mut workflow, _) = workflow(vec![
        shape_b_package(),
        shape_a_package("Round two statement"),
        shape_a_package("Focus item"),
        PLAN_TEXT.to_string(),
    ]);
    let ctx = ctx("pro");

    workflow
        .advance(
            &ctx,
            WorkflowInput::Idea("Turn my meeting notes into content plans".to_string()),
        )
        .await
        .unwrap();

    // Fewer than 5 answered blocks round 1
    for i in 0..4 {
        workflow
            .advance(&ctx, WorkflowInput::Answer { round: Round::One, index: i, scale: 3 })
            .await
            .unwrap();
    }
    assert!(workflow.advance(&ctx, WorkflowInput::Next).await.is_err());
    workflow
        .advance(&ctx, WorkflowInput::Answer { round: Round::One, index: 4, scale: 3 })
        .await
        .unwrap();
    workflow.advance(&ctx, WorkflowInput::Next).await.unwrap();

    for i in 0..5 {
        workflow
            .advance(&ctx, WorkflowInput::Answer { round: Round::Two, index: i, scale: 3 })
            .await
            .unwrap();
    }
    workflow
        .advance(&ctx, WorkflowInput::Focus(FocusType::Functional))
        .await
        .unwrap();
    workflow.advance(&ctx, WorkflowInput::Next).await.unwrap();

    // Zero answers blocks the plan; one is enough
    assert!(workflow.advance(&ctx, WorkflowInput::Next).await.is_err());
    workflow
        .advance(&ctx, WorkflowInput::Answer { round: Round::Three, index: 3, scale: 4 })
        .await
        .unwrap();
    let outcome = workflow.advance(&ctx, WorkflowInput::Next).await.unwrap();
    assert_eq!(outcome.phase, Phase::GeneratingPlan);
    assert_eq!(workflow.report().unwrap().matches("Answer:").count(), 11);
}
