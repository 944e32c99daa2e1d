//! Text-generation provider interface
//!
//! The provider is a pure black box: prompt in, text out, fallible. The
//! engine never sees transport, streaming, or provider internals; the host
//! application implements [`TextGenerator`] over whatever client it uses.

use async_trait::async_trait;
use thiserror::Error;

/// Per-call caller context, injected explicitly on every transition
///
/// Nothing in the engine reads ambient state: tier, language, and identity
/// always arrive through this struct.
#[derive(Debug, Clone)]
pub struct CallContext {
    /// Opaque caller identity (budget accounting key)
    pub user_id: String,
    /// Opaque subscription tier, interpreted only by the feature gate
    pub tier: String,
    /// Target output language; pinned into every compiled prompt
    pub language: String,
}

impl CallContext {
    pub fn new(
        user_id: impl Into<String>,
        tier: impl Into<String>,
        language: impl Into<String>,
    ) -> Self {
        Self {
            user_id: user_id.into(),
            tier: tier.into(),
            language: language.into(),
        }
    }
}

/// Everything needed for one generation call
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    /// Compiled prompt text
    pub prompt: String,
    /// Function-type tag for the provider's own accounting
    pub function: String,
    /// Opaque caller identity
    pub user_id: String,
    /// Opaque tier value
    pub tier: String,
    /// Max tokens for the response
    pub max_tokens: u32,
}

/// Result of a successful generation call
///
/// `content` may still be blank; the workflow treats that as a distinct
/// failure (`EmptyResponse`) from a provider error.
#[derive(Debug, Clone)]
pub struct GenerationOutput {
    pub content: String,
}

/// A failure of the generation call itself
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct GenerateError {
    pub message: String,
}

impl GenerateError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Stateless text generator - each call is independent
///
/// There is at most one outstanding call per workflow at any time; the
/// phase controller enforces this with an in-flight flag. There is no
/// cancellation primitive: an abandoned call runs to completion and its
/// result is discarded with the workflow value.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, request: GenerationRequest) -> Result<GenerationOutput, GenerateError>;
}

#[cfg(test)]
pub mod mock {
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    /// Scripted generator for unit tests: returns queued outcomes in order
    pub struct ScriptedGenerator {
        responses: Mutex<Vec<Result<GenerationOutput, GenerateError>>>,
        call_count: AtomicUsize,
    }

    impl ScriptedGenerator {
        pub fn new(responses: Vec<Result<GenerationOutput, GenerateError>>) -> Self {
            Self {
                responses: Mutex::new(responses),
                call_count: AtomicUsize::new(0),
            }
        }

        /// Convenience: queue plain-text successful responses
        pub fn with_texts(texts: Vec<&str>) -> Self {
            Self::new(
                texts
                    .into_iter()
                    .map(|t| {
                        Ok(GenerationOutput {
                            content: t.to_string(),
                        })
                    })
                    .collect(),
            )
        }

        pub fn call_count(&self) -> usize {
            self.call_count.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl TextGenerator for ScriptedGenerator {
        async fn generate(
            &self,
            _request: GenerationRequest,
        ) -> Result<GenerationOutput, GenerateError> {
            self.call_count.fetch_add(1, Ordering::SeqCst);
            let mut queue = self.responses.lock().unwrap();
            if queue.is_empty() {
                return Err(GenerateError::new("no more scripted responses"));
            }
            queue.remove(0)
        }
    }

    #[tokio::test]
    async fn test_scripted_generator_returns_in_order() {
        let generator = ScriptedGenerator::with_texts(vec!["first", "second"]);

        let req = GenerationRequest {
            prompt: "p".to_string(),
            function: "idea-builder".to_string(),
            user_id: "u1".to_string(),
            tier: "pro".to_string(),
            max_tokens: 100,
        };

        assert_eq!(generator.generate(req.clone()).await.unwrap().content, "first");
        assert_eq!(generator.generate(req.clone()).await.unwrap().content, "second");
        assert!(generator.generate(req).await.is_err());
        assert_eq!(generator.call_count(), 3);
    }
}
