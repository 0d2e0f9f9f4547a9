//! The assemble, generate, validate flow.
//!
//! Each call is independent: no shared request queue, no admission control,
//! no "last response" slot. A request conceptually moves IDLE -> ASSEMBLING ->
//! AWAITING_RESPONSE -> {PARSED | PARSE_FAILED | TRANSPORT_FAILED}; the states
//! show up as tracing events, nothing is persisted.

use super::payload::AdvicePayload;
use super::prompt;
use super::schema::{self, Schema};
use super::types::{AdviceOutcome, AdviceRequest, AdviceResponse};
use super::validate;
use crate::error::{GenerateError, Result};
use crate::llm::GenerationBackend;
use crate::media::ImagePayload;
use std::time::Duration;

/// Bounded retry for transient generation failures.
///
/// Defaults to zero retries: out of the box a failed call fails, and the user
/// retriggers the action. Opting in only ever re-sends on `Transport` and
/// `RateLimited`; auth failures and refusals fail fast.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub base_backoff_ms: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 0,
            base_backoff_ms: 500,
        }
    }
}

pub struct AdvicePipeline {
    backend: Box<dyn GenerationBackend>,
    retry: RetryPolicy,
}

impl AdvicePipeline {
    #[must_use]
    pub fn new(backend: Box<dyn GenerationBackend>) -> Self {
        Self {
            backend,
            retry: RetryPolicy::default(),
        }
    }

    #[must_use]
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Run one advice request end to end.
    ///
    /// A response that arrived but failed validation is an `Ok` carrying
    /// `ParseFailed`, the expected branch for a best-effort endpoint. The
    /// `Err` branch is reserved for transport-class failures.
    pub async fn request_advice(
        &self,
        payload: &AdvicePayload,
        image: Option<ImagePayload>,
    ) -> Result<AdviceResponse> {
        let advice_type = payload.advice_type();
        tracing::debug!(advice_type = %advice_type, "assembling advice request");

        let request = prompt::assemble(payload, image)?;
        let response_schema = schema::get_schema(advice_type).map_err(anyhow::Error::from)?;

        tracing::debug!(advice_type = %advice_type, backend = self.backend.name(), "awaiting response");
        let raw = self.generate_with_retry(&request, response_schema).await?;

        let outcome = match validate::validate(&raw, response_schema) {
            Ok(parsed) => {
                tracing::debug!(advice_type = %advice_type, "response parsed");
                AdviceOutcome::Parsed(parsed)
            }
            Err(err) => {
                tracing::warn!(advice_type = %advice_type, error = %err, "response failed validation");
                AdviceOutcome::ParseFailed(err)
            }
        };

        Ok(AdviceResponse {
            advice_type,
            raw,
            outcome,
        })
    }

    async fn generate_with_retry(
        &self,
        request: &AdviceRequest,
        response_schema: &Schema,
    ) -> std::result::Result<String, GenerateError> {
        let mut backoff_ms = self.retry.base_backoff_ms.max(50);
        let mut attempt = 0u32;

        loop {
            match self.backend.generate(request, response_schema).await {
                Ok(raw) => {
                    if attempt > 0 {
                        tracing::info!(
                            backend = self.backend.name(),
                            attempt,
                            "endpoint recovered after retries"
                        );
                    }
                    return Ok(raw);
                }
                Err(err) if err.is_retryable() && attempt < self.retry.max_retries => {
                    let delay_ms = match &err {
                        GenerateError::RateLimited { retry_after_secs } => {
                            (retry_after_secs * 1000).max(backoff_ms)
                        }
                        _ => backoff_ms,
                    };
                    attempt += 1;
                    tracing::warn!(
                        backend = self.backend.name(),
                        attempt,
                        max_retries = self.retry.max_retries,
                        error = %err,
                        "generation failed, retrying"
                    );
                    tokio::time::sleep(Duration::from_millis(delay_ms)).await;
                    backoff_ms = backoff_ms.saturating_mul(2).min(10_000);
                }
                Err(err) => {
                    tracing::warn!(backend = self.backend.name(), error = %err, "generation failed");
                    return Err(err);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{AdvicePipeline, RetryPolicy};
    use crate::advice::payload::AdvicePayload;
    use crate::advice::schema::Schema;
    use crate::advice::types::{AdviceRequest, AdviceType};
    use crate::error::{CoachError, GenerateError};
    use crate::llm::GenerationBackend;
    use serde_json::json;
    use std::collections::VecDeque;
    use std::future::Future;
    use std::pin::Pin;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::{Arc, Mutex};

    /// Backend double that replays a scripted sequence of results.
    struct ScriptedBackend {
        script: Mutex<VecDeque<Result<String, GenerateError>>>,
        calls: Arc<AtomicU32>,
    }

    impl ScriptedBackend {
        fn new(script: Vec<Result<String, GenerateError>>) -> Self {
            Self {
                script: Mutex::new(script.into()),
                calls: Arc::new(AtomicU32::new(0)),
            }
        }
    }

    impl GenerationBackend for ScriptedBackend {
        fn name(&self) -> &str {
            "scripted"
        }

        fn generate<'a>(
            &'a self,
            _request: &'a AdviceRequest,
            _schema: &'a Schema,
        ) -> Pin<Box<dyn Future<Output = Result<String, GenerateError>> + Send + 'a>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let next = self
                .script
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(GenerateError::Transport("script exhausted".into())));
            Box::pin(async move { next })
        }
    }

    /// Backend double that answers per advice type, for concurrency tests.
    struct PerTypeBackend;

    impl GenerationBackend for PerTypeBackend {
        fn name(&self) -> &str {
            "per-type"
        }

        fn generate<'a>(
            &'a self,
            request: &'a AdviceRequest,
            _schema: &'a Schema,
        ) -> Pin<Box<dyn Future<Output = Result<String, GenerateError>> + Send + 'a>> {
            let advice_type = request.advice_type;
            Box::pin(async move {
                // Let the other in-flight request interleave.
                tokio::task::yield_now().await;
                Ok(match advice_type {
                    AdviceType::MacroTargets => json!({"calories": 2000}).to_string(),
                    _ => json!({"headline": "Coaching that sticks"}).to_string(),
                })
            })
        }
    }

    fn macro_payload() -> AdvicePayload {
        AdvicePayload::MacroTargets {
            profile: crate::advice::payload::ClientProfile {
                name: None,
                age: 40,
                sex: None,
                weight_kg: 90.0,
                height_cm: None,
                tier: crate::identity::Tier::Advanced,
                allergens: vec![],
                goal: "strength".into(),
            },
            activity_level: "active".into(),
        }
    }

    fn copy_payload() -> AdvicePayload {
        AdvicePayload::MarketingCopy {
            offer: "12-week program".into(),
            audience: "busy parents".into(),
            tone: "warm".into(),
        }
    }

    #[tokio::test]
    async fn conformant_response_is_parsed() {
        let backend = ScriptedBackend::new(vec![Ok(json!({"calories": 2000}).to_string())]);
        let pipeline = AdvicePipeline::new(Box::new(backend));
        let response = pipeline.request_advice(&macro_payload(), None).await.unwrap();
        assert!(response.is_parsed());
        assert_eq!(response.parsed().unwrap()["calories"], 2000);
    }

    #[tokio::test]
    async fn malformed_response_is_ok_with_parse_failed() {
        let backend =
            ScriptedBackend::new(vec![Ok("Sorry, I cannot process this image.".into())]);
        let pipeline = AdvicePipeline::new(Box::new(backend));
        let response = pipeline.request_advice(&macro_payload(), None).await.unwrap();
        assert!(!response.is_parsed());
        assert!(response.parse_error().is_some());
        assert_eq!(response.raw, "Sorry, I cannot process this image.");
    }

    #[tokio::test]
    async fn transport_failure_is_not_retried_by_default() {
        let backend = ScriptedBackend::new(vec![Err(GenerateError::Transport("down".into()))]);
        let calls = Arc::clone(&backend.calls);
        let pipeline = AdvicePipeline::new(Box::new(backend));
        let result = pipeline.request_advice(&macro_payload(), None).await;
        assert!(matches!(
            result,
            Err(CoachError::Generate(GenerateError::Transport(_)))
        ));
        // One attempt, zero retries.
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn bounded_retry_recovers_from_transient_failures() {
        let backend = ScriptedBackend::new(vec![
            Err(GenerateError::Transport("blip".into())),
            Err(GenerateError::Transport("blip".into())),
            Ok(json!({"calories": 1800}).to_string()),
        ]);
        let calls = Arc::clone(&backend.calls);
        let pipeline = AdvicePipeline::new(Box::new(backend)).with_retry(RetryPolicy {
            max_retries: 2,
            base_backoff_ms: 1,
        });
        let response = pipeline.request_advice(&macro_payload(), None).await.unwrap();
        assert!(response.is_parsed());
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn auth_failure_is_never_retried() {
        let backend = ScriptedBackend::new(vec![Err(GenerateError::Auth("expired".into()))]);
        let calls = Arc::clone(&backend.calls);
        let pipeline = AdvicePipeline::new(Box::new(backend)).with_retry(RetryPolicy {
            max_retries: 3,
            base_backoff_ms: 1,
        });
        let result = pipeline.request_advice(&macro_payload(), None).await;
        assert!(matches!(
            result,
            Err(CoachError::Generate(GenerateError::Auth(_)))
        ));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn concurrent_requests_resolve_independently() {
        let pipeline = AdvicePipeline::new(Box::new(PerTypeBackend));

        let macro_payload = macro_payload();
        let copy_payload = copy_payload();
        let (macros, copy) = tokio::join!(
            pipeline.request_advice(&macro_payload, None),
            pipeline.request_advice(&copy_payload, None),
        );

        let macros = macros.unwrap();
        let copy = copy.unwrap();
        assert_eq!(macros.advice_type, AdviceType::MacroTargets);
        assert_eq!(macros.parsed().unwrap()["calories"], 2000);
        assert_eq!(copy.advice_type, AdviceType::MarketingCopy);
        assert_eq!(
            copy.parsed().unwrap()["headline"],
            "Coaching that sticks"
        );
    }
}
