//! Resilient generation call layer: bounded retries with classification.

use std::sync::Arc;

use crate::backoff::RetryPolicy;
use crate::classify::{classify_provider_error, RetryDecision};
use crate::provider::{LlmError, LlmProvider};

/// Terminal failure of a generation call, after classification and (for
/// transient causes) retry exhaustion. Wraps the last underlying cause.
#[derive(Debug, thiserror::Error)]
pub enum GenerationError {
    #[error("generation failed after {attempts} attempts: {last_cause}")]
    RetriesExhausted { attempts: u32, last_cause: String },

    #[error("generation failed: {0}")]
    Fatal(String),

    #[error("provider not configured: {0}")]
    NotConfigured(String),
}

/// Wraps a single provider call with the bounded retry policy.
///
/// The provider is injected rather than constructed internally so tests can
/// substitute a scripted transport and so one shared HTTP client is owned by
/// whoever builds the application state.
#[derive(Debug, Clone)]
pub struct GenerationClient {
    provider: Arc<dyn LlmProvider>,
    policy: RetryPolicy,
}

impl GenerationClient {
    pub fn new(provider: Arc<dyn LlmProvider>, policy: RetryPolicy) -> Self {
        Self { provider, policy }
    }

    pub fn with_default_policy(provider: Arc<dyn LlmProvider>) -> Self {
        Self::new(provider, RetryPolicy::default())
    }

    /// Call the provider, retrying transient failures per the policy.
    ///
    /// Succeeds with the raw model text. Token accounting is logged when the
    /// provider reports it; it is not part of the return contract.
    pub async fn generate(&self, prompt: &str) -> Result<String, GenerationError> {
        let max_attempts = self.policy.max_retries + 1;
        let mut last_cause = String::new();

        for attempt in 1..=max_attempts {
            match self.provider.complete(prompt).await {
                Ok(completion) => {
                    if let Some(usage) = completion.usage {
                        tracing::info!(
                            provider = self.provider.provider_name(),
                            attempt,
                            input_tokens = usage.input_tokens,
                            output_tokens = usage.output_tokens,
                            total_tokens = usage.total_tokens(),
                            "Generation call succeeded",
                        );
                    } else {
                        tracing::info!(
                            provider = self.provider.provider_name(),
                            attempt,
                            "Generation call succeeded (no usage reported)",
                        );
                    }
                    return Ok(completion.text);
                }
                Err(LlmError::NotConfigured(msg)) => {
                    return Err(GenerationError::NotConfigured(msg));
                }
                Err(e) => {
                    let message = e.to_string();
                    match classify_provider_error(&message) {
                        RetryDecision::Abort => {
                            tracing::warn!(
                                provider = self.provider.provider_name(),
                                attempt,
                                error = %message,
                                "Non-retryable provider error",
                            );
                            return Err(GenerationError::Fatal(message));
                        }
                        RetryDecision::Retry => {
                            last_cause = message;
                        }
                    }
                }
            }

            if attempt < max_attempts {
                let base = self.policy.base_delay(attempt - 1);
                let delay = self.policy.jittered(base);
                tracing::warn!(
                    provider = self.provider.provider_name(),
                    attempt,
                    delay_ms = delay.as_millis() as u64,
                    error = %last_cause,
                    "Transient provider error, retrying",
                );
                tokio::time::sleep(delay).await;
            }
        }

        Err(GenerationError::RetriesExhausted {
            attempts: max_attempts,
            last_cause,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fake::FakeProvider;
    use assert_matches::assert_matches;

    fn client_with(provider: FakeProvider) -> (GenerationClient, Arc<FakeProvider>) {
        let provider = Arc::new(provider);
        (
            GenerationClient::with_default_policy(provider.clone() as Arc<dyn LlmProvider>),
            provider,
        )
    }

    #[tokio::test(start_paused = true)]
    async fn succeeds_after_transient_failures() {
        let fake = FakeProvider::new("ok");
        fake.push_failures(3, "503 Service Unavailable");
        fake.push(Ok("recovered".into()));
        let (client, fake) = client_with(fake);

        let text = client.generate("prompt").await.unwrap();
        assert_eq!(text, "recovered");
        // 3 failures + 1 success = 4 attempts (3 retries).
        assert_eq!(fake.calls(), 4);
    }

    #[tokio::test]
    async fn non_retryable_error_aborts_after_one_attempt() {
        let fake = FakeProvider::new("unused");
        fake.push(Err(LlmError::ApiError {
            status: 401,
            message: "invalid api key".into(),
        }));
        let (client, fake) = client_with(fake);

        let err = client.generate("prompt").await.unwrap_err();
        assert_matches!(err, GenerationError::Fatal(ref msg) if msg.contains("invalid api key"));
        assert_eq!(fake.calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn exhausts_retries_and_wraps_last_cause() {
        let fake = FakeProvider::new("unused");
        fake.push_failures(5, "[503] still overloaded");
        let (client, fake) = client_with(fake);

        let err = client.generate("prompt").await.unwrap_err();
        assert_matches!(
            err,
            GenerationError::RetriesExhausted { attempts: 5, ref last_cause }
                if last_cause.contains("still overloaded")
        );
        assert_eq!(fake.calls(), 5);
    }

    #[tokio::test]
    async fn not_configured_short_circuits() {
        let fake = FakeProvider::new("unused");
        fake.push(Err(LlmError::NotConfigured("ANTHROPIC_API_KEY not set".into())));
        let (client, fake) = client_with(fake);

        let err = client.generate("prompt").await.unwrap_err();
        assert_matches!(err, GenerationError::NotConfigured(_));
        assert_eq!(fake.calls(), 1);
    }
}
