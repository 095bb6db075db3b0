//! Provider trait and shared transport types.

use async_trait::async_trait;
use std::fmt;

/// Error type for raw provider calls.
///
/// Retryability is NOT encoded here; that decision belongs to
/// [`crate::classify::classify_provider_error`], which inspects the rendered
/// message. The transport only reports what happened.
#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    #[error("API request failed: {0}")]
    RequestFailed(String),

    #[error("API returned error: [{status}] {message}")]
    ApiError { status: u16, message: String },

    #[error("Failed to decode provider response: {0}")]
    DecodeError(String),

    #[error("Provider not configured: {0}")]
    NotConfigured(String),
}

/// Token accounting reported by the provider for one call.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokenUsage {
    pub input_tokens: u64,
    pub output_tokens: u64,
}

impl TokenUsage {
    pub fn total_tokens(&self) -> u64 {
        self.input_tokens + self.output_tokens
    }
}

/// One successful provider completion.
#[derive(Debug, Clone)]
pub struct Completion {
    /// The raw model output text.
    pub text: String,
    /// Token accounting, when the provider reports it.
    pub usage: Option<TokenUsage>,
}

/// Trait for text-generation providers.
///
/// Implementations are stateless per call and thread-safe; retry and failure
/// classification are layered on top by [`crate::client::GenerationClient`].
#[async_trait]
pub trait LlmProvider: Send + Sync + fmt::Debug {
    /// Send a prompt to the provider and return the model's text response.
    async fn complete(&self, prompt: &str) -> Result<Completion, LlmError>;

    /// Provider name for logging (e.g. "anthropic", "fake").
    fn provider_name(&self) -> &'static str;
}

/// Placeholder provider used when no real credentials are present.
///
/// Every call fails with [`LlmError::NotConfigured`], which the call layer
/// surfaces without retrying. Lets the API serve job-status traffic even
/// before generation credentials are provisioned.
#[derive(Debug)]
pub struct UnconfiguredProvider;

#[async_trait]
impl LlmProvider for UnconfiguredProvider {
    async fn complete(&self, _prompt: &str) -> Result<Completion, LlmError> {
        Err(LlmError::NotConfigured(
            "no generation provider configured".into(),
        ))
    }

    fn provider_name(&self) -> &'static str {
        "unconfigured"
    }
}
