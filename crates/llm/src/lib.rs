//! Provider abstraction and resilient call layer for text generation.
//!
//! [`provider::LlmProvider`] is the transport seam: the real Anthropic
//! implementation lives in [`anthropic`], a scripted in-memory one in
//! [`fake`]. [`client::GenerationClient`] wraps any provider with the
//! bounded retry policy ([`backoff`]) and failure classification
//! ([`classify`]).

pub mod anthropic;
pub mod backoff;
pub mod classify;
pub mod client;
pub mod fake;
pub mod provider;

pub use backoff::RetryPolicy;
pub use classify::{classify_provider_error, RetryDecision};
pub use client::{GenerationClient, GenerationError};
pub use anthropic::AnthropicProvider;
pub use fake::FakeProvider;
pub use provider::{Completion, LlmError, LlmProvider, TokenUsage, UnconfiguredProvider};
