//! Scripted in-memory provider for tests and offline development.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::provider::{Completion, LlmError, LlmProvider, TokenUsage};

/// One scripted outcome for a [`FakeProvider`] call.
pub type ScriptedResult = Result<String, LlmError>;

/// A fake provider that plays back a queue of scripted outcomes.
///
/// When the script runs dry, further calls return the default response.
/// The attempt counter lets tests assert exactly how many calls were made.
#[derive(Debug)]
pub struct FakeProvider {
    script: Mutex<VecDeque<ScriptedResult>>,
    default_response: String,
    calls: AtomicU32,
}

impl Default for FakeProvider {
    fn default() -> Self {
        Self::new("{}")
    }
}

impl FakeProvider {
    /// Create a provider with no script; every call returns `default_response`.
    pub fn new(default_response: &str) -> Self {
        Self {
            script: Mutex::new(VecDeque::new()),
            default_response: default_response.to_string(),
            calls: AtomicU32::new(0),
        }
    }

    /// Queue an outcome to be returned by the next unscripted call.
    pub fn push(&self, result: ScriptedResult) {
        self.script.lock().unwrap().push_back(result);
    }

    /// Queue `count` failures rendering to `message`, then nothing.
    pub fn push_failures(&self, count: usize, message: &str) {
        for _ in 0..count {
            self.push(Err(LlmError::RequestFailed(message.to_string())));
        }
    }

    /// Number of calls made so far.
    pub fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl LlmProvider for FakeProvider {
    async fn complete(&self, _prompt: &str) -> Result<Completion, LlmError> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        let next = self.script.lock().unwrap().pop_front();
        match next {
            Some(Ok(text)) => Ok(Completion {
                text,
                usage: Some(TokenUsage {
                    input_tokens: 10,
                    output_tokens: 20,
                }),
            }),
            Some(Err(e)) => Err(e),
            None => Ok(Completion {
                text: self.default_response.clone(),
                usage: None,
            }),
        }
    }

    fn provider_name(&self) -> &'static str {
        "fake"
    }
}
