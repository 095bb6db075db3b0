//! Failure classification for provider errors.
//!
//! Classification is an explicit function over literal tables rather than
//! ad-hoc message inspection at call sites, so the retry contract can be
//! unit-tested as (input, expected decision) pairs.

/// Whether a failed provider call should be retried.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryDecision {
    /// Transient failure, eligible for bounded backoff retry.
    Retry,
    /// Fatal failure: abort immediately, do not retry.
    Abort,
}

/// HTTP status tokens that mark an error as transient. Matched as the bare
/// number, which also covers the bracket-prefixed `[503]` rendering.
const RETRYABLE_STATUS_TOKENS: [&str; 5] = ["503", "429", "500", "502", "504"];

/// Case-insensitive message fragments that mark an error as transient.
const RETRYABLE_MESSAGE_FRAGMENTS: [&str; 10] = [
    "overloaded",
    "rate limit",
    "too many requests",
    "service unavailable",
    "temporarily unavailable",
    "try again later",
    "timeout",
    "econnreset",
    "enotfound",
    "etimedout",
];

/// Classify a rendered provider error message.
///
/// Any message not matching the transient tables is fatal: a bad API key or
/// a malformed request will never heal by retrying.
pub fn classify_provider_error(message: &str) -> RetryDecision {
    if RETRYABLE_STATUS_TOKENS
        .iter()
        .any(|token| message.contains(token))
    {
        return RetryDecision::Retry;
    }

    let lowered = message.to_lowercase();
    if RETRYABLE_MESSAGE_FRAGMENTS
        .iter()
        .any(|fragment| lowered.contains(fragment))
    {
        return RetryDecision::Retry;
    }

    RetryDecision::Abort
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classification_table() {
        let cases: &[(&str, RetryDecision)] = &[
            // Status tokens, bare and bracket-prefixed.
            ("503 Service Unavailable", RetryDecision::Retry),
            ("API returned error: [503] upstream down", RetryDecision::Retry),
            ("status 429", RetryDecision::Retry),
            ("got 500 from upstream", RetryDecision::Retry),
            ("[502] bad gateway", RetryDecision::Retry),
            ("[504] gateway timeout", RetryDecision::Retry),
            // Message fragments, case-insensitive.
            ("Overloaded", RetryDecision::Retry),
            ("Rate Limit exceeded", RetryDecision::Retry),
            ("Too Many Requests", RetryDecision::Retry),
            ("service unavailable right now", RetryDecision::Retry),
            ("model temporarily unavailable", RetryDecision::Retry),
            ("please try again later", RetryDecision::Retry),
            ("connect timeout", RetryDecision::Retry),
            ("ECONNRESET", RetryDecision::Retry),
            ("getaddrinfo ENOTFOUND api.example.com", RetryDecision::Retry),
            ("ETIMEDOUT", RetryDecision::Retry),
            // Fatal.
            ("invalid api key", RetryDecision::Abort),
            ("[401] authentication_error", RetryDecision::Abort),
            ("[400] max_tokens must be positive", RetryDecision::Abort),
            ("model not found", RetryDecision::Abort),
            ("", RetryDecision::Abort),
        ];

        for (message, expected) in cases {
            assert_eq!(
                classify_provider_error(message),
                *expected,
                "misclassified: {message:?}"
            );
        }
    }
}
