//! Narrative generation seam
//!
//! Specialists hand structured numbers to a `Narrator` and get prose back.
//! The production narrator wraps the Gemini client behind the process-wide
//! rate limiter; tests use `MockNarrator` and never touch the network.

use crate::gemini::GeminiClient;
use crate::rate_limit::RateLimiter;
use crate::Result;
use async_trait::async_trait;
use std::sync::Arc;

/// Turns a persona block plus a task block into prose. Opaque: callers get
/// one shot, no retry contract.
#[async_trait]
pub trait Narrator: Send + Sync {
    async fn narrate(&self, persona: &str, task: &str, temperature: f32) -> Result<String>;
}

pub struct GeminiNarrator {
    client: GeminiClient,
    limiter: Arc<RateLimiter>,
}

impl GeminiNarrator {
    pub fn new(api_key: String, limiter: Arc<RateLimiter>) -> Self {
        Self {
            client: GeminiClient::new(api_key),
            limiter,
        }
    }
}

#[async_trait]
impl Narrator for GeminiNarrator {
    async fn narrate(&self, persona: &str, task: &str, temperature: f32) -> Result<String> {
        self.limiter.acquire_slot().await;
        self.client.generate(persona, task, temperature).await
    }
}

/// Test narrator with a canned response (or a canned failure).
pub struct MockNarrator {
    pub response: Option<String>,
}

impl MockNarrator {
    pub fn replying(text: &str) -> Self {
        Self {
            response: Some(text.to_string()),
        }
    }

    pub fn failing() -> Self {
        Self { response: None }
    }
}

#[async_trait]
impl Narrator for MockNarrator {
    async fn narrate(&self, _persona: &str, _task: &str, _temperature: f32) -> Result<String> {
        self.response
            .clone()
            .ok_or_else(|| crate::error::AdvisorError::LlmError("mock failure".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_narrator_replies() {
        let narrator = MockNarrator::replying("Your finances look solid.");
        let text = narrator.narrate("persona", "task", 0.1).await;
        assert_eq!(text.ok().as_deref(), Some("Your finances look solid."));
    }

    #[tokio::test]
    async fn test_mock_narrator_fails() {
        let narrator = MockNarrator::failing();
        assert!(narrator.narrate("persona", "task", 0.1).await.is_err());
    }
}
