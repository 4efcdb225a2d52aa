use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;

use super::AnswerProvider;

pub const DEFAULT_LATENCY: Duration = Duration::from_millis(900);

const CANNED_ANSWER: &str = "\
Great question! This is a placeholder answer while no real backend is connected.
A real provider would send your question to an AI service and return its explanation here.
Point askbox at a backend with --endpoint (or ASKBOX_ENDPOINT) and --provider http to get real answers.";

/// Placeholder provider: waits a fixed latency and returns the same answer
/// for every question.
#[derive(Debug, Clone)]
pub struct StubProvider {
    latency: Duration,
}

impl StubProvider {
    pub fn new() -> Self {
        Self::with_latency(DEFAULT_LATENCY)
    }

    pub fn with_latency(latency: Duration) -> Self {
        Self { latency }
    }

    pub fn latency(&self) -> Duration {
        self.latency
    }
}

impl Default for StubProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AnswerProvider for StubProvider {
    async fn answer(&self, _question: &str) -> Result<String> {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
        Ok(CANNED_ANSWER.to_string())
    }

    fn name(&self) -> &str {
        "stub"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_stub_ignores_question() {
        let stub = StubProvider::with_latency(Duration::ZERO);
        let a = stub.answer("What is a closure?").await.unwrap();
        let b = stub.answer("Something else entirely").await.unwrap();
        assert_eq!(a, b);
        assert!(!a.is_empty());
    }

    #[test]
    fn test_default_latency() {
        assert_eq!(StubProvider::default().latency(), Duration::from_millis(900));
    }
}
