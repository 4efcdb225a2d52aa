use std::sync::Arc;
use std::time::Instant;

use anyhow::Result;
use async_trait::async_trait;

use super::AnswerProvider;

/// Wraps another provider and records how each call went.
///
/// The conversation itself never keeps the failure reason, so this is the
/// only place it ends up.
pub struct LoggingProvider {
    inner: Arc<dyn AnswerProvider>,
}

impl LoggingProvider {
    pub fn new(inner: Arc<dyn AnswerProvider>) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl AnswerProvider for LoggingProvider {
    async fn answer(&self, question: &str) -> Result<String> {
        let start = Instant::now();
        let result = self.inner.answer(question).await;
        let duration = start.elapsed();

        match &result {
            Ok(answer) => {
                tracing::info!(
                    provider = %self.inner.name(),
                    duration_ms = %duration.as_millis(),
                    question_chars = question.chars().count(),
                    answer_chars = answer.chars().count(),
                    "answer received"
                );
            }
            Err(e) => {
                tracing::warn!(
                    provider = %self.inner.name(),
                    duration_ms = %duration.as_millis(),
                    error = %e,
                    "answer retrieval failed"
                );
            }
        }

        result
    }

    fn name(&self) -> &str {
        self.inner.name()
    }
}
