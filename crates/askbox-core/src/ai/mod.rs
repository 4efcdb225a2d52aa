pub mod http;
pub mod logging;
pub mod stub;

pub use http::HttpProvider;
pub use logging::LoggingProvider;
pub use stub::StubProvider;

use anyhow::Result;
use async_trait::async_trait;

/// Turns a question into an answer, asynchronously, or fails.
///
/// Every failure collapses into the same user-visible outcome, so
/// implementations only need to report *that* something went wrong.
#[async_trait]
pub trait AnswerProvider: Send + Sync {
    async fn answer(&self, question: &str) -> Result<String>;

    /// Short label for headers and logs
    fn name(&self) -> &str;
}
