use reqwest::Client;
use serde::{Deserialize, Serialize};
use anyhow::{Result, anyhow};
use async_trait::async_trait;

use super::AnswerProvider;

#[derive(Serialize)]
struct AskRequest<'a> {
    question: &'a str,
}

#[derive(Deserialize)]
struct AskResponse {
    answer: String,
}

/// Talks to a backend exposing `POST /ask` with `{"question"}` in and
/// `{"answer"}` out.
#[derive(Clone)]
pub struct HttpProvider {
    client: Client,
    base_url: String,
}

impl HttpProvider {
    pub fn new(base_url: &str) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub async fn ask(&self, question: &str) -> Result<String> {
        let url = format!("{}/ask", self.base_url);

        let response = self
            .client
            .post(&url)
            .json(&AskRequest { question })
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(anyhow!("Ask request to {} failed with status {}: {}", url, status, text));
        }

        let ask_response: AskResponse = response.json().await?;
        Ok(ask_response.answer)
    }
}

#[async_trait]
impl AnswerProvider for HttpProvider {
    async fn answer(&self, question: &str) -> Result<String> {
        self.ask(question).await
    }

    fn name(&self) -> &str {
        "http"
    }
}
