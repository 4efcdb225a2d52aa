//! Conversation controller
//!
//! Owns the [`ChatState`] and the answer provider, and is the only thing that
//! feeds events into [`reduce`]. Callers that can await in place use
//! [`Controller::submit`]; event loops that must keep drawing while the
//! provider works use [`Controller::begin_submit`] and
//! [`Controller::resolve`] around their own task.

use std::sync::Arc;

use anyhow::Result;
use chrono::Utc;

use crate::ai::AnswerProvider;
use crate::state::{ChatState, Effect, Event, reduce};

/// Longest draft the input surface accepts, in characters
pub const MAX_DRAFT_CHARS: usize = 2000;

/// Cut `text` down to at most [`MAX_DRAFT_CHARS`] characters
pub fn clamp_draft(text: &str) -> &str {
    match text.char_indices().nth(MAX_DRAFT_CHARS) {
        Some((byte_idx, _)) => &text[..byte_idx],
        None => text,
    }
}

pub struct Controller {
    state: ChatState,
    provider: Arc<dyn AnswerProvider>,
}

impl Controller {
    pub fn new(provider: Arc<dyn AnswerProvider>) -> Self {
        Self {
            state: ChatState::new(Utc::now()),
            provider,
        }
    }

    pub fn state(&self) -> &ChatState {
        &self.state
    }

    pub fn provider(&self) -> Arc<dyn AnswerProvider> {
        Arc::clone(&self.provider)
    }

    fn dispatch(&mut self, event: Event) -> Option<Effect> {
        let state = std::mem::replace(&mut self.state, ChatState::empty());
        let (state, effect) = reduce(state, event);
        self.state = state;
        effect
    }

    /// Replace the draft, truncated to the input ceiling
    pub fn update_draft(&mut self, text: &str) {
        self.dispatch(Event::DraftChanged(clamp_draft(text).to_string()));
    }

    /// Accept a submission without waiting for the answer.
    ///
    /// Returns the trimmed question to hand to the provider, or `None` when
    /// the submission was rejected (blank, or a request is already in flight).
    pub fn begin_submit(&mut self, text: &str) -> Option<String> {
        match self.dispatch(Event::Submit { text: text.to_string(), at: Utc::now() }) {
            Some(Effect::Ask { question }) => Some(question),
            None => None,
        }
    }

    /// Feed the provider's outcome back in. The error itself is dropped;
    /// the user only ever sees the fixed failure notice.
    pub fn resolve(&mut self, outcome: Result<String>) {
        let at = Utc::now();
        let event = match outcome {
            Ok(answer) => Event::AnswerReceived { answer, at },
            Err(_) => Event::AnswerFailed { at },
        };
        self.dispatch(event);
    }

    /// Submit and wait for the provider in place. Never fails; a provider
    /// error becomes an error message in the conversation.
    pub async fn submit(&mut self, text: &str) {
        let Some(question) = self.begin_submit(text) else {
            return;
        };
        let outcome = self.provider.answer(&question).await;
        self.resolve(outcome);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::StubProvider;
    use crate::state::{ChatRole, FAILURE_NOTICE};
    use anyhow::anyhow;
    use async_trait::async_trait;
    use std::sync::Mutex;
    use std::time::Duration;

    /// Replies with a fixed answer (or failure) and remembers the questions
    struct Scripted {
        answer: Option<&'static str>,
        asked: Mutex<Vec<String>>,
    }

    impl Scripted {
        fn answering(answer: &'static str) -> Arc<Self> {
            Arc::new(Self { answer: Some(answer), asked: Mutex::new(Vec::new()) })
        }

        fn failing() -> Arc<Self> {
            Arc::new(Self { answer: None, asked: Mutex::new(Vec::new()) })
        }

        fn asked(&self) -> Vec<String> {
            self.asked.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl AnswerProvider for Scripted {
        async fn answer(&self, question: &str) -> Result<String> {
            self.asked.lock().unwrap().push(question.to_string());
            match self.answer {
                Some(answer) => Ok(answer.to_string()),
                None => Err(anyhow!("backend unreachable")),
            }
        }

        fn name(&self) -> &str {
            "scripted"
        }
    }

    #[tokio::test]
    async fn test_successful_question() {
        let provider = Scripted::answering("A closure is a function with captured state.");
        let mut controller = Controller::new(provider.clone());
        controller.update_draft("What is a closure?");

        controller.submit("What is a closure?").await;

        let state = controller.state();
        let messages = state.conversation().messages();
        assert_eq!(messages.len(), 3);
        assert_eq!(messages[1].role(), ChatRole::User);
        assert_eq!(messages[1].text(), "What is a closure?");
        assert_eq!(messages[2].role(), ChatRole::Assistant);
        assert_eq!(messages[2].text(), "A closure is a function with captured state.");
        assert!(!messages[2].is_error());
        assert!(!state.is_in_flight());
        assert_eq!(state.draft(), "");
        assert_eq!(provider.asked(), vec!["What is a closure?".to_string()]);
    }

    #[tokio::test]
    async fn test_failing_provider_appends_notice() {
        let provider = Scripted::failing();
        let mut controller = Controller::new(provider);

        controller.submit("Y").await;

        let messages = controller.state().conversation().messages();
        assert_eq!(messages.len(), 3);
        assert_eq!(messages[1].text(), "Y");
        assert!(messages[2].is_error());
        assert_eq!(messages[2].text(), FAILURE_NOTICE);
        assert!(!controller.state().is_in_flight());
    }

    #[tokio::test]
    async fn test_blank_submit_never_reaches_provider() {
        let provider = Scripted::answering("unused");
        let mut controller = Controller::new(provider.clone());

        controller.submit("   ").await;

        assert_eq!(controller.state().conversation().len(), 1);
        assert!(!controller.state().is_in_flight());
        assert!(provider.asked().is_empty());
    }

    #[test]
    fn test_overlapping_submit_rejected() {
        let mut controller = Controller::new(Scripted::answering("first answer"));

        assert_eq!(controller.begin_submit(" first "), Some("first".to_string()));
        // User message is visible before anything resolves
        assert_eq!(controller.state().conversation().len(), 2);
        assert!(controller.state().is_in_flight());

        controller.update_draft("X");
        assert_eq!(controller.begin_submit("X"), None);
        assert_eq!(controller.state().conversation().len(), 2);
        assert_eq!(controller.state().draft(), "X");

        controller.resolve(Ok("first answer".to_string()));
        let texts: Vec<String> = controller
            .state()
            .conversation()
            .iter()
            .skip(1)
            .map(|m| m.text())
            .collect();
        assert_eq!(texts, vec!["first", "first answer"]);
        assert!(!controller.state().is_in_flight());

        // Idle again, so the next submission goes through
        assert_eq!(controller.begin_submit("X"), Some("X".to_string()));
    }

    #[tokio::test]
    async fn test_stub_provider_end_to_end() {
        let mut controller = Controller::new(Arc::new(StubProvider::with_latency(Duration::ZERO)));
        controller.submit("anything").await;

        let last = controller.state().conversation().last().unwrap();
        assert_eq!(last.role(), ChatRole::Assistant);
        assert!(!last.is_error());
    }

    #[test]
    fn test_update_draft_clamps_to_ceiling() {
        let mut controller = Controller::new(Scripted::answering("unused"));
        let long: String = "é".repeat(MAX_DRAFT_CHARS + 50);

        controller.update_draft(&long);
        assert_eq!(controller.state().draft().chars().count(), MAX_DRAFT_CHARS);

        controller.update_draft("short");
        assert_eq!(controller.state().draft(), "short");
    }
}
