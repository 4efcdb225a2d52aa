//! UI-agnostic conversation state
//!
//! The conversation is an explicit value driven by a pure reducer:
//! `reduce(state, event) -> (state, effect)`. Nothing in here performs I/O;
//! the only side effect the reducer can ask for is [`Effect::Ask`], which the
//! runtime (controller or TUI event loop) carries out.

use chrono::{DateTime, Utc};

/// Greeting the conversation always starts with
pub const WELCOME_MESSAGE: &str =
    "Hi! Ask me anything and I'll do my best to explain it.\nType a question below and press Enter to send.";

/// Shown in place of an answer when the provider fails for any reason
pub const FAILURE_NOTICE: &str =
    "Sorry, I couldn't get an answer right now. Please try asking again in a moment.";

/// The role of a chat message sender
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatRole {
    User,
    Assistant,
}

/// One immutable turn in the conversation
#[derive(Debug, Clone, PartialEq)]
pub struct ChatMessage {
    id: String,
    role: ChatRole,
    content: Vec<String>,
    timestamp: DateTime<Utc>,
    error: bool,
}

impl ChatMessage {
    fn new(id: String, role: ChatRole, text: &str, timestamp: DateTime<Utc>, error: bool) -> Self {
        Self {
            id,
            role,
            content: text.lines().map(str::to_string).collect(),
            timestamp,
            error,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn role(&self) -> ChatRole {
        self.role
    }

    /// Content split on line breaks, one entry per rendered paragraph
    pub fn lines(&self) -> &[String] {
        &self.content
    }

    /// Content joined back into a single string
    pub fn text(&self) -> String {
        self.content.join("\n")
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    pub fn is_error(&self) -> bool {
        self.error
    }
}

/// Append-only, insertion-ordered list of messages
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Conversation {
    messages: Vec<ChatMessage>,
}

impl Conversation {
    fn push(&mut self, message: ChatMessage) {
        self.messages.push(message);
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn last(&self) -> Option<&ChatMessage> {
        self.messages.last()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ChatMessage> {
        self.messages.iter()
    }
}

/// Everything the conversation controller owns
#[derive(Debug, Clone, PartialEq)]
pub struct ChatState {
    conversation: Conversation,
    draft: String,
    in_flight: bool,
    next_id: u64,
}

impl ChatState {
    /// Fresh session: one seeded welcome message, empty draft, idle.
    pub fn new(now: DateTime<Utc>) -> Self {
        let mut state = Self::empty();
        state.append(ChatRole::Assistant, WELCOME_MESSAGE, now, false);
        state
    }

    /// Unseeded, allocation-free placeholder used while a state is moved
    /// through the reducer
    pub(crate) fn empty() -> Self {
        Self {
            conversation: Conversation::default(),
            draft: String::new(),
            in_flight: false,
            next_id: 0,
        }
    }

    pub fn conversation(&self) -> &Conversation {
        &self.conversation
    }

    pub fn draft(&self) -> &str {
        &self.draft
    }

    pub fn is_in_flight(&self) -> bool {
        self.in_flight
    }

    fn append(&mut self, role: ChatRole, text: &str, at: DateTime<Utc>, error: bool) {
        self.next_id += 1;
        let id = format!("msg-{}", self.next_id);
        self.conversation.push(ChatMessage::new(id, role, text, at, error));
    }
}

/// Inputs to the reducer
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    /// Replace the draft text
    DraftChanged(String),
    /// User asked to send `text`
    Submit { text: String, at: DateTime<Utc> },
    /// The provider resolved with an answer
    AnswerReceived { answer: String, at: DateTime<Utc> },
    /// The provider failed; the reason is deliberately not carried
    AnswerFailed { at: DateTime<Utc> },
}

/// Work the runtime must perform after a transition
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Send `question` to the answer provider and feed the outcome back
    /// as [`Event::AnswerReceived`] or [`Event::AnswerFailed`]
    Ask { question: String },
}

/// Pure state transition.
///
/// Rejected submissions (blank text, or a request already in flight) return
/// the state untouched and no effect. Resolutions that arrive while idle are
/// ignored as well, so a stray answer can never append a second reply.
pub fn reduce(mut state: ChatState, event: Event) -> (ChatState, Option<Effect>) {
    match event {
        Event::DraftChanged(text) => {
            state.draft = text;
            (state, None)
        }
        Event::Submit { text, at } => {
            let question = text.trim();
            if question.is_empty() || state.in_flight {
                tracing::debug!(
                    in_flight = state.in_flight,
                    blank = question.is_empty(),
                    "submission ignored"
                );
                return (state, None);
            }
            let question = question.to_string();
            state.append(ChatRole::User, &question, at, false);
            state.draft.clear();
            state.in_flight = true;
            tracing::debug!(messages = state.conversation.len(), "question dispatched");
            (state, Some(Effect::Ask { question }))
        }
        Event::AnswerReceived { answer, at } => {
            if !state.in_flight {
                tracing::warn!("answer arrived with no request in flight, dropping it");
                return (state, None);
            }
            state.append(ChatRole::Assistant, &answer, at, false);
            state.in_flight = false;
            (state, None)
        }
        Event::AnswerFailed { at } => {
            if !state.in_flight {
                tracing::warn!("failure arrived with no request in flight, dropping it");
                return (state, None);
            }
            state.append(ChatRole::Assistant, FAILURE_NOTICE, at, true);
            state.in_flight = false;
            (state, None)
        }
    }
}
