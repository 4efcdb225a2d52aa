pub mod ai;
pub mod config;
pub mod controller;
pub mod provider;
pub mod state;

// Re-export main types for convenience
pub use ai::{AnswerProvider, HttpProvider, LoggingProvider, StubProvider};
pub use config::Config;
pub use controller::{Controller, MAX_DRAFT_CHARS, clamp_draft};
pub use provider::ProviderKind;
pub use state::{ChatMessage, ChatRole, ChatState, Conversation, Effect, Event, FAILURE_NOTICE, WELCOME_MESSAGE, reduce};
