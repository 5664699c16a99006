//! Parlo: a terminal chat that detects the language of what you type,
//! translates it, and summarizes it through pluggable capability providers.

pub mod config;
pub mod conversation;
pub mod error;
pub mod events;
pub mod languages;
pub mod llm;
pub mod manager;
pub mod prompts;
pub mod providers;
pub mod state;
pub mod ui;

pub use conversation::{Conversation, DetectedLanguage, Message, MessageId, MessageStatus};
pub use error::{ChatError, ErrorKind, ProviderError};
pub use manager::{ChatSettings, ConversationManager};
pub use state::AppState;
