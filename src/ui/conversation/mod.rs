//! Conversation UI components for the chat interface

pub mod commands;
pub mod composer;
pub mod history;
pub mod view;

pub use commands::{ParsedCommand, SlashCommand, get_help_text};
pub use composer::Composer;
pub use history::ConversationHistory;
pub use view::{ChatAction, ChatView};
