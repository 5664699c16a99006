//! Terminal chat view. Renders [`crate::state::AppState`] snapshots and
//! forwards user input to the conversation manager.

pub mod conversation;
mod terminal;
pub mod theme;

pub use terminal::run_chat;
