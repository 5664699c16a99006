//! Application state and the pure reducer that advances it.
//!
//! Every transition produces a fresh [`AppState`]; the manager publishes it
//! wholesale and the view renders from whichever snapshot is current.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, EnumString};
use tracing::debug;

use crate::conversation::{Conversation, Message, MessageId, MessageStatus};
use crate::error::ChatError;
use crate::events::{Action, Operation};
use crate::languages::Language;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Processing(Operation),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, EnumString, AsRefStr)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Theme {
    #[default]
    Dark,
    Light,
}

impl Theme {
    pub fn toggled(self) -> Theme {
        match self {
            Theme::Dark => Theme::Light,
            Theme::Light => Theme::Dark,
        }
    }
}

/// View-only state. Lives here so the view never keeps its own flags.
#[derive(Debug, Clone, PartialEq)]
pub struct UiState {
    pub theme: Theme,
    /// Messages whose translate menu is open
    pub open_menus: BTreeSet<MessageId>,
    pub target_language: Language,
    pub selected: Option<MessageId>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AppState {
    pub conversation: Conversation,
    pub phase: Phase,
    pub last_error: Option<ChatError>,
    pub ui: UiState,
    pub next_id: MessageId,
}

impl Default for AppState {
    fn default() -> Self {
        AppState::new(Theme::default(), Language::English)
    }
}

impl AppState {
    pub fn new(theme: Theme, target_language: Language) -> Self {
        Self {
            conversation: Conversation::default(),
            phase: Phase::Idle,
            last_error: None,
            ui: UiState {
                theme,
                open_menus: BTreeSet::new(),
                target_language,
                selected: None,
            },
            next_id: MessageId::first(),
        }
    }

    pub fn is_processing(&self) -> bool {
        matches!(self.phase, Phase::Processing(_))
    }

    pub fn operation(&self) -> Option<&Operation> {
        match &self.phase {
            Phase::Processing(operation) => Some(operation),
            Phase::Idle => None,
        }
    }

    pub fn is_menu_open(&self, id: MessageId) -> bool {
        self.ui.open_menus.contains(&id)
    }
}

/// Apply `action` to `state`, returning the next state.
///
/// Actions that reference an unknown message, or that would break the
/// one-way `Pending -> Settled` transition, leave the state as it was.
pub fn reduce(state: &AppState, action: Action) -> AppState {
    let mut next = state.clone();
    debug!(?action, "reduce");

    match action {
        Action::Begin(operation) => {
            if !next.is_processing() {
                next.phase = Phase::Processing(operation);
                next.last_error = None;
            }
        }
        Action::Finish => {
            next.phase = Phase::Idle;
        }
        Action::Append { text, created_at } => {
            let id = next.next_id;
            next.conversation.push(Message::pending(id, text, created_at));
            next.next_id = id.next();
            next.ui.selected = Some(id);
        }
        Action::Settle {
            id,
            detected,
            summary,
        } => {
            if let Some(message) = next.conversation.get_mut(id) {
                if message.is_pending() {
                    message.status = MessageStatus::Settled;
                    message.detected_language = detected;
                    if summary.is_some() {
                        message.summary = summary;
                    }
                }
            }
        }
        Action::AttachTranslation { id, target, text } => {
            if let Some(message) = next.conversation.get_mut(id) {
                if !message.is_pending() {
                    message.translations.insert(target, text);
                    next.ui.open_menus.remove(&id);
                }
            }
        }
        Action::AttachSummary { id, summary } => {
            if let Some(message) = next.conversation.get_mut(id) {
                if !message.is_pending() {
                    message.summary = Some(summary);
                }
            }
        }
        Action::Fail(error) => {
            next.last_error = Some(error);
        }
        Action::DismissError => {
            next.last_error = None;
        }
        Action::ToggleTheme => {
            next.ui.theme = next.ui.theme.toggled();
        }
        Action::ToggleMenu(id) => {
            if next.conversation.get(id).is_some() && !next.ui.open_menus.remove(&id) {
                next.ui.open_menus.insert(id);
            }
        }
        Action::SetTargetLanguage(language) => {
            next.ui.target_language = language;
        }
        Action::Select(selection) => {
            next.ui.selected = selection.filter(|id| next.conversation.get(*id).is_some());
        }
        Action::SelectPrevious => {
            next.ui.selected = step_selection(&next, -1);
        }
        Action::SelectNext => {
            next.ui.selected = step_selection(&next, 1);
        }
    }

    next
}

fn step_selection(state: &AppState, delta: isize) -> Option<MessageId> {
    let messages = state.conversation.messages();
    if messages.is_empty() {
        return None;
    }

    let last = messages.len() - 1;
    let index = match state.ui.selected.and_then(|id| state.conversation.position(id)) {
        Some(current) => current.saturating_add_signed(delta).min(last),
        None => last,
    };
    Some(messages[index].id)
}
