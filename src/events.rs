use chrono::{DateTime, Utc};

use crate::conversation::{DetectedLanguage, MessageId};
use crate::error::ChatError;
use crate::languages::Language;

/// A side-effecting operation that holds the single-flight slot
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operation {
    Submit,
    Translate { id: MessageId, target: Language },
    Summarize { id: MessageId },
}

impl Operation {
    /// Short status line for the processing indicator
    pub fn describe(&self) -> String {
        match self {
            Operation::Submit => "Detecting language...".to_string(),
            Operation::Translate { id, target } => format!("Translating {} to {}...", id, target),
            Operation::Summarize { id } => format!("Summarizing {}...", id),
        }
    }
}

/// State transitions applied by [`crate::state::reduce`]
#[derive(Debug, Clone)]
pub enum Action {
    /// Claim the single-flight slot and clear the last error
    Begin(Operation),
    /// Release the single-flight slot
    Finish,
    /// Append a new pending message with the next id
    Append {
        text: String,
        created_at: DateTime<Utc>,
    },
    /// Resolve detection for a pending message, with its auto summary if any
    Settle {
        id: MessageId,
        detected: Option<DetectedLanguage>,
        summary: Option<String>,
    },
    AttachTranslation {
        id: MessageId,
        target: Language,
        text: String,
    },
    AttachSummary {
        id: MessageId,
        summary: String,
    },
    Fail(ChatError),
    DismissError,

    ToggleTheme,
    ToggleMenu(MessageId),
    SetTargetLanguage(Language),
    Select(Option<MessageId>),
    SelectPrevious,
    SelectNext,
}
