//! Error types surfaced by the conversation manager and the capability providers.

use serde::Serialize;
use thiserror::Error;

use crate::conversation::MessageId;
use crate::languages::Language;

/// Errors reported to the view after a user action.
///
/// None of these are fatal: the conversation stays usable after any of them
/// and recovery is always a user-issued retry.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ChatError {
    #[error("Input text cannot be empty.")]
    EmptyInput,

    #[error("Another request is still being processed.")]
    Busy,

    #[error("Failed to detect language: {reason}")]
    DetectionFailed { id: MessageId, reason: String },

    #[error("Failed to translate text to {target}: {reason}")]
    TranslationFailed {
        id: MessageId,
        target: Language,
        reason: String,
    },

    #[error("Failed to summarize text: {reason}")]
    SummarizationFailed { id: MessageId, reason: String },

    #[error("No text available for message {0}.")]
    UnknownMessage(MessageId),

    #[error("Unsupported target language: {0}")]
    UnsupportedLanguage(String),
}

/// Discriminant of [`ChatError`], for callers that only care about the kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    EmptyInput,
    Busy,
    DetectionFailed,
    TranslationFailed,
    SummarizationFailed,
    UnknownMessage,
    UnsupportedLanguage,
}

impl ChatError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ChatError::EmptyInput => ErrorKind::EmptyInput,
            ChatError::Busy => ErrorKind::Busy,
            ChatError::DetectionFailed { .. } => ErrorKind::DetectionFailed,
            ChatError::TranslationFailed { .. } => ErrorKind::TranslationFailed,
            ChatError::SummarizationFailed { .. } => ErrorKind::SummarizationFailed,
            ChatError::UnknownMessage(_) => ErrorKind::UnknownMessage,
            ChatError::UnsupportedLanguage(_) => ErrorKind::UnsupportedLanguage,
        }
    }

    /// The message the error refers to, if any.
    pub fn message_id(&self) -> Option<MessageId> {
        match self {
            ChatError::DetectionFailed { id, .. }
            | ChatError::TranslationFailed { id, .. }
            | ChatError::SummarizationFailed { id, .. }
            | ChatError::UnknownMessage(id) => Some(*id),
            _ => None,
        }
    }
}

/// Serializable `{kind, message}` pair for headless output.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorReport {
    pub kind: ErrorKind,
    pub message: String,
}

impl From<&ChatError> for ErrorReport {
    fn from(error: &ChatError) -> Self {
        Self {
            kind: error.kind(),
            message: error.to_string(),
        }
    }
}

/// Failure inside a capability provider.
#[derive(Error, Debug)]
pub enum ProviderError {
    /// The capability cannot run in this environment
    #[error("{0} is not available on this device.")]
    Unavailable(&'static str),

    #[error("No API key configured. Set {0} or add api_key to the config file.")]
    MissingApiKey(String),

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error ({status}): {body}")]
    Api { status: u16, body: String },

    #[error("Malformed provider response: {0}")]
    Malformed(String),
}
