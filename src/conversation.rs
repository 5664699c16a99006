//! Message log owned by the conversation state.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::languages::{Language, display_name_for, normalize_code};

/// Creation-ordered message identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MessageId(u64);

impl MessageId {
    pub fn first() -> Self {
        MessageId(1)
    }

    pub fn next(self) -> Self {
        MessageId(self.0 + 1)
    }
}

impl Default for MessageId {
    fn default() -> Self {
        MessageId::first()
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageStatus {
    /// Language detection is in flight
    Pending,
    /// Detection resolved, successfully or not
    Settled,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectedLanguage {
    pub code: String,
    pub display_name: String,
    /// Always within `0.0..=1.0`
    pub confidence: f32,
}

impl DetectedLanguage {
    pub fn new(code: &str, confidence: f32) -> Self {
        let code = normalize_code(code);
        let confidence = if confidence.is_nan() {
            0.0
        } else {
            confidence.clamp(0.0, 1.0)
        };
        Self {
            display_name: display_name_for(&code),
            code,
            confidence,
        }
    }

    /// Confidence formatted the way the chat view shows it, e.g. `97.5%`.
    pub fn confidence_percent(&self) -> String {
        format!("{:.1}%", self.confidence * 100.0)
    }
}

/// One user submission and everything derived from it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub id: MessageId,
    pub text: String,
    pub created_at: DateTime<Utc>,
    pub status: MessageStatus,
    pub detected_language: Option<DetectedLanguage>,
    pub summary: Option<String>,
    pub translations: BTreeMap<Language, String>,
}

impl Message {
    pub fn pending(id: MessageId, text: String, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            text,
            created_at,
            status: MessageStatus::Pending,
            detected_language: None,
            summary: None,
            translations: BTreeMap::new(),
        }
    }

    pub fn is_pending(&self) -> bool {
        self.status == MessageStatus::Pending
    }

    pub fn translation(&self, language: Language) -> Option<&str> {
        self.translations.get(&language).map(String::as_str)
    }
}

/// Append-only sequence of messages, mutated in place by id.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Conversation {
    messages: Vec<Message>,
}

impl Conversation {
    pub fn push(&mut self, message: Message) {
        self.messages.push(message);
    }

    pub fn get(&self, id: MessageId) -> Option<&Message> {
        self.messages.iter().find(|message| message.id == id)
    }

    pub fn get_mut(&mut self, id: MessageId) -> Option<&mut Message> {
        self.messages.iter_mut().find(|message| message.id == id)
    }

    pub fn position(&self, id: MessageId) -> Option<usize> {
        self.messages.iter().position(|message| message.id == id)
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn iter(&self) -> impl Iterator<Item = &Message> {
        self.messages.iter()
    }

    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn pending_count(&self) -> usize {
        self.messages.iter().filter(|message| message.is_pending()).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detected_language_clamps_confidence() {
        assert_eq!(DetectedLanguage::new("en", 1.7).confidence, 1.0);
        assert_eq!(DetectedLanguage::new("en", -0.2).confidence, 0.0);
        assert_eq!(DetectedLanguage::new("en", f32::NAN).confidence, 0.0);
    }

    #[test]
    fn test_detected_language_normalizes_code() {
        let detected = DetectedLanguage::new("FR-ca", 0.975);
        assert_eq!(detected.code, "fr");
        assert_eq!(detected.display_name, "French");
        assert_eq!(detected.confidence_percent(), "97.5%");

        let unknown = DetectedLanguage::new("ja", 0.5);
        assert_eq!(unknown.display_name, "ja");
    }

    #[test]
    fn test_conversation_lookup_by_id() {
        let mut conversation = Conversation::default();
        let first = MessageId::first();
        let second = first.next();
        conversation.push(Message::pending(first, "hola".into(), Utc::now()));
        conversation.push(Message::pending(second, "salut".into(), Utc::now()));

        assert_eq!(conversation.len(), 2);
        assert_eq!(conversation.position(second), Some(1));
        assert_eq!(conversation.get(first).map(|m| m.text.as_str()), Some("hola"));
        assert_eq!(conversation.pending_count(), 2);
        assert!(first < second);
    }
}
