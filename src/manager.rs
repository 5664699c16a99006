//! Conversation state manager.
//!
//! Owns the [`AppState`] and is the only place that calls the capability
//! providers. One `submit`/`translate`/`summarize` may be in flight at a time;
//! anything issued meanwhile is rejected with [`ChatError::Busy`].

use std::sync::Arc;

use chrono::Utc;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::conversation::{DetectedLanguage, MessageId};
use crate::error::{ChatError, ProviderError};
use crate::events::{Action, Operation};
use crate::languages::{Language, normalize_code};
use crate::providers::{
    Availability, Detector, SourceLanguage, Summarizer, SummaryOptions, Translator,
};
use crate::state::{AppState, Theme, reduce};

/// Behavior knobs for the manager, usually built from [`crate::config::Config`].
#[derive(Debug, Clone, PartialEq)]
pub struct ChatSettings {
    /// Detected code that triggers automatic summarization
    pub auto_summarize_code: String,
    /// Auto-summarize only when the text is longer than this many characters
    pub auto_summarize_threshold: usize,
    pub summary_options: SummaryOptions,
    /// Allowed translation targets
    pub languages: Vec<Language>,
    pub theme: Theme,
    pub target_language: Language,
}

impl Default for ChatSettings {
    fn default() -> Self {
        Self {
            auto_summarize_code: Language::English.code().to_string(),
            auto_summarize_threshold: 150,
            summary_options: SummaryOptions::default(),
            languages: Language::all(),
            theme: Theme::Dark,
            target_language: Language::English,
        }
    }
}

impl ChatSettings {
    pub fn should_auto_summarize(&self, detected_code: &str, text: &str) -> bool {
        normalize_code(detected_code) == normalize_code(&self.auto_summarize_code)
            && text.chars().count() > self.auto_summarize_threshold
    }

    /// Resolve a code to a supported target language
    pub fn resolve_language(&self, code: &str) -> Option<Language> {
        Language::from_code(code).filter(|language| self.languages.contains(language))
    }
}

/// Holds the single-flight slot; releases it on drop.
struct InFlight<'a> {
    state: &'a watch::Sender<Arc<AppState>>,
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        apply(self.state, Action::Finish);
    }
}

fn apply(state: &watch::Sender<Arc<AppState>>, action: Action) {
    debug!(?action, "applying action");
    state.send_modify(|current| {
        let next = reduce(current, action);
        *current = Arc::new(next);
    });
}

pub struct ConversationManager {
    detector: Arc<dyn Detector>,
    translator: Arc<dyn Translator>,
    summarizer: Arc<dyn Summarizer>,
    settings: ChatSettings,
    state: watch::Sender<Arc<AppState>>,
}

impl ConversationManager {
    pub fn new(
        detector: Arc<dyn Detector>,
        translator: Arc<dyn Translator>,
        summarizer: Arc<dyn Summarizer>,
        settings: ChatSettings,
    ) -> Self {
        let initial = AppState::new(settings.theme, settings.target_language);
        let (state, _) = watch::channel(Arc::new(initial));

        Self {
            detector,
            translator,
            summarizer,
            settings,
            state,
        }
    }

    pub fn settings(&self) -> &ChatSettings {
        &self.settings
    }

    /// Current state. Cheap: the snapshot is shared, never copied.
    pub fn snapshot(&self) -> Arc<AppState> {
        self.state.borrow().clone()
    }

    /// Receive every new state as it is published
    pub fn subscribe(&self) -> watch::Receiver<Arc<AppState>> {
        self.state.subscribe()
    }

    pub fn is_processing(&self) -> bool {
        self.state.borrow().is_processing()
    }

    /// Add a message and detect its language.
    ///
    /// English (or whichever code is configured) input longer than the
    /// threshold is summarized before the message settles, so observers see
    /// the detected language and the summary land together.
    pub async fn submit(&self, text: impl Into<String>) -> Result<MessageId, ChatError> {
        let text = text.into();
        self.ensure_idle()?;
        if text.trim().is_empty() {
            return Err(self.fail(ChatError::EmptyInput));
        }

        let _slot = self.begin(Operation::Submit)?;
        let id = self.append(text.clone());
        info!(%id, chars = text.chars().count(), "message submitted");

        let detection = match self.detector.detect(&text).await {
            Ok(detection) => detection,
            Err(e) => {
                self.dispatch(Action::Settle {
                    id,
                    detected: None,
                    summary: None,
                });
                return Err(self.fail(ChatError::DetectionFailed {
                    id,
                    reason: e.to_string(),
                }));
            }
        };

        let detected = DetectedLanguage::new(&detection.language_code, detection.confidence);
        let mut summary = None;
        let mut summary_error = None;
        if self.settings.should_auto_summarize(&detected.code, &text) {
            debug!(%id, "auto-summarizing");
            match self.run_summarizer(&text).await {
                Ok(result) => summary = Some(result),
                Err(e) => {
                    summary_error = Some(ChatError::SummarizationFailed {
                        id,
                        reason: e.to_string(),
                    })
                }
            }
        }

        info!(
            %id,
            language = %detected.code,
            confidence = detected.confidence,
            summarized = summary.is_some(),
            "message settled"
        );
        self.dispatch(Action::Settle {
            id,
            detected: Some(detected),
            summary,
        });

        match summary_error {
            Some(error) => Err(self.fail(error)),
            None => Ok(id),
        }
    }

    /// Translate a message into `target` and store it under that code,
    /// replacing any earlier translation into the same language.
    pub async fn translate(&self, id: MessageId, target: &str) -> Result<(), ChatError> {
        self.ensure_idle()?;
        let Some(language) = self.settings.resolve_language(target) else {
            return Err(self.fail(ChatError::UnsupportedLanguage(target.to_string())));
        };
        let (text, source) = self.message_input(id)?;

        let _slot = self.begin(Operation::Translate {
            id,
            target: language,
        })?;
        debug!(%id, %source, target = language.code(), "translating");

        match self.translator.translate(&text, &source, language).await {
            Ok(translated) => {
                info!(%id, target = language.code(), "translation attached");
                self.dispatch(Action::AttachTranslation {
                    id,
                    target: language,
                    text: translated,
                });
                Ok(())
            }
            Err(e) => Err(self.fail(ChatError::TranslationFailed {
                id,
                target: language,
                reason: e.to_string(),
            })),
        }
    }

    /// Summarize a message, replacing any earlier summary.
    pub async fn summarize(&self, id: MessageId) -> Result<(), ChatError> {
        self.ensure_idle()?;
        let (text, _) = self.message_input(id)?;

        let _slot = self.begin(Operation::Summarize { id })?;
        match self.run_summarizer(&text).await {
            Ok(summary) => {
                info!(%id, "summary attached");
                self.dispatch(Action::AttachSummary { id, summary });
                Ok(())
            }
            Err(e) => Err(self.fail(ChatError::SummarizationFailed {
                id,
                reason: e.to_string(),
            })),
        }
    }

    pub fn toggle_theme(&self) {
        self.dispatch(Action::ToggleTheme);
    }

    pub fn toggle_menu(&self, id: MessageId) {
        self.dispatch(Action::ToggleMenu(id));
    }

    pub fn set_target_language(&self, code: &str) -> Result<Language, ChatError> {
        let Some(language) = self.settings.resolve_language(code) else {
            return Err(self.fail(ChatError::UnsupportedLanguage(code.to_string())));
        };
        self.dispatch(Action::SetTargetLanguage(language));
        Ok(language)
    }

    /// Step the target language through the configured list
    pub fn cycle_target_language(&self, forward: bool) -> Language {
        let languages = &self.settings.languages;
        let current = self.snapshot().ui.target_language;
        let len = languages.len();
        let next = match languages.iter().position(|l| *l == current) {
            Some(index) if forward => languages[(index + 1) % len],
            Some(index) => languages[(index + len - 1) % len],
            None => languages.first().copied().unwrap_or(current),
        };
        self.dispatch(Action::SetTargetLanguage(next));
        next
    }

    pub fn select(&self, id: Option<MessageId>) {
        self.dispatch(Action::Select(id));
    }

    pub fn select_previous(&self) {
        self.dispatch(Action::SelectPrevious);
    }

    pub fn select_next(&self) {
        self.dispatch(Action::SelectNext);
    }

    pub fn dismiss_error(&self) {
        self.dispatch(Action::DismissError);
    }

    fn dispatch(&self, action: Action) {
        apply(&self.state, action);
    }

    /// Reject with `Busy` before any precondition is checked or recorded
    fn ensure_idle(&self) -> Result<(), ChatError> {
        if self.is_processing() {
            debug!("rejected: operation already in flight");
            return Err(ChatError::Busy);
        }
        Ok(())
    }

    /// Claim the single-flight slot, or report `Busy` without touching state
    fn begin(&self, operation: Operation) -> Result<InFlight<'_>, ChatError> {
        let mut admitted = false;
        self.state.send_if_modified(|current| {
            if current.is_processing() {
                return false;
            }
            *current = Arc::new(reduce(current, Action::Begin(operation)));
            admitted = true;
            true
        });

        if admitted {
            Ok(InFlight { state: &self.state })
        } else {
            debug!("rejected: operation already in flight");
            Err(ChatError::Busy)
        }
    }

    fn append(&self, text: String) -> MessageId {
        let mut id = MessageId::first();
        self.state.send_modify(|current| {
            id = current.next_id;
            let next = reduce(
                current,
                Action::Append {
                    text,
                    created_at: Utc::now(),
                },
            );
            *current = Arc::new(next);
        });
        id
    }

    /// Record `error` as the visible error and hand it back to the caller
    fn fail(&self, error: ChatError) -> ChatError {
        warn!(kind = ?error.kind(), %error, "operation failed");
        self.dispatch(Action::Fail(error.clone()));
        error
    }

    fn message_input(&self, id: MessageId) -> Result<(String, SourceLanguage), ChatError> {
        let snapshot = self.snapshot();
        let message = snapshot
            .conversation
            .get(id)
            .filter(|message| !message.text.trim().is_empty());
        match message {
            Some(message) => {
                let source = message
                    .detected_language
                    .as_ref()
                    .map(|detected| SourceLanguage::Code(detected.code.clone()))
                    .unwrap_or(SourceLanguage::Auto);
                Ok((message.text.clone(), source))
            }
            None => Err(self.fail(ChatError::UnknownMessage(id))),
        }
    }

    async fn run_summarizer(&self, text: &str) -> Result<String, ProviderError> {
        match self.summarizer.availability().await {
            Availability::No => return Err(ProviderError::Unavailable("Summarization")),
            Availability::AfterDownload => {
                info!("summarizer not ready yet; first call waits for it")
            }
            Availability::Readily => {}
        }
        self.summarizer
            .summarize(text, &self.settings.summary_options)
            .await
    }
}
