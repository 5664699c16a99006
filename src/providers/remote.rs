//! Capability providers backed by an OpenAI-compatible completions API.

use async_trait::async_trait;
use serde::Deserialize;
use tokio::sync::OnceCell;
use tracing::{debug, info};

use super::{
    Availability, Detection, Detector, SourceLanguage, Summarizer, SummaryOptions, Translator,
};
use crate::error::ProviderError;
use crate::languages::Language;
use crate::llm::{LlmClient, LlmMessage, LlmRequest};
use crate::prompts::{DETECTION_PROMPT, summary_prompt, translation_prompt};

pub struct RemoteDetector {
    client: LlmClient,
}

impl RemoteDetector {
    pub fn new(client: LlmClient) -> Self {
        Self { client }
    }
}

#[derive(Debug, Deserialize)]
struct DetectionPayload {
    language: String,
    #[serde(default)]
    confidence: Option<f32>,
}

/// Parse the detector's JSON reply. Code fences or chatter around the
/// object are ignored.
pub fn parse_detection(raw: &str) -> Result<Detection, ProviderError> {
    let start = raw.find('{');
    let end = raw.rfind('}');
    let object = match (start, end) {
        (Some(start), Some(end)) if start < end => &raw[start..=end],
        _ => return Err(ProviderError::Malformed(format!("no JSON object in {:?}", raw))),
    };

    let payload: DetectionPayload = serde_json::from_str(object)
        .map_err(|e| ProviderError::Malformed(format!("detection payload: {}", e)))?;

    let language_code = payload.language.trim().to_string();
    if language_code.is_empty() {
        return Err(ProviderError::Malformed("empty language code".to_string()));
    }

    Ok(Detection {
        language_code,
        confidence: payload.confidence.unwrap_or(1.0),
    })
}

#[async_trait]
impl Detector for RemoteDetector {
    async fn detect(&self, text: &str) -> Result<Detection, ProviderError> {
        let request = LlmRequest::new(vec![
            LlmMessage::system(DETECTION_PROMPT),
            LlmMessage::user(text),
        ])
        .with_temperature(0.0)
        .with_max_tokens(64);

        let raw = self.client.complete(request).await?;
        debug!(%raw, "detection reply");
        parse_detection(&raw)
    }
}

pub struct RemoteTranslator {
    client: LlmClient,
}

impl RemoteTranslator {
    pub fn new(client: LlmClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Translator for RemoteTranslator {
    async fn translate(
        &self,
        text: &str,
        source: &SourceLanguage,
        target: Language,
    ) -> Result<String, ProviderError> {
        let request = LlmRequest::new(vec![
            LlmMessage::system(translation_prompt(source, target)),
            LlmMessage::user(text),
        ]);
        self.client.complete(request).await
    }
}

/// Summarizer that confirms the backend is reachable once, before its first
/// summary. Later calls skip the check.
pub struct RemoteSummarizer {
    client: LlmClient,
    ready: OnceCell<()>,
}

impl RemoteSummarizer {
    pub fn new(client: LlmClient) -> Self {
        Self {
            client,
            ready: OnceCell::new(),
        }
    }

    async fn ensure_ready(&self) -> Result<(), ProviderError> {
        self.ready
            .get_or_try_init(|| async {
                info!("waiting for summarizer backend");
                self.client.probe().await?;
                info!("summarizer backend ready");
                Ok::<(), ProviderError>(())
            })
            .await?;
        Ok(())
    }
}

#[async_trait]
impl Summarizer for RemoteSummarizer {
    async fn availability(&self) -> Availability {
        if !self.client.has_api_key() {
            Availability::No
        } else if self.ready.initialized() {
            Availability::Readily
        } else {
            Availability::AfterDownload
        }
    }

    async fn summarize(
        &self,
        text: &str,
        options: &SummaryOptions,
    ) -> Result<String, ProviderError> {
        self.ensure_ready().await?;

        let request = LlmRequest::new(vec![
            LlmMessage::system(summary_prompt(options)),
            LlmMessage::user(text),
        ]);
        self.client.complete(request).await
    }
}
