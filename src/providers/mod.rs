//! Capability providers: the external services that detect, translate and
//! summarize text. The conversation manager only sees these traits.

pub mod remote;

use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, EnumString};

use crate::error::ProviderError;
use crate::languages::Language;

pub use remote::{RemoteDetector, RemoteSummarizer, RemoteTranslator};

/// Top detection result for a piece of text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Detection {
    pub language_code: String,
    pub confidence: f32,
}

/// Source language handed to a translator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceLanguage {
    /// Let the provider work it out
    Auto,
    Code(String),
}

impl SourceLanguage {
    pub fn as_str(&self) -> &str {
        match self {
            SourceLanguage::Auto => "auto",
            SourceLanguage::Code(code) => code,
        }
    }
}

impl fmt::Display for SourceLanguage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, EnumString, AsRefStr)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum SummaryStyle {
    #[default]
    KeyPoints,
    TlDr,
    Teaser,
    Headline,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, EnumString, AsRefStr)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum SummaryFormat {
    #[default]
    Markdown,
    PlainText,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, EnumString, AsRefStr)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum SummaryLength {
    Short,
    #[default]
    Medium,
    Long,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SummaryOptions {
    pub style: SummaryStyle,
    pub format: SummaryFormat,
    pub length: SummaryLength,
}

/// Whether a summarizer can run right now.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Availability {
    Readily,
    /// Usable, but the first call waits for the model to become ready
    AfterDownload,
    No,
}

#[async_trait]
pub trait Detector: Send + Sync {
    async fn detect(&self, text: &str) -> Result<Detection, ProviderError>;
}

#[async_trait]
pub trait Translator: Send + Sync {
    async fn translate(
        &self,
        text: &str,
        source: &SourceLanguage,
        target: Language,
    ) -> Result<String, ProviderError>;
}

#[async_trait]
pub trait Summarizer: Send + Sync {
    async fn availability(&self) -> Availability {
        Availability::Readily
    }

    async fn summarize(&self, text: &str, options: &SummaryOptions)
    -> Result<String, ProviderError>;
}
