use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::languages::Language;
use crate::manager::ChatSettings;
use crate::providers::SummaryOptions;
use crate::state::Theme;

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// OpenAI-compatible API root, without the trailing `/chat/completions`
    pub api_base_url: String,

    /// API key; falls back to the `api_key_env` variable when unset
    pub api_key: Option<String>,

    /// Environment variable consulted for the API key
    pub api_key_env: String,

    /// Model used for every capability
    pub model: String,

    pub request_timeout_secs: u64,

    /// Detected language code that triggers automatic summarization
    pub auto_summarize_code: String,

    /// Minimum input length, in characters, exceeded before auto-summarizing
    pub auto_summarize_threshold: usize,

    /// Languages offered as translation targets
    pub languages: Vec<Language>,

    /// Default `tracing` filter when `RUST_LOG` is unset
    pub log_filter: String,

    pub summary: SummaryOptions,

    pub ui: UiConfig,

    /// Parlo home directory
    #[serde(skip)]
    pub parlo_home: PathBuf,
}

/// UI configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UiConfig {
    pub theme: Theme,
    pub target_language: Language,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            theme: Theme::Dark,
            target_language: Language::English,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        let home = dirs::home_dir().unwrap_or_else(|| PathBuf::from("~"));

        Config {
            api_base_url: "https://openrouter.ai/api/v1".to_string(),
            api_key: None,
            api_key_env: "OPENROUTER_API_KEY".to_string(),
            model: "openai/gpt-4o-mini".to_string(),
            request_timeout_secs: 60,
            auto_summarize_code: Language::English.code().to_string(),
            auto_summarize_threshold: 150,
            languages: Language::all(),
            log_filter: "info".to_string(),
            summary: SummaryOptions::default(),
            ui: UiConfig::default(),
            parlo_home: home.join(".parlo"),
        }
    }
}

impl Config {
    /// Default location: `~/.parlo/config.toml`
    pub fn default_path() -> Result<PathBuf> {
        let home = dirs::home_dir().context("Could not find home directory")?;
        Ok(home.join(".parlo").join("config.toml"))
    }

    /// Load configuration, writing defaults on first run
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config_path = match path {
            Some(path) => path.to_path_buf(),
            None => Self::default_path()?,
        };

        let parlo_home = config_path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));
        fs::create_dir_all(&parlo_home).context("Failed to create parlo directory")?;

        let mut config = if config_path.exists() {
            Self::load_from(&config_path)?
        } else {
            let config = Config::default();
            config.save_to(&config_path)?;
            config
        };

        config.parlo_home = parlo_home;
        Ok(config)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        toml::from_str(&content).context("Failed to parse config file")
    }

    /// Save configuration to file
    pub fn save_to(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;
        fs::write(path, content).context("Failed to write config file")?;
        Ok(())
    }

    /// Log file used while the terminal UI owns the screen
    pub fn log_path(&self) -> PathBuf {
        self.parlo_home.join("parlo.log")
    }

    /// Check if API key is configured
    pub fn has_api_key(&self) -> bool {
        self.get_api_key().is_some()
    }

    /// Get API key from config or environment
    pub fn get_api_key(&self) -> Option<String> {
        self.api_key
            .clone()
            .filter(|key| !key.trim().is_empty())
            .or_else(|| std::env::var(&self.api_key_env).ok())
    }

    /// Settings handed to the conversation manager
    pub fn chat_settings(&self) -> ChatSettings {
        let languages = if self.languages.is_empty() {
            Language::all()
        } else {
            self.languages.clone()
        };

        ChatSettings {
            auto_summarize_code: self.auto_summarize_code.clone(),
            auto_summarize_threshold: self.auto_summarize_threshold,
            summary_options: self.summary,
            languages,
            theme: self.ui.theme,
            target_language: self.ui.target_language,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::{SummaryLength, SummaryStyle};
    use tempfile::TempDir;

    #[test]
    fn test_load_creates_default_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let config = Config::load(Some(&path)).unwrap();
        assert!(path.exists());
        assert_eq!(config.auto_summarize_threshold, 150);
        assert_eq!(config.parlo_home, dir.path().join("nested"));
        assert_eq!(config.log_path(), dir.path().join("nested").join("parlo.log"));
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(
            &path,
            r#"
auto_summarize_code = "es"
languages = ["fr", "tr"]

[summary]
style = "tl-dr"
length = "short"

[ui]
theme = "light"
"#,
        )
        .unwrap();

        let config = Config::load(Some(&path)).unwrap();
        assert_eq!(config.model, "openai/gpt-4o-mini");
        assert_eq!(config.ui.theme, Theme::Light);

        let settings = config.chat_settings();
        assert_eq!(settings.auto_summarize_code, "es");
        assert_eq!(settings.languages, vec![Language::French, Language::Turkish]);
        assert_eq!(settings.summary_options.style, SummaryStyle::TlDr);
        assert_eq!(settings.summary_options.length, SummaryLength::Short);
    }

    #[test]
    fn test_save_and_reload() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        let config = Config {
            model: "mistral/small".to_string(),
            auto_summarize_threshold: 80,
            ..Config::default()
        };
        config.save_to(&path).unwrap();

        let reloaded = Config::load_from(&path).unwrap();
        assert_eq!(reloaded.model, "mistral/small");
        assert_eq!(reloaded.auto_summarize_threshold, 80);
        assert_eq!(reloaded.languages, Language::all());
    }

    #[test]
    fn test_empty_language_list_means_all() {
        let config = Config {
            languages: Vec::new(),
            ..Config::default()
        };
        assert_eq!(config.chat_settings().languages.len(), 6);
    }

    #[test]
    fn test_api_key_prefers_config() {
        let config = Config {
            api_key: Some("sk-test".to_string()),
            api_key_env: "PARLO_TEST_UNSET_KEY".to_string(),
            ..Config::default()
        };
        assert_eq!(config.get_api_key().as_deref(), Some("sk-test"));

        let blank = Config {
            api_key: Some("  ".to_string()),
            api_key_env: "PARLO_TEST_UNSET_KEY".to_string(),
            ..Config::default()
        };
        assert!(!blank.has_api_key());
    }
}
