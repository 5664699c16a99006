//! Supported target languages and code lookup.

use std::collections::HashMap;

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, EnumIter, EnumString, IntoEnumIterator, IntoStaticStr};

/// Languages a message can be translated into.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    EnumString,
    EnumIter,
    AsRefStr,
    IntoStaticStr,
)]
pub enum Language {
    #[strum(serialize = "en")]
    #[serde(rename = "en")]
    English,
    #[strum(serialize = "es")]
    #[serde(rename = "es")]
    Spanish,
    #[strum(serialize = "fr")]
    #[serde(rename = "fr")]
    French,
    #[strum(serialize = "pt")]
    #[serde(rename = "pt")]
    Portuguese,
    #[strum(serialize = "ru")]
    #[serde(rename = "ru")]
    Russian,
    #[strum(serialize = "tr")]
    #[serde(rename = "tr")]
    Turkish,
}

static BY_CODE: Lazy<HashMap<&'static str, Language>> =
    Lazy::new(|| Language::iter().map(|language| (language.code(), language)).collect());

impl Language {
    /// Two-letter code, e.g. `"fr"`.
    pub fn code(self) -> &'static str {
        self.into()
    }

    pub fn display_name(self) -> &'static str {
        match self {
            Language::English => "English",
            Language::Spanish => "Spanish",
            Language::French => "French",
            Language::Portuguese => "Portuguese",
            Language::Russian => "Russian",
            Language::Turkish => "Turkish",
        }
    }

    /// Look up a language by code. Accepts regional tags such as `en-US`.
    pub fn from_code(code: &str) -> Option<Language> {
        BY_CODE.get(normalize_code(code).as_str()).copied()
    }

    pub fn all() -> Vec<Language> {
        Language::iter().collect()
    }
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.display_name())
    }
}

/// Lowercased primary subtag of a language tag (`"pt-BR"` -> `"pt"`).
pub fn normalize_code(code: &str) -> String {
    code.trim()
        .split(['-', '_'])
        .next()
        .unwrap_or_default()
        .to_ascii_lowercase()
}

/// Human-readable name for any code; unknown codes are shown as-is.
pub fn display_name_for(code: &str) -> String {
    Language::from_code(code)
        .map(|language| language.display_name().to_string())
        .unwrap_or_else(|| code.to_string())
}
