//! Language type and language-code normalization.
//!
//! `Language` is a validated registry entry used as the translation target.
//! Detected languages are plain strings (providers may report codes outside
//! the registry, e.g. "zh-tw"), cleaned up by `normalize_language_code`.

use crate::i18n::LanguageRegistry;
use anyhow::{bail, Result};
use regex::Regex;
use std::sync::OnceLock;

/// Reported when a language could not be determined.
pub const UNKNOWN_LANGUAGE: &str = "unknown";

/// A language validated against the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Language {
    /// ISO 639-1 language code (e.g., "en", "vi")
    code: &'static str,
    /// English name, used in model prompts
    name: &'static str,
}

impl Language {
    pub const ENGLISH: Language = Language {
        code: "en",
        name: "English",
    };

    /// Create a Language from a code string.
    ///
    /// The code is trimmed and lowercased before lookup, so "EN" and " en "
    /// are accepted.
    pub fn from_code(code: &str) -> Result<Language> {
        let normalized = code.trim().to_ascii_lowercase();
        match LanguageRegistry::get().get_by_code(&normalized) {
            Some(config) => Ok(Language {
                code: config.code,
                name: config.name,
            }),
            None => bail!("Unknown language code: '{}'", code),
        }
    }

    pub fn code(&self) -> &'static str {
        self.code
    }

    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl Default for Language {
    fn default() -> Self {
        Language::ENGLISH
    }
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.name, self.code)
    }
}

fn language_code_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^([a-z]{2,3})(?:[-_]([a-z]{2,4}))?$").expect("language code regex is valid")
    })
}

/// Labels a model may put in front of the code.
const CODE_PREFIXES: [&str; 3] = ["language code:", "language:", "code:"];

/// Extract a language code from provider output.
///
/// Accepts bare codes ("vi"), decorated ones ("'Vi'.", "Language code: fr")
/// and region variants ("zh-TW" becomes "zh-tw"). Anything else, including
/// prose such as "I am not sure", yields `None`, as do "unknown" and "auto".
pub fn normalize_language_code(raw: &str) -> Option<String> {
    let lowered = raw.trim().to_lowercase();
    let unlabeled = CODE_PREFIXES
        .iter()
        .find_map(|prefix| lowered.strip_prefix(prefix))
        .unwrap_or(lowered.as_str());
    let candidate = unlabeled
        .trim()
        .trim_matches(|c: char| matches!(c, '"' | '\'' | '`' | '.' | ',' | '!' | '?' | ';' | ':'))
        .trim();

    if candidate.is_empty() || candidate == UNKNOWN_LANGUAGE || candidate == "auto" {
        return None;
    }

    let caps = language_code_regex().captures(candidate)?;
    Some(match caps.get(2) {
        Some(region) => format!("{}-{}", &caps[1], region.as_str()),
        None => caps[1].to_string(),
    })
}
