//! Language registry: the languages the service knows by code and name.
//!
//! The registry validates the configured target language, names it in
//! model prompts, and is the supported-language list of providers that
//! cannot enumerate their own.

use std::sync::OnceLock;

/// Metadata for one known language.
#[derive(Debug, Clone)]
pub struct LanguageConfig {
    /// ISO 639-1 language code (e.g., "en", "vi")
    pub code: &'static str,

    /// English name of the language (e.g., "English", "Vietnamese")
    pub name: &'static str,
}

/// Global language registry singleton.
pub struct LanguageRegistry {
    languages: Vec<LanguageConfig>,
}

static REGISTRY: OnceLock<LanguageRegistry> = OnceLock::new();

impl LanguageRegistry {
    /// Get the global language registry instance.
    pub fn get() -> &'static LanguageRegistry {
        REGISTRY.get_or_init(|| LanguageRegistry {
            languages: default_languages(),
        })
    }

    /// Look up a language by its code (case-sensitive, lowercase).
    pub fn get_by_code(&self, code: &str) -> Option<&LanguageConfig> {
        self.languages.iter().find(|lang| lang.code == code)
    }

    /// All registry codes, in registry order.
    pub fn codes(&self) -> Vec<String> {
        self.languages.iter().map(|lang| lang.code.to_string()).collect()
    }
}

fn default_languages() -> Vec<LanguageConfig> {
    vec![
        LanguageConfig { code: "en", name: "English" },
        LanguageConfig { code: "vi", name: "Vietnamese" },
        LanguageConfig { code: "fr", name: "French" },
        LanguageConfig { code: "de", name: "German" },
        LanguageConfig { code: "es", name: "Spanish" },
        LanguageConfig { code: "it", name: "Italian" },
        LanguageConfig { code: "pt", name: "Portuguese" },
        LanguageConfig { code: "ru", name: "Russian" },
        LanguageConfig { code: "ja", name: "Japanese" },
        LanguageConfig { code: "ko", name: "Korean" },
        LanguageConfig { code: "zh", name: "Chinese (Simplified)" },
        LanguageConfig { code: "ar", name: "Arabic" },
        LanguageConfig { code: "hi", name: "Hindi" },
        LanguageConfig { code: "th", name: "Thai" },
    ]
}
