//! Translation providers: language detection and translation backends.
//!
//! Two real backends exist, AWS Translate (`aws`) and OpenAI chat
//! completions (`openai`), plus `DisabledProvider` for when neither is
//! configured. Exactly one is selected at startup by `from_config`.

pub mod aws;
pub mod openai;
pub mod sigv4;

pub use aws::AwsTranslateProvider;
pub use openai::OpenAiProvider;

use crate::config::{Config, ProviderKind};
use crate::error::ProviderError;
use crate::i18n::{LanguageRegistry, UNKNOWN_LANGUAGE};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{info, warn};

/// Output of a successful `translate` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslatedText {
    pub text: String,
    /// The provider could not translate this language pair and handed back
    /// the original text instead.
    pub unsupported_pair: bool,
}

impl TranslatedText {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            unsupported_pair: false,
        }
    }

    pub fn unsupported_pair(original: impl Into<String>) -> Self {
        Self {
            text: original.into(),
            unsupported_pair: true,
        }
    }
}

/// Language detection and translation into the configured target language.
///
/// Implementations never panic on provider trouble: every remote failure is
/// returned as a `ProviderError`. Blank input is answered locally without a
/// remote call (`"unknown"` for detection, the input itself for translation).
#[async_trait]
pub trait TranslationProvider: Send + Sync {
    /// Short provider name for logs and health output.
    fn name(&self) -> &'static str;

    /// True when credentials were present and the client was built.
    fn enabled(&self) -> bool;

    /// Detect the language of `text`, returning a language code or
    /// `"unknown"`.
    async fn detect_language(&self, text: &str) -> Result<String, ProviderError>;

    /// Translate `text` into the target language. `source_language` is a
    /// detected code or `"unknown"`.
    async fn translate(
        &self,
        text: &str,
        source_language: &str,
    ) -> Result<TranslatedText, ProviderError>;

    /// Language codes this provider can handle.
    async fn supported_languages(&self) -> Result<Vec<String>, ProviderError> {
        Ok(LanguageRegistry::get().codes())
    }
}

/// Provider used when no credentials are configured.
#[derive(Debug, Default, Clone, Copy)]
pub struct DisabledProvider;

#[async_trait]
impl TranslationProvider for DisabledProvider {
    fn name(&self) -> &'static str {
        "disabled"
    }

    fn enabled(&self) -> bool {
        false
    }

    async fn detect_language(&self, _text: &str) -> Result<String, ProviderError> {
        Err(ProviderError::Disabled)
    }

    async fn translate(
        &self,
        _text: &str,
        _source_language: &str,
    ) -> Result<TranslatedText, ProviderError> {
        Err(ProviderError::Disabled)
    }

    async fn supported_languages(&self) -> Result<Vec<String>, ProviderError> {
        Ok(Vec::new())
    }
}

/// Build the provider selected by the configured credentials.
///
/// A provider whose client cannot be constructed degrades to
/// `DisabledProvider` instead of failing startup.
pub fn from_config(config: &Config) -> Arc<dyn TranslationProvider> {
    match config.provider_kind() {
        ProviderKind::Aws => match AwsTranslateProvider::new(config) {
            Ok(provider) => {
                info!(
                    region = %config.aws_region,
                    target = %config.target_language,
                    "AWS Translate enabled"
                );
                Arc::new(provider)
            }
            Err(e) => {
                warn!("Failed to initialize AWS Translate, translation disabled: {}", e);
                Arc::new(DisabledProvider)
            }
        },
        ProviderKind::OpenAi => match OpenAiProvider::new(config) {
            Ok(provider) => {
                info!(
                    model = %config.openai_model,
                    target = %config.target_language,
                    "OpenAI translator enabled"
                );
                Arc::new(provider)
            }
            Err(e) => {
                warn!("Failed to initialize OpenAI translator, translation disabled: {}", e);
                Arc::new(DisabledProvider)
            }
        },
        ProviderKind::Disabled => {
            warn!("No translation credentials found (AWS or OpenAI). Translation disabled.");
            Arc::new(DisabledProvider)
        }
    }
}

/// Empty or whitespace-only text never reaches a remote provider.
pub fn is_blank(text: &str) -> bool {
    text.trim().is_empty()
}

/// True when a source-language argument carries no usable code.
pub(crate) fn is_unknown_language(code: &str) -> bool {
    let code = code.trim();
    code.is_empty() || code.eq_ignore_ascii_case(UNKNOWN_LANGUAGE) || code.eq_ignore_ascii_case("auto")
}

/// Shared HTTP client construction for the remote providers.
pub(crate) fn build_http_client(config: &Config) -> Result<reqwest::Client, ProviderError> {
    reqwest::Client::builder()
        .connect_timeout(config.translation_timeout)
        .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(|e| ProviderError::Request(format!("failed to build HTTP client: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_disabled_provider_fails_every_call() {
        let provider = DisabledProvider;

        assert!(!provider.enabled());
        assert_eq!(provider.name(), "disabled");
        assert_eq!(
            provider.detect_language("Bonjour").await,
            Err(ProviderError::Disabled)
        );
        assert_eq!(
            provider.translate("Bonjour", "fr").await,
            Err(ProviderError::Disabled)
        );
        assert_eq!(provider.supported_languages().await, Ok(vec![]));
    }

    #[test]
    fn test_from_config_without_credentials_is_disabled() {
        let provider = from_config(&Config::default());
        assert!(!provider.enabled());
        assert_eq!(provider.name(), "disabled");
    }

    #[test]
    fn test_from_config_selects_openai() {
        let config = Config {
            openai_api_key: Some("sk-test".to_string()),
            ..Config::default()
        };
        let provider = from_config(&config);
        assert!(provider.enabled());
        assert_eq!(provider.name(), "openai");
    }

    #[test]
    fn test_from_config_prefers_aws() {
        let config = Config {
            aws_access_key_id: Some("AKIDEXAMPLE".to_string()),
            aws_secret_access_key: Some("secret".to_string()),
            openai_api_key: Some("sk-test".to_string()),
            ..Config::default()
        };
        let provider = from_config(&config);
        assert!(provider.enabled());
        assert_eq!(provider.name(), "aws-translate");
    }

    #[test]
    fn test_is_blank() {
        assert!(is_blank(""));
        assert!(is_blank("   "));
        assert!(is_blank("\n\t"));
        assert!(!is_blank(" a "));
    }

    #[test]
    fn test_is_unknown_language() {
        assert!(is_unknown_language("unknown"));
        assert!(is_unknown_language("AUTO"));
        assert!(is_unknown_language(""));
        assert!(!is_unknown_language("vi"));
    }

    #[test]
    fn test_translated_text_constructors() {
        let translated = TranslatedText::new("Hello");
        assert!(!translated.unsupported_pair);

        let passthrough = TranslatedText::unsupported_pair("Xin chào");
        assert!(passthrough.unsupported_pair);
        assert_eq!(passthrough.text, "Xin chào");
    }
}
