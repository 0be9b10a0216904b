use crate::config::Config;
use crate::error::ProviderError;
use crate::i18n::{normalize_language_code, TranslationMetrics, UNKNOWN_LANGUAGE};
use crate::provider::{self, is_blank, TranslationProvider};
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Outcome of translating one subject line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TranslationStatus {
    Success,
    Failed,
    NoText,
}

/// Uniform translation result, whatever provider is active.
///
/// `translated` is always populated: on failure it carries the original text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranslationResult {
    pub original: String,
    pub translated: String,
    pub language_detected: String,
    #[serde(rename = "translation_status")]
    pub status: TranslationStatus,
}

impl TranslationResult {
    fn no_text(subject: &str) -> Self {
        Self {
            original: subject.to_string(),
            translated: subject.to_string(),
            language_detected: UNKNOWN_LANGUAGE.to_string(),
            status: TranslationStatus::NoText,
        }
    }

    fn failed(subject: &str, language_detected: String) -> Self {
        Self {
            original: subject.to_string(),
            translated: subject.to_string(),
            language_detected,
            status: TranslationStatus::Failed,
        }
    }
}

/// Detect-then-translate orchestration over a `TranslationProvider`.
///
/// Provider trouble (errors, timeouts, a disabled provider) never escapes:
/// it downgrades the result to `Failed` with the original text.
#[derive(Clone)]
pub struct Translator {
    provider: Arc<dyn TranslationProvider>,
    timeout: Duration,
    metrics: Arc<TranslationMetrics>,
}

impl Translator {
    pub fn new(provider: Arc<dyn TranslationProvider>, timeout: Duration) -> Self {
        Self {
            provider,
            timeout,
            metrics: Arc::new(TranslationMetrics::new()),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(provider::from_config(config), config.translation_timeout)
    }

    pub fn enabled(&self) -> bool {
        self.provider.enabled()
    }

    pub fn provider_name(&self) -> &'static str {
        self.provider.name()
    }

    pub fn metrics(&self) -> &TranslationMetrics {
        &self.metrics
    }

    /// Translate a subject line into the target language.
    pub async fn translate_subject(&self, subject: &str) -> TranslationResult {
        if is_blank(subject) {
            self.metrics.record_no_text();
            return TranslationResult::no_text(subject);
        }

        if !self.provider.enabled() {
            debug!("Translation provider disabled, keeping original subject");
            self.metrics.record_failure();
            return TranslationResult::failed(subject, UNKNOWN_LANGUAGE.to_string());
        }

        let detected = match self
            .guarded("detect_language", self.provider.detect_language(subject))
            .await
        {
            Ok(raw) => normalize_language_code(&raw).unwrap_or_else(|| UNKNOWN_LANGUAGE.to_string()),
            Err(_) => UNKNOWN_LANGUAGE.to_string(),
        };

        match self
            .guarded("translate", self.provider.translate(subject, &detected))
            .await
        {
            Ok(translated) => {
                if translated.unsupported_pair {
                    self.metrics.record_unsupported_pair();
                }
                self.metrics.record_success();
                TranslationResult {
                    original: subject.to_string(),
                    translated: translated.text,
                    language_detected: detected,
                    status: TranslationStatus::Success,
                }
            }
            Err(_) => {
                self.metrics.record_failure();
                TranslationResult::failed(subject, detected)
            }
        }
    }

    /// Languages the active provider can translate.
    ///
    /// Empty when translation is disabled or the provider cannot answer.
    pub async fn supported_languages(&self) -> Vec<String> {
        if !self.provider.enabled() {
            return Vec::new();
        }

        match self
            .guarded("supported_languages", self.provider.supported_languages())
            .await
        {
            Ok(languages) => languages,
            Err(_) => Vec::new(),
        }
    }

    /// Run one provider call under the per-call timeout, recording metrics
    /// and logging failures.
    async fn guarded<T, F>(&self, operation: &str, call: F) -> Result<T, ProviderError>
    where
        F: Future<Output = Result<T, ProviderError>>,
    {
        self.metrics.record_provider_call();

        let result = match tokio::time::timeout(self.timeout, call).await {
            Ok(result) => result,
            Err(_) => {
                self.metrics.record_timeout();
                Err(ProviderError::Timeout(self.timeout))
            }
        };

        if let Err(e) = &result {
            self.metrics.record_provider_failure();
            warn!(
                provider = self.provider.name(),
                kind = e.kind(),
                "{} failed: {}",
                operation,
                e
            );
        }

        result
    }
}
