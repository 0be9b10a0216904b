use crate::config::Config;
use crate::error::ProviderError;
use crate::i18n::{Language, LanguageRegistry, UNKNOWN_LANGUAGE};
use crate::provider::{build_http_client, is_blank, is_unknown_language, TranslatedText, TranslationProvider};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// OpenAI Chat Completion request
#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<Message>,
    max_completion_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    reasoning_effort: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Message {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: Message,
}

/// Check if a model is a reasoning model that doesn't support temperature
fn is_reasoning_model(model: &str) -> bool {
    model.starts_with("gpt-5")
        || model.starts_with("o1")
        || model.starts_with("o3")
        || model.starts_with("o4")
}

fn build_translation_system_prompt(target_language: &str) -> String {
    format!(
        "You are a helpful translation assistant. Translate the given text to {}. \
         Keep the translation concise and natural. Reply with the translation only.",
        target_language
    )
}

fn build_translation_user_prompt(text: &str, source_language: Option<&str>, target_language: &str) -> String {
    let source_hint = match source_language {
        Some(source) => format!("The text is written in {}.\n", source),
        None => String::new(),
    };
    format!(
        "Translate the following text to {target}.\n\
         If the text is already in {target}, return it as is.\n\
         {hint}\n\
         Text: \"{text}\"\n\n\
         Translation:",
        target = target_language,
        hint = source_hint,
        text = text
    )
}

const DETECTION_SYSTEM_PROMPT: &str =
    "You are a language detection assistant. Return only the language code.";

fn build_detection_user_prompt(text: &str) -> String {
    format!(
        "Detect the language of this text and return only the ISO 639-1 language code \
         (e.g., 'en', 'vi', 'fr'):\n\nText: \"{}\"\n\nLanguage code:",
        text
    )
}

/// Models often echo the quotes used in the prompt around their answer.
fn strip_wrapping_quotes(text: &str) -> &str {
    let trimmed = text.trim();
    for quote in ['"', '\'', '“'] {
        let closing = if quote == '“' { '”' } else { quote };
        if let Some(inner) = trimmed
            .strip_prefix(quote)
            .and_then(|rest| rest.strip_suffix(closing))
        {
            return inner.trim();
        }
    }
    trimmed
}

/// Generative translation through the OpenAI chat completions API.
pub struct OpenAiProvider {
    client: reqwest::Client,
    api_url: String,
    api_key: String,
    model: String,
    target_language: Language,
}

impl OpenAiProvider {
    pub fn new(config: &Config) -> Result<Self, ProviderError> {
        let api_key = config
            .openai_api_key
            .clone()
            .ok_or_else(|| ProviderError::Request("OPENAI_API_KEY is required".to_string()))?;

        Ok(Self {
            client: build_http_client(config)?,
            api_url: config.openai_api_url.clone(),
            api_key,
            model: config.openai_model.clone(),
            target_language: config.target_language,
        })
    }

    fn build_request(&self, system: String, user: String, max_tokens: u32, temperature: f32) -> ChatRequest {
        // Reasoning models need headroom for hidden reasoning tokens and reject temperature
        let is_reasoning = is_reasoning_model(&self.model);
        ChatRequest {
            model: self.model.clone(),
            messages: vec![
                Message {
                    role: "system".to_string(),
                    content: system,
                },
                Message {
                    role: "user".to_string(),
                    content: user,
                },
            ],
            max_completion_tokens: if is_reasoning { 2000 } else { max_tokens },
            temperature: if is_reasoning { None } else { Some(temperature) },
            reasoning_effort: if is_reasoning {
                Some("low".to_string())
            } else {
                None
            },
        }
    }

    async fn complete(&self, request: &ChatRequest) -> Result<String, ProviderError> {
        let response = self
            .client
            .post(&self.api_url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response
                .text()
                .await
                .unwrap_or_else(|e| format!("<failed to read body: {}>", e));
            return Err(ProviderError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let chat_response: ChatResponse = response.json().await?;

        let content = chat_response
            .choices
            .first()
            .map(|c| strip_wrapping_quotes(&c.message.content).to_string())
            .ok_or_else(|| {
                ProviderError::InvalidResponse("OpenAI response contained no choices".to_string())
            })?;

        if content.is_empty() {
            return Err(ProviderError::InvalidResponse(
                "OpenAI response was empty".to_string(),
            ));
        }

        Ok(content)
    }
}

#[async_trait]
impl TranslationProvider for OpenAiProvider {
    fn name(&self) -> &'static str {
        "openai"
    }

    fn enabled(&self) -> bool {
        true
    }

    async fn detect_language(&self, text: &str) -> Result<String, ProviderError> {
        if is_blank(text) {
            return Ok(UNKNOWN_LANGUAGE.to_string());
        }

        let request = self.build_request(
            DETECTION_SYSTEM_PROMPT.to_string(),
            build_detection_user_prompt(text),
            10,
            0.1,
        );
        let language_code = self.complete(&request).await?.to_lowercase();
        debug!("Language detected: '{}' -> '{}'", text, language_code);
        Ok(language_code)
    }

    async fn translate(
        &self,
        text: &str,
        source_language: &str,
    ) -> Result<TranslatedText, ProviderError> {
        if is_blank(text) {
            return Ok(TranslatedText::new(text));
        }

        let source_name = if is_unknown_language(source_language) {
            None
        } else {
            Some(
                LanguageRegistry::get()
                    .get_by_code(source_language)
                    .map(|lang| lang.name)
                    .unwrap_or(source_language),
            )
        };

        let request = self.build_request(
            build_translation_system_prompt(self.target_language.name()),
            build_translation_user_prompt(text, source_name, self.target_language.name()),
            100,
            0.3,
        );
        let translated = self.complete(&request).await?;
        info!("Translation: '{}' -> '{}'", text, translated);
        Ok(TranslatedText::new(translated))
    }
}
