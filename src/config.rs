use crate::i18n::Language;
use anyhow::{bail, Context, Result};
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Config {
    // Server
    pub environment: String,
    pub host: String,
    pub port: u16,
    pub use_https: bool,
    pub log_level: String,

    // Pipeline
    pub target_language: Language,
    pub max_stored_emails: usize,
    pub translation_timeout: Duration,

    // AWS Translate
    pub aws_access_key_id: Option<String>,
    pub aws_secret_access_key: Option<String>,
    pub aws_session_token: Option<String>,
    pub aws_region: String,
    pub aws_translate_endpoint: Option<String>,

    // OpenAI
    pub openai_api_key: Option<String>,
    pub openai_model: String,
    pub openai_api_url: String,
}

/// Which translation backend the configured credentials select.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderKind {
    Aws,
    OpenAi,
    Disabled,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let target_code = std::env::var("TARGET_LANGUAGE").unwrap_or_else(|_| "en".to_string());
        let target_language = Language::from_code(&target_code)
            .with_context(|| format!("Invalid TARGET_LANGUAGE '{}'", target_code))?;

        let max_stored_emails: usize = parse_var("MAX_STORED_EMAILS", 1000)?;
        if max_stored_emails == 0 {
            bail!("MAX_STORED_EMAILS must be at least 1");
        }

        let timeout_secs: u64 = parse_var("TRANSLATION_TIMEOUT_SECS", 10)?;
        if timeout_secs == 0 {
            bail!("TRANSLATION_TIMEOUT_SECS must be at least 1");
        }

        let port: u16 = parse_var("PORT", 5000)?;

        Ok(Self {
            // Server
            environment: std::env::var("APP_ENV").unwrap_or_else(|_| "production".to_string()),
            host: std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port,
            use_https: parse_bool(std::env::var("USE_HTTPS").ok().as_deref()),
            log_level: std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),

            // Pipeline
            target_language,
            max_stored_emails,
            translation_timeout: Duration::from_secs(timeout_secs),

            // AWS Translate
            aws_access_key_id: non_empty_var("AWS_ACCESS_KEY_ID"),
            aws_secret_access_key: non_empty_var("AWS_SECRET_ACCESS_KEY"),
            aws_session_token: non_empty_var("AWS_SESSION_TOKEN"),
            aws_region: std::env::var("AWS_REGION").unwrap_or_else(|_| "us-east-1".to_string()),
            aws_translate_endpoint: non_empty_var("AWS_TRANSLATE_ENDPOINT"),

            // OpenAI
            openai_api_key: non_empty_var("OPENAI_API_KEY"),
            openai_model: std::env::var("OPENAI_MODEL")
                .unwrap_or_else(|_| "gpt-4o-mini".to_string()),
            openai_api_url: std::env::var("OPENAI_API_URL")
                .unwrap_or_else(|_| "https://api.openai.com/v1/chat/completions".to_string()),
        })
    }

    /// AWS wins when both credential sets are present.
    pub fn provider_kind(&self) -> ProviderKind {
        if self.aws_access_key_id.is_some() && self.aws_secret_access_key.is_some() {
            ProviderKind::Aws
        } else if self.openai_api_key.is_some() {
            ProviderKind::OpenAi
        } else {
            ProviderKind::Disabled
        }
    }

    pub fn aws_endpoint(&self) -> String {
        self.aws_translate_endpoint
            .clone()
            .unwrap_or_else(|| format!("https://translate.{}.amazonaws.com", self.aws_region))
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            environment: "production".to_string(),
            host: "0.0.0.0".to_string(),
            port: 5000,
            use_https: false,
            log_level: "info".to_string(),
            target_language: Language::ENGLISH,
            max_stored_emails: 1000,
            translation_timeout: Duration::from_secs(10),
            aws_access_key_id: None,
            aws_secret_access_key: None,
            aws_session_token: None,
            aws_region: "us-east-1".to_string(),
            aws_translate_endpoint: None,
            openai_api_key: None,
            openai_model: "gpt-4o-mini".to_string(),
            openai_api_url: "https://api.openai.com/v1/chat/completions".to_string(),
        }
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Parse a numeric variable; unset uses `default`, malformed is an error.
fn parse_var<T>(name: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(name) {
        Ok(v) => v
            .trim()
            .parse()
            .with_context(|| format!("{} must be a non-negative integer, got '{}'", name, v)),
        Err(_) => Ok(default),
    }
}

fn parse_bool(value: Option<&str>) -> bool {
    matches!(
        value.map(|v| v.trim().to_ascii_lowercase()).as_deref(),
        Some("true") | Some("1") | Some("yes")
    )
}
