//! Translate a subject line from the command line with the configured provider
//!
//! Usage:
//!   cargo run --bin translate -- "Thông báo quan trọng"
//!   cargo run --bin translate -- --languages     # List supported languages
//!
//! Provider selection follows the server: AWS_ACCESS_KEY_ID + AWS_SECRET_ACCESS_KEY,
//! else OPENAI_API_KEY, else translation is disabled.
//!
//! Prints the translation result as JSON on stdout.

use anyhow::{bail, Context, Result};
use email_webhook_translator::config::Config;
use email_webhook_translator::translation::Translator;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr so stdout stays pure JSON
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("email_webhook_translator=warn".parse()?),
        )
        .init();

    dotenvy::dotenv().ok();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let list_languages = args.iter().any(|arg| arg == "--languages");
    let text = args
        .iter()
        .filter(|arg| !arg.starts_with("--"))
        .cloned()
        .collect::<Vec<_>>()
        .join(" ");

    let config = Config::from_env()?;
    let translator = Translator::from_config(&config);
    info!(
        "Using provider '{}' (target {})",
        translator.provider_name(),
        config.target_language
    );

    let output = if list_languages {
        serde_json::to_string_pretty(&serde_json::json!({
            "provider": translator.provider_name(),
            "languages": translator.supported_languages().await,
        }))?
    } else {
        if text.is_empty() {
            bail!("Usage: translate <text> | translate --languages");
        }
        let result = translator.translate_subject(&text).await;
        serde_json::to_string_pretty(&result).context("Failed to serialize translation")?
    };

    println!("{}", output);
    Ok(())
}
