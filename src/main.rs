use anyhow::Result;
use email_webhook_translator::config::Config;
use email_webhook_translator::server;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file (absent in production)
    let _ = dotenvy::dotenv();

    let config = Config::from_env()?;

    // RUST_LOG wins over LOG_LEVEL
    let filter = EnvFilter::try_from_default_env().or_else(|_| {
        EnvFilter::try_new(format!(
            "email_webhook_translator={level},tower_http={level}",
            level = config.log_level
        ))
    })?;
    tracing_subscriber::fmt().with_env_filter(filter).init();

    info!(
        "Starting email webhook receiver ({} environment)",
        config.environment
    );

    server::serve(config).await
}
