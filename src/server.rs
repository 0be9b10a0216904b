//! HTTP surface of the webhook receiver.
//!
//! Routes:
//! - `GET  /`              service info
//! - `POST /api/email`     receive one email notification
//! - `GET  /api/emails`    stored history, oldest first
//! - `POST /api/translate` translate arbitrary text
//! - `GET  /api/languages` languages the active provider supports
//! - `GET  /health`        liveness
//! - `GET  /metrics`       storage and translation counters

use crate::config::Config;
use crate::error::ApiError;
use crate::processor::{EmailProcessor, InboundRecord, ProcessedRecord};
use crate::store::BoundedStore;
use crate::translation::{TranslationResult, TranslationStatus, Translator};
use anyhow::{Context, Result};
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post, MethodRouter};
use axum::{Json, Router};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Instant;
use tower_http::cors::{Any, CorsLayer};
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

const HSTS_VALUE: &str = "max-age=31536000; includeSubDomains";

/// Shared state handed to every handler.
pub struct AppState {
    pub config: Config,
    pub processor: EmailProcessor,
    pub started_at: Instant,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        let translator = Translator::from_config(&config);
        Self::with_translator(config, translator)
    }

    pub fn with_translator(config: Config, translator: Translator) -> Self {
        let store = Arc::new(BoundedStore::new(config.max_stored_emails));
        Self {
            processor: EmailProcessor::new(translator, store),
            config,
            started_at: Instant::now(),
        }
    }

    fn translator(&self) -> &Translator {
        self.processor.translator()
    }
}

#[derive(Debug, Serialize)]
struct TranslationInfo {
    original_subject: String,
    translated_subject: String,
    language_detected: String,
    translation_status: TranslationStatus,
}

impl From<&TranslationResult> for TranslationInfo {
    fn from(result: &TranslationResult) -> Self {
        Self {
            original_subject: result.original.clone(),
            translated_subject: result.translated.clone(),
            language_detected: result.language_detected.clone(),
            translation_status: result.status,
        }
    }
}

#[derive(Debug, Serialize)]
struct EmailReceived {
    message: &'static str,
    email: ProcessedRecord,
    translation_info: TranslationInfo,
}

#[derive(Debug, Serialize)]
struct EmailList {
    emails: Vec<ProcessedRecord>,
    count: usize,
    total_count: u64,
}

#[derive(Debug, Deserialize)]
struct TranslateRequest {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Serialize)]
struct TranslateResponse {
    translation: TranslationResult,
    translator_enabled: bool,
}

/// Build the application router with CORS, security headers and tracing.
pub fn router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api = Router::new()
        .route("/api/email", json_405(post(receive_email)))
        .route("/api/emails", json_405(get(list_emails)))
        .route("/api/translate", json_405(post(translate_text)))
        .route("/api/languages", json_405(get(list_languages)))
        .layer(cors);

    let mut app = Router::new()
        .route("/", json_405(get(home)))
        .route("/health", json_405(get(health)))
        .route("/metrics", json_405(get(metrics)))
        .merge(api)
        .fallback(not_found)
        .layer(SetResponseHeaderLayer::overriding(
            header::X_CONTENT_TYPE_OPTIONS,
            HeaderValue::from_static("nosniff"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::X_FRAME_OPTIONS,
            HeaderValue::from_static("DENY"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::X_XSS_PROTECTION,
            HeaderValue::from_static("1; mode=block"),
        ));

    if state.config.use_https {
        app = app.layer(SetResponseHeaderLayer::overriding(
            header::STRICT_TRANSPORT_SECURITY,
            HeaderValue::from_static(HSTS_VALUE),
        ));
    }

    app.layer(TraceLayer::new_for_http()).with_state(state)
}

/// Bind and serve until Ctrl+C.
pub async fn serve(config: Config) -> Result<()> {
    let address = config.bind_address();
    let state = Arc::new(AppState::new(config));

    info!(
        "Translation: {} (target {})",
        if state.translator().enabled() {
            state.translator().provider_name()
        } else {
            "disabled"
        },
        state.config.target_language
    );

    let listener = tokio::net::TcpListener::bind(&address)
        .await
        .with_context(|| format!("Failed to bind to {}", address))?;
    info!("Webhook receiver listening on http://{}", address);

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}

fn json_405(route: MethodRouter<Arc<AppState>>) -> MethodRouter<Arc<AppState>> {
    route.fallback(method_not_allowed)
}

// ==================== Handlers ====================

async fn home(State(state): State<Arc<AppState>>) -> Json<Value> {
    Json(json!({
        "message": "Email webhook receiver with subject translation",
        "status": "running",
        "version": env!("CARGO_PKG_VERSION"),
        "environment": state.config.environment,
        "https_enabled": state.config.use_https,
        "translation_enabled": state.translator().enabled(),
        "endpoints": {
            "receive_email": "/api/email",
            "get_emails": "/api/emails",
            "translate": "/api/translate",
            "languages": "/api/languages",
            "health": "/health",
            "metrics": "/metrics"
        }
    }))
}

async fn receive_email(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<InboundRecord>, JsonRejection>,
) -> Result<Json<EmailReceived>, ApiError> {
    let Json(record) = payload.map_err(|rejection| {
        warn!("Rejected webhook payload: {}", rejection.body_text());
        ApiError::BadRequest("No JSON data received".to_string())
    })?;

    info!("Received email webhook");
    let email = state.processor.process(record).await?;
    let translation_info = TranslationInfo::from(&email.subject);

    Ok(Json(EmailReceived {
        message: "Email received successfully",
        email,
        translation_info,
    }))
}

async fn list_emails(State(state): State<Arc<AppState>>) -> Json<EmailList> {
    let store = state.processor.store();
    let emails = store.all();
    Json(EmailList {
        count: emails.len(),
        emails,
        total_count: store.stats().total_appended,
    })
}

async fn translate_text(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<TranslateRequest>, JsonRejection>,
) -> Result<Json<TranslateResponse>, ApiError> {
    let text = payload
        .ok()
        .and_then(|Json(request)| request.text)
        .ok_or_else(|| ApiError::BadRequest("Text field is required".to_string()))?;

    let translator = state.translator();
    Ok(Json(TranslateResponse {
        translation: translator.translate_subject(&text).await,
        translator_enabled: translator.enabled(),
    }))
}

async fn list_languages(State(state): State<Arc<AppState>>) -> Json<Value> {
    let translator = state.translator();
    Json(json!({
        "provider": translator.provider_name(),
        "target_language": state.config.target_language.code(),
        "languages": translator.supported_languages().await,
    }))
}

async fn health(State(state): State<Arc<AppState>>) -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "timestamp": Utc::now().to_rfc3339(),
        "processed_emails_count": state.processor.store().count(),
        "translation_enabled": state.translator().enabled(),
        "translation_provider": state.translator().provider_name(),
        "uptime_seconds": state.started_at.elapsed().as_secs(),
    }))
}

async fn metrics(State(state): State<Arc<AppState>>) -> Json<Value> {
    let stats = state.processor.store().stats();
    Json(json!({
        "total_emails_processed": stats.total_appended,
        "stored_emails": stats.count,
        "max_emails_stored": stats.capacity,
        "current_storage_usage": format!("{:.1}%", stats.usage_percent()),
        "store_evictions": stats.evicted,
        "records_rejected": state.processor.rejected(),
        "translation_enabled": state.translator().enabled(),
        "timestamp": Utc::now().to_rfc3339(),
        "translation": state.translator().metrics().report(),
    }))
}

async fn not_found() -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(json!({ "error": "Endpoint not found" })),
    )
        .into_response()
}

async fn method_not_allowed() -> Response {
    (
        StatusCode::METHOD_NOT_ALLOWED,
        Json(json!({ "error": "Method not allowed" })),
    )
        .into_response()
}
