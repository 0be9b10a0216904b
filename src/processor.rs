use crate::error::ProcessError;
use crate::store::BoundedStore;
use crate::translation::{TranslationResult, Translator};
use chrono::{SecondsFormat, Utc};
use futures::FutureExt;
use serde::{Deserialize, Serialize};
use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tracing::{error, info, warn};

/// Email notification as delivered by the webhook source.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InboundRecord {
    #[serde(default)]
    pub from: Option<String>,
    #[serde(default)]
    pub to: Option<String>,
    #[serde(default)]
    pub subject: Option<String>,
    #[serde(default)]
    pub body: Option<String>,
}

impl InboundRecord {
    pub fn new(from: &str, to: &str, subject: &str, body: &str) -> Self {
        Self {
            from: Some(from.to_string()),
            to: Some(to.to_string()),
            subject: Some(subject.to_string()),
            body: Some(body.to_string()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordStatus {
    Processed,
}

/// An accepted email with its translated subject.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessedRecord {
    pub timestamp: String,
    pub from: String,
    pub to: String,
    pub subject: TranslationResult,
    pub body: String,
    pub status: RecordStatus,
}

pub type EmailStore = BoundedStore<ProcessedRecord>;

/// Validates inbound emails, translates their subjects and keeps them in
/// the bounded store.
pub struct EmailProcessor {
    translator: Translator,
    store: Arc<EmailStore>,
    rejected: AtomicUsize,
}

impl EmailProcessor {
    pub fn new(translator: Translator, store: Arc<EmailStore>) -> Self {
        Self {
            translator,
            store,
            rejected: AtomicUsize::new(0),
        }
    }

    pub fn translator(&self) -> &Translator {
        &self.translator
    }

    pub fn store(&self) -> &EmailStore {
        &self.store
    }

    /// Number of records rejected by validation or internal errors.
    pub fn rejected(&self) -> usize {
        self.rejected.load(Ordering::Relaxed)
    }

    /// Validate, enrich and store one inbound email.
    ///
    /// Only `from` and `to` are required. The store is only touched once the
    /// record is fully assembled; a panic anywhere in the pipeline comes back
    /// as `ProcessError::Internal`.
    pub async fn process(&self, record: InboundRecord) -> Result<ProcessedRecord, ProcessError> {
        let (from, to) = match validate(&record) {
            Ok(addresses) => addresses,
            Err(e) => {
                self.rejected.fetch_add(1, Ordering::Relaxed);
                warn!("Email data missing from/to, rejecting");
                return Err(e);
            }
        };

        let subject = record.subject.unwrap_or_default();
        let body = record.body.unwrap_or_default();

        match AssertUnwindSafe(self.enrich(from, to, subject, body))
            .catch_unwind()
            .await
        {
            Ok(processed) => Ok(processed),
            Err(panic) => {
                self.rejected.fetch_add(1, Ordering::Relaxed);
                let message = panic_message(panic.as_ref());
                error!("Error processing email: {}", message);
                Err(ProcessError::Internal(message))
            }
        }
    }

    async fn enrich(&self, from: String, to: String, subject: String, body: String) -> ProcessedRecord {
        let timestamp = Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true);
        let translation = self.translator.translate_subject(&subject).await;

        let processed = ProcessedRecord {
            timestamp,
            from,
            to,
            subject: translation,
            body,
            status: RecordStatus::Processed,
        };

        if self.store.append(processed.clone()).is_some() {
            info!(
                "Store at capacity ({}), evicted oldest email",
                self.store.capacity()
            );
        }

        // Body is never logged
        info!(
            "Email processed: From={}, To={}, Subject='{}' -> '{}' ({:?})",
            processed.from,
            processed.to,
            processed.subject.original,
            processed.subject.translated,
            processed.subject.status
        );

        processed
    }
}

fn validate(record: &InboundRecord) -> Result<(String, String), ProcessError> {
    let from = record.from.as_deref().filter(|v| !v.is_empty());
    let to = record.to.as_deref().filter(|v| !v.is_empty());

    match (from, to) {
        (Some(from), Some(to)) => Ok((from.to_string(), to.to_string())),
        _ => Err(ProcessError::MissingField),
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else {
        "internal error while processing email".to_string()
    }
}
