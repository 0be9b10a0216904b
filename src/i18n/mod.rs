//! Language handling for the translation pipeline.
//!
//! # Architecture
//!
//! - `registry`: the languages the service knows, by code and name
//! - `language`: validated target `Language` and detected-code normalization
//! - `metrics`: translation outcome counters reported at `/metrics`

mod language;
mod metrics;
mod registry;

pub use language::{normalize_language_code, Language, UNKNOWN_LANGUAGE};
pub use metrics::{MetricsReport, TranslationMetrics};
pub use registry::{LanguageConfig, LanguageRegistry};
