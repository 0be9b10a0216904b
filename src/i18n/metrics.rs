//! Translation metrics and observability module.
//!
//! Counts translation outcomes and provider calls so `/metrics` can report
//! how often translation actually happened versus degraded.

use serde::Serialize;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Translation counters shared by the orchestrator and the HTTP surface.
#[derive(Debug, Default)]
pub struct TranslationMetrics {
    /// Subjects translated with status `success`
    translations_succeeded: AtomicUsize,

    /// Subjects that degraded to status `failed`
    translations_failed: AtomicUsize,

    /// Subjects skipped because they were empty (status `no_text`)
    translations_skipped: AtomicUsize,

    /// Remote calls issued to the provider (detect + translate)
    provider_calls: AtomicUsize,

    /// Provider calls that returned an error or timed out
    provider_failures: AtomicUsize,

    /// Provider calls that hit the per-call timeout
    provider_timeouts: AtomicUsize,

    /// Translations that fell back to the original text because the
    /// provider does not support the language pair
    unsupported_pairs: AtomicUsize,
}

impl TranslationMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_success(&self) {
        self.translations_succeeded.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_failure(&self) {
        self.translations_failed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_no_text(&self) {
        self.translations_skipped.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_provider_call(&self) {
        self.provider_calls.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_provider_failure(&self) {
        self.provider_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_timeout(&self) {
        self.provider_timeouts.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_unsupported_pair(&self) {
        self.unsupported_pairs.fetch_add(1, Ordering::Relaxed);
    }

    pub fn provider_calls(&self) -> usize {
        self.provider_calls.load(Ordering::Relaxed)
    }

    pub fn provider_failures(&self) -> usize {
        self.provider_failures.load(Ordering::Relaxed)
    }

    /// Generate a metrics report.
    pub fn report(&self) -> MetricsReport {
        let succeeded = self.translations_succeeded.load(Ordering::Relaxed);
        let failed = self.translations_failed.load(Ordering::Relaxed);
        let attempted = succeeded + failed;
        let success_rate = if attempted > 0 {
            (succeeded as f64 / attempted as f64) * 100.0
        } else {
            0.0
        };

        MetricsReport {
            translations_succeeded: succeeded,
            translations_failed: failed,
            translations_skipped: self.translations_skipped.load(Ordering::Relaxed),
            translation_success_rate: success_rate,
            provider_calls: self.provider_calls(),
            provider_failures: self.provider_failures(),
            provider_timeouts: self.provider_timeouts.load(Ordering::Relaxed),
            unsupported_pairs: self.unsupported_pairs.load(Ordering::Relaxed),
        }
    }
}

/// Snapshot of the translation counters.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct MetricsReport {
    pub translations_succeeded: usize,
    pub translations_failed: usize,
    pub translations_skipped: usize,

    /// Success rate over non-empty subjects as a percentage (0-100)
    pub translation_success_rate: f64,

    pub provider_calls: usize,
    pub provider_failures: usize,
    pub provider_timeouts: usize,
    pub unsupported_pairs: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_empty() {
        let report = TranslationMetrics::new().report();

        assert_eq!(report.translations_succeeded, 0);
        assert_eq!(report.translations_failed, 0);
        assert_eq!(report.translations_skipped, 0);
        assert_eq!(report.translation_success_rate, 0.0);
        assert_eq!(report.provider_calls, 0);
    }

    #[test]
    fn test_report_success_rate() {
        let metrics = TranslationMetrics::new();

        // 3 successes, 1 failure = 75%
        metrics.record_success();
        metrics.record_success();
        metrics.record_success();
        metrics.record_failure();

        let report = metrics.report();
        assert_eq!(report.translations_succeeded, 3);
        assert_eq!(report.translations_failed, 1);
        assert_eq!(report.translation_success_rate, 75.0);
    }

    #[test]
    fn test_no_text_does_not_affect_success_rate() {
        let metrics = TranslationMetrics::new();

        metrics.record_success();
        metrics.record_no_text();
        metrics.record_no_text();

        let report = metrics.report();
        assert_eq!(report.translations_skipped, 2);
        assert_eq!(report.translation_success_rate, 100.0);
    }

    #[test]
    fn test_provider_counters() {
        let metrics = TranslationMetrics::new();

        metrics.record_provider_call();
        metrics.record_provider_call();
        metrics.record_provider_failure();
        metrics.record_timeout();
        metrics.record_unsupported_pair();

        let report = metrics.report();
        assert_eq!(report.provider_calls, 2);
        assert_eq!(report.provider_failures, 1);
        assert_eq!(report.provider_timeouts, 1);
        assert_eq!(report.unsupported_pairs, 1);
    }

    #[test]
    fn test_report_serializes_field_names() {
        let json = serde_json::to_value(TranslationMetrics::new().report()).expect("serialize");
        assert!(json.get("translation_success_rate").is_some());
        assert!(json.get("unsupported_pairs").is_some());
    }
}
