use std::sync::Arc;
use std::time::{Duration, Instant};

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::models::Summary;
use crate::services::inference::{InferenceError, SummaryParams};
use crate::services::model_context::ModelContext;

#[derive(Debug, Error)]
#[error("summarization failed: {source}")]
pub struct SummarizationError {
    #[from]
    pub source: InferenceError,
}

/// Returns the longest prefix of `text` holding at most `max_chars` characters.
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((byte_index, _)) => &text[..byte_index],
        None => text,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SummarizerSettings {
    pub max_input_chars: usize,
    pub params: SummaryParams,
    pub timeout: Duration,
}

impl SummarizerSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            max_input_chars: config.summary_input_chars,
            params: SummaryParams {
                max_length: config.summary_max_length,
                min_length: config.summary_min_length,
                do_sample: false,
                truncation: true,
            },
            timeout: config.model_timeout(),
        }
    }
}

impl Default for SummarizerSettings {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

/// Bounds the input and makes exactly one summarization call per request.
pub struct SummarizerAdapter {
    models: Arc<ModelContext>,
    settings: SummarizerSettings,
}

impl SummarizerAdapter {
    pub fn new(models: Arc<ModelContext>, settings: SummarizerSettings) -> Self {
        Self { models, settings }
    }

    pub async fn summarize(&self, text: &str) -> Result<Summary, SummarizationError> {
        let bounded = truncate_chars(text, self.settings.max_input_chars);
        if bounded.trim().is_empty() {
            debug!("Empty input, skipping summarization");
            return Ok(Summary::empty());
        }

        let start = Instant::now();
        let model = self.models.summarizer().await?;
        let call = model.summarize(bounded, &self.settings.params);

        let summary = match tokio::time::timeout(self.settings.timeout, call).await {
            Ok(result) => result?,
            Err(_) => {
                warn!(
                    timeout_seconds = self.settings.timeout.as_secs(),
                    "Summarization model call timed out"
                );
                return Err(InferenceError::Timeout {
                    seconds: self.settings.timeout.as_secs(),
                }
                .into());
            }
        };

        info!(
            input_chars = bounded.chars().count(),
            truncated = bounded.len() < text.len(),
            summary_chars = summary.chars().count(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Summarization completed"
        );
        Ok(Summary::new(summary.trim()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::testing::{FakeLoader, FakeModels};

    fn adapter(models: FakeModels) -> (SummarizerAdapter, Arc<FakeModels>) {
        let loader = Arc::new(FakeLoader::new(models));
        let fakes = loader.models.clone();
        let context = Arc::new(ModelContext::new(loader));
        (SummarizerAdapter::new(context, SummarizerSettings::default()), fakes)
    }

    #[test]
    fn test_truncate_chars_respects_char_boundaries() {
        assert_eq!(truncate_chars("résumé", 3), "rés");
        assert_eq!(truncate_chars("short", 10), "short");
        assert_eq!(truncate_chars("exact", 5), "exact");
        assert_eq!(truncate_chars("", 4), "");
        assert_eq!(truncate_chars("abc", 0), "");
    }

    #[test]
    fn test_default_settings() {
        let settings = SummarizerSettings::default();
        assert_eq!(settings.max_input_chars, 1500);
        assert_eq!(
            settings.params,
            SummaryParams {
                max_length: 200,
                min_length: 50,
                do_sample: false,
                truncation: true,
            }
        );
    }

    #[tokio::test]
    async fn test_input_is_truncated_before_the_call() {
        let (adapter, fakes) = adapter(FakeModels::default());
        let text = "é".repeat(2000);

        let summary = adapter.summarize(&text).await.unwrap();

        assert_eq!(summary.as_str(), "A concise synopsis.");
        let inputs = fakes.summarize_inputs.lock().unwrap();
        assert_eq!(inputs.len(), 1);
        assert_eq!(inputs[0].chars().count(), 1500);
        assert_eq!(fakes.summary_params.lock().unwrap()[0].max_length, 200);
    }

    #[tokio::test]
    async fn test_empty_input_returns_empty_summary() {
        let (adapter, fakes) = adapter(FakeModels::default());

        let summary = adapter.summarize("").await.unwrap();
        assert!(summary.is_empty());
        let summary = adapter.summarize("   \n ").await.unwrap();
        assert!(summary.is_empty());
        assert_eq!(fakes.summarize_calls(), 0);
    }

    #[tokio::test]
    async fn test_model_failure_is_reported_without_retry() {
        let (adapter, fakes) = adapter(FakeModels {
            fail_summarize: true,
            ..FakeModels::default()
        });

        let err = adapter.summarize("Some job description").await.unwrap_err();

        assert!(matches!(err.source, InferenceError::Api { status: 500, .. }));
        assert!(err.to_string().starts_with("summarization failed"));
        assert_eq!(fakes.summarize_calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_model_times_out() {
        let loader = Arc::new(FakeLoader::new(FakeModels {
            delay: Some(Duration::from_secs(120)),
            ..FakeModels::default()
        }));
        let context = Arc::new(ModelContext::new(loader));
        let settings = SummarizerSettings {
            timeout: Duration::from_secs(5),
            ..SummarizerSettings::default()
        };
        let adapter = SummarizerAdapter::new(context, settings);

        let err = adapter.summarize("Some job description").await.unwrap_err();
        assert!(matches!(err.source, InferenceError::Timeout { seconds: 5 }));
    }
}
