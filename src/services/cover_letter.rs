use std::sync::Arc;
use std::time::{Duration, Instant};

use thiserror::Error;
use tracing::{info, warn};

use crate::config::Config;
use crate::models::{CoverLetterDraft, Summary, Tone, UnsupportedTone};
use crate::services::inference::{GenerationParams, InferenceError};
use crate::services::model_context::ModelContext;
use crate::services::summarizer::truncate_chars;

pub const SALUTATION: &str = "Dear Hiring Manager,";
pub const CLOSING: &str = "Sincerely,";

#[derive(Debug, Error)]
pub enum ComposeError {
    #[error(transparent)]
    UnsupportedTone(#[from] UnsupportedTone),

    #[error("cover letter generation failed: {0}")]
    GenerationFailed(#[from] InferenceError),
}

/// Instruction that opens the generation prompt for each tone.
pub fn tone_instruction(tone: Tone) -> &'static str {
    match tone {
        Tone::Friendly => "Write a friendly and positive cover letter",
        Tone::Professional => "Write a professional and formal cover letter",
        Tone::Informal => "Write a casual and informal cover letter",
    }
}

pub fn build_prompt(
    tone: Tone,
    job_summary: &Summary,
    resume_summary: &Summary,
    max_summary_chars: usize,
) -> String {
    let combined = format!("{} {}", job_summary, resume_summary);
    format!(
        "{} based on the following summary: {}",
        tone_instruction(tone),
        truncate_chars(&combined, max_summary_chars)
    )
}

pub fn format_letter(body: &str, signature: &str) -> String {
    format!("{}\n\n{}\n\n{}\n{}", SALUTATION, body.trim(), CLOSING, signature)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComposerSettings {
    pub max_summary_chars: usize,
    pub params: GenerationParams,
    pub signature: String,
    pub timeout: Duration,
}

impl ComposerSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            max_summary_chars: config.prompt_summary_chars,
            params: GenerationParams {
                max_new_tokens: config.max_new_tokens,
                num_return_sequences: 1,
            },
            signature: config.signature.clone(),
            timeout: config.model_timeout(),
        }
    }
}

impl Default for ComposerSettings {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

pub struct CoverLetterComposer {
    models: Arc<ModelContext>,
    settings: ComposerSettings,
}

impl CoverLetterComposer {
    pub fn new(models: Arc<ModelContext>, settings: ComposerSettings) -> Self {
        Self { models, settings }
    }

    /// Parses the tone name before touching any model.
    pub async fn compose_named(
        &self,
        job_summary: &Summary,
        resume_summary: &Summary,
        tone_name: &str,
    ) -> Result<CoverLetterDraft, ComposeError> {
        let tone: Tone = tone_name.parse()?;
        self.compose(job_summary, resume_summary, tone).await
    }

    pub async fn compose(
        &self,
        job_summary: &Summary,
        resume_summary: &Summary,
        tone: Tone,
    ) -> Result<CoverLetterDraft, ComposeError> {
        let start = Instant::now();
        let prompt = build_prompt(
            tone,
            job_summary,
            resume_summary,
            self.settings.max_summary_chars,
        );

        let model = self.models.generator().await?;
        let call = model.generate(&prompt, &self.settings.params);
        let generated = match tokio::time::timeout(self.settings.timeout, call).await {
            Ok(result) => result?,
            Err(_) => {
                warn!(
                    tone = %tone,
                    timeout_seconds = self.settings.timeout.as_secs(),
                    "Generation model call timed out"
                );
                return Err(InferenceError::Timeout {
                    seconds: self.settings.timeout.as_secs(),
                }
                .into());
            }
        };

        let generated_body = generated.trim().to_string();
        let formatted_letter = format_letter(&generated_body, &self.settings.signature);

        info!(
            tone = %tone,
            prompt_chars = prompt.chars().count(),
            body_chars = generated_body.chars().count(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Cover letter composed"
        );

        Ok(CoverLetterDraft {
            tone,
            generated_body,
            formatted_letter,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::testing::{FakeLoader, FakeModels};
    use std::sync::atomic::Ordering;

    fn composer(models: FakeModels) -> (CoverLetterComposer, Arc<FakeLoader>) {
        let loader = Arc::new(FakeLoader::new(models));
        let context = Arc::new(ModelContext::new(loader.clone()));
        let settings = ComposerSettings {
            signature: "Jordan Doe".to_string(),
            ..ComposerSettings::default()
        };
        (CoverLetterComposer::new(context, settings), loader)
    }

    #[test]
    fn test_prompt_uses_tone_instruction() {
        let prompt = build_prompt(
            Tone::Professional,
            &Summary::new("Backend role."),
            &Summary::new("Rust engineer."),
            700,
        );
        assert_eq!(
            prompt,
            "Write a professional and formal cover letter based on the following summary: \
             Backend role. Rust engineer."
        );
    }

    #[test]
    fn test_prompt_summary_is_truncated() {
        let job = Summary::new("j".repeat(500));
        let resume = Summary::new("r".repeat(500));

        let prompt = build_prompt(Tone::Friendly, &job, &resume, 700);
        let prefix = "Write a friendly and positive cover letter based on the following summary: ";
        let summary_part = prompt.strip_prefix(prefix).unwrap();

        assert_eq!(summary_part.chars().count(), 700);
        assert_eq!(&summary_part[..500], "j".repeat(500));
        assert_eq!(summary_part.chars().nth(500), Some(' '));
    }

    #[test]
    fn test_format_letter() {
        assert_eq!(
            format_letter("\n  Body text.  \n", "Jordan Doe"),
            "Dear Hiring Manager,\n\nBody text.\n\nSincerely,\nJordan Doe"
        );
    }

    #[tokio::test]
    async fn test_compose_wraps_trimmed_body() {
        let (composer, loader) = composer(FakeModels::default());

        let draft = composer
            .compose(&Summary::new("Job."), &Summary::new("Resume."), Tone::Informal)
            .await
            .unwrap();

        assert_eq!(draft.tone, Tone::Informal);
        assert_eq!(draft.generated_body, "I am excited to apply for this role.");
        assert_eq!(
            draft.formatted_letter,
            "Dear Hiring Manager,\n\nI am excited to apply for this role.\n\nSincerely,\nJordan Doe"
        );

        let prompts = loader.models.prompts.lock().unwrap();
        assert_eq!(prompts.len(), 1);
        assert!(prompts[0].starts_with("Write a casual and informal cover letter"));
        let params = loader.models.generation_params.lock().unwrap()[0];
        assert_eq!(params.max_new_tokens, 200);
        assert_eq!(params.num_return_sequences, 1);
    }

    #[tokio::test]
    async fn test_unsupported_tone_fails_before_model_access() {
        let (composer, loader) = composer(FakeModels::default());

        let err = composer
            .compose_named(&Summary::new("Job."), &Summary::new("Resume."), "aggressive")
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            ComposeError::UnsupportedTone(UnsupportedTone(ref tone)) if tone == "aggressive"
        ));
        assert_eq!(loader.generator_loads.load(Ordering::SeqCst), 0);
        assert_eq!(loader.models.generate_calls(), 0);
    }

    #[tokio::test]
    async fn test_generation_failure_returns_no_draft() {
        let (composer, loader) = composer(FakeModels {
            fail_generate: true,
            ..FakeModels::default()
        });

        let result = composer
            .compose_named(&Summary::new("Job."), &Summary::new("Resume."), "friendly")
            .await;

        assert!(matches!(result, Err(ComposeError::GenerationFailed(InferenceError::Api { .. }))));
        assert_eq!(loader.models.generate_calls(), 1);
    }
}
