use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, info};

use crate::error::AppResult;
use crate::models::{AnalysisReport, RawDocument};
use crate::services::document_loader::DocumentLoader;
use crate::services::phrase_extractor::PhraseExtractor;
use crate::services::skill_comparator;
use crate::services::summarizer::SummarizerAdapter;

/// Runs one analysis request: load, summarize, extract, compare.
///
/// Stages run strictly one after the other. Nothing is kept between requests.
pub struct ApplicationAnalyzer {
    loader: DocumentLoader,
    extractor: Arc<dyn PhraseExtractor>,
    summarizer: SummarizerAdapter,
}

impl ApplicationAnalyzer {
    pub fn new(extractor: Arc<dyn PhraseExtractor>, summarizer: SummarizerAdapter) -> Self {
        Self {
            loader: DocumentLoader::new(),
            extractor,
            summarizer,
        }
    }

    /// Extracts the résumé text off the async runtime.
    pub async fn load_resume(&self, resume: RawDocument) -> AppResult<String> {
        let loader = self.loader;
        let text = tokio::task::spawn_blocking(move || loader.load(resume)).await??;
        Ok(text)
    }

    pub async fn analyze(&self, job_text: &str, resume: RawDocument) -> AppResult<AnalysisReport> {
        debug!(
            stage = "load",
            file_name = %resume.name,
            size = resume.size,
            "Analysis stage started"
        );
        let resume_text = self.load_resume(resume).await?;
        self.analyze_text(job_text, resume_text).await
    }

    pub async fn analyze_text(
        &self,
        job_text: &str,
        resume_text: String,
    ) -> AppResult<AnalysisReport> {
        let start = Instant::now();

        debug!(
            stage = "summarize_job",
            input_chars = job_text.chars().count(),
            "Analysis stage started"
        );
        let job_summary = self.summarizer.summarize(job_text).await?;

        debug!(
            stage = "summarize_resume",
            input_chars = resume_text.chars().count(),
            "Analysis stage started"
        );
        let resume_summary = self.summarizer.summarize(&resume_text).await?;

        debug!(stage = "extract", strategy = %self.extractor.strategy(), "Analysis stage started");
        let job_phrases = self.extractor.extract(job_text);
        let resume_phrases = self.extractor.extract(&resume_text);

        debug!(stage = "compare", "Analysis stage started");
        let comparison = skill_comparator::compare(&job_phrases, &resume_phrases);

        info!(
            job_phrases = job_phrases.len(),
            resume_phrases = resume_phrases.len(),
            matched = comparison.matched.len(),
            missing = comparison.missing.len(),
            extra = comparison.extra.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Analysis completed"
        );

        Ok(AnalysisReport {
            job_summary,
            resume_summary,
            comparison,
            resume_text,
        })
    }
}
