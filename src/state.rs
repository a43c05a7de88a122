use std::sync::Arc;

use crate::config::Config;
use crate::services::{
    ApplicationAnalyzer, ComposerSettings, CoverLetterComposer, HfModelLoader, ModelContext,
    ModelLoader, ResumeRenderer, SummarizerAdapter, SummarizerSettings,
};

/// Shared state handed to every route handler.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    /// Lazily initialised model handles, shared by the analyzer and composer.
    pub models: Arc<ModelContext>,
    pub analyzer: Arc<ApplicationAnalyzer>,
    pub composer: Arc<CoverLetterComposer>,
    pub renderer: ResumeRenderer,
}

impl AppState {
    pub fn from_config(config: Config) -> Self {
        let loader = Arc::new(HfModelLoader::from_config(&config));
        Self::with_loader(config, loader)
    }

    pub fn with_loader(config: Config, loader: Arc<dyn ModelLoader>) -> Self {
        let models = Arc::new(ModelContext::new(loader));
        let summarizer =
            SummarizerAdapter::new(models.clone(), SummarizerSettings::from_config(&config));
        let analyzer = ApplicationAnalyzer::new(config.extraction_strategy.extractor(), summarizer);
        let composer =
            CoverLetterComposer::new(models.clone(), ComposerSettings::from_config(&config));

        Self {
            config: Arc::new(config),
            models,
            analyzer: Arc::new(analyzer),
            composer: Arc::new(composer),
            renderer: ResumeRenderer::new(),
        }
    }

    pub fn max_file_size_bytes(&self) -> usize {
        self.config.max_file_size_mb * 1024 * 1024
    }
}
