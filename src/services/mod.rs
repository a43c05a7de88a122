pub mod analyzer;
pub mod cover_letter;
pub mod document_loader;
pub mod inference;
pub mod model_context;
pub mod phrase_extractor;
pub mod resume_renderer;
pub mod skill_comparator;
pub mod summarizer;

#[cfg(test)]
pub mod testing;

pub use analyzer::ApplicationAnalyzer;
pub use cover_letter::{ComposeError, ComposerSettings, CoverLetterComposer};
pub use document_loader::{DocumentLoader, LoadError};
pub use inference::{
    GenerationModel, GenerationParams, HfModelLoader, InferenceError, ModelLoader,
    SummarizationModel, SummaryParams,
};
pub use model_context::{ModelContext, ModelState};
pub use phrase_extractor::{ChunkExtractor, ExtractionStrategy, PatternExtractor, PhraseExtractor};
pub use resume_renderer::{RenderError, ResumeRenderer};
pub use skill_comparator::{compare, rank_extra, RANKED_EXTRA_LIMIT};
pub use summarizer::{SummarizationError, SummarizerAdapter, SummarizerSettings};
