use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use serde::Serialize;
use tokio::sync::OnceCell;
use tracing::{info, warn};

use crate::services::inference::{
    GenerationModel, InferenceError, ModelLoader, SummarizationModel,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelState {
    Uninitialized,
    Initializing,
    Ready,
}

/// Marks a handle as loading until dropped, including when the load future
/// is cancelled.
struct LoadInFlight<'a>(&'a AtomicBool);

impl<'a> LoadInFlight<'a> {
    fn start(flag: &'a AtomicBool) -> Self {
        flag.store(true, Ordering::SeqCst);
        Self(flag)
    }
}

impl Drop for LoadInFlight<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

/// Owns the process-wide model handles.
///
/// Each handle is loaded on first use and then reused until the process exits.
/// Concurrent first callers wait on the same initialization; a failed load
/// leaves the handle uninitialized so that a later call can try again.
pub struct ModelContext {
    loader: Arc<dyn ModelLoader>,
    summarizer: OnceCell<Arc<dyn SummarizationModel>>,
    generator: OnceCell<Arc<dyn GenerationModel>>,
    summarizer_loading: AtomicBool,
    generator_loading: AtomicBool,
}

impl ModelContext {
    pub fn new(loader: Arc<dyn ModelLoader>) -> Self {
        Self {
            loader,
            summarizer: OnceCell::new(),
            generator: OnceCell::new(),
            summarizer_loading: AtomicBool::new(false),
            generator_loading: AtomicBool::new(false),
        }
    }

    pub async fn summarizer(&self) -> Result<Arc<dyn SummarizationModel>, InferenceError> {
        let handle = self
            .summarizer
            .get_or_try_init(|| async {
                let _loading = LoadInFlight::start(&self.summarizer_loading);
                info!(handle = "summarizer", "Initializing model handle");
                self.loader.load_summarizer().await.map_err(|e| {
                    warn!(handle = "summarizer", error = %e, "Model handle initialization failed");
                    e
                })
            })
            .await?;
        Ok(Arc::clone(handle))
    }

    pub async fn generator(&self) -> Result<Arc<dyn GenerationModel>, InferenceError> {
        let handle = self
            .generator
            .get_or_try_init(|| async {
                let _loading = LoadInFlight::start(&self.generator_loading);
                info!(handle = "generator", "Initializing model handle");
                self.loader.load_generator().await.map_err(|e| {
                    warn!(handle = "generator", error = %e, "Model handle initialization failed");
                    e
                })
            })
            .await?;
        Ok(Arc::clone(handle))
    }

    pub fn summarizer_state(&self) -> ModelState {
        Self::state_of(self.summarizer.initialized(), &self.summarizer_loading)
    }

    pub fn generator_state(&self) -> ModelState {
        Self::state_of(self.generator.initialized(), &self.generator_loading)
    }

    fn state_of(initialized: bool, loading: &AtomicBool) -> ModelState {
        if initialized {
            ModelState::Ready
        } else if loading.load(Ordering::SeqCst) {
            ModelState::Initializing
        } else {
            ModelState::Uninitialized
        }
    }
}
