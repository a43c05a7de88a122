//! In-process model fakes shared by the unit tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use crate::services::inference::{
    GenerationModel, GenerationParams, InferenceError, ModelLoader, SummarizationModel,
    SummaryParams,
};

/// Records every call and answers with fixed text.
pub struct FakeModels {
    pub summary: String,
    pub generated: String,
    pub fail_summarize: bool,
    pub fail_generate: bool,
    pub delay: Option<Duration>,
    pub summarize_inputs: Mutex<Vec<String>>,
    pub summary_params: Mutex<Vec<SummaryParams>>,
    pub prompts: Mutex<Vec<String>>,
    pub generation_params: Mutex<Vec<GenerationParams>>,
}

impl Default for FakeModels {
    fn default() -> Self {
        Self {
            summary: "A concise synopsis.".to_string(),
            generated: "  I am excited to apply for this role.  \n".to_string(),
            fail_summarize: false,
            fail_generate: false,
            delay: None,
            summarize_inputs: Mutex::new(Vec::new()),
            summary_params: Mutex::new(Vec::new()),
            prompts: Mutex::new(Vec::new()),
            generation_params: Mutex::new(Vec::new()),
        }
    }
}

impl FakeModels {
    pub fn summarize_calls(&self) -> usize {
        self.summarize_inputs.lock().unwrap().len()
    }

    pub fn generate_calls(&self) -> usize {
        self.prompts.lock().unwrap().len()
    }
}

#[async_trait]
impl SummarizationModel for FakeModels {
    async fn summarize(
        &self,
        text: &str,
        params: &SummaryParams,
    ) -> Result<String, InferenceError> {
        self.summarize_inputs.lock().unwrap().push(text.to_string());
        self.summary_params.lock().unwrap().push(*params);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if self.fail_summarize {
            return Err(InferenceError::Api {
                status: 500,
                message: "summarizer offline".to_string(),
            });
        }
        Ok(self.summary.clone())
    }
}

#[async_trait]
impl GenerationModel for FakeModels {
    async fn generate(
        &self,
        prompt: &str,
        params: &GenerationParams,
    ) -> Result<String, InferenceError> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        self.generation_params.lock().unwrap().push(*params);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if self.fail_generate {
            return Err(InferenceError::Api {
                status: 500,
                message: "generator offline".to_string(),
            });
        }
        Ok(self.generated.clone())
    }
}

/// Hands out the same [`FakeModels`] for both handles and counts loads.
pub struct FakeLoader {
    pub models: Arc<FakeModels>,
    pub summarizer_loads: AtomicUsize,
    pub generator_loads: AtomicUsize,
    load_delay: Duration,
    failures_left: AtomicUsize,
}

impl FakeLoader {
    pub fn new(models: FakeModels) -> Self {
        Self {
            models: Arc::new(models),
            summarizer_loads: AtomicUsize::new(0),
            generator_loads: AtomicUsize::new(0),
            load_delay: Duration::ZERO,
            failures_left: AtomicUsize::new(0),
        }
    }

    pub fn with_load_delay_ms(mut self, millis: u64) -> Self {
        self.load_delay = Duration::from_millis(millis);
        self
    }

    pub fn failing_first_loads(self, count: usize) -> Self {
        self.failures_left.store(count, Ordering::SeqCst);
        self
    }

    async fn simulate_load(&self) -> Result<(), InferenceError> {
        if !self.load_delay.is_zero() {
            tokio::time::sleep(self.load_delay).await;
        }
        let failed = self
            .failures_left
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |left| left.checked_sub(1))
            .is_ok();
        if failed {
            return Err(InferenceError::Initialization {
                message: "weights unavailable".to_string(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl ModelLoader for FakeLoader {
    async fn load_summarizer(&self) -> Result<Arc<dyn SummarizationModel>, InferenceError> {
        self.summarizer_loads.fetch_add(1, Ordering::SeqCst);
        self.simulate_load().await?;
        Ok(self.models.clone())
    }

    async fn load_generator(&self) -> Result<Arc<dyn GenerationModel>, InferenceError> {
        self.generator_loads.fetch_add(1, Ordering::SeqCst);
        self.simulate_load().await?;
        Ok(self.models.clone())
    }
}
