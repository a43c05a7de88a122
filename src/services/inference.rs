//! Model capabilities consumed by the pipeline and their Hugging Face
//! Inference API implementation.
//!
//! The pipeline only sees the [`SummarizationModel`] and [`GenerationModel`]
//! traits. Handles are produced by a [`ModelLoader`] and cached by
//! [`crate::services::ModelContext`].

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::Client;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::config::Config;

#[derive(Debug, Error)]
pub enum InferenceError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("model API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("model returned an empty response")]
    EmptyResponse,

    #[error("model call timed out after {seconds}s")]
    Timeout { seconds: u64 },

    #[error("model initialization failed: {message}")]
    Initialization { message: String },
}

/// Decoding configuration for a summarization call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SummaryParams {
    pub max_length: u32,
    pub min_length: u32,
    pub do_sample: bool,
    /// Let the model truncate inputs that exceed its context window.
    pub truncation: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GenerationParams {
    pub max_new_tokens: u32,
    pub num_return_sequences: u32,
}

#[async_trait]
pub trait SummarizationModel: Send + Sync {
    async fn summarize(&self, text: &str, params: &SummaryParams) -> Result<String, InferenceError>;
}

#[async_trait]
pub trait GenerationModel: Send + Sync {
    /// Returns only the continuation, never the prompt.
    async fn generate(
        &self,
        prompt: &str,
        params: &GenerationParams,
    ) -> Result<String, InferenceError>;
}

/// Produces model handles. Called at most once per handle by the model context.
#[async_trait]
pub trait ModelLoader: Send + Sync {
    async fn load_summarizer(&self) -> Result<Arc<dyn SummarizationModel>, InferenceError>;

    async fn load_generator(&self) -> Result<Arc<dyn GenerationModel>, InferenceError>;
}

#[derive(Serialize)]
struct InferenceRequest<'a, P: Serialize> {
    inputs: &'a str,
    parameters: P,
}

#[derive(Serialize)]
struct HfSummaryParameters {
    max_length: u32,
    min_length: u32,
    do_sample: bool,
    truncation: &'static str,
}

#[derive(Serialize)]
struct HfGenerationParameters {
    max_new_tokens: u32,
    num_return_sequences: u32,
    return_full_text: bool,
}

#[derive(Deserialize)]
struct SummaryOutput {
    summary_text: String,
}

#[derive(Deserialize)]
struct GenerationOutput {
    generated_text: String,
}

/// Thin client for `POST {base_url}/models/{model}`.
#[derive(Clone)]
pub struct HfInferenceClient {
    http: Client,
    base_url: String,
    api_token: Option<String>,
}

impl HfInferenceClient {
    pub fn new(
        base_url: impl Into<String>,
        api_token: Option<String>,
    ) -> Result<Self, InferenceError> {
        let http = Client::builder()
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| InferenceError::Initialization {
                message: format!("failed to build HTTP client: {}", e),
            })?;

        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_token,
        })
    }

    pub fn model_url(&self, model: &str) -> String {
        format!("{}/models/{}", self.base_url, model)
    }

    async fn invoke<P, R>(
        &self,
        model: &str,
        inputs: &str,
        parameters: P,
    ) -> Result<R, InferenceError>
    where
        P: Serialize + Send,
        R: DeserializeOwned + Send,
    {
        let url = self.model_url(model);
        debug!(model = model, input_chars = inputs.len(), "Invoking inference endpoint");

        let mut request = self.http.post(&url).json(&InferenceRequest { inputs, parameters });
        if let Some(token) = &self.api_token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            warn!(model = model, status = status.as_u16(), "Inference endpoint returned an error");
            return Err(InferenceError::Api {
                status: status.as_u16(),
                message,
            });
        }

        Ok(response.json::<R>().await?)
    }
}

pub struct HfSummarizer {
    client: HfInferenceClient,
    model: String,
}

impl HfSummarizer {
    pub fn new(client: HfInferenceClient, model: impl Into<String>) -> Self {
        Self {
            client,
            model: model.into(),
        }
    }
}

#[async_trait]
impl SummarizationModel for HfSummarizer {
    async fn summarize(
        &self,
        text: &str,
        params: &SummaryParams,
    ) -> Result<String, InferenceError> {
        let parameters = HfSummaryParameters {
            max_length: params.max_length,
            min_length: params.min_length,
            do_sample: params.do_sample,
            truncation: if params.truncation { "only_first" } else { "do_not_truncate" },
        };

        let outputs: Vec<SummaryOutput> = self.client.invoke(&self.model, text, parameters).await?;
        outputs
            .into_iter()
            .next()
            .map(|output| output.summary_text)
            .ok_or(InferenceError::EmptyResponse)
    }
}

pub struct HfGenerator {
    client: HfInferenceClient,
    model: String,
}

impl HfGenerator {
    pub fn new(client: HfInferenceClient, model: impl Into<String>) -> Self {
        Self {
            client,
            model: model.into(),
        }
    }
}

#[async_trait]
impl GenerationModel for HfGenerator {
    async fn generate(
        &self,
        prompt: &str,
        params: &GenerationParams,
    ) -> Result<String, InferenceError> {
        let parameters = HfGenerationParameters {
            max_new_tokens: params.max_new_tokens,
            num_return_sequences: params.num_return_sequences,
            return_full_text: false,
        };

        let outputs: Vec<GenerationOutput> =
            self.client.invoke(&self.model, prompt, parameters).await?;
        outputs
            .into_iter()
            .next()
            .map(|output| output.generated_text)
            .ok_or(InferenceError::EmptyResponse)
    }
}

/// Builds Hugging Face backed handles from the service configuration.
pub struct HfModelLoader {
    base_url: String,
    api_token: Option<String>,
    summarization_model: String,
    generation_model: String,
}

impl HfModelLoader {
    pub fn from_config(config: &Config) -> Self {
        Self {
            base_url: config.inference_base_url.clone(),
            api_token: config.inference_api_token.clone(),
            summarization_model: config.summarization_model.clone(),
            generation_model: config.generation_model.clone(),
        }
    }

    fn client(&self) -> Result<HfInferenceClient, InferenceError> {
        HfInferenceClient::new(self.base_url.clone(), self.api_token.clone())
    }
}

#[async_trait]
impl ModelLoader for HfModelLoader {
    async fn load_summarizer(&self) -> Result<Arc<dyn SummarizationModel>, InferenceError> {
        info!(model = %self.summarization_model, "Loading summarization model handle");
        Ok(Arc::new(HfSummarizer::new(self.client()?, self.summarization_model.clone())))
    }

    async fn load_generator(&self) -> Result<Arc<dyn GenerationModel>, InferenceError> {
        info!(model = %self.generation_model, "Loading generation model handle");
        Ok(Arc::new(HfGenerator::new(self.client()?, self.generation_model.clone())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use serde_json::json;

    const SUMMARY_PARAMS: SummaryParams = SummaryParams {
        max_length: 200,
        min_length: 50,
        do_sample: false,
        truncation: true,
    };

    #[tokio::test]
    async fn test_summarizer_sends_decoding_parameters() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/models/facebook/bart-large-cnn")
                    .header("Authorization", "Bearer secret-token")
                    .json_body(json!({
                        "inputs": "A long job description",
                        "parameters": {
                            "max_length": 200,
                            "min_length": 50,
                            "do_sample": false,
                            "truncation": "only_first"
                        }
                    }));
                then.status(200)
                    .header("Content-Type", "application/json")
                    .json_body(json!([{ "summary_text": "A short synopsis." }]));
            })
            .await;

        let client =
            HfInferenceClient::new(server.base_url(), Some("secret-token".to_string())).unwrap();
        let summarizer = HfSummarizer::new(client, "facebook/bart-large-cnn");

        let summary = summarizer
            .summarize("A long job description", &SUMMARY_PARAMS)
            .await
            .unwrap();

        assert_eq!(summary, "A short synopsis.");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_generator_requests_continuation_only() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST).path("/models/gpt2").json_body(json!({
                    "inputs": "Write a letter",
                    "parameters": {
                        "max_new_tokens": 200,
                        "num_return_sequences": 1,
                        "return_full_text": false
                    }
                }));
                then.status(200)
                    .json_body(json!([{ "generated_text": " I am writing to apply." }]));
            })
            .await;

        let client = HfInferenceClient::new(format!("{}/", server.base_url()), None).unwrap();
        let generator = HfGenerator::new(client, "gpt2");
        let params = GenerationParams {
            max_new_tokens: 200,
            num_return_sequences: 1,
        };

        let text = generator.generate("Write a letter", &params).await.unwrap();

        assert_eq!(text, " I am writing to apply.");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_api_error_is_reported_with_status() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/models/gpt2");
                then.status(503).body("{\"error\":\"Model gpt2 is currently loading\"}");
            })
            .await;

        let client = HfInferenceClient::new(server.base_url(), None).unwrap();
        let generator = HfGenerator::new(client, "gpt2");
        let params = GenerationParams {
            max_new_tokens: 10,
            num_return_sequences: 1,
        };

        match generator.generate("prompt", &params).await {
            Err(InferenceError::Api { status, message }) => {
                assert_eq!(status, 503);
                assert!(message.contains("currently loading"));
            }
            other => panic!("Expected Api error, got {:?}", other.map(|_| ())),
        }
    }

    #[tokio::test]
    async fn test_empty_output_array() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/models/facebook/bart-large-cnn");
                then.status(200).json_body(json!([]));
            })
            .await;

        let client = HfInferenceClient::new(server.base_url(), None).unwrap();
        let summarizer = HfSummarizer::new(client, "facebook/bart-large-cnn");

        let result = summarizer.summarize("text", &SUMMARY_PARAMS).await;
        assert!(matches!(result, Err(InferenceError::EmptyResponse)));
    }

    #[test]
    fn test_model_url_trims_trailing_slash() {
        let client = HfInferenceClient::new("https://models.example.com/", None).unwrap();
        assert_eq!(client.model_url("gpt2"), "https://models.example.com/models/gpt2");
    }

    #[tokio::test]
    async fn test_loader_builds_handles_from_config() {
        let loader = HfModelLoader::from_config(&Config::default());
        assert!(loader.load_summarizer().await.is_ok());
        assert!(loader.load_generator().await.is_ok());
    }
}
