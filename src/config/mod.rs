use std::env;
use std::time::Duration;

use anyhow::{Context, Result};
use tracing::{info, warn};

use crate::services::phrase_extractor::ExtractionStrategy;

pub const DEFAULT_INFERENCE_BASE_URL: &str = "https://api-inference.huggingface.co";
pub const DEFAULT_SUMMARIZATION_MODEL: &str = "facebook/bart-large-cnn";
pub const DEFAULT_GENERATION_MODEL: &str = "gpt2";
pub const DEFAULT_SIGNATURE: &str = "Applicant";

#[derive(Clone)]
pub struct Config {
    pub server_host: String,
    pub server_port: u16,
    pub max_file_size_mb: usize,
    pub model_timeout_seconds: u64,
    pub extraction_strategy: ExtractionStrategy,
    pub summary_input_chars: usize,
    pub summary_max_length: u32,
    pub summary_min_length: u32,
    pub prompt_summary_chars: usize,
    pub max_new_tokens: u32,
    pub signature: String,
    pub inference_base_url: String,
    pub inference_api_token: Option<String>,
    pub summarization_model: String,
    pub generation_model: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_host: "0.0.0.0".to_string(),
            server_port: 8080,
            max_file_size_mb: 10,
            model_timeout_seconds: 60,
            extraction_strategy: ExtractionStrategy::Pattern,
            summary_input_chars: 1500,
            summary_max_length: 200,
            summary_min_length: 50,
            prompt_summary_chars: 700,
            max_new_tokens: 200,
            signature: DEFAULT_SIGNATURE.to_string(),
            inference_base_url: DEFAULT_INFERENCE_BASE_URL.to_string(),
            inference_api_token: None,
            summarization_model: DEFAULT_SUMMARIZATION_MODEL.to_string(),
            generation_model: DEFAULT_GENERATION_MODEL.to_string(),
        }
    }
}

// Omits the API token.
impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("server_host", &self.server_host)
            .field("server_port", &self.server_port)
            .field("max_file_size_mb", &self.max_file_size_mb)
            .field("model_timeout_seconds", &self.model_timeout_seconds)
            .field("extraction_strategy", &self.extraction_strategy)
            .field("summary_input_chars", &self.summary_input_chars)
            .field("summary_max_length", &self.summary_max_length)
            .field("summary_min_length", &self.summary_min_length)
            .field("prompt_summary_chars", &self.prompt_summary_chars)
            .field("max_new_tokens", &self.max_new_tokens)
            .field("signature", &self.signature)
            .field("inference_base_url", &self.inference_base_url)
            .field("inference_api_token", &self.inference_api_token.as_ref().map(|_| "<set>"))
            .field("summarization_model", &self.summarization_model)
            .field("generation_model", &self.generation_model)
            .finish()
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        info!("Loading configuration from environment variables");
        let defaults = Config::default();

        let config = Config {
            server_host: Self::string_env_var("SERVER_HOST", &defaults.server_host),
            server_port: Self::parse_env_var("SERVER_PORT", defaults.server_port)
                .context("Failed to parse SERVER_PORT")?,
            max_file_size_mb: Self::parse_env_var("MAX_FILE_SIZE_MB", defaults.max_file_size_mb)
                .context("Failed to parse MAX_FILE_SIZE_MB")?,
            model_timeout_seconds: Self::parse_env_var(
                "MODEL_TIMEOUT_SECONDS",
                defaults.model_timeout_seconds,
            )
            .context("Failed to parse MODEL_TIMEOUT_SECONDS")?,
            extraction_strategy: Self::parse_env_var(
                "EXTRACTION_STRATEGY",
                defaults.extraction_strategy,
            )
            .context("Failed to parse EXTRACTION_STRATEGY")?,
            summary_input_chars: Self::parse_env_var(
                "SUMMARY_INPUT_CHARS",
                defaults.summary_input_chars,
            )
            .context("Failed to parse SUMMARY_INPUT_CHARS")?,
            summary_max_length: Self::parse_env_var(
                "SUMMARY_MAX_LENGTH",
                defaults.summary_max_length,
            )
            .context("Failed to parse SUMMARY_MAX_LENGTH")?,
            summary_min_length: Self::parse_env_var(
                "SUMMARY_MIN_LENGTH",
                defaults.summary_min_length,
            )
            .context("Failed to parse SUMMARY_MIN_LENGTH")?,
            prompt_summary_chars: Self::parse_env_var(
                "PROMPT_SUMMARY_CHARS",
                defaults.prompt_summary_chars,
            )
            .context("Failed to parse PROMPT_SUMMARY_CHARS")?,
            max_new_tokens: Self::parse_env_var("MAX_NEW_TOKENS", defaults.max_new_tokens)
                .context("Failed to parse MAX_NEW_TOKENS")?,
            signature: Self::string_env_var("COVER_LETTER_SIGNATURE", &defaults.signature),
            inference_base_url: Self::string_env_var(
                "INFERENCE_BASE_URL",
                &defaults.inference_base_url,
            ),
            inference_api_token: env::var("INFERENCE_API_TOKEN")
                .ok()
                .map(|token| token.trim().to_string())
                .filter(|token| !token.is_empty()),
            summarization_model: Self::string_env_var(
                "SUMMARIZATION_MODEL",
                &defaults.summarization_model,
            ),
            generation_model: Self::string_env_var("GENERATION_MODEL", &defaults.generation_model),
        };

        config.validate()?;

        if config.inference_api_token.is_none() {
            warn!("INFERENCE_API_TOKEN not set, model calls will be anonymous");
        }

        info!("Configuration loaded successfully: {:?}", config);
        Ok(config)
    }

    pub fn model_timeout(&self) -> Duration {
        Duration::from_secs(self.model_timeout_seconds)
    }

    fn string_env_var(var_name: &str, default: &str) -> String {
        match env::var(var_name) {
            Ok(val) if !val.trim().is_empty() => val.trim().to_string(),
            _ => {
                info!("{} not set, using default: {}", var_name, default);
                default.to_string()
            }
        }
    }

    fn parse_env_var<T>(var_name: &str, default: T) -> Result<T>
    where
        T: std::str::FromStr + Copy + std::fmt::Debug,
        T::Err: std::fmt::Display,
    {
        match env::var(var_name) {
            Ok(val) => match val.trim().parse() {
                Ok(parsed) => Ok(parsed),
                Err(e) => {
                    warn!("Failed to parse {}: {} (using default: {:?})", var_name, e, default);
                    Ok(default)
                }
            },
            Err(_) => {
                info!("{} not set, using default: {:?}", var_name, default);
                Ok(default)
            }
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.server_port == 0 {
            return Err(anyhow::anyhow!("SERVER_PORT must be greater than 0"));
        }
        if self.max_file_size_mb == 0 {
            return Err(anyhow::anyhow!("MAX_FILE_SIZE_MB must be greater than 0"));
        }
        if self.model_timeout_seconds == 0 {
            return Err(anyhow::anyhow!("MODEL_TIMEOUT_SECONDS must be greater than 0"));
        }
        if self.summary_input_chars == 0 {
            return Err(anyhow::anyhow!("SUMMARY_INPUT_CHARS must be greater than 0"));
        }
        if self.summary_min_length > self.summary_max_length {
            return Err(anyhow::anyhow!(
                "SUMMARY_MIN_LENGTH ({}) must not exceed SUMMARY_MAX_LENGTH ({})",
                self.summary_min_length,
                self.summary_max_length
            ));
        }
        if self.prompt_summary_chars == 0 {
            return Err(anyhow::anyhow!("PROMPT_SUMMARY_CHARS must be greater than 0"));
        }
        if self.max_new_tokens == 0 {
            return Err(anyhow::anyhow!("MAX_NEW_TOKENS must be greater than 0"));
        }
        if !self.inference_base_url.starts_with("http://")
            && !self.inference_base_url.starts_with("https://")
        {
            return Err(anyhow::anyhow!(
                "INFERENCE_BASE_URL must be an http(s) URL, got {}",
                self.inference_base_url
            ));
        }
        Ok(())
    }
}
