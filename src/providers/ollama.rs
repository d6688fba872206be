use async_trait::async_trait;
use log::{debug, error, warn};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::errors::ProviderError;
use crate::language_utils;
use crate::providers::Translator;

/// Ollama client translating segments through a local LLM
#[derive(Debug)]
pub struct Ollama {
    /// Base URL of the Ollama API
    base_url: String,
    /// HTTP client for making requests
    client: Client,
    /// Model name used for generation
    model: String,
    /// System prompt with `{target_language}` placeholder
    system_prompt: String,
    /// Sampling temperature
    temperature: f32,
    /// Maximum number of retry attempts
    max_retries: u32,
    /// Base backoff time in milliseconds for exponential backoff
    backoff_base_ms: u64,
}

/// Generate request for the Ollama API
#[derive(Debug, Serialize, Deserialize)]
pub struct GenerationRequest {
    /// Model name to use for generation
    model: String,
    /// Prompt to generate from
    prompt: String,
    /// System message to guide the model
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<String>,
    /// Additional model parameters
    #[serde(skip_serializing_if = "Option::is_none")]
    options: Option<GenerationOptions>,
    /// Whether to stream the response
    #[serde(skip_serializing_if = "Option::is_none")]
    stream: Option<bool>,
}

/// Generation options for the Ollama API
#[derive(Debug, Serialize, Deserialize)]
pub struct GenerationOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

/// Generation response from the Ollama API
#[derive(Debug, Serialize, Deserialize)]
pub struct GenerationResponse {
    /// Model name
    pub model: String,
    /// Generated text
    pub response: String,
    /// Whether the generation is complete
    pub done: bool,
}

impl GenerationRequest {
    /// Create a new non-streaming generation request
    pub fn new(model: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            prompt: prompt.into(),
            system: None,
            options: None,
            stream: Some(false),
        }
    }

    /// Set the system prompt
    pub fn system(mut self, system: impl Into<String>) -> Self {
        self.system = Some(system.into());
        self
    }

    /// Set the temperature
    pub fn temperature(mut self, temperature: f32) -> Self {
        self.options = Some(GenerationOptions {
            temperature: Some(temperature),
        });
        self
    }
}

impl Ollama {
    /// Create a new Ollama client for the given endpoint and model
    pub fn new(endpoint: impl Into<String>, model: impl Into<String>) -> Self {
        Self::new_with_config(endpoint, model, default_system_prompt(), 0.3, 60, 3, 1000)
    }

    /// Create a new Ollama client with configuration
    ///
    /// Ollama speaks HTTP/1.1, so the client is pinned to it and keeps
    /// connections alive between segment requests.
    pub fn new_with_config(
        endpoint: impl Into<String>,
        model: impl Into<String>,
        system_prompt: impl Into<String>,
        temperature: f32,
        timeout_secs: u64,
        max_retries: u32,
        backoff_base_ms: u64,
    ) -> Self {
        let endpoint = endpoint.into();
        let base_url = if endpoint.starts_with("http://") || endpoint.starts_with("https://") {
            endpoint.trim_end_matches('/').to_string()
        } else {
            format!("http://{}", endpoint.trim_end_matches('/'))
        };

        Self {
            base_url,
            client: Client::builder()
                .timeout(Duration::from_secs(timeout_secs))
                .http1_only()
                .pool_idle_timeout(Duration::from_secs(90))
                .tcp_keepalive(Duration::from_secs(60))
                .build()
                .unwrap_or_default(),
            model: model.into(),
            system_prompt: system_prompt.into(),
            temperature,
            max_retries,
            backoff_base_ms,
        }
    }

    /// Base URL requests are sent to
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Build the system prompt for a target language
    fn system_prompt_for(&self, target_language: &str) -> String {
        let language_name = language_utils::get_language_name(target_language)
            .unwrap_or_else(|_| target_language.to_string());
        self.system_prompt.replace("{target_language}", &language_name)
    }

    /// Generate text from the Ollama API with retry logic
    pub async fn generate(&self, request: &GenerationRequest) -> Result<GenerationResponse, ProviderError> {
        let url = format!("{}/api/generate", self.base_url);

        let mut attempt = 0;
        let mut last_error = ProviderError::RequestFailed("No attempt made".to_string());

        while attempt <= self.max_retries {
            if attempt > 0 {
                let backoff = self.backoff_base_ms * 2u64.pow(attempt - 1);
                debug!("Retrying Ollama request in {}ms (attempt {})", backoff, attempt + 1);
                tokio::time::sleep(Duration::from_millis(backoff)).await;
            }

            match self.client.post(&url).json(request).send().await {
                Ok(response) => {
                    let status = response.status();
                    if status.is_success() {
                        let text = response
                            .text()
                            .await
                            .map_err(|e| ProviderError::ParseError(e.to_string()))?;
                        return serde_json::from_str::<GenerationResponse>(&text).map_err(|e| {
                            error!("Failed to parse Ollama API response: {}", e);
                            ProviderError::ParseError(e.to_string())
                        });
                    }

                    let message = response.text().await.unwrap_or_default();
                    last_error = ProviderError::ApiError {
                        status_code: status.as_u16(),
                        message,
                    };

                    // Client errors will not improve on retry
                    if status.is_client_error() {
                        return Err(last_error);
                    }
                }
                Err(e) => {
                    warn!("Ollama request failed: {}", e);
                    last_error = if e.is_connect() {
                        ProviderError::ConnectionError(e.to_string())
                    } else {
                        ProviderError::RequestFailed(e.to_string())
                    };
                }
            }

            attempt += 1;
        }

        Err(last_error)
    }
}

#[async_trait]
impl Translator for Ollama {
    async fn translate(&self, text: &str, target_language: &str) -> Result<String, ProviderError> {
        let request = GenerationRequest::new(&self.model, text)
            .system(self.system_prompt_for(target_language))
            .temperature(self.temperature);

        let response = self.generate(&request).await?;
        let translated = response.response.trim().to_string();
        if translated.is_empty() {
            return Err(ProviderError::ParseError("Empty translation".to_string()));
        }
        Ok(translated)
    }

    fn name(&self) -> &str {
        "ollama"
    }
}

/// Default system prompt for segment translation
pub fn default_system_prompt() -> String {
    "You are a translator. Translate the user's text into {target_language}. \
     Only return the translated text."
        .to_string()
}
