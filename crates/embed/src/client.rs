use async_trait::async_trait;
use folio_common::{AppConfig, FolioError, Result};
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, info};

use crate::provider::EmbeddingProvider;
use crate::types::{ApiErrorResponse, Content, EmbedContentRequest, EmbedContentResponse, TaskType};

/// Gemini embedding API client
#[derive(Debug, Clone)]
pub struct GeminiClient {
    base_url: String,
    api_key: String,
    model: String,
    output_dim: Option<usize>,
    client: Client,
}

impl GeminiClient {
    /// Create new Gemini client
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        model: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        let model = model.into();
        if model.trim().is_empty() {
            return Err(FolioError::config("missing embedding model name"));
        }

        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| FolioError::config(format!("Failed to create HTTP client: {}", e)))?;

        info!("Gemini embedding client initialized: {} ({})", base_url, model);
        Ok(Self {
            base_url,
            api_key: api_key.into(),
            model,
            output_dim: None,
            client,
        })
    }

    /// Build a client from application configuration
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        if config.gemini_api_key.trim().is_empty() {
            return Err(FolioError::config("GEMINI_API_KEY is not set"));
        }
        Ok(Self::new(
            &config.gemini_base_url,
            &config.gemini_api_key,
            &config.embedding_model,
            config.http_timeout(),
        )?
        .with_output_dim(config.embedding_dim))
    }

    /// Ask the API to truncate vectors to `dim` dimensions
    pub fn with_output_dim(mut self, dim: usize) -> Self {
        self.output_dim = Some(dim);
        self
    }

    fn endpoint(&self) -> String {
        format!("{}/v1beta/models/{}:embedContent", self.base_url, self.model)
    }

    /// Single attempt to generate an embedding
    async fn try_embed(&self, request: &EmbedContentRequest) -> Result<Vec<f32>> {
        let response = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", &self.api_key)
            .json(request)
            .send()
            .await
            .map_err(|e| FolioError::embedding_failed(format!("request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let detail = serde_json::from_str::<ApiErrorResponse>(&body)
                .map(|e| format!("{} {}", e.error.status, e.error.message))
                .unwrap_or(body);
            return Err(FolioError::embedding_failed(format!(
                "Gemini API error ({}): {}",
                status,
                detail.trim()
            )));
        }

        let result: EmbedContentResponse = response.json().await.map_err(|e| {
            FolioError::embedding_failed(format!("Failed to parse embedding response: {}", e))
        })?;

        validate_vector(result.embedding.values)
    }
}

/// Reject vectors that can't be trusted for ranking
fn validate_vector(values: Vec<f32>) -> Result<Vec<f32>> {
    if values.is_empty() {
        return Err(FolioError::embedding_failed("Empty embedding from Gemini"));
    }
    if values.iter().any(|v| !v.is_finite()) {
        return Err(FolioError::embedding_failed("Embedding contains non-finite values"));
    }
    if values.iter().all(|v| *v == 0.0) {
        return Err(FolioError::embedding_failed("Embedding has zero norm"));
    }
    Ok(values)
}

#[async_trait]
impl EmbeddingProvider for GeminiClient {
    async fn embed(&self, text: &str, task_type: TaskType) -> Result<Vec<f32>> {
        if text.trim().is_empty() {
            return Err(FolioError::invalid_input("cannot embed empty text"));
        }

        debug!(
            "Generating {} embedding - Model: {}, Text length: {}",
            task_type,
            self.model,
            text.len()
        );

        let request = EmbedContentRequest {
            model: format!("models/{}", self.model),
            content: Content::text(text),
            task_type,
            output_dimensionality: self.output_dim,
        };

        let embedding = self.try_embed(&request).await?;
        debug!("Received embedding - Dimension: {}", embedding.len());
        Ok(embedding)
    }

    fn model(&self) -> &str {
        &self.model
    }
}
