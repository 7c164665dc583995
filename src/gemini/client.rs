use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use std::time::{Duration, Instant};
use tracing::{debug, error, info};

use super::types::{ErrorEnvelope, GenerateContentRequest, GenerateContentResponse};
use crate::config::{GeminiConfig, RequestConfig};
use crate::error::{GatewayError, GatewayResult};
use crate::gateway::{parse_completion, ModelGateway};
use crate::prompts::Prompt;

/// Client for the Gemini `generateContent` API
#[derive(Clone)]
pub struct GeminiClient {
    client: Client,
    base_url: String,
    model: String,
    api_key: Option<String>,
    request_config: RequestConfig,
}

impl GeminiClient {
    /// Create a new Gemini client
    ///
    /// A missing API key is not an error here; it is reported on first use.
    pub fn new(config: &GeminiConfig, request_config: RequestConfig) -> GatewayResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_millis(request_config.timeout_ms))
            .build()
            .map_err(GatewayError::Http)?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            api_key: config.api_key.clone(),
            request_config,
        })
    }

    /// Send a request and return the raw completion text
    pub async fn generate(&self, request: &GenerateContentRequest) -> GatewayResult<String> {
        let Some(api_key) = self.api_key.as_deref() else {
            error!(model = %self.model, "Gemini API key not set (GEMINI_API_KEY)");
            return Err(GatewayError::NotConfigured);
        };
        let start = Instant::now();

        match self.execute_request(api_key, request).await {
            Ok(text) => {
                info!(
                    model = %self.model,
                    latency_ms = start.elapsed().as_millis(),
                    "Gemini call succeeded"
                );
                Ok(text)
            }
            Err(e) => {
                error!(
                    model = %self.model,
                    error = %e,
                    latency_ms = start.elapsed().as_millis(),
                    "Gemini call failed"
                );
                Err(e)
            }
        }
    }

    /// Execute a single request (internal)
    async fn execute_request(
        &self,
        api_key: &str,
        request: &GenerateContentRequest,
    ) -> GatewayResult<String> {
        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, self.model
        );

        debug!(model = %self.model, contents = request.contents.len(), "Calling Gemini");

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", api_key)
            .header("Content-Type", "application/json")
            .json(request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    GatewayError::Timeout {
                        timeout_ms: self.request_config.timeout_ms,
                    }
                } else {
                    GatewayError::Http(e)
                }
            })?;

        let status = response.status();

        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            return Err(GatewayError::Api {
                status: status.as_u16(),
                message: ErrorEnvelope::message_from_body(&error_body),
            });
        }

        let parsed: GenerateContentResponse =
            response
                .json()
                .await
                .map_err(|e| GatewayError::InvalidResponse {
                    message: format!("Failed to parse response: {}", e),
                })?;

        parsed.text().ok_or_else(|| GatewayError::InvalidResponse {
            message: "Response contained no text".to_string(),
        })
    }

    /// Get the base URL (for testing)
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Get the model name
    pub fn model(&self) -> &str {
        &self.model
    }
}

#[async_trait]
impl ModelGateway for GeminiClient {
    async fn invoke(&self, prompt: &Prompt) -> GatewayResult<Value> {
        let request = GenerateContentRequest::structured(&prompt.text, prompt.schema.clone());
        let text = self.generate(&request).await?;

        parse_completion(&text).map_err(|e| {
            error!(model = %self.model, error = %e, "Gemini returned unparseable output");
            e
        })
    }
}
