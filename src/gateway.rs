//! Boundary to the generative model.
//!
//! [`ModelGateway`] is the only seam through which the crate talks to a model
//! provider. Implementations send one request per call and never retry.

use async_trait::async_trait;
use serde_json::Value;

use crate::error::{GatewayError, GatewayResult};
use crate::prompts::Prompt;

/// Sends a prompt and its response schema to a model and returns parsed JSON.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ModelGateway: Send + Sync {
    /// Invoke the model once and parse its text output as JSON.
    async fn invoke(&self, prompt: &Prompt) -> GatewayResult<Value>;
}

/// Extract JSON from completion text, handling markdown code fences.
///
/// Attempts extraction in this order:
/// 1. Raw JSON after trimming (fast path)
/// 2. Contents of a ```json ... ``` block
/// 3. Contents of a ``` ... ``` block
pub fn extract_json(completion: &str) -> Result<&str, String> {
    let trimmed = completion.trim();
    if trimmed.starts_with('{') || trimmed.starts_with('[') {
        return Ok(trimmed);
    }

    if completion.contains("```json") {
        return completion
            .split("```json")
            .nth(1)
            .and_then(|s| s.split("```").next())
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .ok_or_else(|| "Found ```json block but content was empty or malformed".to_string());
    }

    if completion.contains("```") {
        return completion
            .split("```")
            .nth(1)
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .ok_or_else(|| "Found ``` block but content was empty or malformed".to_string());
    }

    Err(format!(
        "No JSON found in response. First 100 chars: '{}'",
        trimmed.chars().take(100).collect::<String>()
    ))
}

/// Parse completion text into a JSON value.
pub fn parse_completion(completion: &str) -> GatewayResult<Value> {
    let json = extract_json(completion)
        .map_err(|message| GatewayError::InvalidResponse { message })?;

    serde_json::from_str(json).map_err(|e| GatewayError::InvalidResponse {
        message: format!("Response is not valid JSON: {}", e),
    })
}
