//! OpenAI-compatible API backend
//!
//! Implements ChatInvoker by making HTTP calls to any OpenAI-compatible
//! API endpoint (Ollama, vLLM, LM Studio, OpenAI, etc.).

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::config::ModelSettings;
use crate::error::{Error, Result};
use crate::version;

use super::{ChatInvoker, ChatMessage, ChatRequest};

// ─────────────────────────────────────────────────────────────────
// OpenAI API types (request/response)
// ─────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage>,
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    stream: bool,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
    usage: Option<ApiUsage>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiUsage {
    prompt_tokens: u32,
    completion_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct ModelListResponse {
    #[serde(default)]
    data: Vec<ModelEntry>,
}

#[derive(Debug, Deserialize)]
struct ModelEntry {
    id: String,
}

// ─────────────────────────────────────────────────────────────────
// OpenAI Backend
// ─────────────────────────────────────────────────────────────────

/// OpenAI-compatible chat backend bound to one model
pub struct OpenAiBackend {
    base_url: String,
    api_key: String,
    model: String,
    temperature: f32,
    max_tokens: Option<u32>,
    client: Client,
}

impl OpenAiBackend {
    /// Create a backend for `model` using the endpoint settings
    pub fn new(settings: &ModelSettings, model: impl Into<String>) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .user_agent(version::build_info().user_agent())
            .build()
            .map_err(|e| Error::Internal(format!("failed to create HTTP client: {}", e)))?;

        let model = model.into();
        info!(
            base_url = %settings.base_url,
            model = %model,
            "OpenAI-compatible backend created"
        );

        Ok(Self {
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            api_key: settings.api_key.clone(),
            model,
            temperature: settings.temperature,
            max_tokens: settings.max_tokens,
            client,
        })
    }

    /// Build the authorization header value (if API key is set)
    fn auth_header(&self) -> Option<String> {
        if self.api_key.is_empty() {
            None
        } else {
            Some(format!("Bearer {}", self.api_key))
        }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    /// List model identifiers served by the endpoint (GET `/models`)
    pub async fn list_models(&self) -> Result<Vec<String>> {
        let url = self.endpoint("models");
        let mut req = self.client.get(&url);
        if let Some(ref auth) = self.auth_header() {
            req = req.header("Authorization", auth);
        }

        let discovery_error = |message: String| Error::ModelDiscoveryFailed {
            source_name: url.clone(),
            message,
        };

        let response = req.send().await.map_err(|e| discovery_error(e.to_string()))?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(discovery_error(format!("HTTP {}: {}", status, body)));
        }

        let parsed: ModelListResponse = response
            .json()
            .await
            .map_err(|e| discovery_error(format!("malformed model list: {}", e)))?;

        Ok(parsed.data.into_iter().map(|m| m.id).collect())
    }

    fn map_send_error(&self, err: reqwest::Error) -> Error {
        if err.is_connect() || err.is_timeout() {
            Error::ModelUnavailable {
                model: self.model.clone(),
                message: err.to_string(),
            }
        } else {
            Error::chat_completion(None, format!("request error: {}", err))
        }
    }
}

#[async_trait]
impl ChatInvoker for OpenAiBackend {
    fn name(&self) -> &'static str {
        "openai"
    }

    fn model(&self) -> &str {
        &self.model
    }

    async fn invoke(&self, request: ChatRequest) -> Result<String> {
        let body = ChatCompletionRequest {
            model: &self.model,
            messages: request.messages(),
            temperature: self.temperature,
            max_tokens: self.max_tokens,
            stream: false,
        };

        let url = self.endpoint("chat/completions");
        let mut req = self.client.post(&url).json(&body);
        if let Some(ref auth) = self.auth_header() {
            req = req.header("Authorization", auth);
        }

        let start = Instant::now();
        let response = req.send().await.map_err(|e| self.map_send_error(e))?;
        let status = response.status();

        if status == StatusCode::NOT_FOUND {
            let text = response.text().await.unwrap_or_default();
            return Err(Error::ModelUnavailable {
                model: self.model.clone(),
                message: format!("HTTP 404: {}", text),
            });
        }
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(Error::chat_completion(Some(status.as_u16()), text));
        }

        let parsed: ChatCompletionResponse = response.json().await.map_err(|e| {
            Error::chat_completion(Some(status.as_u16()), format!("failed to parse API response: {}", e))
        })?;

        let text = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| Error::chat_completion(Some(status.as_u16()), "no choices in API response"))?;

        debug!(
            model = %self.model,
            elapsed_ms = start.elapsed().as_millis() as u64,
            prompt_tokens = parsed.usage.as_ref().map(|u| u.prompt_tokens),
            completion_tokens = parsed.usage.as_ref().map(|u| u.completion_tokens),
            "Chat completion finished"
        );

        Ok(text)
    }
}

// ─────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────
