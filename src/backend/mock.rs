//! Mock backend for testing
//!
//! Deterministic offline ChatInvoker. Used by unit tests and by
//! `provider = "mock"` for end-to-end runs without a model server.

use std::time::Duration;

use async_trait::async_trait;
use parking_lot::RwLock;
use tracing::debug;

use crate::error::{Error, Result};

use super::{ChatInvoker, ChatRequest};

// ─────────────────────────────────────────────────────────────────
// Mock Backend Configuration
// ─────────────────────────────────────────────────────────────────

/// Configuration for mock backend behavior
#[derive(Debug, Clone)]
pub struct MockConfig {
    /// Model identifier reported by the backend
    pub model: String,

    /// Scripted replies by call index (0-based); later calls get a generated reply
    pub responses: Vec<String>,

    /// Fail the k-th call (1-based)
    pub fail_on_call: Option<usize>,

    /// Simulated latency by call index (ms); missing entries mean no delay
    pub latency_ms: Vec<u64>,
}

impl Default for MockConfig {
    fn default() -> Self {
        Self {
            model: "mock".to_string(),
            responses: Vec::new(),
            fail_on_call: None,
            latency_ms: Vec::new(),
        }
    }
}

// ─────────────────────────────────────────────────────────────────
// Mock Backend
// ─────────────────────────────────────────────────────────────────

/// Mock implementation of ChatInvoker for testing
pub struct MockBackend {
    config: MockConfig,
    calls: RwLock<Vec<ChatRequest>>,
}

impl MockBackend {
    /// Create a new mock backend with default configuration
    pub fn new() -> Self {
        Self::with_config(MockConfig::default())
    }

    /// Create a new mock backend with custom configuration
    pub fn with_config(config: MockConfig) -> Self {
        Self {
            config,
            calls: RwLock::new(Vec::new()),
        }
    }

    /// Mock replying with `responses` in call order
    #[cfg(test)]
    pub fn scripted<I, S>(responses: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::with_config(MockConfig {
            responses: responses.into_iter().map(Into::into).collect(),
            ..MockConfig::default()
        })
    }

    /// Number of invocations so far, including failed ones
    #[cfg(test)]
    pub fn call_count(&self) -> usize {
        self.calls.read().len()
    }

    /// Every request received, in call order
    #[cfg(test)]
    pub fn requests(&self) -> Vec<ChatRequest> {
        self.calls.read().clone()
    }

    /// Reset the call log
    #[cfg(test)]
    pub fn reset(&self) {
        self.calls.write().clear();
    }

    fn generate_response(index: usize, request: &ChatRequest) -> String {
        let topic: String = request
            .user
            .lines()
            .next()
            .unwrap_or_default()
            .chars()
            .take(80)
            .collect();
        format!("Mock reply {} on: {}", index + 1, topic)
    }
}

impl Default for MockBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ChatInvoker for MockBackend {
    fn name(&self) -> &'static str {
        "mock"
    }

    fn model(&self) -> &str {
        &self.config.model
    }

    async fn invoke(&self, request: ChatRequest) -> Result<String> {
        let index = {
            let mut calls = self.calls.write();
            calls.push(request.clone());
            calls.len() - 1
        };

        if let Some(&delay) = self.config.latency_ms.get(index) {
            if delay > 0 {
                tokio::time::sleep(Duration::from_millis(delay)).await;
            }
        }

        if self.config.fail_on_call == Some(index + 1) {
            debug!(call = index + 1, "Mock failing as configured");
            return Err(Error::ModelUnavailable {
                model: self.config.model.clone(),
                message: format!("mock failure on call {}", index + 1),
            });
        }

        Ok(self
            .config
            .responses
            .get(index)
            .cloned()
            .unwrap_or_else(|| Self::generate_response(index, &request)))
    }
}

// ─────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_scripted_then_generated() {
        let backend = MockBackend::scripted(["one"]);
        assert_eq!(backend.invoke(ChatRequest::new("Q")).await.unwrap(), "one");
        assert_eq!(
            backend.invoke(ChatRequest::new("Q")).await.unwrap(),
            "Mock reply 2 on: Q"
        );
        assert_eq!(backend.call_count(), 2);
    }

    #[tokio::test]
    async fn test_fail_on_call() {
        let backend = MockBackend::with_config(MockConfig {
            fail_on_call: Some(2),
            ..MockConfig::default()
        });

        assert!(backend.invoke(ChatRequest::new("a")).await.is_ok());
        let err = backend.invoke(ChatRequest::new("b")).await.unwrap_err();
        assert!(matches!(err, Error::ModelUnavailable { .. }));
        assert!(backend.invoke(ChatRequest::new("c")).await.is_ok());
        assert_eq!(backend.call_count(), 3);
    }

    #[tokio::test]
    async fn test_records_requests() {
        let backend = MockBackend::new();
        backend
            .invoke(ChatRequest::new("question").with_system("instruction"))
            .await
            .unwrap();

        let requests = backend.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].system, vec!["instruction"]);
        assert_eq!(requests[0].user, "question");

        backend.reset();
        assert_eq!(backend.call_count(), 0);
    }

    #[test]
    fn test_name_and_model() {
        let backend = MockBackend::new();
        assert_eq!(backend.name(), "mock");
        assert_eq!(backend.model(), "mock");
    }
}
