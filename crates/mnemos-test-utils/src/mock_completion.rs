// SPDX-FileCopyrightText: 2026 Mnemos Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock completion model for deterministic testing.
//!
//! `MockCompletion` implements `CompletionAdapter` with pre-configured
//! responses and records every request it receives.

use std::collections::VecDeque;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use mnemos_core::MnemosError;
use mnemos_core::traits::{CompletionAdapter, PluginAdapter};
use mnemos_core::types::{AdapterType, CompletionRequest, CompletionResponse, HealthStatus};

/// A mock completion model that returns pre-configured responses.
///
/// Responses are popped from a FIFO queue. When the queue is empty,
/// a default "mock response" text is returned.
pub struct MockCompletion {
    responses: Arc<Mutex<VecDeque<Result<String, String>>>>,
    requests: Arc<Mutex<Vec<CompletionRequest>>>,
}

impl MockCompletion {
    /// Create a new mock with an empty response queue.
    pub fn new() -> Self {
        Self {
            responses: Arc::new(Mutex::new(VecDeque::new())),
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Create a mock pre-loaded with the given responses.
    pub fn with_responses<I, S>(responses: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            responses: Arc::new(Mutex::new(
                responses.into_iter().map(|r| Ok(r.into())).collect(),
            )),
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Add a response to the end of the queue.
    pub async fn queue_response(&self, text: impl Into<String>) {
        self.responses.lock().await.push_back(Ok(text.into()));
    }

    /// Make the next call in queue order fail with a completion error.
    pub async fn queue_error(&self, message: impl Into<String>) {
        self.responses.lock().await.push_back(Err(message.into()));
    }

    /// Requests received so far, in call order.
    pub async fn requests(&self) -> Vec<CompletionRequest> {
        self.requests.lock().await.clone()
    }

    async fn next_response(&self) -> Result<String, String> {
        self.responses
            .lock()
            .await
            .pop_front()
            .unwrap_or_else(|| Ok("mock response".to_string()))
    }
}

impl Default for MockCompletion {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PluginAdapter for MockCompletion {
    fn name(&self) -> &str {
        "mock-completion"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Completion
    }

    async fn health_check(&self) -> Result<HealthStatus, MnemosError> {
        Ok(HealthStatus::Healthy)
    }
}

#[async_trait]
impl CompletionAdapter for MockCompletion {
    async fn complete(
        &self,
        request: CompletionRequest,
    ) -> Result<CompletionResponse, MnemosError> {
        self.requests.lock().await.push(request);
        match self.next_response().await {
            Ok(content) => Ok(CompletionResponse {
                content,
                model: Some("mock-model".to_string()),
            }),
            Err(message) => Err(MnemosError::completion(message)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn mock_completion_returns_queued_responses() {
        let mock = MockCompletion::with_responses(["first", "second"]);

        let r1 = mock.complete(CompletionRequest::new("a")).await.unwrap();
        assert_eq!(r1.content, "first");

        let r2 = mock.complete(CompletionRequest::new("b")).await.unwrap();
        assert_eq!(r2.content, "second");

        // Queue exhausted -- returns default
        let r3 = mock.complete(CompletionRequest::new("c")).await.unwrap();
        assert_eq!(r3.content, "mock response");

        let prompts: Vec<String> = mock.requests().await.into_iter().map(|r| r.prompt).collect();
        assert_eq!(prompts, vec!["a", "b", "c"]);
    }

    #[tokio::test]
    async fn mock_completion_injects_errors_in_order() {
        let mock = MockCompletion::new();
        mock.queue_error("rate limited").await;
        mock.queue_response("ok").await;

        let err = mock.complete(CompletionRequest::new("x")).await.unwrap_err();
        assert!(err.to_string().contains("rate limited"));
        assert_eq!(mock.complete(CompletionRequest::new("y")).await.unwrap().content, "ok");
    }

    #[tokio::test]
    async fn mock_completion_health_check() {
        let mock = MockCompletion::new();
        assert_eq!(mock.health_check().await.unwrap(), HealthStatus::Healthy);
        assert_eq!(mock.adapter_type(), AdapterType::Completion);
    }
}
