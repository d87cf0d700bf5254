// SPDX-FileCopyrightText: 2026 Mnemos Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Completion and rerank adapter traits for LLM integrations.

use async_trait::async_trait;

use crate::error::MnemosError;
use crate::traits::adapter::PluginAdapter;
use crate::types::{CompletionRequest, CompletionResponse};

/// Adapter for single-shot LLM text completion.
#[async_trait]
pub trait CompletionAdapter: PluginAdapter {
    /// Sends a completion request and returns the full response.
    async fn complete(
        &self,
        request: CompletionRequest,
    ) -> Result<CompletionResponse, MnemosError>;
}

/// Adapter for relevance reranking of candidate documents.
///
/// Implementations return one score per document, in input order.
/// Callers must not assume the adapter honours that contract.
#[async_trait]
pub trait RerankAdapter: PluginAdapter {
    /// Scores each document against the query.
    async fn rerank(&self, query: &str, documents: &[String]) -> Result<Vec<f32>, MnemosError>;
}
