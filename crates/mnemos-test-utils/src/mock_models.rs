// SPDX-FileCopyrightText: 2026 Mnemos Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock embedding, rerank and query-expansion models.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use mnemos_core::MnemosError;
use mnemos_core::traits::{EmbeddingAdapter, PluginAdapter, QueryExpander, RerankAdapter};
use mnemos_core::types::{AdapterType, EmbeddingInput, EmbeddingOutput, HealthStatus};

macro_rules! mock_adapter {
    ($ty:ty, $name:literal, $kind:expr) => {
        #[async_trait]
        impl PluginAdapter for $ty {
            fn name(&self) -> &str {
                $name
            }

            fn version(&self) -> semver::Version {
                semver::Version::new(0, 1, 0)
            }

            fn adapter_type(&self) -> AdapterType {
                $kind
            }

            async fn health_check(&self) -> Result<HealthStatus, MnemosError> {
                Ok(HealthStatus::Healthy)
            }
        }
    };
}

/// Embedder producing a deterministic vector per text.
pub struct MockEmbedder {
    dimensions: usize,
    failure: Option<String>,
    empty: bool,
    texts: Arc<Mutex<Vec<String>>>,
}

impl MockEmbedder {
    pub fn new(dimensions: usize) -> Self {
        Self {
            dimensions: dimensions.max(1),
            failure: None,
            empty: false,
            texts: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Every call fails with an embedding error carrying `message`.
    pub fn failing(mut self, message: impl Into<String>) -> Self {
        self.failure = Some(message.into());
        self
    }

    /// Every call succeeds with zero embeddings.
    pub fn returning_nothing(mut self) -> Self {
        self.empty = true;
        self
    }

    /// Texts embedded so far, in call order.
    pub async fn texts(&self) -> Vec<String> {
        self.texts.lock().await.clone()
    }

    fn vector_for(&self, text: &str) -> Vec<f32> {
        let mut vector = vec![0.0; self.dimensions];
        for (i, byte) in text.bytes().enumerate() {
            vector[i % self.dimensions] += f32::from(byte) / 255.0;
        }
        let norm = vector.iter().map(|v| v * v).sum::<f32>().sqrt();
        if norm > 0.0 {
            vector.iter_mut().for_each(|v| *v /= norm);
        }
        vector
    }
}

impl Default for MockEmbedder {
    fn default() -> Self {
        Self::new(8)
    }
}

mock_adapter!(MockEmbedder, "mock-embedder", AdapterType::Embedding);

#[async_trait]
impl EmbeddingAdapter for MockEmbedder {
    async fn embed(&self, input: EmbeddingInput) -> Result<EmbeddingOutput, MnemosError> {
        self.texts.lock().await.extend(input.texts.iter().cloned());
        if let Some(message) = &self.failure {
            return Err(MnemosError::embedding(message.clone()));
        }
        let embeddings = if self.empty {
            vec![]
        } else {
            input.texts.iter().map(|t| self.vector_for(t)).collect()
        };
        Ok(EmbeddingOutput {
            embeddings,
            dimensions: self.dimensions,
        })
    }
}

/// Reranker returning a fixed score list, or failing.
pub struct MockReranker {
    scores: Result<Vec<f32>, String>,
    calls: Arc<Mutex<Vec<(String, Vec<String>)>>>,
}

impl MockReranker {
    /// Returns `scores` verbatim, whatever the document count.
    pub fn with_scores(scores: Vec<f32>) -> Self {
        Self {
            scores: Ok(scores),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            scores: Err(message.into()),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// `(query, documents)` pairs received so far.
    pub async fn calls(&self) -> Vec<(String, Vec<String>)> {
        self.calls.lock().await.clone()
    }
}

mock_adapter!(MockReranker, "mock-reranker", AdapterType::Rerank);

#[async_trait]
impl RerankAdapter for MockReranker {
    async fn rerank(&self, query: &str, documents: &[String]) -> Result<Vec<f32>, MnemosError> {
        self.calls
            .lock()
            .await
            .push((query.to_string(), documents.to_vec()));
        self.scores
            .clone()
            .map_err(|message| MnemosError::Internal(format!("rerank failed: {message}")))
    }
}

/// Query expander returning a fixed list, or failing.
pub struct MockExpander {
    queries: Result<Vec<String>, String>,
    calls: Arc<Mutex<Vec<String>>>,
}

impl MockExpander {
    pub fn with_queries<I, S>(queries: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            queries: Ok(queries.into_iter().map(Into::into).collect()),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            queries: Err(message.into()),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Queries expanded so far.
    pub async fn calls(&self) -> Vec<String> {
        self.calls.lock().await.clone()
    }
}

mock_adapter!(MockExpander, "mock-expander", AdapterType::QueryExpansion);

#[async_trait]
impl QueryExpander for MockExpander {
    async fn expand_query(&self, query: &str) -> Result<Vec<String>, MnemosError> {
        self.calls.lock().await.push(query.to_string());
        self.queries.clone().map_err(MnemosError::completion)
    }
}
