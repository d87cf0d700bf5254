// SPDX-FileCopyrightText: 2026 Mnemos Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Retrieval orchestrator over the keyword and vector stores.
//!
//! `retrieve` dispatches on the request's method:
//!
//! - **keyword**: CJK-aware tokens joined into one `LIKE` pattern, scored in
//!   memory by exact-phrase bonus plus keyword density
//! - **vector**: nearest-neighbour search per memory type, soft scope filter,
//!   score `1 - distance`
//! - **hybrid / rrf**: keyword and vector run concurrently, two-way RRF
//! - **agentic**: query expansion, one hybrid search per sub-query run
//!   concurrently, N-way RRF
//!
//! An optional rerank pass runs after dispatch; truncation to the request
//! limit happens once, at the very end.

use std::sync::Arc;

use futures::future::try_join_all;
use mnemos_config::RetrievalConfig;
use mnemos_core::error::MnemosError;
use mnemos_core::traits::{
    EmbeddingAdapter, QueryExpander, RelationalStore, RerankAdapter, VectorStore,
};
use mnemos_core::types::{EmbeddingInput, QueryParam, Row, VectorHit};
use serde_json::Value;
use tracing::{debug, warn};

use crate::fusion::{reciprocal_rank_fusion, reciprocal_rank_fusion_many};
use crate::tokenizer::{keyword_score, tokenize};
use crate::types::{RetrieveRequest, SearchMethod, SearchResult, sort_by_score_desc};

/// Top-level retrieval entry point.
///
/// Holds the injected stores and models; all methods take `&self` and share
/// no mutable state, so one manager can serve concurrent requests.
pub struct RetrievalManager {
    relational: Arc<dyn RelationalStore>,
    vectors: Arc<dyn VectorStore>,
    embedder: Arc<dyn EmbeddingAdapter>,
    expander: Option<Arc<dyn QueryExpander>>,
    reranker: Option<Arc<dyn RerankAdapter>>,
    config: RetrievalConfig,
}

impl RetrievalManager {
    /// Creates a manager without query expansion or reranking.
    pub fn new(
        relational: Arc<dyn RelationalStore>,
        vectors: Arc<dyn VectorStore>,
        embedder: Arc<dyn EmbeddingAdapter>,
        config: RetrievalConfig,
    ) -> Self {
        Self {
            relational,
            vectors,
            embedder,
            expander: None,
            reranker: None,
            config,
        }
    }

    /// Enables query expansion for agentic search.
    pub fn with_expander(mut self, expander: Arc<dyn QueryExpander>) -> Self {
        self.expander = Some(expander);
        self
    }

    /// Enables the optional rerank pass.
    pub fn with_reranker(mut self, reranker: Arc<dyn RerankAdapter>) -> Self {
        self.reranker = Some(reranker);
        self
    }

    pub fn config(&self) -> &RetrievalConfig {
        &self.config
    }

    /// Effective result cap for `request`.
    pub fn limit_for(&self, request: &RetrieveRequest) -> usize {
        request.effective_limit(self.config.default_limit)
    }

    /// Retrieve memories for `request`, sorted by score descending and
    /// truncated to the request limit.
    ///
    /// Store and embedding failures propagate. Rerank failures do not.
    pub async fn retrieve(
        &self,
        request: &RetrieveRequest,
    ) -> Result<Vec<SearchResult>, MnemosError> {
        let limit = self.limit_for(request);
        debug!(method = %request.method, limit, "retrieving memories");

        let mut results = match request.method {
            SearchMethod::Keyword => self.keyword_search(request).await?,
            SearchMethod::Vector => self.vector_search(request).await?,
            SearchMethod::Hybrid | SearchMethod::Rrf => self.hybrid_search(request).await?,
            SearchMethod::Agentic => self.agentic_search(request).await?,
        };

        if request.use_rerank {
            results = self.rerank(&request.query, results).await;
        }

        results.truncate(limit);
        Ok(results)
    }

    /// Substring search through the relational store, scored in memory.
    ///
    /// Returns an empty list when the query has no usable tokens.
    pub async fn keyword_search(
        &self,
        request: &RetrieveRequest,
    ) -> Result<Vec<SearchResult>, MnemosError> {
        let tokens = tokenize(&request.query);
        if tokens.is_empty() {
            debug!("keyword search skipped: no usable tokens");
            return Ok(vec![]);
        }
        let limit = self.limit_for(request);

        let (sql, params) = self.build_keyword_query(&tokens, request, limit);
        let rows = self.relational.query(&sql, &params).await?;
        debug!(tokens = ?tokens, rows = rows.len(), "keyword candidates fetched");

        let query_lower = request.query.trim().to_lowercase();
        let mut results: Vec<SearchResult> = rows
            .into_iter()
            .filter_map(|row| row_to_result(row, &self.config.default_memory_type))
            .map(|mut result| {
                result.score = keyword_score(
                    &result.content,
                    &query_lower,
                    &tokens,
                    self.config.exact_match_bonus,
                    self.config.density_scale,
                );
                result
            })
            .collect();

        sort_by_score_desc(&mut results);
        Ok(results)
    }

    /// Builds `SELECT * FROM <table> WHERE content LIKE ? [AND user_id = ?] [AND group_id = ?] LIMIT ?`.
    fn build_keyword_query(
        &self,
        tokens: &[String],
        request: &RetrieveRequest,
        limit: usize,
    ) -> (String, Vec<QueryParam>) {
        let mut sql = format!(
            "SELECT * FROM {} WHERE content LIKE ?",
            self.config.keyword_table
        );
        let mut params = vec![QueryParam::Text(format!("%{}%", tokens.join("%")))];

        if let Some(user_id) = &request.user_id {
            sql.push_str(" AND user_id = ?");
            params.push(user_id.as_str().into());
        }
        if let Some(group_id) = &request.group_id {
            sql.push_str(" AND group_id = ?");
            params.push(group_id.as_str().into());
        }

        sql.push_str(" LIMIT ?");
        params.push(QueryParam::Integer(limit as i64));
        (sql, params)
    }

    /// Nearest-neighbour search across the requested memory types.
    ///
    /// Over-fetches per type so the soft scope filter still leaves enough
    /// candidates. A hit is dropped only when it carries a `user_id` or
    /// `group_id` that differs from the request's; hits missing those fields
    /// are kept.
    pub async fn vector_search(
        &self,
        request: &RetrieveRequest,
    ) -> Result<Vec<SearchResult>, MnemosError> {
        let limit = self.limit_for(request);
        let embedding = self.embed_query(&request.query).await?;

        let memory_types: Vec<&str> = if request.memory_types.is_empty() {
            vec![self.config.default_memory_type.as_str()]
        } else {
            request.memory_types.iter().map(String::as_str).collect()
        };
        let top_k = limit.saturating_mul(self.config.vector_overfetch.max(1));

        let per_type = try_join_all(
            memory_types
                .iter()
                .map(|memory_type| self.vectors.search(memory_type, &embedding, top_k)),
        )
        .await?;

        let mut results = Vec::new();
        for (memory_type, hits) in memory_types.iter().zip(per_type) {
            let fetched = hits.len();
            let before = results.len();
            results.extend(
                hits.into_iter()
                    .filter(|hit| in_scope(hit, request))
                    .map(|hit| hit_to_result(hit, memory_type)),
            );
            debug!(
                memory_type,
                fetched,
                kept = results.len() - before,
                "vector hits filtered"
            );
        }

        sort_by_score_desc(&mut results);
        results.truncate(limit);
        Ok(results)
    }

    /// Keyword and vector search run concurrently, fused with two-way RRF.
    pub async fn hybrid_search(
        &self,
        request: &RetrieveRequest,
    ) -> Result<Vec<SearchResult>, MnemosError> {
        let limit = self.limit_for(request);
        let (keyword, vector) =
            tokio::try_join!(self.keyword_search(request), self.vector_search(request))?;

        let mut fused = reciprocal_rank_fusion(&keyword, &vector, self.config.rrf_k);
        debug!(
            keyword = keyword.len(),
            vector = vector.len(),
            fused = fused.len(),
            "hybrid lists fused"
        );
        fused.truncate(limit);
        Ok(fused)
    }

    /// Multi-query search: expand, hybrid-search every sub-query concurrently,
    /// fuse all lists with N-way RRF.
    pub async fn agentic_search(
        &self,
        request: &RetrieveRequest,
    ) -> Result<Vec<SearchResult>, MnemosError> {
        let limit = self.limit_for(request);
        let sub_queries = self.expand(&request.query).await;
        debug!(sub_queries = ?sub_queries, "agentic search expanded");

        let lists = self.search_sub_queries(request, &sub_queries).await?;
        let mut fused = reciprocal_rank_fusion_many(&lists, self.config.rrf_k);
        fused.truncate(limit);
        Ok(fused)
    }

    /// Runs one hybrid search per query, all concurrently, with a per-query
    /// limit of `max(limit, agentic_min_limit)` and reranking disabled.
    pub(crate) async fn search_sub_queries(
        &self,
        request: &RetrieveRequest,
        queries: &[String],
    ) -> Result<Vec<Vec<SearchResult>>, MnemosError> {
        let sub_limit = self.limit_for(request).max(self.config.agentic_min_limit);
        let sub_requests: Vec<RetrieveRequest> = queries
            .iter()
            .map(|query| request.sub_query(query, sub_limit))
            .collect();

        try_join_all(sub_requests.iter().map(|sub| self.hybrid_search(sub))).await
    }

    /// Sub-queries for `query`, falling back to the query itself when no
    /// expander is configured, it fails, or it returns nothing usable.
    async fn expand(&self, query: &str) -> Vec<String> {
        let Some(expander) = &self.expander else {
            return vec![query.to_string()];
        };

        match expander.expand_query(query).await {
            Ok(queries) => {
                let queries: Vec<String> = queries
                    .into_iter()
                    .map(|q| q.trim().to_string())
                    .filter(|q| !q.is_empty())
                    .collect();
                if queries.is_empty() {
                    vec![query.to_string()]
                } else {
                    queries
                }
            }
            Err(e) => {
                warn!("query expansion failed, searching the original query only: {e}");
                vec![query.to_string()]
            }
        }
    }

    /// Replaces scores with rerank scores and re-sorts.
    ///
    /// Any rerank error or a score count that does not match the result count
    /// leaves `results` untouched.
    async fn rerank(&self, query: &str, mut results: Vec<SearchResult>) -> Vec<SearchResult> {
        let Some(reranker) = &self.reranker else {
            return results;
        };
        if results.is_empty() {
            return results;
        }

        let documents: Vec<String> = results.iter().map(|r| r.content.clone()).collect();
        match reranker.rerank(query, &documents).await {
            Ok(scores) if scores.len() == results.len() => {
                for (result, score) in results.iter_mut().zip(scores) {
                    result.score = score;
                }
                sort_by_score_desc(&mut results);
                results
            }
            Ok(scores) => {
                warn!(
                    expected = results.len(),
                    got = scores.len(),
                    "rerank score count mismatch, keeping original order"
                );
                results
            }
            Err(e) => {
                warn!("rerank failed, keeping original order: {e}");
                results
            }
        }
    }

    async fn embed_query(&self, query: &str) -> Result<Vec<f32>, MnemosError> {
        let output = self
            .embedder
            .embed(EmbeddingInput {
                texts: vec![query.to_string()],
            })
            .await?;

        output
            .embeddings
            .into_iter()
            .next()
            .ok_or_else(|| MnemosError::embedding("embedding returned no results"))
    }
}

/// True unless the hit carries a scope value that differs from the request's.
fn in_scope(hit: &VectorHit, request: &RetrieveRequest) -> bool {
    scope_matches(hit.user_id.as_deref(), request.user_id.as_deref())
        && scope_matches(hit.group_id.as_deref(), request.group_id.as_deref())
}

fn scope_matches(hit_value: Option<&str>, wanted: Option<&str>) -> bool {
    match (hit_value.filter(|v| !v.is_empty()), wanted) {
        (Some(have), Some(want)) => have == want,
        _ => true,
    }
}

fn hit_to_result(hit: VectorHit, memory_type: &str) -> SearchResult {
    let mut metadata = match hit.metadata {
        Value::Object(map) => map,
        Value::Null => serde_json::Map::new(),
        other => {
            let mut map = serde_json::Map::new();
            map.insert("value".to_string(), other);
            map
        }
    };
    if let Some(user_id) = hit.user_id {
        metadata.insert("user_id".to_string(), Value::String(user_id));
    }
    if let Some(group_id) = hit.group_id {
        metadata.insert("group_id".to_string(), Value::String(group_id));
    }

    SearchResult {
        id: hit.id,
        score: 1.0 - hit.distance,
        content: hit.content,
        metadata: Value::Object(metadata),
        memory_type: memory_type.to_string(),
    }
}

/// Maps a store row onto a result; `id`, `content` and `type` are lifted out,
/// every other column lands in `metadata`.
fn row_to_result(mut row: Row, default_type: &str) -> Option<SearchResult> {
    let id = match row.remove("id") {
        Some(Value::String(id)) => id,
        Some(Value::Number(id)) => id.to_string(),
        _ => {
            debug!("skipping keyword row without id");
            return None;
        }
    };
    let content = match row.remove("content") {
        Some(Value::String(content)) => content,
        _ => {
            debug!(id, "skipping keyword row without content");
            return None;
        }
    };
    let memory_type = match row.remove("type") {
        Some(Value::String(memory_type)) if !memory_type.is_empty() => memory_type,
        _ => default_type.to_string(),
    };

    Some(SearchResult {
        id,
        score: 0.0,
        content,
        metadata: Value::Object(row),
        memory_type,
    })
}
