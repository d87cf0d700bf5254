// SPDX-FileCopyrightText: 2026 Mnemos Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Retrieval request and result types.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// How `RetrievalManager::retrieve` searches.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum SearchMethod {
    /// Substring match with in-memory density scoring.
    Keyword,
    /// Nearest-neighbour search over the query embedding.
    Vector,
    /// Keyword and vector fused with two-way RRF.
    #[default]
    Hybrid,
    /// Alias of `Hybrid`.
    Rrf,
    /// Query expansion, hybrid search per sub-query, N-way RRF.
    Agentic,
}

/// A retrieval request.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RetrieveRequest {
    pub query: String,
    #[serde(default)]
    pub user_id: Option<String>,
    /// Exact-match scope filter.
    #[serde(default)]
    pub group_id: Option<String>,
    #[serde(default)]
    pub method: SearchMethod,
    /// Result cap. `None` uses the configured default.
    #[serde(default)]
    pub limit: Option<usize>,
    /// Memory types vector search is restricted to. Empty means the default type.
    #[serde(default)]
    pub memory_types: Vec<String>,
    #[serde(default)]
    pub use_rerank: bool,
}

impl RetrieveRequest {
    /// Creates a hybrid request for `query` with default limit and no scoping.
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            ..Self::default()
        }
    }

    pub fn with_method(mut self, method: SearchMethod) -> Self {
        self.method = method;
        self
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit.max(1));
        self
    }

    pub fn with_user(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = Some(user_id.into());
        self
    }

    pub fn with_group(mut self, group_id: impl Into<String>) -> Self {
        self.group_id = Some(group_id.into());
        self
    }

    pub fn with_memory_types<I, S>(mut self, types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.memory_types = types.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_rerank(mut self, use_rerank: bool) -> Self {
        self.use_rerank = use_rerank;
        self
    }

    /// Effective result cap, never below 1.
    pub fn effective_limit(&self, default_limit: usize) -> usize {
        self.limit.unwrap_or(default_limit).max(1)
    }

    /// Same scoping as `self`, different query and limit, no rerank.
    pub(crate) fn sub_query(&self, query: &str, limit: usize) -> Self {
        Self {
            query: query.to_string(),
            user_id: self.user_id.clone(),
            group_id: self.group_id.clone(),
            method: SearchMethod::Hybrid,
            limit: Some(limit),
            memory_types: self.memory_types.clone(),
            use_rerank: false,
        }
    }
}

/// One ranked memory record.
///
/// `score` depends on the method that produced it: keyword density, `1 - distance`,
/// an RRF sum, or a rerank score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    pub id: String,
    pub score: f32,
    pub content: String,
    #[serde(default)]
    pub metadata: serde_json::Value,
    #[serde(rename = "type")]
    pub memory_type: String,
}

/// Sort descending by score. Ties keep their current relative order.
pub(crate) fn sort_by_score_desc(results: &mut [SearchResult]) {
    results.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn method_defaults_to_hybrid() {
        assert_eq!(SearchMethod::default(), SearchMethod::Hybrid);
        let req: RetrieveRequest = serde_json::from_str(r#"{"query":"tea"}"#).unwrap();
        assert_eq!(req.method, SearchMethod::Hybrid);
        assert!(req.limit.is_none());
    }

    #[test]
    fn method_parses_case_insensitively() {
        assert_eq!(SearchMethod::from_str("AGENTIC").unwrap(), SearchMethod::Agentic);
        assert_eq!(SearchMethod::from_str("rrf").unwrap(), SearchMethod::Rrf);
        assert_eq!(SearchMethod::Keyword.to_string(), "keyword");
    }

    #[test]
    fn limit_is_never_zero() {
        assert_eq!(RetrieveRequest::new("q").with_limit(0).limit, Some(1));
        let req = RetrieveRequest {
            limit: Some(0),
            ..RetrieveRequest::new("q")
        };
        assert_eq!(req.effective_limit(10), 1);
        assert_eq!(RetrieveRequest::new("q").effective_limit(10), 10);
    }

    #[test]
    fn sub_query_keeps_scope_and_disables_rerank() {
        let req = RetrieveRequest::new("original")
            .with_group("scope-a")
            .with_user("u1")
            .with_method(SearchMethod::Agentic)
            .with_rerank(true);
        let sub = req.sub_query("narrower", 15);
        assert_eq!(sub.query, "narrower");
        assert_eq!(sub.group_id.as_deref(), Some("scope-a"));
        assert_eq!(sub.user_id.as_deref(), Some("u1"));
        assert_eq!(sub.limit, Some(15));
        assert_eq!(sub.method, SearchMethod::Hybrid);
        assert!(!sub.use_rerank);
    }

    #[test]
    fn search_result_serializes_type_field() {
        let result = SearchResult {
            id: "m1".into(),
            score: 0.5,
            content: "likes tea".into(),
            metadata: serde_json::Value::Null,
            memory_type: "memory".into(),
        };
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["type"], "memory");
    }
}
