// SPDX-FileCopyrightText: 2026 Mnemos Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-memory relational and vector stores for deterministic testing.
//!
//! `MockRelationalStore` understands the `SELECT ... WHERE col LIKE ? AND
//! col = ? LIMIT ?` shape the keyword path issues, with SQL `LIKE`
//! semantics (`%`, `_`, case-insensitive) and positional binding.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::Mutex;

use mnemos_core::MnemosError;
use mnemos_core::traits::{PluginAdapter, RelationalStore, VectorStore};
use mnemos_core::types::{AdapterType, HealthStatus, QueryParam, Row, VectorHit};

fn store_error(message: impl Into<String>) -> MnemosError {
    MnemosError::storage(std::io::Error::other(message.into()))
}

/// A query the relational mock received.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedQuery {
    pub sql: String,
    pub params: Vec<QueryParam>,
}

/// Relational store over a fixed set of rows.
pub struct MockRelationalStore {
    rows: Vec<Row>,
    failure: Option<String>,
    queries: Arc<Mutex<Vec<RecordedQuery>>>,
}

impl MockRelationalStore {
    pub fn new() -> Self {
        Self {
            rows: Vec::new(),
            failure: None,
            queries: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Adds a row. Non-object values are ignored.
    pub fn with_row(mut self, row: Value) -> Self {
        if let Value::Object(row) = row {
            self.rows.push(row);
        }
        self
    }

    pub fn with_rows(self, rows: impl IntoIterator<Item = Value>) -> Self {
        rows.into_iter().fold(self, Self::with_row)
    }

    /// Every query fails with a storage error carrying `message`.
    pub fn failing(mut self, message: impl Into<String>) -> Self {
        self.failure = Some(message.into());
        self
    }

    /// Queries received so far, in call order.
    pub async fn queries(&self) -> Vec<RecordedQuery> {
        self.queries.lock().await.clone()
    }
}

impl Default for MockRelationalStore {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug)]
enum Condition {
    Like { column: String, pattern: String },
    Equals { column: String, value: String },
}

impl Condition {
    fn matches(&self, row: &Row) -> bool {
        match self {
            Condition::Like { column, pattern } => {
                column_text(row, column).is_some_and(|text| like_matches(pattern, &text))
            }
            Condition::Equals { column, value } => {
                column_text(row, column).is_some_and(|text| &text == value)
            }
        }
    }
}

fn column_text(row: &Row, column: &str) -> Option<String> {
    match row.get(column)? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn param_text(param: &QueryParam) -> String {
    match param {
        QueryParam::Text(s) => s.clone(),
        QueryParam::Integer(i) => i.to_string(),
    }
}

/// Parses the `WHERE` conditions and `LIMIT` of a simple select, binding
/// `?` placeholders from `params` left to right.
fn parse_select(
    sql: &str,
    params: &[QueryParam],
) -> Result<(Vec<Condition>, Option<usize>), MnemosError> {
    let tokens: Vec<&str> = sql.split_whitespace().collect();
    let mut params = params.iter();
    let mut bind = |token: &str| -> Result<String, MnemosError> {
        if token == "?" {
            params
                .next()
                .map(param_text)
                .ok_or_else(|| store_error("not enough parameters for placeholders"))
        } else {
            Ok(token.trim_matches('\'').to_string())
        }
    };

    let mut conditions = Vec::new();
    let mut limit = None;
    let mut i = tokens
        .iter()
        .position(|t| t.eq_ignore_ascii_case("WHERE"))
        .map_or(tokens.len(), |p| p + 1);

    while i < tokens.len() {
        let token = tokens[i];
        if token.eq_ignore_ascii_case("AND") {
            i += 1;
            continue;
        }
        if token.eq_ignore_ascii_case("LIMIT") {
            let raw = tokens
                .get(i + 1)
                .ok_or_else(|| store_error("LIMIT without a value"))?;
            let value = bind(*raw)?;
            limit = Some(
                value
                    .parse()
                    .map_err(|_| store_error(format!("invalid LIMIT value: {value}")))?,
            );
            break;
        }

        let (Some(op), Some(raw)) = (tokens.get(i + 1), tokens.get(i + 2)) else {
            return Err(store_error(format!("incomplete condition at `{token}`")));
        };
        let column = token.to_string();
        let value = bind(*raw)?;
        conditions.push(if op.eq_ignore_ascii_case("LIKE") {
            Condition::Like {
                column,
                pattern: value,
            }
        } else if *op == "=" {
            Condition::Equals { column, value }
        } else {
            return Err(store_error(format!("unsupported operator `{op}`")));
        });
        i += 3;
    }

    Ok((conditions, limit))
}

/// Case-insensitive SQL `LIKE`: `%` matches any run, `_` one character.
pub fn like_matches(pattern: &str, text: &str) -> bool {
    let p: Vec<char> = pattern.to_lowercase().chars().collect();
    let t: Vec<char> = text.to_lowercase().chars().collect();
    let (mut pi, mut ti) = (0, 0);
    let mut backtrack: Option<(usize, usize)> = None;

    while ti < t.len() {
        if pi < p.len() && p[pi] == '%' {
            backtrack = Some((pi, ti));
            pi += 1;
        } else if pi < p.len() && (p[pi] == '_' || p[pi] == t[ti]) {
            pi += 1;
            ti += 1;
        } else if let Some((star, mark)) = backtrack {
            pi = star + 1;
            ti = mark + 1;
            backtrack = Some((star, mark + 1));
        } else {
            return false;
        }
    }
    p[pi..].iter().all(|c| *c == '%')
}

#[async_trait]
impl PluginAdapter for MockRelationalStore {
    fn name(&self) -> &str {
        "mock-relational-store"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::RelationalStore
    }

    async fn health_check(&self) -> Result<HealthStatus, MnemosError> {
        Ok(HealthStatus::Healthy)
    }
}

#[async_trait]
impl RelationalStore for MockRelationalStore {
    async fn query(&self, sql: &str, params: &[QueryParam]) -> Result<Vec<Row>, MnemosError> {
        self.queries.lock().await.push(RecordedQuery {
            sql: sql.to_string(),
            params: params.to_vec(),
        });
        if let Some(message) = &self.failure {
            return Err(store_error(message.clone()));
        }

        let (conditions, limit) = parse_select(sql, params)?;
        Ok(self
            .rows
            .iter()
            .filter(|row| conditions.iter().all(|c| c.matches(row)))
            .take(limit.unwrap_or(usize::MAX))
            .cloned()
            .collect())
    }
}

/// A search the vector mock received.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedSearch {
    pub memory_type: String,
    pub top_k: usize,
}

/// Vector store returning canned hits per memory type, closest first.
pub struct MockVectorStore {
    hits: HashMap<String, Vec<VectorHit>>,
    failure: Option<String>,
    searches: Arc<Mutex<Vec<RecordedSearch>>>,
}

impl MockVectorStore {
    pub fn new() -> Self {
        Self {
            hits: HashMap::new(),
            failure: None,
            searches: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn with_hits(mut self, memory_type: &str, hits: Vec<VectorHit>) -> Self {
        self.hits.entry(memory_type.to_string()).or_default().extend(hits);
        self
    }

    /// Every search fails with a storage error carrying `message`.
    pub fn failing(mut self, message: impl Into<String>) -> Self {
        self.failure = Some(message.into());
        self
    }

    /// Searches received so far, in call order.
    pub async fn searches(&self) -> Vec<RecordedSearch> {
        self.searches.lock().await.clone()
    }
}

impl Default for MockVectorStore {
    fn default() -> Self {
        Self::new()
    }
}

/// Builds a hit with no metadata.
pub fn vector_hit(
    id: &str,
    content: &str,
    distance: f32,
    user_id: Option<&str>,
    group_id: Option<&str>,
) -> VectorHit {
    VectorHit {
        id: id.to_string(),
        content: content.to_string(),
        user_id: user_id.map(str::to_string),
        group_id: group_id.map(str::to_string),
        distance,
        metadata: Value::Null,
    }
}

#[async_trait]
impl PluginAdapter for MockVectorStore {
    fn name(&self) -> &str {
        "mock-vector-store"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::VectorStore
    }

    async fn health_check(&self) -> Result<HealthStatus, MnemosError> {
        Ok(HealthStatus::Healthy)
    }
}

#[async_trait]
impl VectorStore for MockVectorStore {
    async fn search(
        &self,
        memory_type: &str,
        _embedding: &[f32],
        top_k: usize,
    ) -> Result<Vec<VectorHit>, MnemosError> {
        self.searches.lock().await.push(RecordedSearch {
            memory_type: memory_type.to_string(),
            top_k,
        });
        if let Some(message) = &self.failure {
            return Err(store_error(message.clone()));
        }

        let mut hits = self.hits.get(memory_type).cloned().unwrap_or_default();
        hits.sort_by(|a, b| a.distance.total_cmp(&b.distance));
        hits.truncate(top_k);
        Ok(hits)
    }
}
