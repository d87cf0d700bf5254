// SPDX-FileCopyrightText: 2026 Mnemos Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Store adapter traits for the relational and vector backends.

use async_trait::async_trait;

use crate::error::MnemosError;
use crate::traits::adapter::PluginAdapter;
use crate::types::{QueryParam, Row, VectorHit};

/// Relational query engine holding memory records.
///
/// The store owns substring-match semantics for `LIKE` and must bind
/// `?` placeholders positionally from `params`.
#[async_trait]
pub trait RelationalStore: PluginAdapter {
    /// Runs a parameterized query and returns all matching rows.
    async fn query(&self, sql: &str, params: &[QueryParam]) -> Result<Vec<Row>, MnemosError>;
}

/// Approximate nearest-neighbour index partitioned by memory type.
#[async_trait]
pub trait VectorStore: PluginAdapter {
    /// Returns up to `top_k` hits closest to `embedding` within `memory_type`.
    ///
    /// Hits must report a distance in `[0, 1]`, smaller meaning closer.
    async fn search(
        &self,
        memory_type: &str,
        embedding: &[f32],
        top_k: usize,
    ) -> Result<Vec<VectorHit>, MnemosError>;
}
