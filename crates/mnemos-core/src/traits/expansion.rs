// SPDX-FileCopyrightText: 2026 Mnemos Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Query expansion adapter trait for multi-query retrieval.

use async_trait::async_trait;

use crate::error::MnemosError;
use crate::traits::adapter::PluginAdapter;

/// Expands one free-text query into several narrower sub-queries.
#[async_trait]
pub trait QueryExpander: PluginAdapter {
    /// Returns the sub-queries for `query`. An empty list is allowed.
    async fn expand_query(&self, query: &str) -> Result<Vec<String>, MnemosError>;
}
