// SPDX-FileCopyrightText: 2026 Mnemos Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Base adapter trait that all capability adapters must implement.

use async_trait::async_trait;

use crate::error::MnemosError;
use crate::types::{AdapterType, HealthStatus};

/// The base trait for all Mnemos capability adapters.
///
/// Every injected collaborator (store, embedder, completion model, ...)
/// implements this trait, which provides identity and health checks.
#[async_trait]
pub trait PluginAdapter: Send + Sync + 'static {
    /// Returns the human-readable name of this adapter instance.
    fn name(&self) -> &str;

    /// Returns the semantic version of this adapter.
    fn version(&self) -> semver::Version;

    /// Returns the type of adapter (store, embedding, completion, etc.).
    fn adapter_type(&self) -> AdapterType;

    /// Performs a health check and returns the adapter's current status.
    async fn health_check(&self) -> Result<HealthStatus, MnemosError>;
}
