// SPDX-FileCopyrightText: 2026 Mnemos Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the Mnemos memory core.

use thiserror::Error;

/// The primary error type used across all Mnemos capability traits and core operations.
#[derive(Debug, Error)]
pub enum MnemosError {
    /// Configuration errors (invalid TOML, missing required fields, type mismatches).
    #[error("configuration error: {0}")]
    Config(String),

    /// Relational or vector store errors (connection, query failure, row decoding).
    #[error("storage error: {source}")]
    Storage {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Embedding capability errors (model unavailable, empty output).
    #[error("embedding error: {message}")]
    Embedding {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Completion capability errors (API failure, token limits, model not found).
    #[error("completion error: {message}")]
    Completion {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl MnemosError {
    /// Shorthand for a completion failure without an underlying source.
    pub fn completion(message: impl Into<String>) -> Self {
        MnemosError::Completion {
            message: message.into(),
            source: None,
        }
    }

    /// Shorthand for an embedding failure without an underlying source.
    pub fn embedding(message: impl Into<String>) -> Self {
        MnemosError::Embedding {
            message: message.into(),
            source: None,
        }
    }

    /// Wraps any store-side error.
    pub fn storage(source: impl std::error::Error + Send + Sync + 'static) -> Self {
        MnemosError::Storage {
            source: Box::new(source),
        }
    }
}
