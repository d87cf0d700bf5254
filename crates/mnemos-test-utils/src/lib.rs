// SPDX-FileCopyrightText: 2026 Mnemos Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for Mnemos tests.
//!
//! Provides in-memory implementations of every capability trait for fast,
//! deterministic, CI-runnable tests without external services.
//!
//! # Components
//!
//! - [`MockCompletion`] - Completion model with queued responses and failures
//! - [`MockEmbedder`] - Deterministic embedder
//! - [`MockRelationalStore`] - Rows with SQL `LIKE` matching and positional parameters
//! - [`MockVectorStore`] - Canned nearest-neighbour hits per memory type
//! - [`MockReranker`] / [`MockExpander`] - Fixed-output rerank and expansion models

pub mod mock_completion;
pub mod mock_models;
pub mod mock_store;

pub use mock_completion::MockCompletion;
pub use mock_models::{MockEmbedder, MockExpander, MockReranker};
pub use mock_store::{
    MockRelationalStore, MockVectorStore, RecordedQuery, RecordedSearch, like_matches, vector_hit,
};
