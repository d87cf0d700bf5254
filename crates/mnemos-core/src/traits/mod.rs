// SPDX-FileCopyrightText: 2026 Mnemos Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Capability trait definitions for the collaborators the memory core consumes.
//!
//! All adapters extend the [`PluginAdapter`] base trait and use
//! `#[async_trait]` for dynamic dispatch compatibility.

pub mod adapter;
pub mod completion;
pub mod embedding;
pub mod expansion;
pub mod store;

pub use adapter::PluginAdapter;
pub use completion::{CompletionAdapter, RerankAdapter};
pub use embedding::EmbeddingAdapter;
pub use expansion::QueryExpander;
pub use store::{RelationalStore, VectorStore};
