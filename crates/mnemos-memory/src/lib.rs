// SPDX-FileCopyrightText: 2026 Mnemos Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Retrieval and memory normalization core for the Mnemos memory layer.
//!
//! Ranks stored memories for free-text queries and turns extraction-model
//! output into typed memory records and profile updates. Storage, embedding
//! and completion models are injected through the `mnemos-core` traits.
//!
//! ## Architecture
//!
//! - **RetrievalManager**: keyword, vector, hybrid and agentic search with optional rerank
//! - **fusion**: two-way and N-way Reciprocal Rank Fusion
//! - **agentic**: sufficiency judge, refined queries, LLM query expansion, refinement loop
//! - **parser**: sectioned plain-text extraction output to `UnifiedExtraction`
//! - **profile**: normalized and LLM profile merging behind `ProfileMergeStrategy`
//! - **tokenizer**: CJK-aware keyword tokens and density scoring

pub mod agentic;
pub mod fusion;
mod json;
pub mod parser;
pub mod profile;
pub mod retriever;
pub mod tokenizer;
pub mod types;

pub use agentic::{
    LlmQueryExpander, RefinedRetrieval, RefinementRound, SufficiencyVerdict, check_sufficiency,
    generate_refined_queries,
};
pub use fusion::{DEFAULT_RRF_K, Ranked, reciprocal_rank_fusion, reciprocal_rank_fusion_many};
pub use parser::{UnifiedExtraction, parse_unified_memory};
pub use profile::{
    FallbackMerge, LlmMerge, MergeOutcome, Profile, ProfileMergeStrategy, ProfileMerger,
    SimpleMerge, merge_profiles_simple, merge_profiles_with_llm, normalize_fact,
};
pub use retriever::RetrievalManager;
pub use types::*;
