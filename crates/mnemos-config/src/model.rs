// SPDX-FileCopyrightText: 2026 Mnemos Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for the Mnemos memory core.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use serde::{Deserialize, Serialize};

/// Top-level Mnemos configuration.
///
/// Loaded from TOML files following XDG hierarchy, with environment variable overrides.
/// All sections are optional and default to sensible values.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct MnemosConfig {
    /// Log output settings.
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Keyword, vector, hybrid and agentic retrieval settings.
    #[serde(default)]
    pub retrieval: RetrievalConfig,

    /// Sufficiency judging and query refinement settings.
    #[serde(default)]
    pub agentic: AgenticConfig,

    /// User profile merge settings.
    #[serde(default)]
    pub profile: ProfileConfig,
}

/// Log output configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Retrieval orchestration configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct RetrievalConfig {
    /// Result cap used when a request does not specify one.
    #[serde(default = "default_limit")]
    pub default_limit: usize,

    /// Reciprocal Rank Fusion constant `k`.
    #[serde(default = "default_rrf_k")]
    pub rrf_k: f32,

    /// Vector candidates fetched per memory type, as a multiple of the limit.
    #[serde(default = "default_vector_overfetch")]
    pub vector_overfetch: usize,

    /// Floor for the per-sub-query limit in agentic search.
    #[serde(default = "default_agentic_min_limit")]
    pub agentic_min_limit: usize,

    /// Memory type searched when a request names none.
    #[serde(default = "default_memory_type")]
    pub default_memory_type: String,

    /// Table holding memory rows for keyword search.
    #[serde(default = "default_keyword_table")]
    pub keyword_table: String,

    /// Flat score bonus when the whole query appears verbatim in the content.
    #[serde(default = "default_exact_match_bonus")]
    pub exact_match_bonus: f32,

    /// Multiplier applied to keyword hit density (hits per character).
    #[serde(default = "default_density_scale")]
    pub density_scale: f32,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            default_limit: default_limit(),
            rrf_k: default_rrf_k(),
            vector_overfetch: default_vector_overfetch(),
            agentic_min_limit: default_agentic_min_limit(),
            default_memory_type: default_memory_type(),
            keyword_table: default_keyword_table(),
            exact_match_bonus: default_exact_match_bonus(),
            density_scale: default_density_scale(),
        }
    }
}

fn default_limit() -> usize {
    10
}

fn default_rrf_k() -> f32 {
    60.0
}

fn default_vector_overfetch() -> usize {
    2
}

fn default_agentic_min_limit() -> usize {
    15
}

fn default_memory_type() -> String {
    "memory".to_string()
}

fn default_keyword_table() -> String {
    "memories".to_string()
}

fn default_exact_match_bonus() -> f32 {
    2.0
}

fn default_density_scale() -> f32 {
    1000.0
}

/// Agentic retrieval helper configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AgenticConfig {
    /// How many top results are shown to the sufficiency judge.
    #[serde(default = "default_sufficiency_top_n")]
    pub sufficiency_top_n: usize,

    /// Upper bound on follow-up queries accepted from the model.
    #[serde(default = "default_max_refined_queries")]
    pub max_refined_queries: usize,

    /// Refinement rounds run by iterative retrieval. Zero disables refinement.
    #[serde(default = "default_max_rounds")]
    pub max_rounds: usize,

    /// Sampling temperature for judge and refinement prompts.
    #[serde(default)]
    pub judge_temperature: f32,
}

impl Default for AgenticConfig {
    fn default() -> Self {
        Self {
            sufficiency_top_n: default_sufficiency_top_n(),
            max_refined_queries: default_max_refined_queries(),
            max_rounds: default_max_rounds(),
            judge_temperature: 0.0,
        }
    }
}

fn default_sufficiency_top_n() -> usize {
    5
}

fn default_max_refined_queries() -> usize {
    3
}

fn default_max_rounds() -> usize {
    2
}

/// User profile merge configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ProfileConfig {
    /// Use the LLM semantic merge (falling back to normalized dedup).
    /// When false only the normalized-text merge runs.
    #[serde(default = "default_llm_merge")]
    pub llm_merge: bool,

    /// Sampling temperature for the merge prompt.
    #[serde(default = "default_merge_temperature")]
    pub merge_temperature: f32,
}

impl Default for ProfileConfig {
    fn default() -> Self {
        Self {
            llm_merge: default_llm_merge(),
            merge_temperature: default_merge_temperature(),
        }
    }
}

fn default_llm_merge() -> bool {
    true
}

fn default_merge_temperature() -> f32 {
    0.2
}
