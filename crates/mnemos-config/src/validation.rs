// SPDX-FileCopyrightText: 2026 Mnemos Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Validates semantic constraints that cannot be expressed via serde attributes,
//! such as positive limits, identifier-shaped table names, and temperature ranges.

use crate::diagnostic::ConfigError;
use crate::model::MnemosConfig;

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Validate a deserialized configuration for semantic correctness.
///
/// Returns `Ok(())` if all validations pass, or `Err(Vec<ConfigError>)` with
/// all collected validation errors (does not fail fast).
pub fn validate_config(config: &MnemosConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    let level = config.logging.level.trim().to_ascii_lowercase();
    if !LOG_LEVELS.contains(&level.as_str()) {
        errors.push(ConfigError::Validation {
            message: format!(
                "logging.level `{}` must be one of {}",
                config.logging.level,
                LOG_LEVELS.join(", ")
            ),
        });
    }

    let retrieval = &config.retrieval;
    if retrieval.default_limit < 1 {
        errors.push(ConfigError::Validation {
            message: "retrieval.default_limit must be at least 1".to_string(),
        });
    }

    if retrieval.rrf_k.is_nan() || retrieval.rrf_k <= 0.0 {
        errors.push(ConfigError::Validation {
            message: format!("retrieval.rrf_k must be positive, got {}", retrieval.rrf_k),
        });
    }

    if retrieval.vector_overfetch < 1 {
        errors.push(ConfigError::Validation {
            message: "retrieval.vector_overfetch must be at least 1".to_string(),
        });
    }

    if retrieval.agentic_min_limit < 1 {
        errors.push(ConfigError::Validation {
            message: "retrieval.agentic_min_limit must be at least 1".to_string(),
        });
    }

    if retrieval.default_memory_type.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "retrieval.default_memory_type must not be empty".to_string(),
        });
    }

    // Interpolated into SQL text, so it must be a bare identifier.
    if !is_sql_identifier(&retrieval.keyword_table) {
        errors.push(ConfigError::Validation {
            message: format!(
                "retrieval.keyword_table `{}` is not a plain SQL identifier",
                retrieval.keyword_table
            ),
        });
    }

    if retrieval.exact_match_bonus < 0.0 {
        errors.push(ConfigError::Validation {
            message: format!(
                "retrieval.exact_match_bonus must be non-negative, got {}",
                retrieval.exact_match_bonus
            ),
        });
    }

    if retrieval.density_scale < 0.0 {
        errors.push(ConfigError::Validation {
            message: format!(
                "retrieval.density_scale must be non-negative, got {}",
                retrieval.density_scale
            ),
        });
    }

    if config.agentic.sufficiency_top_n < 1 {
        errors.push(ConfigError::Validation {
            message: "agentic.sufficiency_top_n must be at least 1".to_string(),
        });
    }

    if config.agentic.max_refined_queries < 1 {
        errors.push(ConfigError::Validation {
            message: "agentic.max_refined_queries must be at least 1".to_string(),
        });
    }

    for (key, value) in [
        ("agentic.judge_temperature", config.agentic.judge_temperature),
        ("profile.merge_temperature", config.profile.merge_temperature),
    ] {
        if !(0.0..=2.0).contains(&value) {
            errors.push(ConfigError::Validation {
                message: format!("{key} must be within [0, 2], got {value}"),
            });
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn is_sql_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}
