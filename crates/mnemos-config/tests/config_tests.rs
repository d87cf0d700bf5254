// SPDX-FileCopyrightText: 2026 Mnemos Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Integration tests for the Mnemos configuration system.

use mnemos_config::diagnostic::ConfigError;
use mnemos_config::model::MnemosConfig;
use mnemos_config::{load_and_validate_path, load_and_validate_str, load_config_from_str};

/// Valid TOML with all known fields deserializes successfully.
#[test]
fn valid_toml_deserializes_into_mnemos_config() {
    let toml = r#"
[logging]
level = "debug"

[retrieval]
default_limit = 20
rrf_k = 30.0
vector_overfetch = 3
agentic_min_limit = 25
default_memory_type = "document"
keyword_table = "memory_rows"
exact_match_bonus = 1.5
density_scale = 500.0

[agentic]
sufficiency_top_n = 3
max_refined_queries = 2
max_rounds = 1
judge_temperature = 0.3

[profile]
llm_merge = false
merge_temperature = 0.0
"#;

    let config = load_config_from_str(toml).expect("valid TOML should deserialize");
    assert_eq!(config.logging.level, "debug");
    assert_eq!(config.retrieval.default_limit, 20);
    assert!((config.retrieval.rrf_k - 30.0).abs() < f32::EPSILON);
    assert_eq!(config.retrieval.vector_overfetch, 3);
    assert_eq!(config.retrieval.agentic_min_limit, 25);
    assert_eq!(config.retrieval.default_memory_type, "document");
    assert_eq!(config.retrieval.keyword_table, "memory_rows");
    assert_eq!(config.agentic.sufficiency_top_n, 3);
    assert_eq!(config.agentic.max_refined_queries, 2);
    assert_eq!(config.agentic.max_rounds, 1);
    assert!(!config.profile.llm_merge);
}

/// Missing optional sections use defaults without error.
#[test]
fn missing_optional_sections_use_defaults() {
    let config = load_config_from_str("").expect("empty TOML should use defaults");

    assert_eq!(config.logging.level, "info");
    assert_eq!(config.retrieval.default_limit, 10);
    assert!((config.retrieval.rrf_k - 60.0).abs() < f32::EPSILON);
    assert_eq!(config.retrieval.vector_overfetch, 2);
    assert_eq!(config.retrieval.agentic_min_limit, 15);
    assert_eq!(config.retrieval.default_memory_type, "memory");
    assert_eq!(config.retrieval.keyword_table, "memories");
    assert_eq!(config.agentic.sufficiency_top_n, 5);
    assert_eq!(config.agentic.max_refined_queries, 3);
    assert!(config.profile.llm_merge);
}

/// Partial sections keep defaults for the keys they omit.
#[test]
fn partial_section_keeps_remaining_defaults() {
    let toml = r#"
[retrieval]
default_limit = 5
"#;
    let config = load_config_from_str(toml).expect("partial section should parse");
    assert_eq!(config.retrieval.default_limit, 5);
    assert_eq!(config.retrieval.agentic_min_limit, 15);
    assert_eq!(config.retrieval.keyword_table, "memories");
}

/// Unexpected top-level section is rejected by deny_unknown_fields.
#[test]
fn deny_unknown_fields_at_top_level() {
    let toml = r#"
[telemetry]
enabled = true
"#;

    let err = load_config_from_str(toml).expect_err("unknown top-level section should be rejected");
    let err_str = format!("{err}");
    assert!(
        err_str.contains("unknown field") || err_str.contains("telemetry"),
        "error should mention unknown field, got: {err_str}"
    );
}

/// Unknown key in [retrieval] produces an UnknownKey diagnostic with a suggestion.
#[test]
fn diagnostic_error_includes_unknown_key_and_suggestion() {
    let toml = r#"
[retrieval]
defualt_limit = 5
"#;

    let errors = load_and_validate_str(toml).expect_err("should produce errors");
    let has_unknown_key = errors.iter().any(|e| {
        matches!(e, ConfigError::UnknownKey { key, suggestion, valid_keys, .. } if {
            key == "defualt_limit"
                && suggestion.as_deref() == Some("default_limit")
                && valid_keys.contains("rrf_k")
        })
    });
    assert!(
        has_unknown_key,
        "should have UnknownKey error with suggestion, got: {errors:?}"
    );
}

/// A key written under the wrong section header names the right one and
/// points at the offending line.
#[test]
fn misplaced_key_reports_owning_section() {
    let toml = "[retrieval]\ndefault_limit = 5\nmax_rounds = 3\n";

    let errors = load_and_validate_str(toml).expect_err("misplaced key should be rejected");
    let error = errors
        .iter()
        .find(|e| matches!(e, ConfigError::UnknownKey { key, .. } if key == "max_rounds"))
        .unwrap_or_else(|| panic!("expected UnknownKey for max_rounds, got: {errors:?}"));
    let ConfigError::UnknownKey { section, belongs_in, span, .. } = error else {
        unreachable!();
    };
    assert_eq!(section.as_deref(), Some("retrieval"));
    assert_eq!(belongs_in.as_deref(), Some("agentic"));
    let span = span.expect("inline source should carry a span");
    assert_eq!(&toml[span.offset()..span.offset() + span.len()], "max_rounds");
}

/// Invalid type (string where number expected) produces a clear message.
#[test]
fn diagnostic_invalid_type_message() {
    let toml = r#"
[retrieval]
default_limit = "ten"
"#;

    let err = load_config_from_str(toml).expect_err("should reject invalid type");
    let err_str = format!("{err}");
    assert!(
        err_str.contains("invalid type") || err_str.contains("default_limit"),
        "error should mention type mismatch, got: {err_str}"
    );
}

/// Semantic validation runs after a successful parse.
#[test]
fn load_and_validate_reports_semantic_errors() {
    let toml = r#"
[retrieval]
default_limit = 0
"#;

    let errors = load_and_validate_str(toml).expect_err("zero limit should fail validation");
    assert!(errors.iter().any(
        |e| matches!(e, ConfigError::Validation { message } if message.contains("default_limit"))
    ));
}

/// ConfigError renders through miette's graphical handler.
#[test]
fn config_error_renders_with_miette() {
    use miette::{Diagnostic, GraphicalReportHandler};

    let error = ConfigError::UnknownKey {
        section: Some("retrieval".to_string()),
        key: "rrf_kk".to_string(),
        suggestion: Some("rrf_k".to_string()),
        belongs_in: None,
        valid_keys: "default_limit, rrf_k".to_string(),
        span: None,
        src: None,
    };

    assert!(error.code().is_some(), "should have diagnostic code");
    let help = error.help().expect("help text").to_string();
    assert!(help.contains("did you mean `rrf_k`"), "got: {help}");

    let handler = GraphicalReportHandler::new();
    let mut buf = String::new();
    handler
        .render_report(&mut buf, &error)
        .expect("should render without error");
    assert!(buf.contains("rrf_kk"));
}

/// A config file on disk is loaded and validated.
#[test]
fn load_and_validate_from_file() {
    use std::io::Write;

    let mut file = tempfile::NamedTempFile::new().expect("temp file");
    writeln!(file, "[agentic]\nmax_rounds = 4").expect("write config");

    let config = load_and_validate_path(file.path()).expect("file config should validate");
    assert_eq!(config.agentic.max_rounds, 4);
}

/// MNEMOS_* variables override file values, including keys that contain
/// another section's name.
#[test]
fn env_vars_override_file_values() {
    figment::Jail::expect_with(|jail| {
        jail.create_file("mnemos.toml", "[retrieval]\ndefault_limit = 7\n")?;
        jail.set_env("MNEMOS_RETRIEVAL_DEFAULT_LIMIT", "12");
        jail.set_env("MNEMOS_RETRIEVAL_AGENTIC_MIN_LIMIT", "30");
        jail.set_env("MNEMOS_PROFILE_LLM_MERGE", "false");

        let config = mnemos_config::load_config().expect("layered config should load");
        assert_eq!(config.retrieval.default_limit, 12);
        assert_eq!(config.retrieval.agentic_min_limit, 30);
        assert!(!config.profile.llm_merge);
        Ok(())
    });
}

/// Default config round-trips through TOML serialization.
#[test]
fn default_config_serializes_to_toml() {
    let rendered = mnemos_config::render_toml(&MnemosConfig::default()).expect("serialize");
    assert!(rendered.contains("[retrieval]"));
    let reparsed = load_config_from_str(&rendered).expect("reparse");
    assert_eq!(reparsed.retrieval.default_limit, 10);
}
