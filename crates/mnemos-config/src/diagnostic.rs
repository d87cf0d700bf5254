// SPDX-FileCopyrightText: 2026 Mnemos Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Config errors as miette diagnostics.
//!
//! Unknown keys are looked up in every section of `MnemosConfig`, so a key
//! written under the wrong header (`max_rounds` in `[retrieval]`) points at
//! the section it belongs to. Other unknown keys get a Jaro-Winkler "did you
//! mean" from their own section.

#![allow(unused_assignments)] // miette's Diagnostic derive generates code triggering this lint

use std::path::Path;

use miette::{Diagnostic, NamedSource, SourceSpan};
use thiserror::Error;

use crate::model::MnemosConfig;

/// Minimum Jaro-Winkler similarity for a suggestion.
const SUGGESTION_THRESHOLD: f64 = 0.8;

/// A configuration problem, rendered through miette.
#[derive(Debug, Error, Diagnostic)]
pub enum ConfigError {
    #[error("unknown key `{key}` in {}", section_label(.section.as_deref()))]
    #[diagnostic(
        code(mnemos::config::unknown_key),
        help("{}", unknown_key_help(key, suggestion.as_deref(), belongs_in.as_deref(), valid_keys))
    )]
    UnknownKey {
        /// Section holding the key; `None` at the top level.
        section: Option<String>,
        key: String,
        /// Closest valid key of the same section.
        suggestion: Option<String>,
        /// Another section that defines this exact key.
        belongs_in: Option<String>,
        valid_keys: String,
        #[label("unknown key")]
        span: Option<SourceSpan>,
        #[source_code]
        src: Option<NamedSource<String>>,
    },

    #[error("invalid value for `{key}`: found {found}")]
    #[diagnostic(code(mnemos::config::invalid_type), help("`{key}` expects {expected}"))]
    InvalidType {
        /// Dotted path, e.g. `retrieval.default_limit`.
        key: String,
        found: String,
        expected: String,
        #[label("wrong type here")]
        span: Option<SourceSpan>,
        #[source_code]
        src: Option<NamedSource<String>>,
    },

    /// A semantic check failed after parsing.
    #[error("validation error: {message}")]
    #[diagnostic(code(mnemos::config::validation))]
    Validation { message: String },

    #[error("configuration error: {0}")]
    #[diagnostic(code(mnemos::config::other))]
    Other(String),
}

fn section_label(section: Option<&str>) -> String {
    match section {
        Some(name) => format!("[{name}]"),
        None => "the top level".to_string(),
    }
}

fn unknown_key_help(
    key: &str,
    suggestion: Option<&str>,
    belongs_in: Option<&str>,
    valid_keys: &str,
) -> String {
    match (belongs_in, suggestion) {
        (Some(section), _) => format!("`{key}` belongs in the [{section}] section"),
        (None, Some(s)) => format!("did you mean `{s}`? Valid keys: {valid_keys}"),
        (None, None) => format!("valid keys: {valid_keys}"),
    }
}

/// `(section, keys)` pairs taken from the serialized default config.
pub fn section_keys() -> Vec<(String, Vec<String>)> {
    let Ok(toml::Value::Table(root)) = toml::Value::try_from(MnemosConfig::default()) else {
        return Vec::new();
    };
    root.into_iter()
        .filter_map(|(section, value)| match value {
            toml::Value::Table(table) => Some((section, table.keys().cloned().collect())),
            _ => None,
        })
        .collect()
}

/// The section other than `current` that defines `key`, if any.
pub fn owning_section(key: &str, current: Option<&str>) -> Option<String> {
    section_keys()
        .into_iter()
        .find(|(section, keys)| Some(section.as_str()) != current && keys.iter().any(|k| k == key))
        .map(|(section, _)| section)
}

/// Closest key above the similarity threshold.
pub fn suggest_key(unknown: &str, valid_keys: &[&str]) -> Option<String> {
    valid_keys
        .iter()
        .map(|&key| (strsim::jaro_winkler(unknown, key), key))
        .filter(|(score, _)| *score > SUGGESTION_THRESHOLD)
        .max_by(|a, b| a.0.total_cmp(&b.0))
        .map(|(_, key)| key.to_string())
}

/// Converts every error inside a `figment::Error` into a `ConfigError`.
///
/// `sources` are `(path, content)` pairs used to attach source spans. A
/// single entry also serves errors that carry no file path (inline TOML).
pub fn figment_to_config_errors(
    err: figment::Error,
    sources: &[(String, String)],
) -> Vec<ConfigError> {
    use figment::error::Kind;

    err.into_iter()
        .map(|error| {
            let path: Vec<String> = error.path.clone();
            match &error.kind {
                Kind::UnknownField(field, expected) => {
                    let section = path.first().cloned();
                    let (span, src) = locate(&error, sources, section.as_deref(), field);
                    ConfigError::UnknownKey {
                        belongs_in: owning_section(field, section.as_deref()),
                        suggestion: suggest_key(field, expected),
                        valid_keys: expected.join(", "),
                        key: field.clone(),
                        section,
                        span,
                        src,
                    }
                }
                Kind::InvalidType(actual, expected) => {
                    let (section, field) = match path.as_slice() {
                        [section, field, ..] => (Some(section.as_str()), field.as_str()),
                        [field] => (None, field.as_str()),
                        [] => (None, ""),
                    };
                    let (span, src) = locate(&error, sources, section, field);
                    ConfigError::InvalidType {
                        key: path.join("."),
                        found: actual.to_string(),
                        expected: expected.clone(),
                        span,
                        src,
                    }
                }
                _ => ConfigError::Other(error.to_string()),
            }
        })
        .collect()
}

fn locate(
    error: &figment::Error,
    sources: &[(String, String)],
    section: Option<&str>,
    key: &str,
) -> (Option<SourceSpan>, Option<NamedSource<String>>) {
    let file = error
        .metadata
        .as_ref()
        .and_then(|m| m.source.as_ref())
        .and_then(|source| match source {
            figment::Source::File(path) => Some(path.clone()),
            _ => None,
        });
    let source = match file {
        Some(file) => sources.iter().find(|(p, _)| file.ends_with(Path::new(p))),
        None if sources.len() == 1 => sources.first(),
        None => None,
    };

    source
        .and_then(|(name, content)| {
            let offset = locate_key(content, section, key)?;
            Some((
                Some(SourceSpan::new(offset.into(), key.len())),
                Some(NamedSource::new(name, content.clone())),
            ))
        })
        .unwrap_or((None, None))
}

/// Byte offset of `key` in TOML `content`.
///
/// With `section` set, only `key = ...` lines under that `[section]` header
/// match. At the top level a `[key]` header matches too.
pub fn locate_key(content: &str, section: Option<&str>, key: &str) -> Option<usize> {
    let mut current: Option<&str> = None;
    let mut offset = 0;

    for line in content.split_inclusive('\n') {
        let trimmed = line.trim_start();
        let indent = line.len() - trimmed.len();

        if let Some((header, _)) = trimmed.strip_prefix('[').and_then(|rest| rest.split_once(']')) {
            let header = header.trim();
            if section.is_none() && header == key {
                return Some(offset + line.find(key)?);
            }
            current = Some(header);
        } else if current == section
            && trimmed
                .strip_prefix(key)
                .is_some_and(|after| after.trim_start().starts_with('='))
        {
            return Some(offset + indent);
        }
        offset += line.len();
    }

    None
}

/// Writes each error to stderr with miette's graphical handler.
pub fn render_errors(errors: &[ConfigError]) {
    let handler = miette::GraphicalReportHandler::new();
    for error in errors {
        let mut out = String::new();
        match handler.render_report(&mut out, error) {
            Ok(()) => eprint!("{out}"),
            Err(_) => eprintln!("Error: {error}"),
        }
    }
}
