// SPDX-FileCopyrightText: 2026 Mnemos Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports XDG hierarchy: `./mnemos.toml` > `~/.config/mnemos/mnemos.toml` > `/etc/mnemos/mnemos.toml`
//! with environment variable overrides via `MNEMOS_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::Path;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};

use crate::model::MnemosConfig;

/// System-wide config file location.
pub const SYSTEM_CONFIG_PATH: &str = "/etc/mnemos/mnemos.toml";

/// Local (working directory) config file name.
pub const LOCAL_CONFIG_FILE: &str = "mnemos.toml";

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/mnemos/mnemos.toml` (system-wide)
/// 3. `~/.config/mnemos/mnemos.toml` (user XDG config)
/// 4. `./mnemos.toml` (local directory)
/// 5. `MNEMOS_*` environment variables
pub fn load_config() -> Result<MnemosConfig, figment::Error> {
    build_figment().extract()
}

/// Load configuration from a TOML string only (no XDG lookup, no env).
///
/// Used for testing and explicit inline configuration.
pub fn load_config_from_str(toml_content: &str) -> Result<MnemosConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(MnemosConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<MnemosConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(MnemosConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Build the Figment used internally for config loading.
///
/// Returns the Figment before extraction so callers can inspect metadata.
pub fn build_figment() -> Figment {
    Figment::new()
        .merge(Serialized::defaults(MnemosConfig::default()))
        .merge(Toml::file(SYSTEM_CONFIG_PATH))
        .merge(Toml::file(user_config_path().unwrap_or_default()))
        .merge(Toml::file(LOCAL_CONFIG_FILE))
        .merge(env_provider())
}

/// Path of the per-user config file, if the platform has a config dir.
pub fn user_config_path() -> Option<std::path::PathBuf> {
    dirs::config_dir().map(|d| d.join("mnemos").join(LOCAL_CONFIG_FILE))
}

/// Top-level config sections, used to map env var names onto dotted keys.
const SECTIONS: &[&str] = &["logging", "retrieval", "agentic", "profile"];

/// Create the environment variable provider using explicit `map()` for section-to-dot mapping.
///
/// Uses `Env::map()` rather than `Env::split("_")` because key names contain
/// underscores: `MNEMOS_RETRIEVAL_AGENTIC_MIN_LIMIT` must map to
/// `retrieval.agentic_min_limit`. Only the leading section name is rewritten.
fn env_provider() -> Env {
    Env::prefixed("MNEMOS_").map(|key| {
        // Figment hands over the stripped name in its original case.
        let key_str = key.as_str().to_ascii_lowercase();
        for section in SECTIONS {
            if let Some(rest) = key_str
                .strip_prefix(section)
                .and_then(|rest| rest.strip_prefix('_'))
            {
                return format!("{section}.{rest}").into();
            }
        }
        key_str.into()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upper_case_env_vars_map_onto_section_keys() {
        figment::Jail::expect_with(|jail| {
            jail.set_env("MNEMOS_RETRIEVAL_DEFAULT_LIMIT", "12");
            jail.set_env("MNEMOS_AGENTIC_MAX_ROUNDS", "4");
            jail.set_env("MNEMOS_LOGGING_LEVEL", "debug");

            let config: MnemosConfig = Figment::new()
                .merge(Serialized::defaults(MnemosConfig::default()))
                .merge(env_provider())
                .extract()?;
            assert_eq!(config.retrieval.default_limit, 12);
            assert_eq!(config.agentic.max_rounds, 4);
            assert_eq!(config.logging.level, "debug");
            Ok(())
        });
    }

    #[test]
    fn env_overrides_explicit_config_file() {
        figment::Jail::expect_with(|jail| {
            jail.create_file("custom.toml", "[profile]\nllm_merge = true\n")?;
            jail.set_env("MNEMOS_PROFILE_LLM_MERGE", "false");

            let config = load_config_from_path(Path::new("custom.toml"))?;
            assert!(!config.profile.llm_merge);
            Ok(())
        });
    }
}
