// SPDX-FileCopyrightText: 2026 Mnemos Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `mnemos merge-profile`: fold new facts into a stored profile.

use std::path::Path;

use mnemos_config::ProfileConfig;
use mnemos_core::MnemosError;
use mnemos_memory::{MergeOutcome, Profile, ProfileMerger};
use serde::Deserialize;
use tracing::info;

use crate::input::{print_json, read_json};

/// A profile file: either `{"items": [...]}` or a bare fact array.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ProfileFile {
    Profile(Profile),
    Items(Vec<String>),
}

impl From<ProfileFile> for Profile {
    fn from(file: ProfileFile) -> Self {
        match file {
            ProfileFile::Profile(profile) => profile,
            ProfileFile::Items(items) => Profile { items },
        }
    }
}

pub async fn run(config: &ProfileConfig, existing: &Path, incoming: &Path) -> Result<(), MnemosError> {
    let existing: Profile = read_json::<ProfileFile>(existing)?.into();
    let incoming: Profile = read_json::<ProfileFile>(incoming)?.into();

    let outcome = merge(config, &existing, &incoming).await;
    print_json(&outcome)
}

/// No completion model is wired into the CLI, so this always takes the
/// normalized path.
async fn merge(config: &ProfileConfig, existing: &Profile, incoming: &Profile) -> MergeOutcome {
    let merger = ProfileMerger::from_config(config, None);
    let outcome = merger.merge(existing, incoming).await;
    info!(
        strategy = merger.strategy_name(),
        has_changes = outcome.has_changes,
        added = outcome.added.len(),
        "profile merged"
    );
    outcome
}
