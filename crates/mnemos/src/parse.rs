// SPDX-FileCopyrightText: 2026 Mnemos Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `mnemos parse`: extraction output to typed memory sections.

use mnemos_core::MnemosError;
use mnemos_memory::{UnifiedExtraction, parse_unified_memory};
use tracing::debug;

use crate::input::{print_json, read_text};

pub fn run(source: &str) -> Result<(), MnemosError> {
    let text = read_text(source)?;
    let extraction = extract(&text)?;
    print_json(&extraction)
}

fn extract(text: &str) -> Result<UnifiedExtraction, MnemosError> {
    let extraction = parse_unified_memory(text)
        .ok_or_else(|| MnemosError::Internal("no usable memory sections found".to_string()))?;
    debug!(
        narratives = extraction.narratives.len(),
        has_event_log = extraction.event_log.is_some(),
        foresight = extraction.foresight.len(),
        has_profile = extraction.profile.is_some(),
        "parsed extraction output"
    );
    Ok(extraction)
}
