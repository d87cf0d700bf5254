// SPDX-FileCopyrightText: 2026 Mnemos Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Lenient JSON extraction from LLM responses.

use serde::de::DeserializeOwned;

/// Parse a JSON value out of a model response.
///
/// Handles bare JSON, markdown code fences, and JSON surrounded by prose:
/// when the whole response does not parse, the span from the first `{`/`[`
/// to the matching last `}`/`]` is tried instead.
pub(crate) fn parse_llm_json<T: DeserializeOwned>(response: &str) -> Result<T, serde_json::Error> {
    let trimmed = strip_code_fence(response.trim());

    let first_err = match serde_json::from_str::<T>(trimmed) {
        Ok(value) => return Ok(value),
        Err(e) => e,
    };

    let start = trimmed.find(['{', '[']);
    let Some(start) = start else {
        return Err(first_err);
    };
    let close = if trimmed[start..].starts_with('{') { '}' } else { ']' };
    match trimmed.rfind(close) {
        Some(end) if end > start => serde_json::from_str(&trimmed[start..=end]),
        _ => Err(first_err),
    }
}

fn strip_code_fence(text: &str) -> &str {
    let Some(rest) = text.strip_prefix("```") else {
        return text;
    };
    // Drop the info string (e.g. `json`) on the opening fence line.
    let body = rest.split_once('\n').map(|(_, body)| body).unwrap_or("");
    body.trim_end().strip_suffix("```").unwrap_or(body).trim()
}
