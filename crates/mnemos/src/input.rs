// SPDX-FileCopyrightText: 2026 Mnemos Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! File and stdin input helpers shared by the subcommands.

use std::io::Read;
use std::path::Path;

use mnemos_core::MnemosError;
use serde::de::DeserializeOwned;

/// Reads `source` as UTF-8 text; `-` means stdin.
pub fn read_text(source: &str) -> Result<String, MnemosError> {
    if source == "-" {
        let mut text = String::new();
        std::io::stdin()
            .read_to_string(&mut text)
            .map_err(|e| MnemosError::Internal(format!("failed to read stdin: {e}")))?;
        return Ok(text);
    }
    read_file(Path::new(source))
}

pub fn read_file(path: &Path) -> Result<String, MnemosError> {
    std::fs::read_to_string(path)
        .map_err(|e| MnemosError::Internal(format!("failed to read {}: {e}", path.display())))
}

/// Reads and deserializes a JSON file.
pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, MnemosError> {
    let text = read_file(path)?;
    serde_json::from_str(&text)
        .map_err(|e| MnemosError::Internal(format!("invalid JSON in {}: {e}", path.display())))
}

/// Pretty-prints `value` as JSON on stdout.
pub fn print_json<T: serde::Serialize>(value: &T) -> Result<(), MnemosError> {
    let rendered = serde_json::to_string_pretty(value)
        .map_err(|e| MnemosError::Internal(format!("failed to encode output: {e}")))?;
    println!("{rendered}");
    Ok(())
}
