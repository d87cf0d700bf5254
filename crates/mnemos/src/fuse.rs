// SPDX-FileCopyrightText: 2026 Mnemos Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `mnemos fuse`: reciprocal rank fusion over result files.

use std::path::PathBuf;

use mnemos_core::MnemosError;
use mnemos_memory::{SearchResult, reciprocal_rank_fusion_many};
use tracing::debug;

use crate::input::{print_json, read_json};

pub fn run(paths: &[PathBuf], k: f32, limit: Option<usize>) -> Result<(), MnemosError> {
    let lists = paths
        .iter()
        .map(|path| read_json::<Vec<SearchResult>>(path))
        .collect::<Result<Vec<_>, _>>()?;

    let fused = fuse(&lists, k, limit)?;
    print_json(&fused)
}

fn fuse(
    lists: &[Vec<SearchResult>],
    k: f32,
    limit: Option<usize>,
) -> Result<Vec<SearchResult>, MnemosError> {
    if k.is_nan() || k <= 0.0 {
        return Err(MnemosError::Config(format!("RRF k must be positive, got {k}")));
    }

    let mut fused = reciprocal_rank_fusion_many(lists, k);
    if let Some(limit) = limit {
        fused.truncate(limit);
    }
    debug!(lists = lists.len(), fused = fused.len(), "fused result lists");
    Ok(fused)
}
