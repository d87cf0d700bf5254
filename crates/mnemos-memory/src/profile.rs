// SPDX-FileCopyrightText: 2026 Mnemos Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Folding newly extracted atomic facts into a persisted user profile.
//!
//! Two strategies share the [`ProfileMergeStrategy`] interface:
//!
//! - [`SimpleMerge`]: exact match on a normalized form of each fact
//! - [`LlmMerge`]: asks a completion model for a semantically deduplicated list
//!
//! [`FallbackMerge`] chains them so that a failing model degrades to the
//! simple path. A merge through [`ProfileMerger`] never fails.

use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use mnemos_config::ProfileConfig;
use mnemos_core::error::MnemosError;
use mnemos_core::traits::CompletionAdapter;
use mnemos_core::types::CompletionRequest;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::json::parse_llm_json;
use crate::tokenizer::is_cjk_punctuation;

const MERGE_PROMPT: &str = r#"You maintain a list of atomic facts about a user.

Merge the new facts into the existing facts:
- Drop new facts that repeat an existing fact, even if worded differently
- When a new fact updates an existing one, keep only the updated version
- Keep every other fact unchanged, one self-contained statement per item
- Do not invent facts

Existing facts (JSON):
{existing}

New facts (JSON):
{incoming}

Respond with JSON only:
{"items": ["fact", ...], "summary": "one sentence describing what changed"}"#;

/// The persisted profile: an unordered, deduplicated list of atomic facts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    #[serde(default)]
    pub items: Vec<String>,
}

impl Profile {
    pub fn new<I, S>(items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            items: items.into_iter().map(Into::into).collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Result of a merge.
///
/// When `has_changes` is false, `profile` equals the existing profile and the
/// caller can skip the write.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MergeOutcome {
    pub profile: Profile,
    pub has_changes: bool,
    /// Incoming facts appended verbatim. Only the simple path fills this.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub added: Vec<String>,
    /// Model-written change summary. Only the LLM path fills this.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
}

impl MergeOutcome {
    fn unchanged(existing: &Profile) -> Self {
        Self {
            profile: existing.clone(),
            has_changes: false,
            added: vec![],
            summary: None,
        }
    }
}

/// Comparison key for a fact: lowercase, with every run of whitespace or
/// ASCII/CJK punctuation collapsed into one space, trimmed.
pub fn normalize_fact(fact: &str) -> String {
    let mut normalized = String::with_capacity(fact.len());
    let mut pending_space = false;

    for c in fact.chars().flat_map(char::to_lowercase) {
        if c.is_whitespace() || c.is_ascii_punctuation() || is_cjk_punctuation(c) {
            pending_space = true;
            continue;
        }
        if pending_space && !normalized.is_empty() {
            normalized.push(' ');
        }
        pending_space = false;
        normalized.push(c);
    }
    normalized
}

/// Appends every incoming fact whose normalized form is not yet present.
///
/// Added facts keep their original spelling. Blank facts are ignored, and
/// duplicates within `incoming` are added once.
pub fn merge_profiles_simple(existing: &Profile, incoming: &Profile) -> MergeOutcome {
    let mut seen: HashSet<String> = existing.items.iter().map(|f| normalize_fact(f)).collect();
    let mut added = Vec::new();

    for fact in &incoming.items {
        let key = normalize_fact(fact);
        if key.is_empty() || !seen.insert(key) {
            continue;
        }
        added.push(fact.clone());
    }

    if added.is_empty() {
        return MergeOutcome::unchanged(existing);
    }

    let mut profile = existing.clone();
    profile.items.extend(added.iter().cloned());
    MergeOutcome {
        profile,
        has_changes: true,
        added,
        summary: None,
    }
}

/// LLM-backed merge that falls back to [`merge_profiles_simple`] on any
/// completion, parse or content failure.
pub async fn merge_profiles_with_llm(
    existing: &Profile,
    incoming: &Profile,
    completion: &dyn CompletionAdapter,
    temperature: f32,
) -> MergeOutcome {
    match llm_merge(existing, incoming, completion, temperature).await {
        Ok(outcome) => outcome,
        Err(e) => {
            warn!("LLM profile merge failed, using normalized merge: {e}");
            merge_profiles_simple(existing, incoming)
        }
    }
}

#[derive(Debug, Deserialize)]
struct LlmMergeResponse {
    #[serde(default)]
    items: Vec<String>,
    #[serde(default)]
    summary: Option<String>,
}

async fn llm_merge(
    existing: &Profile,
    incoming: &Profile,
    completion: &dyn CompletionAdapter,
    temperature: f32,
) -> Result<MergeOutcome, MnemosError> {
    // Nothing new even by exact match means nothing for the model to do.
    if !merge_profiles_simple(existing, incoming).has_changes {
        debug!("no new facts, skipping LLM merge");
        return Ok(MergeOutcome::unchanged(existing));
    }

    let encode = |items: &[String]| {
        serde_json::to_string_pretty(items)
            .map_err(|e| MnemosError::Internal(format!("failed to encode facts: {e}")))
    };
    let prompt = MERGE_PROMPT
        .replace("{existing}", &encode(&existing.items)?)
        .replace("{incoming}", &encode(&incoming.items)?);

    let response = completion
        .complete(
            CompletionRequest::new(prompt)
                .json()
                .with_temperature(temperature),
        )
        .await?;

    let parsed: LlmMergeResponse = parse_llm_json(&response.content).map_err(|e| {
        MnemosError::completion(format!("unparsable merge response: {e}"))
    })?;

    let items: Vec<String> = parsed
        .items
        .into_iter()
        .map(|item| item.trim().to_string())
        .filter(|item| !item.is_empty())
        .collect();
    if items.is_empty() {
        return Err(MnemosError::completion("merge response contained no items"));
    }

    let has_changes = !same_facts(&existing.items, &items);
    debug!(
        before = existing.items.len(),
        after = items.len(),
        has_changes,
        "LLM profile merge parsed"
    );

    if !has_changes {
        return Ok(MergeOutcome::unchanged(existing));
    }
    Ok(MergeOutcome {
        profile: Profile { items },
        has_changes,
        added: vec![],
        summary: parsed.summary.filter(|s| !s.trim().is_empty()),
    })
}

fn same_facts(a: &[String], b: &[String]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let left: HashSet<String> = a.iter().map(|f| normalize_fact(f)).collect();
    let right: HashSet<String> = b.iter().map(|f| normalize_fact(f)).collect();
    left == right
}

/// A way of folding incoming facts into an existing profile.
#[async_trait]
pub trait ProfileMergeStrategy: Send + Sync {
    /// Short name for logs.
    fn name(&self) -> &str;

    async fn merge(
        &self,
        existing: &Profile,
        incoming: &Profile,
    ) -> Result<MergeOutcome, MnemosError>;
}

/// Normalized exact-match merge. Never fails.
#[derive(Debug, Clone, Copy, Default)]
pub struct SimpleMerge;

#[async_trait]
impl ProfileMergeStrategy for SimpleMerge {
    fn name(&self) -> &str {
        "simple"
    }

    async fn merge(
        &self,
        existing: &Profile,
        incoming: &Profile,
    ) -> Result<MergeOutcome, MnemosError> {
        Ok(merge_profiles_simple(existing, incoming))
    }
}

/// Semantic merge through a completion model. Surfaces every failure.
pub struct LlmMerge {
    completion: Arc<dyn CompletionAdapter>,
    temperature: f32,
}

impl LlmMerge {
    pub fn new(completion: Arc<dyn CompletionAdapter>, temperature: f32) -> Self {
        Self {
            completion,
            temperature,
        }
    }
}

#[async_trait]
impl ProfileMergeStrategy for LlmMerge {
    fn name(&self) -> &str {
        "llm"
    }

    async fn merge(
        &self,
        existing: &Profile,
        incoming: &Profile,
    ) -> Result<MergeOutcome, MnemosError> {
        llm_merge(existing, incoming, self.completion.as_ref(), self.temperature).await
    }
}

/// Tries `primary`, then `fallback` when it fails.
pub struct FallbackMerge<P, F> {
    primary: P,
    fallback: F,
}

impl<P, F> FallbackMerge<P, F> {
    pub fn new(primary: P, fallback: F) -> Self {
        Self { primary, fallback }
    }
}

#[async_trait]
impl<P, F> ProfileMergeStrategy for FallbackMerge<P, F>
where
    P: ProfileMergeStrategy,
    F: ProfileMergeStrategy,
{
    fn name(&self) -> &str {
        self.primary.name()
    }

    async fn merge(
        &self,
        existing: &Profile,
        incoming: &Profile,
    ) -> Result<MergeOutcome, MnemosError> {
        match self.primary.merge(existing, incoming).await {
            Ok(outcome) => Ok(outcome),
            Err(e) => {
                warn!(
                    primary = self.primary.name(),
                    fallback = self.fallback.name(),
                    "profile merge strategy failed, falling back: {e}"
                );
                self.fallback.merge(existing, incoming).await
            }
        }
    }
}

/// Config-driven merge entry point.
pub struct ProfileMerger {
    strategy: Box<dyn ProfileMergeStrategy>,
}

impl ProfileMerger {
    /// LLM merge with normalized fallback when `llm_merge` is enabled and a
    /// completion model is available, simple merge otherwise.
    pub fn from_config(
        config: &ProfileConfig,
        completion: Option<Arc<dyn CompletionAdapter>>,
    ) -> Self {
        match completion {
            Some(completion) if config.llm_merge => Self::with_strategy(FallbackMerge::new(
                LlmMerge::new(completion, config.merge_temperature),
                SimpleMerge,
            )),
            _ => Self::with_strategy(SimpleMerge),
        }
    }

    pub fn with_strategy(strategy: impl ProfileMergeStrategy + 'static) -> Self {
        Self {
            strategy: Box::new(strategy),
        }
    }

    pub fn strategy_name(&self) -> &str {
        self.strategy.name()
    }

    /// Merges `incoming` into `existing`. Strategy errors degrade to the
    /// simple merge.
    pub async fn merge(&self, existing: &Profile, incoming: &Profile) -> MergeOutcome {
        match self.strategy.merge(existing, incoming).await {
            Ok(outcome) => outcome,
            Err(e) => {
                warn!(strategy = self.strategy.name(), "profile merge failed: {e}");
                merge_profiles_simple(existing, incoming)
            }
        }
    }
}
