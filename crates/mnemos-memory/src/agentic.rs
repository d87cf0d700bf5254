// SPDX-FileCopyrightText: 2026 Mnemos Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! LLM-judged retrieval: sufficiency checks, refined follow-up queries,
//! LLM query expansion, and the iterative refinement loop built on them.
//!
//! Every model call here degrades instead of failing. A judge that cannot be
//! understood counts as "sufficient" so a broken model never causes endless
//! retries.

use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use mnemos_config::AgenticConfig;
use mnemos_core::error::MnemosError;
use mnemos_core::traits::{CompletionAdapter, PluginAdapter, QueryExpander};
use mnemos_core::types::{AdapterType, CompletionRequest, HealthStatus};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::fusion::reciprocal_rank_fusion_many;
use crate::json::parse_llm_json;
use crate::retriever::RetrievalManager;
use crate::types::{RetrieveRequest, SearchResult};

/// Refined queries shorter than this many characters are dropped.
const MIN_REFINED_QUERY_CHARS: usize = 3;

/// Longest document excerpt shown to the judge.
const JUDGE_EXCERPT_CHARS: usize = 500;

const SUFFICIENCY_PROMPT: &str = r#"You judge whether retrieved memories answer a question.

Question: {query}

Retrieved documents:
{documents}

Do these documents contain enough information to answer the question?
Respond with JSON only:
{"is_sufficient": true or false, "reasoning": "short explanation", "missing_information": ["what is still missing", ...]}"#;

const REFINE_PROMPT: &str = r#"A search for the question below did not find enough information.

Original question: {query}

What was found:
{documents}

Missing information:
{missing}

Write 2-3 new search queries that target the missing information. Each query must differ from the original question.
Respond with JSON only:
{"queries": ["query", ...]}"#;

const EXPANSION_PROMPT: &str = r#"Rewrite the search query below into 2-4 short, specific sub-queries that together cover what the user is asking for.

Query: {query}

Respond with JSON only:
{"queries": ["sub-query", ...]}"#;

/// The judge's answer to "do these results answer the query?".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SufficiencyVerdict {
    pub is_sufficient: bool,
    #[serde(default)]
    pub reasoning: Option<String>,
    #[serde(default)]
    pub missing_information: Vec<String>,
}

impl SufficiencyVerdict {
    fn assume_sufficient(reason: &str) -> Self {
        Self {
            is_sufficient: true,
            reasoning: Some(reason.to_string()),
            missing_information: vec![],
        }
    }
}

/// Asks `completion` whether the top results answer `query`.
///
/// Shows at most `sufficiency_top_n` results. Completion failures and
/// unparsable answers yield `is_sufficient = true`. An empty result list is
/// judged insufficient without calling the model.
pub async fn check_sufficiency(
    query: &str,
    results: &[SearchResult],
    completion: &dyn CompletionAdapter,
    config: &AgenticConfig,
) -> SufficiencyVerdict {
    if results.is_empty() {
        return SufficiencyVerdict {
            is_sufficient: false,
            reasoning: Some("no results".to_string()),
            missing_information: vec![query.to_string()],
        };
    }

    let prompt = SUFFICIENCY_PROMPT
        .replace("{query}", query)
        .replace("{documents}", &format_documents(results, config.sufficiency_top_n));
    let request = CompletionRequest::new(prompt)
        .json()
        .with_temperature(config.judge_temperature);

    let response = match completion.complete(request).await {
        Ok(response) => response,
        Err(e) => {
            warn!("sufficiency check failed, assuming sufficient: {e}");
            return SufficiencyVerdict::assume_sufficient("judge unavailable");
        }
    };

    match parse_llm_json::<SufficiencyVerdict>(&response.content) {
        Ok(mut verdict) => {
            verdict.missing_information.retain(|m| !m.trim().is_empty());
            debug!(
                is_sufficient = verdict.is_sufficient,
                missing = verdict.missing_information.len(),
                "sufficiency judged"
            );
            verdict
        }
        Err(e) => {
            warn!("unparsable sufficiency verdict, assuming sufficient: {e}");
            SufficiencyVerdict::assume_sufficient("unparsable judge response")
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum QueryList {
    Wrapped { queries: Vec<String> },
    Bare(Vec<String>),
}

impl QueryList {
    fn into_queries(self) -> Vec<String> {
        match self {
            QueryList::Wrapped { queries } | QueryList::Bare(queries) => queries,
        }
    }
}

/// Asks `completion` for follow-up queries aimed at `missing_info`.
///
/// Drops empty, too-short and repeated queries and any that equal the
/// original (ignoring case), then caps the list at `max_refined_queries`.
/// Returns `[original_query]` when nothing usable remains or the model fails.
pub async fn generate_refined_queries(
    original_query: &str,
    results: &[SearchResult],
    missing_info: &[String],
    completion: &dyn CompletionAdapter,
    config: &AgenticConfig,
) -> Vec<String> {
    let missing = if missing_info.is_empty() {
        "- (not specified)".to_string()
    } else {
        missing_info
            .iter()
            .map(|m| format!("- {m}"))
            .collect::<Vec<_>>()
            .join("\n")
    };
    let prompt = REFINE_PROMPT
        .replace("{query}", original_query)
        .replace("{documents}", &format_documents(results, config.sufficiency_top_n))
        .replace("{missing}", &missing);
    let request = CompletionRequest::new(prompt)
        .json()
        .with_temperature(config.judge_temperature);

    let candidates = match completion.complete(request).await {
        Ok(response) => match parse_llm_json::<QueryList>(&response.content) {
            Ok(list) => list.into_queries(),
            Err(e) => {
                warn!("unparsable refined queries: {e}");
                vec![]
            }
        },
        Err(e) => {
            warn!("refined query generation failed: {e}");
            vec![]
        }
    };

    let queries = filter_queries(original_query, candidates, config.max_refined_queries);
    if queries.is_empty() {
        debug!("no usable refined queries, reusing the original");
        return vec![original_query.to_string()];
    }
    queries
}

fn filter_queries(original: &str, candidates: Vec<String>, cap: usize) -> Vec<String> {
    let original = original.trim().to_lowercase();
    let mut seen = HashSet::new();

    candidates
        .into_iter()
        .map(|q| q.trim().to_string())
        .filter(|q| q.chars().count() >= MIN_REFINED_QUERY_CHARS)
        .filter(|q| {
            let key = q.to_lowercase();
            key != original && seen.insert(key)
        })
        .take(cap)
        .collect()
}

/// Numbered document list with scores, for judge prompts.
fn format_documents(results: &[SearchResult], top_n: usize) -> String {
    if results.is_empty() {
        return "(none)".to_string();
    }
    results
        .iter()
        .take(top_n)
        .enumerate()
        .map(|(i, r)| {
            let excerpt: String = r.content.chars().take(JUDGE_EXCERPT_CHARS).collect();
            format!("[{}] (relevance {:.4}) {}", i + 1, r.score, excerpt)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// `QueryExpander` backed by a completion model.
///
/// The original query is always the first sub-query. Output that does not
/// parse yields an empty list, which the retrieval manager treats as "search
/// the original query only".
pub struct LlmQueryExpander {
    completion: Arc<dyn CompletionAdapter>,
    temperature: f32,
    max_queries: usize,
}

impl LlmQueryExpander {
    pub fn new(completion: Arc<dyn CompletionAdapter>) -> Self {
        Self {
            completion,
            temperature: 0.3,
            max_queries: 4,
        }
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_max_queries(mut self, max_queries: usize) -> Self {
        self.max_queries = max_queries.max(1);
        self
    }
}

#[async_trait]
impl PluginAdapter for LlmQueryExpander {
    fn name(&self) -> &str {
        "llm-query-expander"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::QueryExpansion
    }

    async fn health_check(&self) -> Result<HealthStatus, MnemosError> {
        self.completion.health_check().await
    }
}

#[async_trait]
impl QueryExpander for LlmQueryExpander {
    async fn expand_query(&self, query: &str) -> Result<Vec<String>, MnemosError> {
        let request = CompletionRequest::new(EXPANSION_PROMPT.replace("{query}", query))
            .json()
            .with_temperature(self.temperature);
        let response = self.completion.complete(request).await?;

        let candidates = match parse_llm_json::<QueryList>(&response.content) {
            Ok(list) => list.into_queries(),
            Err(e) => {
                debug!("unparsable expansion response: {e}");
                return Ok(vec![]);
            }
        };

        let mut queries = vec![query.trim().to_string()];
        queries.extend(filter_queries(
            query,
            candidates,
            self.max_queries.saturating_sub(1),
        ));
        Ok(queries)
    }
}

/// One pass of the refinement loop.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RefinementRound {
    pub round: usize,
    pub verdict: SufficiencyVerdict,
    /// Follow-up queries searched in this round. Empty when the results were
    /// judged sufficient.
    pub queries: Vec<String>,
}

/// Results of `retrieve_with_refinement` plus the rounds that produced them.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RefinedRetrieval {
    pub results: Vec<SearchResult>,
    pub rounds: Vec<RefinementRound>,
    pub judged_sufficient: bool,
}

impl RetrievalManager {
    /// Retrieves, then repeatedly asks `completion` whether the results are
    /// enough and searches refined queries until they are or
    /// `max_rounds` is exhausted.
    ///
    /// Each round fuses the current results with one hybrid search per
    /// refined query. The loop also stops when the model offers nothing
    /// beyond the original query.
    pub async fn retrieve_with_refinement(
        &self,
        request: &RetrieveRequest,
        completion: &dyn CompletionAdapter,
        config: &AgenticConfig,
    ) -> Result<RefinedRetrieval, MnemosError> {
        let limit = self.limit_for(request);
        let mut results = self.retrieve(request).await?;
        let mut rounds = Vec::new();
        let mut judged_sufficient = false;

        for round in 1..=config.max_rounds {
            let verdict = check_sufficiency(&request.query, &results, completion, config).await;
            if verdict.is_sufficient {
                judged_sufficient = true;
                rounds.push(RefinementRound {
                    round,
                    verdict,
                    queries: vec![],
                });
                break;
            }

            let queries = generate_refined_queries(
                &request.query,
                &results,
                &verdict.missing_information,
                completion,
                config,
            )
            .await;
            let nothing_new = queries.len() == 1 && queries[0] == request.query;
            debug!(round, queries = ?queries, "refining retrieval");

            if !nothing_new {
                let mut lists = vec![results];
                lists.extend(self.search_sub_queries(request, &queries).await?);
                results = reciprocal_rank_fusion_many(&lists, self.config().rrf_k);
                results.truncate(limit);
            }

            rounds.push(RefinementRound {
                round,
                verdict,
                queries,
            });
            if nothing_new {
                break;
            }
        }

        Ok(RefinedRetrieval {
            results,
            rounds,
            judged_sufficient,
        })
    }
}
