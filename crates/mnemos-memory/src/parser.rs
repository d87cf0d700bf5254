// SPDX-FileCopyrightText: 2026 Mnemos Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Parser for the sectioned plain-text format extraction models answer in.
//!
//! ```text
//! ## NARRATIVE
//! CONTENT: The user planned a trip to Kyoto.
//! KEYWORDS: travel, kyoto
//!
//! ## EVENT_LOG
//! TIME: 2026-03-14
//! FACT: The user booked a flight to Osaka.
//! FACT: The user prefers window seats.
//! ```
//!
//! Sections are `## WORD` headers (any case). Inside a section, `KEY: value`
//! lines form a multimap and standalone `---` lines split topic blocks.
//! Parsing never fails: malformed input only yields fewer sections, and
//! input with no usable section yields `None`.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

const SUMMARY_FALLBACK_CHARS: usize = 200;
const MAX_EVENT_FACTS: usize = 10;
const MAX_DOCUMENT_FACTS: usize = 20;
const MAX_FORESIGHT_BLOCKS: usize = 10;

/// Narrative sources in precedence order. The first one that yields a
/// narrative wins; the others are ignored.
const NARRATIVE_SECTIONS: [&str; 3] = ["NARRATIVE", "EPISODE", "OVERVIEW"];

/// Keys recognized case-insensitively. Any other `Word:` prefix is prose.
const KNOWN_KEYS: &[&str] = &[
    "CONTENT",
    "SUMMARY",
    "KEYWORDS",
    "TIME",
    "FACT",
    "START",
    "END",
    "EVIDENCE",
    "ITEM",
    "USER_ID",
    "USER_NAME",
    "HARD_SKILLS",
    "SOFT_SKILLS",
    "WORK_RESPONSIBILITY",
    "INTERESTS",
    "TENDENCY",
];

/// Free-text keys whose value may run over several lines. List-valued keys
/// such as `FACT` and `ITEM` always end at their own line.
const MULTILINE_KEYS: &[&str] = &["CONTENT", "SUMMARY", "EVIDENCE"];

static SECTION_HEADER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^[ \t]*##[ \t]*([A-Za-z_]+)[^\n]*$").expect("valid section header regex")
});

/// Everything one extraction response yielded.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UnifiedExtraction {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub narrative: Option<NarrativeSection>,
    /// All topic blocks, only filled when there is more than one.
    /// `narrative` is then the first element.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub narratives: Vec<NarrativeSection>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event_log: Option<EventLog>,
    /// Document-sourced facts, kept apart from conversation event logs.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub document_facts: Option<DocumentFacts>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub foresight: Vec<ForesightEntry>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile: Option<ProfileSection>,
}

impl UnifiedExtraction {
    fn has_content(&self) -> bool {
        self.narrative.is_some()
            || self.event_log.as_ref().is_some_and(|e| !e.atomic_fact.is_empty())
            || self.document_facts.as_ref().is_some_and(|d| !d.facts.is_empty())
            || !self.foresight.is_empty()
            || self.profile.as_ref().is_some_and(|p| !p.user_profiles.is_empty())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NarrativeSection {
    pub content: String,
    pub summary: String,
    #[serde(default)]
    pub keywords: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventLog {
    #[serde(default)]
    pub time: Option<String>,
    pub atomic_fact: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentFacts {
    pub facts: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForesightEntry {
    pub content: String,
    #[serde(default)]
    pub start_time: Option<String>,
    #[serde(default)]
    pub end_time: Option<String>,
    #[serde(default)]
    pub evidence: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileSection {
    pub user_profiles: Vec<UserProfileRecord>,
}

impl ProfileSection {
    /// Atomic facts across all records; legacy records contribute none.
    pub fn profile_items(&self) -> Vec<String> {
        self.user_profiles
            .iter()
            .filter_map(|record| match record {
                UserProfileRecord::Atomic { items } => Some(items.iter().cloned()),
                UserProfileRecord::Legacy(_) => None,
            })
            .flatten()
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum UserProfileRecord {
    /// Current format: one atomic fact per item.
    Atomic { items: Vec<String> },
    /// Older structured format.
    Legacy(LegacyProfile),
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LegacyProfile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(default)]
    pub user_name: String,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub output_reasoning: String,
    #[serde(default)]
    pub hard_skills: Vec<String>,
    #[serde(default)]
    pub soft_skills: Vec<String>,
    #[serde(default)]
    pub work_responsibility: Vec<String>,
    #[serde(default)]
    pub interests: Vec<String>,
    #[serde(default)]
    pub tendency: Vec<String>,
}

impl LegacyProfile {
    fn is_empty(&self) -> bool {
        self.user_id.is_none()
            && self.user_name.is_empty()
            && self.summary.is_empty()
            && self.hard_skills.is_empty()
            && self.soft_skills.is_empty()
            && self.work_responsibility.is_empty()
            && self.interests.is_empty()
            && self.tendency.is_empty()
    }
}

/// Parses one extraction response. Returns `None` when no section produced
/// usable content.
pub fn parse_unified_memory(text: &str) -> Option<UnifiedExtraction> {
    let text = text.replace("\r\n", "\n").replace('\r', "\n");
    let text = text.trim();
    if text.is_empty() {
        return None;
    }

    let sections = split_sections(text);
    let mut result = UnifiedExtraction::default();

    if let Some(blocks) = NARRATIVE_SECTIONS
        .iter()
        .filter_map(|name| find_section(&sections, name))
        .map(parse_narratives)
        .find(|blocks| !blocks.is_empty())
    {
        result.narrative = blocks.first().cloned();
        if blocks.len() > 1 {
            result.narratives = blocks;
        }
    }

    result.event_log = find_section(&sections, "EVENT_LOG").and_then(parse_event_log);
    result.document_facts = find_section(&sections, "FACTS").and_then(parse_document_facts);
    result.foresight = find_section(&sections, "FORESIGHT")
        .map(parse_foresight)
        .unwrap_or_default();
    result.profile = find_section(&sections, "PROFILE").and_then(parse_profile);

    result.has_content().then_some(result)
}

/// Splits `text` into `(UPPERCASE_NAME, body)` pairs in document order.
/// Text before the first header is dropped.
fn split_sections(text: &str) -> Vec<(String, &str)> {
    let headers: Vec<(usize, usize, String)> = SECTION_HEADER
        .captures_iter(text)
        .filter_map(|caps| {
            let whole = caps.get(0)?;
            let name = caps.get(1)?.as_str().to_ascii_uppercase();
            Some((whole.start(), whole.end(), name))
        })
        .collect();

    headers
        .iter()
        .enumerate()
        .map(|(i, (_, body_start, name))| {
            let body_end = headers.get(i + 1).map_or(text.len(), |next| next.0);
            (name.clone(), &text[*body_start..body_end])
        })
        .collect()
}

/// Body of the first section called `name`; later duplicates are ignored.
fn find_section<'a>(sections: &[(String, &'a str)], name: &str) -> Option<&'a str> {
    sections
        .iter()
        .find(|(header, _)| header.as_str() == name)
        .map(|(_, body)| *body)
}

/// Splits a section body on standalone `---` lines.
fn split_blocks(body: &str) -> Vec<&str> {
    let mut blocks = Vec::new();
    let mut start = 0;
    let mut offset = 0;

    for line in body.split_inclusive('\n') {
        if is_separator(line.trim()) {
            blocks.push(&body[start..offset]);
            start = offset + line.len();
        }
        offset += line.len();
    }
    blocks.push(&body[start..]);
    blocks.retain(|block| !block.trim().is_empty());
    blocks
}

/// A line of three or more dashes.
fn is_separator(line: &str) -> bool {
    line.len() >= 3 && line.chars().all(|c| c == '-')
}

/// Ordered multimap of `KEY: value` lines.
#[derive(Debug, Default)]
struct FieldMap {
    entries: Vec<(String, String)>,
}

impl FieldMap {
    fn parse(block: &str) -> Self {
        let mut map = FieldMap::default();
        // Whether the last value still accepts continuation lines.
        let mut open = false;

        for line in block.lines() {
            let line = strip_bullet(line.trim());
            if line.is_empty() || is_separator(line) {
                open = false;
                continue;
            }
            match split_key(line) {
                Some((key, value)) => {
                    open = MULTILINE_KEYS.contains(&key.as_str());
                    map.entries.push((key, value.to_string()));
                }
                None if open => {
                    if let Some((_, value)) = map.entries.last_mut() {
                        if !value.is_empty() {
                            value.push('\n');
                        }
                        value.push_str(line);
                    }
                }
                None => {}
            }
        }

        map.entries.retain(|(_, value)| !value.is_empty());
        map
    }

    fn all(&self, key: &str) -> impl Iterator<Item = &str> {
        self.entries
            .iter()
            .filter(move |(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    fn first(&self, key: &str) -> Option<&str> {
        self.all(key).next()
    }

    fn first_owned(&self, key: &str) -> Option<String> {
        self.first(key).map(str::to_string)
    }

    /// All values for `key`, split into list items.
    fn list(&self, key: &str) -> Vec<String> {
        self.all(key).flat_map(split_list).collect()
    }
}

fn strip_bullet(line: &str) -> &str {
    ["- ", "* ", "• "]
        .iter()
        .find_map(|bullet| line.strip_prefix(bullet))
        .map_or(line, str::trim_start)
}

/// Splits `KEY: value` at the first ASCII or full-width colon.
fn split_key(line: &str) -> Option<(String, &str)> {
    let (idx, colon) = line.char_indices().find(|(_, c)| *c == ':' || *c == '：')?;
    let raw_key = line[..idx].trim();
    if raw_key.is_empty() || !raw_key.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return None;
    }

    let key = raw_key.to_ascii_uppercase();
    if !KNOWN_KEYS.contains(&key.as_str()) {
        return None;
    }
    Some((key, line[idx + colon.len_utf8()..].trim()))
}

fn split_list(value: &str) -> impl Iterator<Item = String> + '_ {
    value
        .split([',', '，', '、'])
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
}

fn parse_narratives(body: &str) -> Vec<NarrativeSection> {
    split_blocks(body)
        .into_iter()
        .filter_map(|block| parse_narrative(&FieldMap::parse(block)))
        .collect()
}

fn parse_narrative(fields: &FieldMap) -> Option<NarrativeSection> {
    let content = fields.first_owned("CONTENT")?;
    let summary = fields
        .first_owned("SUMMARY")
        .unwrap_or_else(|| content.chars().take(SUMMARY_FALLBACK_CHARS).collect());
    Some(NarrativeSection {
        summary,
        keywords: fields.list("KEYWORDS"),
        content,
    })
}

fn parse_event_log(body: &str) -> Option<EventLog> {
    let fields = FieldMap::parse(body);
    let atomic_fact: Vec<String> = fields
        .all("FACT")
        .take(MAX_EVENT_FACTS)
        .map(str::to_string)
        .collect();
    if atomic_fact.is_empty() {
        return None;
    }
    Some(EventLog {
        time: fields.first_owned("TIME"),
        atomic_fact,
    })
}

fn parse_document_facts(body: &str) -> Option<DocumentFacts> {
    let facts: Vec<String> = FieldMap::parse(body)
        .all("FACT")
        .take(MAX_DOCUMENT_FACTS)
        .map(str::to_string)
        .collect();
    (!facts.is_empty()).then_some(DocumentFacts { facts })
}

fn parse_foresight(body: &str) -> Vec<ForesightEntry> {
    split_blocks(body)
        .into_iter()
        .take(MAX_FORESIGHT_BLOCKS)
        .filter_map(|block| {
            let fields = FieldMap::parse(block);
            Some(ForesightEntry {
                content: fields.first_owned("CONTENT")?,
                start_time: fields.first_owned("START"),
                end_time: fields.first_owned("END"),
                evidence: fields.first_owned("EVIDENCE"),
            })
        })
        .collect()
}

fn parse_profile(body: &str) -> Option<ProfileSection> {
    let fields = FieldMap::parse(body);

    let items: Vec<String> = fields.all("ITEM").map(str::to_string).collect();
    if !items.is_empty() {
        return Some(ProfileSection {
            user_profiles: vec![UserProfileRecord::Atomic { items }],
        });
    }

    let summary = fields.first_owned("SUMMARY").unwrap_or_default();
    let legacy = LegacyProfile {
        user_id: fields.first_owned("USER_ID"),
        user_name: fields.first_owned("USER_NAME").unwrap_or_default(),
        output_reasoning: summary.clone(),
        summary,
        hard_skills: fields.list("HARD_SKILLS"),
        soft_skills: fields.list("SOFT_SKILLS"),
        work_responsibility: fields.list("WORK_RESPONSIBILITY"),
        interests: fields.list("INTERESTS"),
        tendency: fields.list("TENDENCY"),
    };
    (!legacy.is_empty()).then(|| ProfileSection {
        user_profiles: vec![UserProfileRecord::Legacy(legacy)],
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn event_log_facts_in_order() {
        let result = parse_unified_memory("## EVENT_LOG\nFACT: a\nFACT: b").unwrap();
        let log = result.event_log.unwrap();
        assert_eq!(log.atomic_fact, vec!["a", "b"]);
        assert!(log.time.is_none());
    }

    #[test]
    fn event_log_caps_at_ten_facts() {
        let text = format!(
            "## EVENT_LOG\nTIME: 2026-01-02\n{}",
            (1..=12).map(|i| format!("FACT: fact {i}\n")).collect::<String>()
        );
        let log = parse_unified_memory(&text).unwrap().event_log.unwrap();
        assert_eq!(log.atomic_fact.len(), 10);
        assert_eq!(log.atomic_fact[9], "fact 10");
        assert_eq!(log.time.as_deref(), Some("2026-01-02"));
    }

    #[test]
    fn facts_and_event_log_do_not_collide() {
        let text = "## EVENT_LOG\nFACT: from chat\n\n## FACTS\nFACT: from doc\nFACT: also doc";
        let result = parse_unified_memory(text).unwrap();
        assert_eq!(result.event_log.unwrap().atomic_fact, vec!["from chat"]);
        assert_eq!(result.document_facts.unwrap().facts, vec!["from doc", "also doc"]);
    }

    #[test]
    fn document_facts_alone_are_content() {
        let text = format!(
            "## FACTS\n{}",
            (0..25).map(|i| format!("FACT: f{i}\n")).collect::<String>()
        );
        let result = parse_unified_memory(&text).unwrap();
        assert!(result.event_log.is_none());
        assert_eq!(result.document_facts.unwrap().facts.len(), 20);
    }

    #[test]
    fn empty_and_contentless_inputs_are_absent() {
        assert!(parse_unified_memory("").is_none());
        assert!(parse_unified_memory("  \r\n\t ").is_none());
        assert!(parse_unified_memory("## NARRATIVE\nSUMMARY: x").is_none());
        assert!(parse_unified_memory("no headers at all\nFACT: x").is_none());
        assert!(parse_unified_memory("## EVENT_LOG\nTIME: today").is_none());
        assert!(parse_unified_memory("## UNKNOWN\nCONTENT: x").is_none());
    }

    #[test]
    fn narrative_summary_falls_back_to_content_prefix() {
        let content = "长".repeat(250);
        let result = parse_unified_memory(&format!("## NARRATIVE\nCONTENT: {content}")).unwrap();
        let narrative = result.narrative.unwrap();
        assert_eq!(narrative.summary.chars().count(), 200);
        assert!(narrative.keywords.is_empty());
        assert!(result.narratives.is_empty());
    }

    #[test]
    fn narrative_fields_and_keywords() {
        let text = "## narrative\nCONTENT: Planned a trip: Kyoto in May\nSUMMARY: Trip planning\nKEYWORDS: travel, kyoto，春天、 plans";
        let narrative = parse_unified_memory(text).unwrap().narrative.unwrap();
        assert_eq!(narrative.content, "Planned a trip: Kyoto in May");
        assert_eq!(narrative.summary, "Trip planning");
        assert_eq!(narrative.keywords, vec!["travel", "kyoto", "春天", "plans"]);
    }

    #[test]
    fn multiple_topic_blocks_fill_narratives() {
        let text = "## NARRATIVE\nCONTENT: first topic\n---\nSUMMARY: no content here\n---\nCONTENT: second topic\n";
        let result = parse_unified_memory(text).unwrap();
        assert_eq!(result.narratives.len(), 2);
        assert_eq!(result.narrative.as_ref(), result.narratives.first());
        assert_eq!(result.narratives[1].content, "second topic");
    }

    #[test]
    fn episode_is_a_narrative_alias() {
        let result = parse_unified_memory("## EPISODE\nCONTENT: legacy").unwrap();
        assert_eq!(result.narrative.unwrap().content, "legacy");
    }

    #[test]
    fn narrative_takes_precedence_over_overview() {
        let text = "## OVERVIEW\nCONTENT: from document\n\n## NARRATIVE\nCONTENT: from chat";
        let result = parse_unified_memory(text).unwrap();
        assert_eq!(result.narrative.unwrap().content, "from chat");

        let result = parse_unified_memory("## OVERVIEW\nCONTENT: from document").unwrap();
        assert_eq!(result.narrative.unwrap().content, "from document");
    }

    #[test]
    fn overview_used_when_narrative_has_no_content() {
        let text = "## NARRATIVE\nSUMMARY: empty\n## OVERVIEW\nCONTENT: doc overview";
        let result = parse_unified_memory(text).unwrap();
        assert_eq!(result.narrative.unwrap().content, "doc overview");
    }

    #[test]
    fn duplicate_section_first_wins() {
        let text = "## EVENT_LOG\nFACT: first\n## EVENT_LOG\nFACT: second";
        let log = parse_unified_memory(text).unwrap().event_log.unwrap();
        assert_eq!(log.atomic_fact, vec!["first"]);
    }

    #[test]
    fn values_keep_extra_colons_and_full_width_delimiters() {
        let text = "## EVENT_LOG\nTIME：2026-05-01 10:30\nFACT: meeting at 10:30: agenda set";
        let log = parse_unified_memory(text).unwrap().event_log.unwrap();
        assert_eq!(log.time.as_deref(), Some("2026-05-01 10:30"));
        assert_eq!(log.atomic_fact, vec!["meeting at 10:30: agenda set"]);
    }

    #[test]
    fn continuation_lines_extend_previous_value() {
        let text = "## NARRATIVE (work)\nCONTENT:\nThe user reviewed the release.\nNote: tests were green.\nKEYWORDS: release";
        let narrative = parse_unified_memory(text).unwrap().narrative.unwrap();
        assert_eq!(
            narrative.content,
            "The user reviewed the release.\nNote: tests were green."
        );
        assert_eq!(narrative.keywords, vec!["release"]);
    }

    #[test]
    fn separator_lines_never_join_facts() {
        let log = parse_unified_memory("## EVENT_LOG\nFACT: a\n---\nFACT: b")
            .unwrap()
            .event_log
            .unwrap();
        assert_eq!(log.atomic_fact, vec!["a", "b"]);

        let facts = parse_unified_memory("## FACTS\nFACT: x\n-----\nFACT: y\n---")
            .unwrap()
            .document_facts
            .unwrap();
        assert_eq!(facts.facts, vec!["x", "y"]);
    }

    #[test]
    fn trailing_prose_is_not_part_of_profile_items() {
        let text = "## PROFILE\nITEM: likes tea\n---\nITEM: owns a bike\n\nThese are all the items I found.";
        let profile = parse_unified_memory(text).unwrap().profile.unwrap();
        assert_eq!(profile.profile_items(), vec!["likes tea", "owns a bike"]);
    }

    #[test]
    fn list_keys_do_not_take_continuation_lines() {
        let text = "## EVENT_LOG\nFACT: booked a flight\nwhich was expensive\nFACT: packed bags";
        let log = parse_unified_memory(text).unwrap().event_log.unwrap();
        assert_eq!(log.atomic_fact, vec!["booked a flight", "packed bags"]);
    }

    #[test]
    fn uppercase_prose_labels_stay_inside_content() {
        let text = "## NARRATIVE\nCONTENT: Shipped the release.\nNOTE: rollback plan ready.\nSUMMARY: release";
        let narrative = parse_unified_memory(text).unwrap().narrative.unwrap();
        assert_eq!(narrative.content, "Shipped the release.\nNOTE: rollback plan ready.");
        assert_eq!(narrative.summary, "release");
    }

    #[test]
    fn blank_line_ends_multiline_content() {
        let text = "## NARRATIVE\nCONTENT: The user moved to Lisbon.\n\nLet me know if you need more.";
        let narrative = parse_unified_memory(text).unwrap().narrative.unwrap();
        assert_eq!(narrative.content, "The user moved to Lisbon.");
    }

    #[test]
    fn crlf_and_bullets_are_normalized() {
        let text = "\r\n## EVENT_LOG\r\n- FACT: a\r\n* FACT: b\r\n";
        let log = parse_unified_memory(text).unwrap().event_log.unwrap();
        assert_eq!(log.atomic_fact, vec!["a", "b"]);
    }

    #[test]
    fn header_levels_other_than_two_are_not_sections() {
        let text = "### EVENT_LOG\nFACT: a";
        assert!(parse_unified_memory(text).is_none());
    }

    #[test]
    fn foresight_caps_blocks_before_skipping_contentless_ones() {
        let mut text = String::from("## FORESIGHT\nSTART: 2026-06-01\n---\n");
        for i in 0..12 {
            text.push_str(&format!(
                "CONTENT: plan {i}\nSTART: 2026-06-01\nEND: 2026-06-30\nEVIDENCE: said so\n---\n"
            ));
        }
        let foresight = parse_unified_memory(&text).unwrap().foresight;
        assert_eq!(foresight.len(), 9);
        assert_eq!(foresight[0].content, "plan 0");
        assert_eq!(foresight[8].content, "plan 8");
        assert_eq!(foresight[0].end_time.as_deref(), Some("2026-06-30"));
        assert_eq!(foresight[0].evidence.as_deref(), Some("said so"));
    }

    #[test]
    fn foresight_keeps_at_most_ten_entries() {
        let text: String = std::iter::once("## FORESIGHT\n".to_string())
            .chain((0..12).map(|i| format!("CONTENT: plan {i}\n---\n")))
            .collect();
        let foresight = parse_unified_memory(&text).unwrap().foresight;
        assert_eq!(foresight.len(), 10);
        assert_eq!(foresight[9].content, "plan 9");
    }

    #[test]
    fn profile_items_are_verbatim() {
        let text = "## PROFILE\nITEM: 用户喜欢音乐。\nITEM: Works as a nurse\nUSER_NAME: ignored";
        let profile = parse_unified_memory(text).unwrap().profile.unwrap();
        assert_eq!(
            profile.user_profiles,
            vec![UserProfileRecord::Atomic {
                items: vec!["用户喜欢音乐。".into(), "Works as a nurse".into()]
            }]
        );
        assert_eq!(profile.profile_items().len(), 2);
    }

    #[test]
    fn legacy_profile_fields() {
        let text = "## PROFILE\nUSER_NAME: Ana\nSUMMARY: backend dev\nHARD_SKILLS: Rust, SQL\nINTERESTS: climbing、chess\nUSER_ID: u-7";
        let profile = parse_unified_memory(text).unwrap().profile.unwrap();
        let UserProfileRecord::Legacy(legacy) = &profile.user_profiles[0] else {
            panic!("expected legacy record");
        };
        assert_eq!(legacy.user_name, "Ana");
        assert_eq!(legacy.summary, "backend dev");
        assert_eq!(legacy.output_reasoning, "backend dev");
        assert_eq!(legacy.hard_skills, vec!["Rust", "SQL"]);
        assert_eq!(legacy.interests, vec!["climbing", "chess"]);
        assert_eq!(legacy.user_id.as_deref(), Some("u-7"));
        assert!(profile.profile_items().is_empty());
    }

    #[test]
    fn empty_profile_is_absent() {
        assert!(parse_unified_memory("## PROFILE\nHARD_SKILLS: ,").is_none());
    }

    #[test]
    fn serializes_with_snake_case_sections() {
        let result = parse_unified_memory("## PROFILE\nITEM: likes tea").unwrap();
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json, serde_json::json!({"profile": {"user_profiles": [{"items": ["likes tea"]}]}}));
    }
}
