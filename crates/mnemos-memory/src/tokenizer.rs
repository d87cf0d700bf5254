// SPDX-FileCopyrightText: 2026 Mnemos Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Dictionary-free, CJK-aware keyword segmentation and keyword scoring.
//!
//! Latin-script words are split on whitespace and punctuation. CJK runs have
//! no word delimiters, so they are cut into consecutive two-character chunks,
//! which approximates the dominant word length in Chinese. Token order follows
//! the source text, so joining tokens with `%` still matches it as a `LIKE` pattern.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RunKind {
    Word,
    Cjk,
}

/// Returns true for CJK ideographs, kana and hangul syllables.
pub fn is_cjk(c: char) -> bool {
    matches!(c,
        '\u{4E00}'..='\u{9FFF}'
        | '\u{3400}'..='\u{4DBF}'
        | '\u{20000}'..='\u{2A6DF}'
        | '\u{F900}'..='\u{FAFF}'
        | '\u{3040}'..='\u{30FF}'
        | '\u{AC00}'..='\u{D7AF}'
    )
}

/// Returns true for CJK and full-width punctuation (`。`, `，`, `「`, `！`, ...).
pub fn is_cjk_punctuation(c: char) -> bool {
    matches!(c,
        '\u{3000}'..='\u{303F}'
        | '\u{FF01}'..='\u{FF0F}'
        | '\u{FF1A}'..='\u{FF20}'
        | '\u{FF3B}'..='\u{FF40}'
        | '\u{FF5B}'..='\u{FF65}'
        | '\u{2010}'..='\u{2027}'
        | '\u{FE30}'..='\u{FE4F}'
    )
}

/// Splits `text` into lowercase search tokens. Never returns empty tokens.
pub fn tokenize(text: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut run = String::new();
    let mut kind: Option<RunKind> = None;

    for c in text.chars().flat_map(char::to_lowercase) {
        let next = if is_cjk(c) {
            Some(RunKind::Cjk)
        } else if c.is_alphanumeric() {
            Some(RunKind::Word)
        } else {
            None
        };

        if next != kind {
            flush_run(&mut run, kind, &mut tokens);
            kind = next;
        }
        if next.is_some() {
            run.push(c);
        }
    }
    flush_run(&mut run, kind, &mut tokens);

    tokens
}

fn flush_run(run: &mut String, kind: Option<RunKind>, tokens: &mut Vec<String>) {
    match kind {
        Some(RunKind::Word) if !run.is_empty() => tokens.push(std::mem::take(run)),
        Some(RunKind::Cjk) => {
            let chars: Vec<char> = run.chars().collect();
            tokens.extend(chars.chunks(2).map(|chunk| chunk.iter().collect::<String>()));
            run.clear();
        }
        _ => run.clear(),
    }
}

/// Density score for one keyword candidate.
///
/// `hits` counts every case-insensitive occurrence of every token; a verbatim
/// occurrence of the whole (lowercased) query adds `exact_bonus`. Dividing by
/// the content length favours short, focused records over long ones that
/// mention the keyword once.
pub fn keyword_score(
    content: &str,
    query_lower: &str,
    tokens: &[String],
    exact_bonus: f32,
    density_scale: f32,
) -> f32 {
    let lower = content.to_lowercase();
    let hits: usize = tokens.iter().map(|t| lower.matches(t.as_str()).count()).sum();
    let exact = if !query_lower.is_empty() && lower.contains(query_lower) {
        exact_bonus
    } else {
        0.0
    };
    let length = content.chars().count().max(1);
    exact + (hits as f32 / length as f32) * density_scale
}
