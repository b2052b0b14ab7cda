//! Voice-search scoring over saved memories.
//!
//! Keyword extraction is deliberately generous: a CJK query contributes
//! single characters, adjacent bigrams, and whitespace tokens, and the
//! score ramp saturates once roughly half the keywords hit, so partial
//! matches still surface.

use std::cmp::Ordering;
use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;

use crate::constants::SCORE_KEYWORD_FACTOR;
use crate::memory::MemoryEntry;

static PUNCTUATION: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[^\w\s]").unwrap());

static STOP_WORDS: LazyLock<HashSet<&'static str>> = LazyLock::new(|| {
    [
        "the", "a", "an", "and", "or", "of", "to", "in", "on", "at", "is", "are", "was", "were",
        "it", "i", "you", "he", "she", "we", "they", "my", "your", "this", "that", "with", "for",
        "的", "了", "是", "在", "我", "你", "他", "她", "它", "们", "和", "有", "不", "这", "那",
        "就", "都", "也", "吗", "呢",
    ]
    .into_iter()
    .collect()
});

/// Lowercase and strip punctuation, keeping word characters (including
/// CJK ideographs) and whitespace.
pub fn normalize_query(query: &str) -> String {
    PUNCTUATION.replace_all(query, " ").to_lowercase()
}

/// Whether the text contains any CJK characters (ideographs, kana, hangul).
pub fn contains_cjk(text: &str) -> bool {
    text.chars().any(|c| {
        matches!(c,
            '\u{4e00}'..='\u{9fff}'   // CJK unified ideographs
            | '\u{3400}'..='\u{4dbf}' // extension A
            | '\u{3040}'..='\u{30ff}' // hiragana + katakana
            | '\u{ac00}'..='\u{d7af}' // hangul syllables
        )
    })
}

/// Build the deduplicated keyword set for a query.
///
/// CJK queries expand to every single character, every adjacent character
/// bigram, and every whitespace token; everything else splits on
/// whitespace. Stop words are excluded either way.
pub fn extract_keywords(query: &str) -> Vec<String> {
    let normalized = normalize_query(query);
    let mut keywords = Vec::new();
    let mut seen = HashSet::new();
    let mut push = |kw: String| {
        if !STOP_WORDS.contains(kw.as_str()) && seen.insert(kw.clone()) {
            keywords.push(kw);
        }
    };

    if contains_cjk(&normalized) {
        for run in normalized.split_whitespace() {
            let chars: Vec<char> = run.chars().collect();
            for &c in &chars {
                push(c.to_string());
            }
            for pair in chars.windows(2) {
                push(pair.iter().collect());
            }
        }
    }
    for token in normalized.split_whitespace() {
        push(token.to_string());
    }
    keywords
}

/// Score one memory against the keyword set.
///
/// Counts keywords occurring as substrings of the transcript concatenated
/// with the sentiment label, then ramps linearly so that hitting about
/// half the keywords already scores 1.0.
pub fn score_memory(memory: &MemoryEntry, keywords: &[String]) -> f32 {
    if keywords.is_empty() {
        return 0.0;
    }
    let haystack = format!(
        "{} {}",
        memory.transcript.to_lowercase(),
        memory.sentiment.as_str()
    );
    let hits = keywords.iter().filter(|k| haystack.contains(k.as_str())).count();
    let needed = (SCORE_KEYWORD_FACTOR * keywords.len() as f32).max(1.0);
    (hits as f32 / needed).min(1.0)
}

/// Re-score and re-order the memory list for a query.
///
/// Returns whether the search is active with at least one positive score,
/// the signal the layout engine keys on. An empty or all-stop-word query
/// resets every score to 0 and degrades ordering to pure recency.
pub fn apply_search(memories: &mut [MemoryEntry], query: &str) -> bool {
    let keywords = extract_keywords(query);

    if keywords.is_empty() {
        for m in memories.iter_mut() {
            m.match_score = 0.0;
        }
        sort_by_recency(memories);
        return false;
    }

    for m in memories.iter_mut() {
        m.match_score = score_memory(m, &keywords);
    }

    if memories.iter().any(|m| m.match_score > 0.0) {
        memories.sort_by(|a, b| {
            b.match_score
                .partial_cmp(&a.match_score)
                .unwrap_or(Ordering::Equal)
                .then(b.timestamp_ms.cmp(&a.timestamp_ms))
        });
        true
    } else {
        sort_by_recency(memories);
        false
    }
}

fn sort_by_recency(memories: &mut [MemoryEntry]) {
    memories.sort_by(|a, b| b.timestamp_ms.cmp(&a.timestamp_ms));
}
