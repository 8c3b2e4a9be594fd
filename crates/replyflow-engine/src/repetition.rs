// SPDX-FileCopyrightText: 2026 Replyflow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Anti-repetition phrase extraction.
//!
//! Two sources feed the avoid list: openers extracted from persisted recent
//! replies, and openers produced within the current batch run (so two
//! replies in the same run never open identically even before either is
//! persisted).

use std::collections::VecDeque;
use std::sync::LazyLock;

use regex::Regex;
use tokio::sync::Mutex;

/// Maximum phrases returned from the persisted history.
pub const MAX_AVOID_PHRASES: usize = 15;

/// Maximum openers retained from the current run; oldest pruned first.
pub const MAX_RUN_PHRASES: usize = 20;

static OPENER_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"(?i)^thank you (?:so much )?for [\w' ]{1,30}",
        r"(?i)^thanks (?:so much )?for [\w' ]{1,30}",
        r"(?i)^we appreciate [\w' ]{1,30}",
        r"(?i)^we're (?:glad|happy|sorry|delighted) [\w' ]{1,30}",
        r"(?i)^it was (?:a pleasure|great|wonderful) [\w' ]{1,30}",
    ]
    .iter()
    .map(|p| Regex::new(p).unwrap_or_else(|e| panic!("bad opener pattern {p}: {e}")))
    .collect()
});

/// The first `n` whitespace-separated words of `text`, lowercased.
pub fn opening_words(text: &str, n: usize) -> String {
    text.split_whitespace()
        .take(n)
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Extract avoid phrases from recent replies, newest first.
///
/// For each reply: its first 4 and first 6 words plus any common-opener
/// pattern matches. Deduplicated case-insensitively, capped, ordered by
/// recency.
pub fn extract_avoid_phrases(recent_replies: &[String]) -> Vec<String> {
    let mut phrases = Vec::new();
    for reply in recent_replies {
        let trimmed = reply.trim();
        if trimmed.is_empty() {
            continue;
        }
        for n in [4, 6] {
            let opener = opening_words(trimmed, n);
            if !opener.is_empty() && !phrases.contains(&opener) {
                phrases.push(opener);
            }
        }
        for pattern in OPENER_PATTERNS.iter() {
            if let Some(m) = pattern.find(trimmed) {
                let matched = m.as_str().trim().to_lowercase();
                if !phrases.contains(&matched) {
                    phrases.push(matched);
                }
            }
        }
        if phrases.len() >= MAX_AVOID_PHRASES {
            break;
        }
    }
    phrases.truncate(MAX_AVOID_PHRASES);
    phrases
}

/// Openers accumulated within a single batch run.
///
/// Shared across concurrent generation tasks in a batch, so access is
/// serialized through a mutex.
#[derive(Default)]
pub struct RunPhraseSet {
    phrases: Mutex<VecDeque<String>>,
}

impl RunPhraseSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the opener of a freshly generated reply.
    pub async fn record(&self, reply_text: &str) {
        let opener = opening_words(reply_text.trim(), 4);
        if opener.is_empty() {
            return;
        }
        let mut phrases = self.phrases.lock().await;
        if phrases.contains(&opener) {
            return;
        }
        if phrases.len() == MAX_RUN_PHRASES {
            phrases.pop_front();
        }
        phrases.push_back(opener);
    }

    /// The persisted avoid list unioned with this run's accumulated openers.
    pub async fn merged_with(&self, persisted: &[String]) -> Vec<String> {
        let phrases = self.phrases.lock().await;
        let mut merged: Vec<String> = persisted.to_vec();
        for phrase in phrases.iter() {
            if !merged.contains(phrase) {
                merged.push(phrase.clone());
            }
        }
        merged
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_openers_and_pattern_matches() {
        let replies = vec![
            "Thank you for stopping by our shop, Maria! We loved having you.".to_string(),
        ];
        let phrases = extract_avoid_phrases(&replies);
        assert!(phrases.contains(&"thank you for stopping".to_string()));
        assert!(phrases.contains(&"thank you for stopping by our".to_string()));
        // Pattern match runs past the fixed word counts.
        assert!(phrases.iter().any(|p| p.starts_with("thank you for stopping by our shop")));
    }

    #[test]
    fn deduplicates_and_caps() {
        let replies: Vec<String> = (0..30)
            .map(|i| format!("Reply number {i} opens differently every single time here"))
            .collect();
        let phrases = extract_avoid_phrases(&replies);
        assert!(phrases.len() <= MAX_AVOID_PHRASES);

        let identical = vec!["Same opener every time".to_string(); 5];
        let phrases = extract_avoid_phrases(&identical);
        assert_eq!(phrases.len(), 1);
    }

    #[test]
    fn empty_replies_are_skipped() {
        let replies = vec![String::new(), "   ".to_string()];
        assert!(extract_avoid_phrases(&replies).is_empty());
    }

    #[tokio::test]
    async fn run_set_unions_and_prunes_oldest() {
        let set = RunPhraseSet::new();
        for i in 0..MAX_RUN_PHRASES + 3 {
            set.record(&format!("Opener variant number {i} for this reply"))
                .await;
        }
        let merged = set.merged_with(&["persisted opener".to_string()]).await;
        assert_eq!(merged.len(), 1 + MAX_RUN_PHRASES);
        assert_eq!(merged[0], "persisted opener");
        // Oldest three were pruned.
        assert!(!merged.contains(&"opener variant number 0".to_string()));
        assert!(merged.contains(&format!(
            "opener variant number {}",
            MAX_RUN_PHRASES + 2
        )));
    }

    #[tokio::test]
    async fn run_set_ignores_duplicate_openers() {
        let set = RunPhraseSet::new();
        set.record("Thanks again for the visit today").await;
        set.record("Thanks again for the visit yesterday").await;
        let merged = set.merged_with(&[]).await;
        assert_eq!(merged, vec!["thanks again for the".to_string()]);
    }
}
