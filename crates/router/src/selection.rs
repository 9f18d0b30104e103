use std::collections::HashSet;

use chrono::{DateTime, Duration, Utc};
use once_cell::sync::Lazy;
use rapidfuzz::fuzz;
use regex::Regex;
use serde::{Deserialize, Serialize};

static WORD: Lazy<Regex> = Lazy::new(|| Regex::new(r"\w+").expect("static word regex"));

/// Score a candidate must strictly exceed to be accepted.
pub const ACCEPT_THRESHOLD: f64 = 80.0;
/// Added to the similarity score when message and title share a word.
pub const OVERLAP_BONUS: f64 = 20.0;

/// One restaurant search result the user may pick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    pub title: String,
    pub address: String,
    pub link: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
}

/// The session's single selection slot: the latest search results and,
/// once resolved, the chosen one.
#[derive(Debug, Clone)]
pub struct PendingSelection {
    candidates: Vec<Candidate>,
    opened_at: DateTime<Utc>,
    chosen: Option<Candidate>,
}

impl PendingSelection {
    pub fn open(candidates: Vec<Candidate>, now: DateTime<Utc>) -> Self {
        Self { candidates, opened_at: now, chosen: None }
    }

    pub fn candidates(&self) -> &[Candidate] {
        &self.candidates
    }

    pub fn chosen(&self) -> Option<&Candidate> {
        self.chosen.as_ref()
    }

    pub fn is_resolved(&self) -> bool {
        self.chosen.is_some()
    }

    /// Unresolved selections stop accepting picks once `ttl` has elapsed.
    pub fn is_expired(&self, now: DateTime<Utc>, ttl: Duration) -> bool {
        !self.is_resolved() && now - self.opened_at > ttl
    }

    pub fn choose(&mut self, index: usize) -> Option<Candidate> {
        let candidate = self.candidates.get(index)?.clone();
        self.chosen = Some(candidate.clone());
        Some(candidate)
    }
}

/// Picks a candidate out of free text by word overlap plus token-sorted
/// string similarity.
#[derive(Debug, Clone)]
pub struct FuzzySelectionResolver {
    threshold: f64,
    overlap_bonus: f64,
}

impl FuzzySelectionResolver {
    pub fn new() -> Self {
        Self { threshold: ACCEPT_THRESHOLD, overlap_bonus: OVERLAP_BONUS }
    }

    /// Index of the best-scoring candidate, if its score beats the threshold.
    /// Ties keep the earliest candidate.
    pub fn resolve(&self, message: &str, candidates: &[Candidate]) -> Option<usize> {
        let message = message.to_lowercase();
        let words = word_set(&message);

        let mut best_score = 0.0;
        let mut best_idx = None;
        for (idx, candidate) in candidates.iter().enumerate() {
            let title = candidate.title.to_lowercase();
            let mut score = token_sort_ratio(&message, &title);
            if !words.is_disjoint(&word_set(&title)) {
                score += self.overlap_bonus;
            }
            if score > best_score {
                best_score = score;
                best_idx = Some(idx);
            }
        }

        tracing::debug!(best_score, ?best_idx, "selection scored");
        best_idx.filter(|_| best_score > self.threshold)
    }
}

impl Default for FuzzySelectionResolver {
    fn default() -> Self {
        Self::new()
    }
}

fn word_set(text: &str) -> HashSet<&str> {
    WORD.find_iter(text).map(|m| m.as_str()).collect()
}

/// Similarity in 0..=100 of the two strings after sorting their
/// whitespace-separated tokens, so word order does not matter.
pub fn token_sort_ratio(a: &str, b: &str) -> f64 {
    let (a, b) = (sorted_tokens(a), sorted_tokens(b));
    fuzz::ratio(a.chars(), b.chars()) * 100.0
}

fn sorted_tokens(text: &str) -> String {
    let mut tokens: Vec<&str> = text.split_whitespace().collect();
    tokens.sort_unstable();
    tokens.join(" ")
}
