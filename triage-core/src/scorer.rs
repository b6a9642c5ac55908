//! Lexicon-based relevance scoring.
//!
//! `score = (matches / tokens) * (1 + min(tokens / saturation, 1))`, where
//! `matches` weighs topical and affect lexicon hits and, once anything has
//! matched, first-person pronouns. Texts below the token floor and texts with
//! no lexicon hit score 0, which the ranker reads as "irrelevant".
//!
//! This is the study's working heuristic, not a validated metric.

use std::collections::{BTreeSet, HashSet};

use triage_common::ScorerConfig;

use crate::lexicon::Lexicons;
use crate::record::Record;
use crate::tokenize;

/// Intermediate counts behind a score.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ScoreBreakdown {
    pub tokens: usize,
    pub topical_hits: usize,
    pub affect_hits: usize,
    pub pronoun_hits: usize,
    pub score: f64,
}

/// Scores text against the loaded lexicons.
#[derive(Debug, Clone)]
pub struct RelevanceScorer {
    lexicons: Lexicons,
    pronouns: HashSet<String>,
    config: ScorerConfig,
}

impl RelevanceScorer {
    pub fn new(lexicons: Lexicons, config: &ScorerConfig) -> Self {
        let pronouns = config.pronouns.iter().map(|p| p.to_lowercase()).collect();
        Self {
            lexicons,
            pronouns,
            config: config.clone(),
        }
    }

    pub fn lexicons(&self) -> &Lexicons {
        &self.lexicons
    }

    /// Relevance of `text`; 0 means irrelevant.
    pub fn score(&self, text: &str) -> f64 {
        self.breakdown(text).score
    }

    /// Score with the counts that produced it.
    pub fn breakdown(&self, text: &str) -> ScoreBreakdown {
        let words = tokenize::tokens(text);
        let mut breakdown = ScoreBreakdown {
            tokens: words.len(),
            ..ScoreBreakdown::default()
        };
        if words.len() < self.config.min_tokens {
            return breakdown;
        }

        for word in &words {
            if self.lexicons.topical.contains(word) {
                breakdown.topical_hits += 1;
            }
            if self.lexicons.affect.contains(word) {
                breakdown.affect_hits += 1;
            }
            if self.pronouns.contains(word) {
                breakdown.pronoun_hits += 1;
            }
        }

        let lexicon_matches = self.config.topical_weight * breakdown.topical_hits as f64
            + self.config.affect_weight * breakdown.affect_hits as f64;
        if lexicon_matches == 0.0 {
            return breakdown;
        }

        let matches = lexicon_matches + self.config.pronoun_weight * breakdown.pronoun_hits as f64;
        let token_count = words.len() as f64;
        let length_factor = (token_count / self.config.length_saturation as f64).min(1.0);
        breakdown.score = (matches / token_count) * (1.0 + length_factor);
        breakdown
    }

    /// A scored copy of `record`.
    pub fn score_record(&self, record: Record) -> Record {
        let score = self.score(&record.body);
        record.with_score(score)
    }

    /// Distinct lexicon terms appearing in `text`, sorted.
    pub fn matched_terms(&self, text: &str) -> BTreeSet<String> {
        tokenize::tokens(text)
            .into_iter()
            .filter(|w| self.lexicons.topical.contains(w) || self.lexicons.affect.contains(w))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexicon::Lexicon;

    fn scorer() -> RelevanceScorer {
        let lexicons = Lexicons::new(
            Lexicon::from_terms("topical", ["anxious", "depression"]),
            Lexicon::from_terms("affect", ["sad", "lonely"]),
        );
        RelevanceScorer::new(lexicons, &ScorerConfig::default())
    }

    fn assert_close(a: f64, b: f64) {
        assert!((a - b).abs() < 1e-12, "{a} != {b}");
    }

    #[test]
    fn test_worked_example() {
        let b = scorer().breakdown("i am anxious and sad today because work");
        assert_eq!(b.tokens, 8);
        assert_eq!(b.topical_hits, 1);
        assert_eq!(b.affect_hits, 1);
        assert_eq!(b.pronoun_hits, 1);
        assert_close(b.score, 0.54);
    }

    #[test]
    fn test_empty_and_short_texts_score_zero() {
        let s = scorer();
        assert_eq!(s.score(""), 0.0);
        assert_eq!(s.score("anxious sad lonely depression"), 0.0);
    }

    #[test]
    fn test_no_lexicon_hit_scores_zero_even_with_pronouns() {
        let s = scorer();
        assert_eq!(s.score("i me myself and mine went to the shop"), 0.0);
        let long = "word ".repeat(500);
        assert_eq!(s.score(&long), 0.0);
    }

    #[test]
    fn test_case_invariant() {
        let s = scorer();
        assert_close(
            s.score("I AM ANXIOUS and SAD today because work"),
            s.score("i am anxious and sad today because work"),
        );
    }

    #[test]
    fn test_length_bonus_saturates() {
        let s = scorer();
        let text = format!("anxious {}", "filler ".repeat(199));
        let b = s.breakdown(&text);
        assert_eq!(b.tokens, 200);
        assert_close(b.score, (2.0 / 200.0) * 2.0);
    }

    #[test]
    fn test_matched_terms() {
        let terms = scorer().matched_terms("Sad and lonely, so SAD. Anxious too.");
        let terms: Vec<_> = terms.into_iter().collect();
        assert_eq!(terms, vec!["anxious", "lonely", "sad"]);
    }

    #[test]
    fn test_score_record_attaches_score() {
        let record = Record::new("p1", "a", "s", "i am anxious and sad today because work");
        let scored = scorer().score_record(record);
        assert_close(scored.score.unwrap(), 0.54);
    }
}
