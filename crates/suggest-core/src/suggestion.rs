//! Ranked suggestion output.

use std::cmp::Ordering;
use std::collections::HashMap;

/// Scale applied to `e^(-cost)` when converting a cost into a score.
pub const SCORE_SCALE: f32 = 1_000_000.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OutputType {
    /// Every input position matched its primary key.
    Exact,
    /// Reached through proximity keys, edits or a gesture trace.
    Correction,
    /// Extends past the end of the input.
    Completion,
    /// Shortcut target attached to a dictionary word.
    Shortcut,
    /// Next-word prediction from the bigram table.
    Prediction,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SuggestedWord {
    pub word: String,
    pub score: i32,
    /// Unigram probability of the dictionary word, when it has one.
    pub probability: Option<u8>,
    pub output_type: OutputType,
    /// Code-point indices of spaces inferred inside a multi-word gesture.
    pub space_indices: Vec<usize>,
    /// Trie position the suggestion came from; final tie-breaker.
    pub position: usize,
}

impl SuggestedWord {
    pub fn code_point_len(&self) -> usize {
        self.word.chars().count()
    }

    /// Best first: higher score, then shorter word, then lower trie position.
    pub fn ranking_cmp(&self, other: &Self) -> Ordering {
        other
            .score
            .cmp(&self.score)
            .then_with(|| self.code_point_len().cmp(&other.code_point_len()))
            .then_with(|| self.position.cmp(&other.position))
    }
}

/// Map an accumulated cost (lower is better) to a score (higher is better).
pub fn score_from_cost(cost: f32) -> i32 {
    (SCORE_SCALE * (-cost.max(0.0)).exp()).round() as i32
}

/// Staging area that deduplicates by word, keeping the better entry.
#[derive(Debug, Default)]
pub(crate) struct CandidateSink {
    words: Vec<SuggestedWord>,
    index: HashMap<String, usize>,
}

impl CandidateSink {
    pub fn clear(&mut self) {
        self.words.clear();
        self.index.clear();
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn offer(&mut self, candidate: SuggestedWord) {
        match self.index.get(&candidate.word) {
            Some(&i) => {
                if candidate.ranking_cmp(&self.words[i]) == Ordering::Less {
                    self.words[i] = candidate;
                }
            }
            None => {
                self.index.insert(candidate.word.clone(), self.words.len());
                self.words.push(candidate);
            }
        }
    }

    /// Sort best first and hand out at most `max` candidates.
    pub fn drain_ranked(&mut self, max: usize) -> Vec<SuggestedWord> {
        self.index.clear();
        let mut out = std::mem::take(&mut self.words);
        out.sort_by(SuggestedWord::ranking_cmp);
        out.truncate(max);
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn word(w: &str, score: i32, position: usize) -> SuggestedWord {
        SuggestedWord {
            word: w.to_string(),
            score,
            probability: None,
            output_type: OutputType::Exact,
            space_indices: Vec::new(),
            position,
        }
    }

    #[test]
    fn score_decreases_with_cost() {
        assert_eq!(score_from_cost(0.0), 1_000_000);
        assert!(score_from_cost(1.0) > score_from_cost(2.0));
        assert!(score_from_cost(50.0) >= 0);
    }

    #[test]
    fn sink_keeps_higher_score() {
        let mut sink = CandidateSink::default();
        sink.offer(word("cat", 10, 40));
        sink.offer(word("cat", 30, 50));
        sink.offer(word("cat", 20, 60));
        let out = sink.drain_ranked(10);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].score, 30);
        assert_eq!(out[0].position, 50);
    }

    #[test]
    fn ties_break_on_length_then_position() {
        let mut sink = CandidateSink::default();
        sink.offer(word("cats", 10, 1));
        sink.offer(word("cab", 10, 9));
        sink.offer(word("cat", 10, 5));
        let out = sink.drain_ranked(10);
        let words: Vec<&str> = out.iter().map(|w| w.word.as_str()).collect();
        assert_eq!(words, vec!["cat", "cab", "cats"]);
    }

    #[test]
    fn drain_truncates_to_capacity() {
        let mut sink = CandidateSink::default();
        for (i, w) in ["a", "b", "c", "d"].iter().enumerate() {
            sink.offer(word(w, i as i32, i));
        }
        let out = sink.drain_ranked(2);
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].word, "d");
        assert_eq!(sink.len(), 0);
    }
}
