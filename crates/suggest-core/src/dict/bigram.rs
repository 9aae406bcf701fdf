//! Word-pair statistics stored on terminal char groups.
//!
//! A terminal flagged `HAS_BIGRAMS` carries a list of attributes, each a
//! relative pointer to the following word's terminal group plus a 4-bit
//! strength. A list is always exhausted in a single forward scan.

use std::collections::HashMap;

use tracing::{debug, debug_span, warn};

use super::format::{
    read_attribute_address, CharGroup, FLAG_ATTRIBUTE_HAS_NEXT, MASK_ATTRIBUTE_PROBABILITY,
    MAX_BIGRAM_STRENGTH, MAX_PROBABILITY,
};
use super::resolver::{resolve, word_at};
use super::FormatError;
use crate::suggestion::{CandidateSink, OutputType, SuggestedWord};
use crate::unicode::to_lower;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BigramEntry {
    /// Position of the following word's terminal group.
    pub target: usize,
    /// Association strength, 0..=15.
    pub strength: u8,
}

/// Combine a unigram probability with a bigram strength.
///
/// The range `[unigram, 255]` is split into 16.5 steps and the strength
/// selects how many of them to climb, so any bigram outranks the bare unigram.
pub fn bigram_probability(unigram: u8, strength: u8) -> u8 {
    let strength = strength.min(MAX_BIGRAM_STRENGTH);
    let step = (MAX_PROBABILITY - unigram) as f32 / (1.5 + MAX_BIGRAM_STRENGTH as f32);
    let boosted = unigram as f32 + (strength as f32 + 1.0) * step;
    boosted.min(MAX_PROBABILITY as f32) as u8
}

/// Iterator over one bigram list.
pub struct BigramIter<'b> {
    buf: &'b [u8],
    pos: Option<usize>,
}

impl Iterator for BigramIter<'_> {
    type Item = Result<BigramEntry, FormatError>;

    fn next(&mut self) -> Option<Self::Item> {
        let pos = self.pos?;
        match read_attribute_address(self.buf, pos) {
            Ok((attr, target, next)) => {
                self.pos = (attr & FLAG_ATTRIBUTE_HAS_NEXT != 0).then_some(next);
                Some(Ok(BigramEntry {
                    target,
                    strength: attr & MASK_ATTRIBUTE_PROBABILITY,
                }))
            }
            Err(e) => {
                self.pos = None;
                Some(Err(e))
            }
        }
    }
}

/// Read-only view of the bigram lists of one dictionary blob.
#[derive(Debug, Clone, Copy)]
pub struct BigramTable<'a> {
    buf: &'a [u8],
    root: usize,
}

impl<'a> BigramTable<'a> {
    pub fn new(buf: &'a [u8], root: usize) -> Self {
        Self { buf, root }
    }

    /// Iterate the bigram list starting at `list_pos`.
    pub fn entries_at(&self, list_pos: usize) -> BigramIter<'a> {
        BigramIter {
            buf: self.buf,
            pos: Some(list_pos),
        }
    }

    /// Bigram list of the terminal group at `terminal`, if it has one.
    pub fn list_for_terminal(&self, terminal: usize) -> Result<Option<usize>, FormatError> {
        let group = CharGroup::read(self.buf, terminal)?;
        Ok(group.bigrams)
    }

    /// Bigram list for `word`: exact case first, then lowercased.
    pub fn list_for_word(&self, word: &[char]) -> Result<Option<usize>, FormatError> {
        let pos = match resolve(self.buf, self.root, word, false)? {
            Some(pos) => Some(pos),
            None => resolve(self.buf, self.root, word, true)?,
        };
        match pos {
            Some(pos) => self.list_for_terminal(pos),
            None => Ok(None),
        }
    }

    /// All entries following `word`, in stored order.
    pub fn lookup(&self, word: &[char]) -> Vec<BigramEntry> {
        if word.is_empty() {
            return Vec::new();
        }
        let _span = debug_span!("bigram_lookup", len = word.len()).entered();
        let mut out = Vec::new();
        if let Err(e) = self.collect_entries(word, |entry| out.push(entry)) {
            warn!(error = %e, "malformed bigram list");
            out.clear();
        }
        out
    }

    /// Fill `out` with `target → strength` for the word preceding a search.
    pub fn strengths(&self, word: &[char], out: &mut HashMap<usize, u8>) {
        out.clear();
        if word.is_empty() {
            return;
        }
        if let Err(e) = self.collect_entries(word, |entry| {
            out.entry(entry.target)
                .and_modify(|s| *s = (*s).max(entry.strength))
                .or_insert(entry.strength);
        }) {
            warn!(error = %e, "malformed bigram list for previous word");
            out.clear();
        }
    }

    fn collect_entries(
        &self,
        word: &[char],
        mut f: impl FnMut(BigramEntry),
    ) -> Result<(), FormatError> {
        let Some(list) = self.list_for_word(word)? else {
            return Ok(());
        };
        for entry in self.entries_at(list) {
            let entry = entry?;
            if entry.target < self.root {
                return Err(FormatError::InvalidAttribute {
                    offset: entry.target,
                });
            }
            f(entry);
        }
        Ok(())
    }

    /// Whether `second` directly follows `first` in the bigram table.
    ///
    /// Asymmetric: `(a, b)` being valid says nothing about `(b, a)`.
    pub fn is_valid_bigram(&self, first: &[char], second: &[char]) -> bool {
        if first.is_empty() || second.is_empty() {
            return false;
        }
        let _span = debug_span!("is_valid_bigram").entered();
        self.find_bigram(first, second).unwrap_or_else(|e| {
            warn!(error = %e, "malformed dictionary while checking bigram");
            false
        })
    }

    fn find_bigram(&self, first: &[char], second: &[char]) -> Result<bool, FormatError> {
        let Some(first_pos) = resolve(self.buf, self.root, first, false)? else {
            return Ok(false);
        };
        let Some(list) = self.list_for_terminal(first_pos)? else {
            return Ok(false);
        };
        let Some(second_pos) = resolve(self.buf, self.root, second, false)? else {
            return Ok(false);
        };
        for entry in self.entries_at(list) {
            if entry?.target == second_pos {
                return Ok(true);
            }
        }
        Ok(false)
    }

    /// Next-word predictions after `word`.
    ///
    /// When `prefix` is non-empty, only words whose first code point matches
    /// one of its entries (ignoring case) are kept.
    pub fn predictions(&self, word: &[char], prefix: &[char], max: usize) -> Vec<SuggestedWord> {
        if word.is_empty() || max == 0 {
            return Vec::new();
        }
        let _span = debug_span!("bigram_predictions", len = word.len(), max).entered();
        let mut sink = CandidateSink::default();
        let mut chars = Vec::new();
        for entry in self.lookup(word) {
            let group = match word_at(self.buf, self.root, entry.target, &mut chars) {
                Ok(Some(group)) => group,
                Ok(None) => continue,
                Err(e) => {
                    warn!(error = %e, target = entry.target, "unreadable bigram target");
                    continue;
                }
            };
            let Some(unigram) = group.unigram_probability() else {
                continue;
            };
            if !prefix.is_empty() {
                let first = chars.first().copied().map(to_lower);
                if !prefix.iter().any(|&c| Some(to_lower(c)) == first) {
                    continue;
                }
            }
            sink.offer(SuggestedWord {
                word: chars.iter().collect(),
                score: bigram_probability(unigram, entry.strength) as i32,
                probability: Some(unigram),
                output_type: OutputType::Prediction,
                space_indices: Vec::new(),
                position: group.pos,
            });
        }
        let out = sink.drain_ranked(max);
        debug!(result_count = out.len());
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bigram_probability_climbs_toward_max() {
        assert!(bigram_probability(100, 0) > 100);
        assert!(bigram_probability(100, 15) > bigram_probability(100, 5));
        assert!(bigram_probability(255, 15) == 255);
        assert_eq!(bigram_probability(0, 15), 247);
    }

    #[test]
    fn bigram_probability_clamps_strength() {
        assert_eq!(bigram_probability(50, 200), bigram_probability(50, 15));
    }
}
