//! Pruned beam search over the trie.
//!
//! The search is step-synchronous: each round moves every frontier node by
//! one trie code point (or by one input-only skip edge), emits candidates for
//! nodes that land on a terminal group, then keeps the `beam_width` cheapest
//! nodes. Every successor has strictly more code points or more consumed input
//! than its parent, so a query runs at most `max_word_length + input_len`
//! rounds of at most `beam_width` expansions each.

use std::cmp::Ordering;
use std::collections::HashMap;

use tracing::{debug, debug_span, warn};

use crate::dict::format::{next_in_run, CharGroup, CharGroups};
use crate::dict::{bigram_probability, FormatError, Shortcuts};
use crate::dictionary::Dictionary;
use crate::input::QueryInput;
use crate::policy::{Edge, EdgeScorer, NodeState, Query, SearchPolicy};
use crate::proximity::ProximityInfo;
use crate::session::TraversalSession;
use crate::suggestion::{score_from_cost, CandidateSink, OutputType, SuggestedWord};

#[cfg(test)]
mod tests;

/// One code point of a partial path; paths share prefixes through `parent`.
#[derive(Debug, Clone, Copy)]
pub(crate) struct PathLink {
    parent: Option<usize>,
    ch: char,
    /// Word separator inserted by the search, not read from the trie.
    space: bool,
}

#[derive(Debug, Clone, Copy)]
enum Cursor {
    /// At the start of the char-group array at this offset.
    Array(usize),
    /// Inside a multi-char run; the next code point is at `next`.
    Run { group: CharGroup, next: usize },
    /// Every code point of the group has been emitted.
    End(CharGroup),
}

impl Cursor {
    fn pos(&self) -> usize {
        match self {
            Cursor::Array(pos) => *pos,
            Cursor::Run { group, .. } | Cursor::End(group) => group.pos,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub(crate) struct SearchNode {
    cursor: Cursor,
    state: NodeState,
    cost: f32,
    path: Option<usize>,
    /// Code points emitted so far, spaces included.
    len: usize,
}

impl SearchNode {
    fn beam_cmp(&self, other: &Self) -> Ordering {
        self.cost
            .total_cmp(&other.cost)
            .then_with(|| self.len.cmp(&other.len))
            .then_with(|| self.cursor.pos().cmp(&other.cursor.pos()))
            .then_with(|| self.state.consumed.cmp(&other.state.consumed))
    }
}

/// Suggestion search bound to one policy.
pub struct SuggestEngine {
    policy: Box<dyn SearchPolicy>,
    max_word_length: usize,
}

impl SuggestEngine {
    pub fn new(policy: Box<dyn SearchPolicy>, max_word_length: usize) -> Self {
        Self {
            policy,
            max_word_length,
        }
    }

    pub fn policy_name(&self) -> &'static str {
        self.policy.name()
    }

    /// Run one query. `session` must have been initialized for `dict` since
    /// its last search; otherwise the result is empty.
    pub fn suggest(
        &self,
        dict: &Dictionary<'_>,
        proximity: &dyn ProximityInfo,
        session: &mut TraversalSession,
        input: &QueryInput,
        commit_point: usize,
    ) -> Vec<SuggestedWord> {
        if !session.take_binding(dict.id()) {
            debug!(dict = dict.id(), "session not initialized for this dictionary");
            return Vec::new();
        }
        let options = session.options();
        let Some(scorer) = self.policy.prepare(Query {
            input,
            proximity,
            commit_point,
            options,
        }) else {
            debug!(policy = self.policy.name(), "input yields no suggestions");
            return Vec::new();
        };
        let input_len = scorer.input_len();
        let beam_width = self.policy.beam_width().max(1);
        let _span = debug_span!(
            "suggest",
            policy = self.policy.name(),
            input_len,
            beam_width,
            max_results = options.max_results
        )
        .entered();

        let TraversalSession {
            bigram_strengths,
            frontier,
            next,
            arena,
            edges,
            sink,
            ..
        } = session;
        let mut walk = Walk {
            buf: dict.buf(),
            root: dict.root(),
            scorer: scorer.as_ref(),
            max_word_length: self.max_word_length,
            strengths: bigram_strengths,
            arena,
            edges,
            sink,
            spelled: Vec::new(),
        };

        frontier.clear();
        next.clear();
        frontier.push(SearchNode {
            cursor: Cursor::Array(walk.root),
            state: NodeState::default(),
            cost: 0.0,
            path: None,
            len: 0,
        });

        let mut rounds = 0;
        while !frontier.is_empty() && rounds <= self.max_word_length + input_len {
            for node in frontier.iter() {
                if let Err(e) = walk.expand(node, next) {
                    warn!(error = %e, pos = node.cursor.pos(), "malformed node, dropping branch");
                }
            }
            if next.len() > beam_width {
                next.select_nth_unstable_by(beam_width - 1, SearchNode::beam_cmp);
                next.truncate(beam_width);
            }
            std::mem::swap(frontier, next);
            next.clear();
            rounds += 1;
        }
        frontier.clear();

        let out = walk.sink.drain_ranked(options.max_results);
        debug!(
            rounds,
            path_links = walk.arena.len(),
            result_count = out.len(),
            best_score = out.first().map(|w| w.score)
        );
        out
    }
}

/// Borrowed view of everything one search round needs.
struct Walk<'s> {
    buf: &'s [u8],
    root: usize,
    scorer: &'s dyn EdgeScorer,
    max_word_length: usize,
    strengths: &'s HashMap<usize, u8>,
    arena: &'s mut Vec<PathLink>,
    edges: &'s mut Vec<Edge>,
    sink: &'s mut CandidateSink,
    spelled: Vec<char>,
}

impl Walk<'_> {
    fn expand(&mut self, node: &SearchNode, out: &mut Vec<SearchNode>) -> Result<(), FormatError> {
        let mut edges = std::mem::take(self.edges);
        edges.clear();
        self.scorer.skip_edges(&node.state, &mut edges);
        for edge in &edges {
            let skipped = SearchNode {
                state: node.state.advance(edge, None),
                cost: node.cost + edge.cost,
                ..*node
            };
            self.push(skipped, out);
        }
        *self.edges = edges;

        match node.cursor {
            Cursor::Array(pos) => self.expand_array(node, pos, out),
            Cursor::End(group) => match group.children {
                Some(children) => self.expand_array(node, children, out),
                None => Ok(()),
            },
            Cursor::Run { group, next } => {
                let (c, more) = next_in_run(self.buf, next)?;
                let cursor = match more {
                    Some(next) => Cursor::Run { group, next },
                    None => Cursor::End(group),
                };
                self.step(node, c, cursor, out);
                Ok(())
            }
        }
    }

    fn expand_array(
        &mut self,
        node: &SearchNode,
        pos: usize,
        out: &mut Vec<SearchNode>,
    ) -> Result<(), FormatError> {
        for group in CharGroups::new(self.buf, pos)? {
            let group = group?;
            let cursor = match group.run_rest {
                Some(next) => Cursor::Run { group, next },
                None => Cursor::End(group),
            };
            self.step(node, group.first_char, cursor, out);
        }
        Ok(())
    }

    /// Follow every edge the scorer offers for emitting `c`.
    fn step(&mut self, node: &SearchNode, c: char, cursor: Cursor, out: &mut Vec<SearchNode>) {
        if node.len >= self.max_word_length {
            return;
        }
        let mut edges = std::mem::take(self.edges);
        edges.clear();
        self.scorer.edges(&node.state, c, &mut edges);
        let mut link = None;
        for edge in &edges {
            let path = *link.get_or_insert_with(|| self.link(node.path, c, false));
            self.push(
                SearchNode {
                    cursor,
                    state: node.state.advance(edge, Some(c)),
                    cost: node.cost + edge.cost,
                    path: Some(path),
                    len: node.len + 1,
                },
                out,
            );
        }
        *self.edges = edges;
    }

    /// Queue `node`, emitting candidates first when it sits on a terminal.
    fn push(&mut self, node: SearchNode, out: &mut Vec<SearchNode>) {
        if let Cursor::End(group) = node.cursor {
            if group.flags.is_terminal() {
                self.on_terminal(&node, &group, out);
            }
        }
        out.push(node);
    }

    fn on_terminal(&mut self, node: &SearchNode, group: &CharGroup, out: &mut Vec<SearchNode>) {
        let Some(raw) = group.probability else {
            return;
        };
        let probability = self.boosted(group.pos, raw, node.state.words);
        let language = self.scorer.language_cost(probability);

        if let Some(terminal) = self.scorer.terminal_cost(&node.state) {
            let score = score_from_cost(node.cost + terminal + language);
            if group.flags.is_suggestible() {
                let (word, space_indices) = self.spell(node.path);
                self.sink.offer(SuggestedWord {
                    word,
                    score,
                    probability: Some(raw),
                    output_type: self.scorer.output_type(&node.state),
                    space_indices,
                    position: group.pos,
                });
            }
            if let Some(list) = group.shortcuts {
                self.offer_shortcuts(node, group, list, score);
            }
        }

        if !group.flags.is_suggestible()
            || node.len + 1 >= self.max_word_length
            || node.state.words + 1 >= self.scorer.max_words()
        {
            return;
        }
        if let Some(space) = self.scorer.space_cost(&node.state) {
            let path = self.link(node.path, ' ', true);
            out.push(SearchNode {
                cursor: Cursor::Array(self.root),
                state: node.state.next_word(),
                cost: node.cost + space + language,
                path: Some(path),
                len: node.len + 1,
            });
        }
    }

    /// Shortcuts replace the last word of the source path. A whitelist entry
    /// ranks just above its source, any other just below.
    fn offer_shortcuts(&mut self, node: &SearchNode, group: &CharGroup, list: usize, score: i32) {
        let (word, space_indices) = self.spell(node.path);
        let prefix_len = space_indices.last().map_or(0, |&i| i + 1);
        let prefix: String = word.chars().take(prefix_len).collect();
        let shortcuts = match Shortcuts::new(self.buf, list) {
            Ok(shortcuts) => shortcuts,
            Err(e) => {
                warn!(error = %e, pos = group.pos, "malformed shortcut list");
                return;
            }
        };
        for shortcut in shortcuts {
            let shortcut = match shortcut {
                Ok(shortcut) => shortcut,
                Err(e) => {
                    warn!(error = %e, pos = group.pos, "malformed shortcut entry");
                    return;
                }
            };
            let score = if shortcut.is_whitelist() {
                score.saturating_add(1)
            } else {
                score.saturating_sub(1).max(0)
            };
            self.sink.offer(SuggestedWord {
                word: format!("{prefix}{}", shortcut.target),
                score,
                probability: None,
                output_type: OutputType::Shortcut,
                space_indices: space_indices.clone(),
                position: group.pos,
            });
        }
    }

    /// Probability of the word ending at `pos`, raised by the previous word's
    /// bigram when this is the first word of the suggestion.
    fn boosted(&self, pos: usize, probability: u8, words: usize) -> u8 {
        match self.strengths.get(&pos) {
            Some(&strength) if words == 0 => bigram_probability(probability, strength),
            _ => probability,
        }
    }

    fn link(&mut self, parent: Option<usize>, ch: char, space: bool) -> usize {
        self.arena.push(PathLink { parent, ch, space });
        self.arena.len() - 1
    }

    /// Rebuild the text of the path ending at `path`, with space positions.
    fn spell(&mut self, mut path: Option<usize>) -> (String, Vec<usize>) {
        self.spelled.clear();
        let mut spaces = Vec::new();
        while let Some(i) = path {
            let link = self.arena[i];
            if link.space {
                spaces.push(self.spelled.len());
            }
            self.spelled.push(link.ch);
            path = link.parent;
        }
        let len = self.spelled.len();
        self.spelled.reverse();
        let mut space_indices: Vec<usize> = spaces.into_iter().map(|i| len - 1 - i).collect();
        space_indices.reverse();
        (self.spelled.iter().collect(), space_indices)
    }
}
