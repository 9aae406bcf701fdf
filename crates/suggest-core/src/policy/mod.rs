//! Edge cost strategies for the suggestion search.
//!
//! A `SearchPolicy` is long-lived configuration owned by the dictionary. For
//! each query it `prepare`s an `EdgeScorer` holding whatever per-query data it
//! derived from the input (key sets, a filtered trajectory), and the engine
//! asks that scorer for every edge it considers.

pub mod gesture;
pub mod typing;

pub use gesture::GesturePolicy;
pub use typing::TypingPolicy;

use crate::input::QueryInput;
use crate::proximity::ProximityInfo;
use crate::session::SuggestOptions;
use crate::suggestion::OutputType;

/// Everything a policy may look at when preparing a query.
#[derive(Clone, Copy)]
pub struct Query<'q> {
    pub input: &'q QueryInput,
    pub proximity: &'q dyn ProximityInfo,
    pub commit_point: usize,
    pub options: SuggestOptions,
}

pub trait SearchPolicy: Send + Sync {
    fn name(&self) -> &'static str;

    /// Number of partial paths kept after each search round.
    fn beam_width(&self) -> usize;

    /// Build the scorer for one query, or `None` when the input can never
    /// produce a suggestion.
    fn prepare<'q>(&'q self, query: Query<'q>) -> Option<Box<dyn EdgeScorer + 'q>>;
}

/// Progress of one partial path, as seen by a scorer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct NodeState {
    /// Input units (typed positions or trajectory samples) consumed so far.
    pub consumed: usize,
    /// Code points of the current word.
    pub depth: usize,
    /// Words completed before the current one.
    pub words: usize,
    pub edits: usize,
    /// Last code point of the current word.
    pub last_char: Option<char>,
    /// Code points emitted past the end of the input.
    pub completion_len: usize,
    /// Some edge was not an exact primary-key match.
    pub corrected: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdgeKind {
    Match,
    Proximity,
    Substitution,
    Omission,
    Insertion,
    Completion,
    /// Input consumed without emitting a code point, free of edit accounting.
    Skip,
}

impl EdgeKind {
    pub fn is_edit(self) -> bool {
        matches!(self, Self::Substitution | Self::Omission | Self::Insertion)
    }

    pub fn is_correction(self) -> bool {
        matches!(
            self,
            Self::Proximity | Self::Substitution | Self::Omission | Self::Insertion
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Edge {
    /// Input units this edge consumes.
    pub consumed: usize,
    pub cost: f32,
    pub kind: EdgeKind,
}

impl NodeState {
    /// State after following `edge`, emitting `c` unless the edge is an
    /// insertion or a skip.
    pub fn advance(&self, edge: &Edge, c: Option<char>) -> Self {
        let mut next = *self;
        next.consumed += edge.consumed;
        if edge.kind.is_edit() {
            next.edits += 1;
        }
        if edge.kind.is_correction() {
            next.corrected = true;
        }
        if let Some(c) = c {
            next.depth += 1;
            next.last_char = Some(c);
        }
        if edge.kind == EdgeKind::Completion {
            next.completion_len += 1;
        }
        next
    }

    /// State at the start of the next word of a multi-word suggestion.
    pub fn next_word(&self) -> Self {
        Self {
            words: self.words + 1,
            depth: 0,
            last_char: None,
            completion_len: 0,
            ..*self
        }
    }
}

pub trait EdgeScorer {
    /// Number of input units a complete match must account for.
    fn input_len(&self) -> usize;

    /// Edges that emit code point `c` from `state`, appended to `out`.
    fn edges(&self, state: &NodeState, c: char, out: &mut Vec<Edge>);

    /// Edges that consume input without emitting a code point.
    fn skip_edges(&self, _state: &NodeState, _out: &mut Vec<Edge>) {}

    /// Cost of ending a word at `state`, or `None` if it may not end here.
    fn terminal_cost(&self, state: &NodeState) -> Option<f32>;

    /// Cost of inserting a space after the word ending at `state`.
    fn space_cost(&self, _state: &NodeState) -> Option<f32> {
        None
    }

    /// Cost of a word with unigram (or bigram-boosted) probability `p`.
    fn language_cost(&self, probability: u8) -> f32;

    /// Most words a single suggestion may contain.
    fn max_words(&self) -> usize {
        1
    }

    fn output_type(&self, state: &NodeState) -> OutputType {
        if state.corrected {
            OutputType::Correction
        } else if state.completion_len > 0 {
            OutputType::Completion
        } else {
            OutputType::Exact
        }
    }
}

/// `weight × (1 − p/255)`: zero for the most frequent words.
pub(crate) fn weighted_language_cost(weight: f32, probability: u8) -> f32 {
    weight * (1.0 - probability as f32 / crate::dict::format::MAX_PROBABILITY as f32)
}
