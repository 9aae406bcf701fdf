//! Per-query state, reused across queries to keep allocations warm.

use std::collections::HashMap;

use tracing::debug;

use crate::dictionary::Dictionary;
use crate::policy::Edge;
use crate::search::{PathLink, SearchNode};
use crate::settings::settings;
use crate::suggestion::CandidateSink;
use crate::unicode::to_code_points;

/// Query options. The engine is chosen from `is_gesture` alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SuggestOptions {
    pub is_gesture: bool,
    /// Allow one edit per typed position instead of the configured maximum.
    pub use_full_edit_distance: bool,
    /// Output capacity.
    pub max_results: usize,
}

impl Default for SuggestOptions {
    fn default() -> Self {
        Self::typing()
    }
}

impl SuggestOptions {
    pub fn typing() -> Self {
        Self {
            is_gesture: false,
            use_full_edit_distance: false,
            max_results: settings().search.max_results,
        }
    }

    pub fn gesture() -> Self {
        Self {
            is_gesture: true,
            ..Self::typing()
        }
    }
}

/// Buffers and context for one suggestion query.
///
/// Call [`TraversalSession::initialize`] before every search. The binding
/// is consumed by the search, so a session cannot be replayed against stale
/// context; each thread querying a shared dictionary owns its own session.
#[derive(Debug, Default)]
pub struct TraversalSession {
    binding: Option<u64>,
    previous_word: Vec<char>,
    options: SuggestOptions,
    pub(crate) bigram_strengths: HashMap<usize, u8>,
    pub(crate) frontier: Vec<SearchNode>,
    pub(crate) next: Vec<SearchNode>,
    pub(crate) arena: Vec<PathLink>,
    pub(crate) edges: Vec<Edge>,
    pub(crate) sink: CandidateSink,
}

impl TraversalSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reset every buffer and bind the session to `dict` and the word typed
    /// before the current one.
    pub fn initialize(
        &mut self,
        dict: &Dictionary<'_>,
        previous_word: Option<&str>,
        options: SuggestOptions,
    ) {
        self.frontier.clear();
        self.next.clear();
        self.arena.clear();
        self.edges.clear();
        self.sink.clear();
        self.previous_word = previous_word.map(to_code_points).unwrap_or_default();
        self.options = options;
        dict.bigrams()
            .strengths(&self.previous_word, &mut self.bigram_strengths);
        self.binding = Some(dict.id());
        debug!(
            dict = dict.id(),
            previous_len = self.previous_word.len(),
            boosted = self.bigram_strengths.len(),
            gesture = options.is_gesture,
            "session initialized"
        );
    }

    pub fn options(&self) -> SuggestOptions {
        self.options
    }

    pub fn previous_word(&self) -> &[char] {
        &self.previous_word
    }

    pub fn is_bound_to(&self, dict: &Dictionary<'_>) -> bool {
        self.binding == Some(dict.id())
    }

    /// Consume the binding; `false` if the session was not initialized for
    /// `dict_id` since its last search.
    pub(crate) fn take_binding(&mut self, dict_id: u64) -> bool {
        self.binding.take() == Some(dict_id)
    }
}
