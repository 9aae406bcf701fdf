use std::sync::atomic::{AtomicU64, Ordering};

use tracing::{debug_span, warn};

use crate::dict::format::{read_code_point, read_flags, read_group_count, read_probability, skip_run};
use crate::dict::resolver::resolve;
use crate::dict::{BigramTable, DictError, DictFlags, FormatError, Header};
use crate::input::QueryInput;
use crate::policy::{GesturePolicy, SearchPolicy, TypingPolicy};
use crate::proximity::ProximityInfo;
use crate::search::SuggestEngine;
use crate::session::{SuggestOptions, TraversalSession};
use crate::settings::settings;
use crate::suggestion::SuggestedWord;
use crate::unicode::to_code_points;

static NEXT_ID: AtomicU64 = AtomicU64::new(1);

/// Read-only view of one dictionary blob plus the engines that search it.
///
/// Shareable across threads; every query brings its own `TraversalSession`.
pub struct Dictionary<'a> {
    id: u64,
    buf: &'a [u8],
    header: Header,
    bigrams: BigramTable<'a>,
    typing: SuggestEngine,
    gesture: SuggestEngine,
}

impl<'a> Dictionary<'a> {
    /// Parse the header of `buf` and build engines from the global settings.
    pub fn new(buf: &'a [u8]) -> Result<Self, DictError> {
        let s = settings();
        Self::with_policies(
            buf,
            Box::new(TypingPolicy::new(s.typing.clone())),
            Box::new(GesturePolicy::new(s.gesture.clone())),
        )
    }

    pub fn with_policies(
        buf: &'a [u8],
        typing: Box<dyn SearchPolicy>,
        gesture: Box<dyn SearchPolicy>,
    ) -> Result<Self, DictError> {
        let header = Header::parse(buf)?;
        let root = header.root();
        read_group_count(buf, root)?;
        let max_word_length = settings().search.max_word_length;
        Ok(Self {
            id: NEXT_ID.fetch_add(1, Ordering::Relaxed),
            buf,
            bigrams: BigramTable::new(buf, root),
            header,
            typing: SuggestEngine::new(typing, max_word_length),
            gesture: SuggestEngine::new(gesture, max_word_length),
        })
    }

    pub fn header(&self) -> &Header {
        &self.header
    }

    pub fn dict_flags(&self) -> DictFlags {
        self.header.flags()
    }

    pub fn bigrams(&self) -> &BigramTable<'a> {
        &self.bigrams
    }

    pub(crate) fn id(&self) -> u64 {
        self.id
    }

    pub(crate) fn buf(&self) -> &'a [u8] {
        self.buf
    }

    pub(crate) fn root(&self) -> usize {
        self.header.root()
    }

    /// Rank candidate words for `input`.
    ///
    /// Reinitializes `session` for this dictionary and `previous_word`, then
    /// runs the typing or gesture engine as `options.is_gesture` says.
    pub fn get_suggestions(
        &self,
        proximity: &dyn ProximityInfo,
        session: &mut TraversalSession,
        input: &QueryInput,
        previous_word: Option<&str>,
        commit_point: usize,
        options: SuggestOptions,
    ) -> Vec<SuggestedWord> {
        session.initialize(self, previous_word, options);
        let engine = if options.is_gesture {
            &self.gesture
        } else {
            &self.typing
        };
        engine.suggest(self, proximity, session, input, commit_point)
    }

    /// Words predicted to follow `preceding_word`, optionally restricted to
    /// those starting with one of `input_prefix`.
    pub fn get_bigrams(&self, preceding_word: &str, input_prefix: &[char]) -> Vec<SuggestedWord> {
        if preceding_word.is_empty() {
            return Vec::new();
        }
        let word = to_code_points(preceding_word);
        self.bigrams
            .predictions(&word, input_prefix, settings().search.max_results)
    }

    /// Stored probability of `word`, or `None` when it is absent, blacklisted
    /// or marked as not a word.
    pub fn get_probability(&self, word: &str) -> Option<u8> {
        if word.is_empty() {
            return None;
        }
        let _span = debug_span!("get_probability").entered();
        let word = to_code_points(word);
        self.probability_of(&word).unwrap_or_else(|e| {
            warn!(error = %e, "malformed dictionary while reading probability");
            None
        })
    }

    fn probability_of(&self, word: &[char]) -> Result<Option<u8>, FormatError> {
        let Some(pos) = resolve(self.buf, self.root(), word, false)? else {
            return Ok(None);
        };
        let (flags, chars) = read_flags(self.buf, pos)?;
        if flags.is_not_a_word() || flags.is_blacklisted() || !flags.is_terminal() {
            return Ok(None);
        }
        let (_, after_first) = read_code_point(self.buf, chars)?;
        let probability_pos = if flags.has_multiple_chars() {
            skip_run(self.buf, after_first)?
        } else {
            after_first
        };
        read_probability(self.buf, probability_pos).map(Some)
    }

    pub fn is_valid_bigram(&self, word1: &str, word2: &str) -> bool {
        self.bigrams
            .is_valid_bigram(&to_code_points(word1), &to_code_points(word2))
    }
}
