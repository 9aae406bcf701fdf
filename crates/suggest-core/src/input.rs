//! Raw query input: typed code points, touch samples and key sets.

use crate::unicode::eq_ignore_case;

/// One touch sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InputPoint {
    pub x: i32,
    pub y: i32,
    /// Milliseconds since the start of the input.
    pub time: i32,
    pub pointer_id: i32,
}

impl InputPoint {
    pub fn new(x: i32, y: i32, time: i32) -> Self {
        Self {
            x,
            y,
            time,
            pointer_id: 0,
        }
    }
}

/// Plausible keys for one typed position, most likely first.
///
/// Each key carries a rank; rank 0 keys are all equally likely. A plain list
/// ranks its first key 0 and the rest 1.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct KeySet {
    keys: Vec<char>,
    ranks: Vec<usize>,
}

impl KeySet {
    pub fn new(keys: Vec<char>) -> Self {
        let ranks = (0..keys.len()).map(|i| i.min(1)).collect();
        Self { keys, ranks }
    }

    pub fn single(c: char) -> Self {
        Self::new(vec![c])
    }

    /// Every key equally likely, e.g. a touch between several keys.
    pub fn ambiguous(keys: Vec<char>) -> Self {
        let ranks = vec![0; keys.len()];
        Self { keys, ranks }
    }

    /// Keys with explicit ranks. The first key is the primary one and is
    /// always rank 0.
    pub fn ranked(keys: Vec<(char, usize)>) -> Self {
        let (keys, mut ranks): (Vec<char>, Vec<usize>) = keys.into_iter().unzip();
        if let Some(first) = ranks.first_mut() {
            *first = 0;
        }
        Self { keys, ranks }
    }

    /// The key the user most likely hit.
    pub fn primary(&self) -> Option<char> {
        self.keys.first().copied()
    }

    /// The key matching `c` ignoring case, with its rank.
    pub fn find(&self, c: char) -> Option<(char, usize)> {
        self.keys
            .iter()
            .position(|&k| eq_ignore_case(k, c))
            .map(|i| (self.keys[i], self.ranks[i]))
    }

    /// Rank of `c` in the set, ignoring case; 0 is a best-guess key.
    pub fn rank_of(&self, c: char) -> Option<usize> {
        self.find(c).map(|(_, rank)| rank)
    }

    pub fn keys(&self) -> &[char] {
        &self.keys
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

impl From<&str> for KeySet {
    fn from(keys: &str) -> Self {
        Self::new(keys.chars().collect())
    }
}

/// Everything the caller knows about what was typed or traced.
///
/// Typing queries use `key_sets` when given; otherwise the typing policy
/// derives them from `code_points` and `points` through the proximity model.
/// Gesture queries use `points` only.
#[derive(Debug, Clone, Default)]
pub struct QueryInput {
    pub code_points: Vec<char>,
    pub points: Vec<InputPoint>,
    pub key_sets: Vec<KeySet>,
}

impl QueryInput {
    /// Typed code points without coordinates.
    pub fn typed(text: &str) -> Self {
        Self {
            code_points: text.chars().collect(),
            ..Self::default()
        }
    }

    /// Typed code points with one touch point per code point.
    pub fn touched(text: &str, points: Vec<InputPoint>) -> Self {
        Self {
            code_points: text.chars().collect(),
            points,
            ..Self::default()
        }
    }

    /// Pre-ranked key sets, one per typed position.
    pub fn from_key_sets(key_sets: Vec<KeySet>) -> Self {
        Self {
            code_points: key_sets.iter().filter_map(KeySet::primary).collect(),
            key_sets,
            ..Self::default()
        }
    }

    /// A continuous gesture trajectory.
    pub fn gesture(points: Vec<InputPoint>) -> Self {
        Self {
            points,
            ..Self::default()
        }
    }
}
