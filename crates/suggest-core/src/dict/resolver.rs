//! Word ↔ trie position.
//!
//! `resolve` walks down from the root comparing one depth at a time;
//! `word_at` goes the other way, rebuilding the word that ends at a given
//! terminal group. Both only move to offsets reached through forward
//! children pointers, so every walk is bounded by `MAX_WORD_LENGTH`.

use tracing::trace;

use super::format::{CharGroup, CharGroups, MAX_WORD_LENGTH};
use super::FormatError;
use crate::unicode::to_lower;

/// Find the terminal char group spelling `word`.
///
/// With `force_lower_case`, each query code point is lowercased before being
/// compared; stored code points are compared as they are.
pub fn resolve(
    buf: &[u8],
    root: usize,
    word: &[char],
    force_lower_case: bool,
) -> Result<Option<usize>, FormatError> {
    if word.is_empty() || word.len() > MAX_WORD_LENGTH {
        return Ok(None);
    }
    let query = |i: usize| {
        if force_lower_case {
            to_lower(word[i])
        } else {
            word[i]
        }
    };

    let mut array = root;
    let mut index = 0;
    loop {
        let mut matched = None;
        for group in CharGroups::new(buf, array)? {
            let group = group?;
            if group.first_char == query(index) {
                matched = Some(group);
                break;
            }
        }
        let Some(group) = matched else {
            return Ok(None);
        };

        // The first code point matched; the rest of a run must match too.
        for c in group.code_points(buf).skip(1) {
            let c = c?;
            index += 1;
            if index >= word.len() || c != query(index) {
                return Ok(None);
            }
        }
        index += 1;

        if index == word.len() {
            return Ok(group.flags.is_terminal().then_some(group.pos));
        }
        match group.children {
            Some(children) => array = children,
            None => return Ok(None),
        }
    }
}

/// Rebuild the word whose terminal group sits at `target` into `out`.
///
/// Children arrays are laid out in sibling order, so the group to descend
/// into is the last sibling whose children start at or before `target`.
pub fn word_at(
    buf: &[u8],
    root: usize,
    target: usize,
    out: &mut Vec<char>,
) -> Result<Option<CharGroup>, FormatError> {
    out.clear();
    if target < root {
        return Ok(None);
    }
    let mut array = root;
    for _ in 0..MAX_WORD_LENGTH {
        let mut descend: Option<CharGroup> = None;
        for group in CharGroups::new(buf, array)? {
            let group = group?;
            if group.pos == target {
                for c in group.code_points(buf) {
                    out.push(c?);
                }
                if !group.flags.is_terminal() || out.len() > MAX_WORD_LENGTH {
                    return Ok(None);
                }
                return Ok(Some(group));
            }
            if group.children.is_some_and(|children| children <= target) {
                descend = Some(group);
            }
        }
        let Some(group) = descend else {
            trace!(target, "no group leads to position");
            return Ok(None);
        };
        for c in group.code_points(buf) {
            out.push(c?);
        }
        if out.len() >= MAX_WORD_LENGTH {
            return Ok(None);
        }
        match group.children {
            Some(children) => array = children,
            None => return Ok(None),
        }
    }
    Ok(None)
}
