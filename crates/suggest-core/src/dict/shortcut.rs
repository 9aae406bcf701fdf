//! Shortcut targets attached to terminal char groups.
//!
//! ```text
//! size(2, includes itself) { flags(1) code_point… 0x1F }*
//! ```
//!
//! `flags & 0x80` marks another entry, `flags & 0x0F` is the probability.

use super::format::{
    read_code_point, read_uint, read_u8, FLAG_ATTRIBUTE_HAS_NEXT, MASK_ATTRIBUTE_PROBABILITY,
    MAX_WORD_LENGTH, WHITELIST_SHORTCUT_PROBABILITY,
};
use super::FormatError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Shortcut {
    pub target: String,
    /// 0..=15; 15 marks a whitelist entry.
    pub probability: u8,
}

impl Shortcut {
    pub fn is_whitelist(&self) -> bool {
        self.probability == WHITELIST_SHORTCUT_PROBABILITY
    }
}

/// Iterator over the shortcut list starting at `pos`.
pub struct Shortcuts<'b> {
    buf: &'b [u8],
    cur: Option<usize>,
    end: usize,
}

impl<'b> Shortcuts<'b> {
    pub fn new(buf: &'b [u8], pos: usize) -> Result<Self, FormatError> {
        let (size, cur) = read_uint(buf, pos, 2)?;
        let end = pos + size;
        if size < 2 || end > buf.len() {
            return Err(FormatError::InvalidAttribute { offset: pos });
        }
        Ok(Self {
            buf,
            cur: (cur < end).then_some(cur),
            end,
        })
    }

    fn read_entry(&self, pos: usize) -> Result<(Shortcut, Option<usize>), FormatError> {
        let flags = read_u8(self.buf, pos)?;
        let mut cur = pos + 1;
        let mut target = String::new();
        for _ in 0..=MAX_WORD_LENGTH {
            let (c, next) = read_code_point(self.buf, cur)?;
            if next > self.end {
                return Err(FormatError::InvalidAttribute { offset: pos });
            }
            cur = next;
            match c {
                Some(c) => target.push(c),
                None => {
                    let more = flags & FLAG_ATTRIBUTE_HAS_NEXT != 0 && cur < self.end;
                    let shortcut = Shortcut {
                        target,
                        probability: flags & MASK_ATTRIBUTE_PROBABILITY,
                    };
                    return Ok((shortcut, more.then_some(cur)));
                }
            }
        }
        Err(FormatError::InvalidAttribute { offset: pos })
    }
}

impl Iterator for Shortcuts<'_> {
    type Item = Result<Shortcut, FormatError>;

    fn next(&mut self) -> Option<Self::Item> {
        let pos = self.cur?;
        match self.read_entry(pos) {
            Ok((shortcut, next)) => {
                self.cur = next;
                Some(Ok(shortcut))
            }
            Err(e) => {
                self.cur = None;
                Some(Err(e))
            }
        }
    }
}
