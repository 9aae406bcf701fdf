//! Char-group layout of the binary trie.
//!
//! A char-group array starts with a group count (1 byte, or 2 bytes when the
//! high bit of the first byte is set) followed by that many char groups:
//!
//! ```text
//! flags(1) code_point(s) [probability(1)] [children(1..3)] [shortcuts] [bigrams]
//! ```
//!
//! All multi-byte integers are big-endian. Every function here is a pure
//! function of `(buf, offset)` returning the decoded value and the offset
//! just past it. Nothing allocates and every read is bounds-checked.

use super::FormatError;

/// Longest word the format can describe.
pub const MAX_WORD_LENGTH: usize = 48;
pub const MAX_PROBABILITY: u8 = 255;
pub const MAX_BIGRAM_STRENGTH: u8 = 15;
/// Shortcut probability that marks a whitelist entry.
pub const WHITELIST_SHORTCUT_PROBABILITY: u8 = 15;

pub(crate) const CHARACTER_ARRAY_TERMINATOR: u8 = 0x1F;
const MINIMAL_ONE_BYTE_CHARACTER_VALUE: u8 = 0x20;

const MASK_CHILDREN_ADDRESS_TYPE: u8 = 0xC0;
const CHILDREN_ADDRESS_TYPE_ONE_BYTE: u8 = 0x40;
const CHILDREN_ADDRESS_TYPE_TWO_BYTES: u8 = 0x80;
const CHILDREN_ADDRESS_TYPE_THREE_BYTES: u8 = 0xC0;

pub(crate) const FLAG_ATTRIBUTE_HAS_NEXT: u8 = 0x80;
pub(crate) const FLAG_ATTRIBUTE_OFFSET_NEGATIVE: u8 = 0x40;
pub(crate) const MASK_ATTRIBUTE_ADDRESS_TYPE: u8 = 0x30;
pub(crate) const MASK_ATTRIBUTE_PROBABILITY: u8 = 0x0F;

/// Flags byte of a char group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct NodeFlags(u8);

impl NodeFlags {
    pub const HAS_MULTIPLE_CHARS: u8 = 0x20;
    pub const IS_TERMINAL: u8 = 0x10;
    pub const HAS_SHORTCUT_TARGETS: u8 = 0x08;
    pub const HAS_BIGRAMS: u8 = 0x04;
    pub const IS_NOT_A_WORD: u8 = 0x02;
    pub const IS_BLACKLISTED: u8 = 0x01;

    pub fn from_bits(bits: u8) -> Self {
        Self(bits)
    }

    pub fn bits(self) -> u8 {
        self.0
    }

    pub fn has_multiple_chars(self) -> bool {
        self.0 & Self::HAS_MULTIPLE_CHARS != 0
    }

    pub fn is_terminal(self) -> bool {
        self.0 & Self::IS_TERMINAL != 0
    }

    pub fn has_shortcuts(self) -> bool {
        self.0 & Self::HAS_SHORTCUT_TARGETS != 0
    }

    pub fn has_bigrams(self) -> bool {
        self.0 & Self::HAS_BIGRAMS != 0
    }

    pub fn is_not_a_word(self) -> bool {
        self.0 & Self::IS_NOT_A_WORD != 0
    }

    pub fn is_blacklisted(self) -> bool {
        self.0 & Self::IS_BLACKLISTED != 0
    }

    /// Terminal that may be offered or scored as a word in its own right.
    pub fn is_suggestible(self) -> bool {
        self.is_terminal() && !self.is_not_a_word() && !self.is_blacklisted()
    }

    /// Width in bytes of the children address field (0 = no children).
    pub fn children_address_size(self) -> usize {
        match self.0 & MASK_CHILDREN_ADDRESS_TYPE {
            CHILDREN_ADDRESS_TYPE_ONE_BYTE => 1,
            CHILDREN_ADDRESS_TYPE_TWO_BYTES => 2,
            CHILDREN_ADDRESS_TYPE_THREE_BYTES => 3,
            _ => 0,
        }
    }
}

#[inline]
fn out_of_bounds(buf: &[u8], offset: usize) -> FormatError {
    FormatError::OutOfBounds {
        offset,
        len: buf.len(),
    }
}

#[inline]
pub(crate) fn read_u8(buf: &[u8], pos: usize) -> Result<u8, FormatError> {
    buf.get(pos).copied().ok_or_else(|| out_of_bounds(buf, pos))
}

/// Advance `pos` by `n`, refusing to move past the end of the blob.
#[inline]
pub(crate) fn advance(buf: &[u8], pos: usize, n: usize) -> Result<usize, FormatError> {
    match pos.checked_add(n) {
        Some(end) if end <= buf.len() => Ok(end),
        _ => Err(out_of_bounds(buf, pos.saturating_add(n))),
    }
}

/// Read an unsigned big-endian integer of `size` bytes (at most 4).
pub(crate) fn read_uint(buf: &[u8], pos: usize, size: usize) -> Result<(usize, usize), FormatError> {
    let end = advance(buf, pos, size)?;
    let value = buf[pos..end]
        .iter()
        .fold(0usize, |acc, &b| (acc << 8) | b as usize);
    Ok((value, end))
}

/// Read the group count of the char-group array at `pos`.
pub fn read_group_count(buf: &[u8], pos: usize) -> Result<(usize, usize), FormatError> {
    let first = read_u8(buf, pos)?;
    if first & 0x80 == 0 {
        Ok((first as usize, pos + 1))
    } else {
        let second = read_u8(buf, pos + 1)?;
        Ok(((((first & 0x7F) as usize) << 8) | second as usize, pos + 2))
    }
}

/// Read the flags byte of the char group at `pos`.
pub fn read_flags(buf: &[u8], pos: usize) -> Result<(NodeFlags, usize), FormatError> {
    Ok((NodeFlags(read_u8(buf, pos)?), pos + 1))
}

/// Decode one code point and advance past it.
///
/// Returns `None` for the run terminator, which is consumed.
pub fn read_code_point(buf: &[u8], pos: usize) -> Result<(Option<char>, usize), FormatError> {
    let first = read_u8(buf, pos)?;
    if first >= MINIMAL_ONE_BYTE_CHARACTER_VALUE {
        return Ok((Some(first as char), pos + 1));
    }
    if first == CHARACTER_ARRAY_TERMINATOR {
        return Ok((None, pos + 1));
    }
    let (value, next) = read_uint(buf, pos, 3)?;
    let value = value as u32;
    char::from_u32(value)
        .map(|c| (Some(c), next))
        .ok_or(FormatError::InvalidCodePoint { offset: pos, value })
}

/// Skip the remaining code points of a multi-char run, including the terminator.
pub fn skip_run(buf: &[u8], mut pos: usize) -> Result<usize, FormatError> {
    // A run can never be longer than a word, so cap the scan.
    for _ in 0..=MAX_WORD_LENGTH {
        let (c, next) = read_code_point(buf, pos)?;
        pos = next;
        if c.is_none() {
            return Ok(pos);
        }
    }
    Err(FormatError::InvalidAttribute { offset: pos })
}

/// Decode the code point of a run at `pos` and report where the run
/// continues, or `None` if it was the last one.
pub fn next_in_run(buf: &[u8], pos: usize) -> Result<(char, Option<usize>), FormatError> {
    match read_code_point(buf, pos)? {
        (Some(c), next) => {
            let more = read_u8(buf, next)? != CHARACTER_ARRAY_TERMINATOR;
            Ok((c, more.then_some(next)))
        }
        (None, _) => Err(FormatError::InvalidCodePoint {
            offset: pos,
            value: CHARACTER_ARRAY_TERMINATOR as u32,
        }),
    }
}

/// Read the probability byte at `pos`; the caller's cursor is not moved.
pub fn read_probability(buf: &[u8], pos: usize) -> Result<u8, FormatError> {
    read_u8(buf, pos)
}

/// Read the children address at `pos` and resolve it to an absolute offset.
///
/// The stored offset is relative to `pos` and must point strictly forward.
pub fn read_children_address(
    buf: &[u8],
    pos: usize,
    flags: NodeFlags,
) -> Result<(Option<usize>, usize), FormatError> {
    let size = flags.children_address_size();
    if size == 0 {
        return Ok((None, pos));
    }
    let (offset, next) = read_uint(buf, pos, size)?;
    if offset == 0 {
        return Err(FormatError::BackwardPointer { from: pos, to: pos });
    }
    let target = pos + offset;
    if target >= buf.len() {
        return Err(out_of_bounds(buf, target));
    }
    Ok((Some(target), next))
}

/// Skip the shortcut list at `pos` if the flags say there is one.
pub fn skip_shortcuts(buf: &[u8], pos: usize, flags: NodeFlags) -> Result<usize, FormatError> {
    if !flags.has_shortcuts() {
        return Ok(pos);
    }
    let (size, _) = read_uint(buf, pos, 2)?;
    if size < 2 {
        return Err(FormatError::InvalidAttribute { offset: pos });
    }
    advance(buf, pos, size)
}

/// Skip the bigram list at `pos` if the flags say there is one.
pub fn skip_bigrams(buf: &[u8], mut pos: usize, flags: NodeFlags) -> Result<usize, FormatError> {
    if !flags.has_bigrams() {
        return Ok(pos);
    }
    loop {
        let (attr, _, next) = read_attribute_address(buf, pos)?;
        pos = next;
        if attr & FLAG_ATTRIBUTE_HAS_NEXT == 0 {
            return Ok(pos);
        }
    }
}

/// Read one bigram attribute: flags byte, then a signed relative address.
///
/// Returns `(flags, absolute target, next offset)`.
pub(crate) fn read_attribute_address(
    buf: &[u8],
    pos: usize,
) -> Result<(u8, usize, usize), FormatError> {
    let attr = read_u8(buf, pos)?;
    let size = match attr & MASK_ATTRIBUTE_ADDRESS_TYPE {
        0x10 => 1,
        0x20 => 2,
        0x30 => 3,
        _ => return Err(FormatError::InvalidAttribute { offset: pos }),
    };
    let origin = pos + 1;
    let (offset, next) = read_uint(buf, origin, size)?;
    let target = if attr & FLAG_ATTRIBUTE_OFFSET_NEGATIVE != 0 {
        origin.checked_sub(offset)
    } else {
        origin.checked_add(offset)
    };
    match target {
        Some(t) if t < buf.len() => Ok((attr, t, next)),
        _ => Err(FormatError::InvalidAttribute { offset: pos }),
    }
}

/// One decoded char group.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CharGroup {
    /// Offset of the flags byte; the group's identity in the blob.
    pub pos: usize,
    pub flags: NodeFlags,
    pub first_char: char,
    /// Offset of the second code point of a multi-char run.
    pub run_rest: Option<usize>,
    chars_pos: usize,
    /// Raw probability byte, present on every terminal.
    pub probability: Option<u8>,
    pub children: Option<usize>,
    pub shortcuts: Option<usize>,
    pub bigrams: Option<usize>,
    /// Offset of the next sibling.
    pub end: usize,
}

impl CharGroup {
    pub fn read(buf: &[u8], pos: usize) -> Result<Self, FormatError> {
        let (flags, chars_pos) = read_flags(buf, pos)?;
        let (first_char, run_rest, mut cur) = if flags.has_multiple_chars() {
            let (c, rest) = next_in_run(buf, chars_pos)?;
            let (_, after_first) = read_code_point(buf, chars_pos)?;
            (c, rest, skip_run(buf, after_first)?)
        } else {
            match read_code_point(buf, chars_pos)? {
                (Some(c), next) => (c, None, next),
                (None, _) => {
                    return Err(FormatError::InvalidCodePoint {
                        offset: chars_pos,
                        value: CHARACTER_ARRAY_TERMINATOR as u32,
                    })
                }
            }
        };
        let probability = if flags.is_terminal() {
            let p = read_probability(buf, cur)?;
            cur = advance(buf, cur, 1)?;
            Some(p)
        } else {
            None
        };
        let (children, next) = read_children_address(buf, cur, flags)?;
        cur = next;
        let shortcuts = flags.has_shortcuts().then_some(cur);
        cur = skip_shortcuts(buf, cur, flags)?;
        let bigrams = flags.has_bigrams().then_some(cur);
        cur = skip_bigrams(buf, cur, flags)?;
        Ok(Self {
            pos,
            flags,
            first_char,
            run_rest,
            chars_pos,
            probability,
            children,
            shortcuts,
            bigrams,
            end: cur,
        })
    }

    /// Probability usable as a word score: `None` unless this is a terminal
    /// that is neither blacklisted nor marked not-a-word.
    pub fn unigram_probability(&self) -> Option<u8> {
        if self.flags.is_suggestible() {
            self.probability
        } else {
            None
        }
    }

    /// Iterate the code points this group spells.
    pub fn code_points<'b>(&self, buf: &'b [u8]) -> CodePoints<'b> {
        CodePoints {
            buf,
            pos: Some(self.chars_pos),
            multi: self.flags.has_multiple_chars(),
        }
    }
}

/// Code points of one char group.
pub struct CodePoints<'b> {
    buf: &'b [u8],
    pos: Option<usize>,
    multi: bool,
}

impl Iterator for CodePoints<'_> {
    type Item = Result<char, FormatError>;

    fn next(&mut self) -> Option<Self::Item> {
        let pos = self.pos?;
        match read_code_point(self.buf, pos) {
            Ok((Some(c), next)) => {
                self.pos = self.multi.then_some(next);
                Some(Ok(c))
            }
            Ok((None, _)) => {
                self.pos = None;
                None
            }
            Err(e) => {
                self.pos = None;
                Some(Err(e))
            }
        }
    }
}

/// Iterate the char groups of the array at `pos`.
pub struct CharGroups<'b> {
    buf: &'b [u8],
    cur: usize,
    remaining: usize,
    failed: bool,
}

impl<'b> CharGroups<'b> {
    pub fn new(buf: &'b [u8], pos: usize) -> Result<Self, FormatError> {
        let (remaining, cur) = read_group_count(buf, pos)?;
        Ok(Self {
            buf,
            cur,
            remaining,
            failed: false,
        })
    }
}

impl Iterator for CharGroups<'_> {
    type Item = Result<CharGroup, FormatError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 || self.failed {
            return None;
        }
        self.remaining -= 1;
        match CharGroup::read(self.buf, self.cur) {
            Ok(group) => {
                self.cur = group.end;
                Some(Ok(group))
            }
            Err(e) => {
                self.failed = true;
                Some(Err(e))
            }
        }
    }
}
