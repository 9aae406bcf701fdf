//! Binary dictionary access.
//!
//! The dictionary is a serialized trie of char groups (see `format`), preceded
//! by a small header. Everything here reads directly from a borrowed byte
//! slice; nothing is copied out of the blob except decoded words.

pub mod bigram;
mod file;
pub mod format;
pub mod header;
pub mod resolver;
pub mod shortcut;
#[cfg(any(test, feature = "testutil"))]
pub mod testutil;
#[cfg(test)]
mod tests;

pub use bigram::{bigram_probability, BigramEntry, BigramTable};
pub use file::DictionaryFile;
pub use format::{CharGroup, NodeFlags};
pub use header::{DictFlags, Header};
pub use shortcut::{Shortcut, Shortcuts};

use std::io;

/// Errors raised while loading a dictionary.
#[derive(Debug, thiserror::Error)]
pub enum DictError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("invalid header (too short or inconsistent)")]
    InvalidHeader,

    #[error("invalid magic bytes")]
    InvalidMagic,

    #[error("unsupported version: {0}")]
    UnsupportedVersion(u16),

    #[error("range {offset}+{len} exceeds file length {file_len}")]
    Range {
        offset: u64,
        len: usize,
        file_len: u64,
    },

    #[error("malformed dictionary: {0}")]
    Format(#[from] FormatError),
}

/// A read that left the blob or followed an invalid pointer.
///
/// These abort the traversal path that hit them; they never abort a whole
/// query on their own.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FormatError {
    #[error("offset {offset} out of bounds (blob length {len})")]
    OutOfBounds { offset: usize, len: usize },

    #[error("pointer at {from} does not point forward (target {to})")]
    BackwardPointer { from: usize, to: usize },

    #[error("invalid code point {value:#x} at {offset}")]
    InvalidCodePoint { offset: usize, value: u32 },

    #[error("invalid attribute at {offset}")]
    InvalidAttribute { offset: usize },
}
