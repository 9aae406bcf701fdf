//! Dictionary file header.
//!
//! ```text
//! magic(4) version(2) options(2) header_size(4) attributes...
//! ```
//!
//! Attributes are `key 0x1F value 0x1F` pairs of encoded code points filling
//! the space up to `header_size`, which is also the offset of the trie root.

use super::format::read_code_point;
use super::{DictError, FormatError};

pub const MAGIC: [u8; 4] = [0x9B, 0xC1, 0x3A, 0xFE];
pub const VERSION: u16 = 2;
/// magic(4) + version(2) + options(2) + header_size(4)
pub const FIXED_HEADER_SIZE: usize = 4 + 2 + 2 + 4;

/// Dictionary-level option bits, read once at load.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DictFlags(u16);

impl DictFlags {
    pub const GERMAN_UMLAUT_PROCESSING: u16 = 0x1;
    pub const SUPPORTS_DYNAMIC_UPDATE: u16 = 0x2;
    pub const FRENCH_LIGATURE_PROCESSING: u16 = 0x4;

    pub fn from_bits(bits: u16) -> Self {
        Self(bits)
    }

    pub fn bits(self) -> u16 {
        self.0
    }

    pub fn contains(self, flag: u16) -> bool {
        self.0 & flag == flag
    }

    pub fn requires_german_umlaut_processing(self) -> bool {
        self.contains(Self::GERMAN_UMLAUT_PROCESSING)
    }

    pub fn supports_dynamic_update(self) -> bool {
        self.contains(Self::SUPPORTS_DYNAMIC_UPDATE)
    }

    pub fn requires_french_ligature_processing(self) -> bool {
        self.contains(Self::FRENCH_LIGATURE_PROCESSING)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Header {
    version: u16,
    flags: DictFlags,
    size: usize,
    attributes: Vec<(String, String)>,
}

impl Header {
    pub fn parse(buf: &[u8]) -> Result<Self, DictError> {
        if buf.len() < FIXED_HEADER_SIZE {
            return Err(DictError::InvalidHeader);
        }
        if buf[..4] != MAGIC {
            return Err(DictError::InvalidMagic);
        }
        let version = u16::from_be_bytes([buf[4], buf[5]]);
        if version != VERSION {
            return Err(DictError::UnsupportedVersion(version));
        }
        let flags = DictFlags(u16::from_be_bytes([buf[6], buf[7]]));
        let size = u32::from_be_bytes([buf[8], buf[9], buf[10], buf[11]]) as usize;
        // The root array needs at least its group count byte.
        if size < FIXED_HEADER_SIZE || size >= buf.len() {
            return Err(DictError::InvalidHeader);
        }
        let attributes = parse_attributes(&buf[..size], FIXED_HEADER_SIZE)?;
        Ok(Self {
            version,
            flags,
            size,
            attributes,
        })
    }

    pub fn version(&self) -> u16 {
        self.version
    }

    pub fn flags(&self) -> DictFlags {
        self.flags
    }

    /// Offset of the root char-group array.
    pub fn root(&self) -> usize {
        self.size
    }

    pub fn attributes(&self) -> &[(String, String)] {
        &self.attributes
    }

    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

fn parse_attributes(buf: &[u8], mut pos: usize) -> Result<Vec<(String, String)>, FormatError> {
    let mut attributes = Vec::new();
    while pos < buf.len() {
        let (key, next) = read_string(buf, pos)?;
        let (value, next) = read_string(buf, next)?;
        attributes.push((key, value));
        pos = next;
    }
    Ok(attributes)
}

/// Read code points up to and including the terminator.
pub(crate) fn read_string(buf: &[u8], mut pos: usize) -> Result<(String, usize), FormatError> {
    let mut s = String::new();
    loop {
        let (c, next) = read_code_point(buf, pos)?;
        pos = next;
        match c {
            Some(c) => s.push(c),
            None => return Ok((s, pos)),
        }
    }
}
