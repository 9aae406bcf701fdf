use std::fs::File;
use std::path::Path;

use memmap2::{Mmap, MmapOptions};
use tracing::debug;

use super::DictError;
use crate::dictionary::Dictionary;

/// Backing storage for dictionary bytes: either owned or memory-mapped.
enum Storage {
    Owned(Vec<u8>),
    Mapped(Mmap),
}

/// Owner of a dictionary blob.
///
/// `Dictionary` only borrows the bytes, so a `DictionaryFile` must outlive
/// every `Dictionary` built from it; the borrow checker enforces this.
pub struct DictionaryFile {
    storage: Storage,
}

impl DictionaryFile {
    /// Map a whole dictionary file.
    pub fn open(path: &Path) -> Result<Self, DictError> {
        let file = File::open(path)?;
        // SAFETY: The file is opened read-only and the mapping is immutable.
        // We hold the Mmap for the lifetime of this struct, so the data remains
        // valid. The file should not be modified while it is mapped.
        let mmap = unsafe { Mmap::map(&file)? };
        debug!(path = %path.display(), len = mmap.len(), "mapped dictionary");
        Ok(Self {
            storage: Storage::Mapped(mmap),
        })
    }

    /// Map a dictionary embedded at `offset..offset + len` of a larger file.
    pub fn open_range(path: &Path, offset: u64, len: usize) -> Result<Self, DictError> {
        let file = File::open(path)?;
        let file_len = file.metadata()?.len();
        let end = offset.checked_add(len as u64);
        if end.map_or(true, |end| end > file_len) {
            return Err(DictError::Range {
                offset,
                len,
                file_len,
            });
        }
        // SAFETY: Same as `open`; the range was checked against the file length.
        let mmap = unsafe { MmapOptions::new().offset(offset).len(len).map(&file)? };
        debug!(path = %path.display(), offset, len, "mapped dictionary range");
        Ok(Self {
            storage: Storage::Mapped(mmap),
        })
    }

    pub fn from_bytes(data: Vec<u8>) -> Self {
        Self {
            storage: Storage::Owned(data),
        }
    }

    pub fn as_bytes(&self) -> &[u8] {
        match &self.storage {
            Storage::Owned(data) => data.as_slice(),
            Storage::Mapped(mmap) => &mmap[..],
        }
    }

    pub fn len(&self) -> usize {
        self.as_bytes().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_mapped(&self) -> bool {
        matches!(self.storage, Storage::Mapped(_))
    }

    /// Parse the header and build a dictionary over these bytes.
    pub fn dictionary(&self) -> Result<Dictionary<'_>, DictError> {
        Dictionary::new(self.as_bytes())
    }
}
