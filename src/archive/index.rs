use std::borrow::Cow;
use std::ops::Range;
use std::path::Path;
use std::sync::Arc;

use super::{
    CDIR_END_LEN, CDIR_END_SIG, CDIR_ENTRY_LEN, CDIR_ENTRY_SIG, LOCAL_HEADER_LEN,
    LOCAL_HEADER_SIG,
};
use crate::foundation::error::{BootAnimError, BootAnimResult, ContainerErrorKind};
use crate::foundation::math::{le_u16, le_u32};

/// One central-directory record, held as offsets into the archive bytes.
///
/// Entries are only produced by [`ArchiveIndex`] and are guaranteed to lie entirely inside the
/// directory region of the archive they came from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DirectoryEntry {
    index: usize,
    record: Range<usize>,
    name: Range<usize>,
    compression: u16,
    compressed_size: u32,
    uncompressed_size: u32,
    local_header_offset: u32,
}

impl DirectoryEntry {
    /// Position of this entry in on-disk directory order.
    pub fn index(&self) -> usize {
        self.index
    }

    /// Byte range of the whole directory record (fixed part, name, extra and comment).
    pub fn record_range(&self) -> Range<usize> {
        self.record.clone()
    }

    /// Length of the member name in bytes.
    pub fn name_len(&self) -> usize {
        self.name.len()
    }

    /// Compression method recorded for the member; `0` means stored.
    pub fn compression(&self) -> u16 {
        self.compression
    }

    /// Whether the member is stored without compression.
    pub fn is_stored(&self) -> bool {
        self.compression == 0
    }

    /// Payload size as recorded in the directory (the stored size).
    pub fn data_size(&self) -> u32 {
        self.compressed_size
    }

    /// Uncompressed size recorded in the directory.
    pub fn uncompressed_size(&self) -> u32 {
        self.uncompressed_size
    }

    /// File offset of the member's local header.
    pub fn local_header_offset(&self) -> u32 {
        self.local_header_offset
    }
}

/// Validated byte range of one member's payload.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PayloadRef {
    range: Range<usize>,
}

impl PayloadRef {
    /// Byte range inside the archive.
    pub fn range(&self) -> Range<usize> {
        self.range.clone()
    }

    /// Payload length in bytes.
    pub fn len(&self) -> usize {
        self.range.len()
    }

    /// Return `true` when the payload is empty.
    pub fn is_empty(&self) -> bool {
        self.range.is_empty()
    }
}

/// Read-only, directory-indexed view of a stored archive.
///
/// The archive bytes are owned immutably; the directory is walked once at open time and
/// materialized as an ordered list of [`DirectoryEntry`] values. Walking stops at the recorded
/// entry count, at the end of the directory region, or at the first record that fails its
/// signature check, whichever comes first.
#[derive(Clone)]
pub struct ArchiveIndex {
    data: Arc<[u8]>,
    end_offset: usize,
    cdir: Range<usize>,
    recorded_entries: u16,
    entries: Vec<DirectoryEntry>,
}

impl std::fmt::Debug for ArchiveIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ArchiveIndex")
            .field("len", &self.data.len())
            .field("end_offset", &self.end_offset)
            .field("cdir", &self.cdir)
            .field("entries", &self.entries.len())
            .finish()
    }
}

impl ArchiveIndex {
    /// Read the archive at `path` and index its directory.
    pub fn open(path: impl AsRef<Path>) -> BootAnimResult<Self> {
        let path = path.as_ref();
        let data = std::fs::read(path).map_err(|e| {
            BootAnimError::container(
                ContainerErrorKind::NotFound,
                format!("open archive '{}': {e}", path.display()),
            )
        })?;
        Self::from_bytes(data)
    }

    /// Index an archive already held in memory.
    pub fn from_bytes(data: impl Into<Arc<[u8]>>) -> BootAnimResult<Self> {
        let data: Arc<[u8]> = data.into();
        if data.len() < CDIR_END_LEN {
            return Err(BootAnimError::container(
                ContainerErrorKind::TooSmall,
                format!(
                    "archive is {} bytes, shorter than a directory-end record",
                    data.len()
                ),
            ));
        }

        // Scan backwards: the end record may be followed by a comment of unknown length.
        let end_offset = (0..=data.len() - CDIR_END_LEN)
            .rev()
            .find(|&off| le_u32(&data, off) == Some(CDIR_END_SIG))
            .ok_or_else(|| {
                BootAnimError::container(
                    ContainerErrorKind::CorruptDirectory,
                    "directory-end record not found",
                )
            })?;

        let corrupt = || {
            BootAnimError::container(
                ContainerErrorKind::CorruptDirectory,
                "directory region extends past the directory-end record",
            )
        };
        let recorded_entries = le_u16(&data, end_offset + 10).ok_or_else(corrupt)?;
        let cdir_size = le_u32(&data, end_offset + 12).ok_or_else(corrupt)? as usize;
        let cdir_offset = le_u32(&data, end_offset + 16).ok_or_else(corrupt)? as usize;
        let cdir_limit = cdir_offset.checked_add(cdir_size).ok_or_else(corrupt)?;
        if cdir_limit > end_offset {
            return Err(corrupt());
        }

        let mut index = Self {
            data,
            end_offset,
            cdir: cdir_offset..cdir_limit,
            recorded_entries,
            entries: Vec::new(),
        };
        index.entries = index.walk_directory();
        Ok(index)
    }

    fn walk_directory(&self) -> Vec<DirectoryEntry> {
        let mut entries = Vec::with_capacity(usize::from(self.recorded_entries));
        let mut offset = self.cdir.start;
        while entries.len() < usize::from(self.recorded_entries) {
            let Some(entry) = self.read_entry(entries.len(), offset) else {
                break;
            };
            offset = entry.record.end;
            entries.push(entry);
        }
        entries
    }

    fn read_entry(&self, index: usize, offset: usize) -> Option<DirectoryEntry> {
        // Only the directory region is visible to the walker.
        let dir = self.data.get(..self.cdir.end)?;
        if offset.checked_add(CDIR_ENTRY_LEN)? > dir.len() {
            return None;
        }
        if le_u32(dir, offset)? != CDIR_ENTRY_SIG {
            return None;
        }

        let name_len = usize::from(le_u16(dir, offset + 28)?);
        let extra_len = usize::from(le_u16(dir, offset + 30)?);
        let comment_len = usize::from(le_u16(dir, offset + 32)?);
        let record_end = offset + CDIR_ENTRY_LEN + name_len + extra_len + comment_len;
        if record_end > dir.len() {
            return None;
        }

        let name_start = offset + CDIR_ENTRY_LEN;
        Some(DirectoryEntry {
            index,
            record: offset..record_end,
            name: name_start..name_start + name_len,
            compression: le_u16(dir, offset + 10)?,
            compressed_size: le_u32(dir, offset + 20)?,
            uncompressed_size: le_u32(dir, offset + 24)?,
            local_header_offset: le_u32(dir, offset + 42)?,
        })
    }

    /// Forward cursor over the directory.
    ///
    /// `None` yields the first entry; otherwise the entry immediately following `prev`. Returns
    /// `None` past the last valid entry.
    pub fn iterate(&self, prev: Option<&DirectoryEntry>) -> Option<&DirectoryEntry> {
        let next = match prev {
            None => 0,
            Some(p) => p.index.checked_add(1)?,
        };
        self.entries.get(next)
    }

    /// All valid entries in on-disk order.
    pub fn entries(&self) -> std::slice::Iter<'_, DirectoryEntry> {
        self.entries.iter()
    }

    /// Number of valid entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Return `true` when no valid entry was found.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entry count recorded in the directory-end record.
    pub fn recorded_entry_count(&self) -> u16 {
        self.recorded_entries
    }

    /// Total archive size in bytes.
    pub fn byte_len(&self) -> usize {
        self.data.len()
    }

    /// Raw member name bytes.
    pub fn entry_name_bytes(&self, entry: &DirectoryEntry) -> &[u8] {
        self.data.get(entry.name.clone()).unwrap_or_default()
    }

    /// Member name, lossily decoded as UTF-8.
    pub fn entry_name(&self, entry: &DirectoryEntry) -> Cow<'_, str> {
        String::from_utf8_lossy(self.entry_name_bytes(entry))
    }

    /// First entry whose name equals `name` exactly.
    pub fn find(&self, name: &str) -> Option<&DirectoryEntry> {
        self.entries
            .iter()
            .find(|e| self.entry_name_bytes(e) == name.as_bytes())
    }

    /// Resolve `entry` to its payload by reading the member's local header.
    ///
    /// Returns `None` when the local header is missing or when the payload would run past the
    /// directory-end record, which guards against corrupt header offsets.
    pub fn payload_of(&self, entry: &DirectoryEntry) -> Option<PayloadRef> {
        let header = entry.local_header_offset as usize;
        if le_u32(&self.data, header)? != LOCAL_HEADER_SIG {
            return None;
        }
        let name_len = usize::from(le_u16(&self.data, header + 26)?);
        let extra_len = usize::from(le_u16(&self.data, header + 28)?);

        let start = header
            .checked_add(LOCAL_HEADER_LEN)?
            .checked_add(name_len)?
            .checked_add(extra_len)?;
        let end = start.checked_add(entry.compressed_size as usize)?;
        if end > self.end_offset {
            return None;
        }
        Some(PayloadRef { range: start..end })
    }

    /// Borrow the bytes of a payload previously resolved by this index.
    pub fn payload_bytes(&self, payload: &PayloadRef) -> &[u8] {
        self.data.get(payload.range.clone()).unwrap_or_default()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/archive/index.rs"]
mod tests;
