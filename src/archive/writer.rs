use std::io::{Cursor, Write};
use std::path::Path;

use anyhow::Context;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::foundation::error::BootAnimResult;

fn stored() -> SimpleFileOptions {
    SimpleFileOptions::default().compression_method(CompressionMethod::Stored)
}

/// Builds a stored-only (uncompressed) archive in memory.
///
/// Members are written in insertion order; the directory follows the last payload and the
/// directory-end record closes the file.
pub struct StoredArchiveWriter {
    zip: ZipWriter<Cursor<Vec<u8>>>,
    entries: usize,
}

impl Default for StoredArchiveWriter {
    fn default() -> Self {
        Self {
            zip: ZipWriter::new(Cursor::new(Vec::new())),
            entries: 0,
        }
    }
}

impl std::fmt::Debug for StoredArchiveWriter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoredArchiveWriter")
            .field("entries", &self.entries)
            .finish_non_exhaustive()
    }
}

impl StoredArchiveWriter {
    /// Create an empty writer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the trailing archive comment.
    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.zip.set_comment(comment.into());
        self
    }

    /// Number of members added so far.
    pub fn len(&self) -> usize {
        self.entries
    }

    /// Return `true` when nothing has been added.
    pub fn is_empty(&self) -> bool {
        self.entries == 0
    }

    /// Add a stored file member.
    pub fn add_file(&mut self, name: &str, data: &[u8]) -> BootAnimResult<()> {
        self.zip
            .start_file(name, stored())
            .with_context(|| format!("start archive member '{name}'"))?;
        self.zip
            .write_all(data)
            .with_context(|| format!("write archive member '{name}'"))?;
        self.entries += 1;
        Ok(())
    }

    /// Add an empty directory member; `name` gets a trailing `/` if missing.
    pub fn add_directory(&mut self, name: &str) -> BootAnimResult<()> {
        self.zip
            .add_directory(name, stored())
            .with_context(|| format!("add archive directory '{name}'"))?;
        self.entries += 1;
        Ok(())
    }

    /// Serialize the archive.
    pub fn finish(self) -> BootAnimResult<Vec<u8>> {
        let cursor = self.zip.finish().context("finish archive")?;
        Ok(cursor.into_inner())
    }

    /// Serialize the archive and write it to `path`.
    pub fn write_to_path(self, path: impl AsRef<Path>) -> BootAnimResult<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, self.finish()?)?;
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/archive/writer.rs"]
mod tests;
