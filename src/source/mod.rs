//! The FileSource contract and its backends.
//!
//! A FileSource is a root-scoped namespace of named artifacts. Backends
//! differ in where bytes live (local disk, a remote namespace behind a
//! client handle) but must be indistinguishable through this trait,
//! including their error behavior, so any two instances can be composed by
//! the cross-backend copier.

mod copy;
mod dfs;
mod local;
mod mem;

pub use copy::{copy_source, CopyStats};
pub use dfs::{DfsClient, DfsFileSource, DfsStatus};
pub use local::LocalFileSource;
pub use mem::MemDfsClient;

use std::io::{Read, Write};

use crate::errors::{Result, SourceError};

/// Backend-polymorphic storage over a single root.
///
/// Implementations must be safely callable from multiple worker threads
/// against the same root. `ensure_exists` is race-safe as a hard guarantee;
/// concurrent writers to the same name have last-writer-wins outcome, and
/// the contract offers no locking beyond that.
pub trait FileSource: Send + Sync {
    /// Create the root container if missing. Idempotent; concurrent callers
    /// must not fail each other, and the end state is always "root exists".
    fn ensure_exists(&self) -> Result<()>;

    /// All artifact names currently under the root, sorted ascending.
    ///
    /// Fails with `NotFound` if the root itself does not exist; an existing
    /// but empty root yields an empty Vec, never an error.
    fn list_all_names(&self) -> Result<Vec<String>>;

    /// Whether `name` is present. Never errors for absence; a missing root
    /// simply means the artifact is absent.
    fn exists(&self, name: &str) -> Result<bool>;

    /// Byte length of `name`. `NotFound` if absent.
    fn size(&self, name: &str) -> Result<u64>;

    /// Open `name` for reading. `NotFound` if absent. The returned stream is
    /// single-owner; the caller must drop it on every exit path before the
    /// artifact is rewritten.
    fn open_reader(&self, name: &str) -> Result<Box<dyn Read + Send>>;

    /// Open `name` for writing, creating missing intermediate segments and
    /// truncating any previous artifact. Content is durable once the stream
    /// is flushed and dropped.
    fn open_writer(&self, name: &str) -> Result<Box<dyn Write + Send>>;

    /// Remove every artifact under the root. The root container itself
    /// survives, so `ensure_exists` stays satisfied without being called
    /// again. `NotFound` if the root does not exist.
    fn clear(&self) -> Result<()>;

    /// Human-readable description of the instance for log lines.
    fn describe(&self) -> String;

    /// Full content of `name`. `NotFound` if absent.
    fn get_bytes(&self, name: &str) -> Result<Vec<u8>> {
        let mut reader = self.open_reader(name)?;
        let mut buf = Vec::new();
        reader.read_to_end(&mut buf)?;
        Ok(buf)
    }

    /// Like [`FileSource::get_bytes`], but absence yields `None` instead of
    /// an error.
    fn get_bytes_if_exists(&self, name: &str) -> Result<Option<Vec<u8>>> {
        match self.get_bytes(name) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(SourceError::NotFound(_)) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Like [`FileSource::open_reader`], but absence yields `None` instead
    /// of an error.
    fn open_reader_if_exists(&self, name: &str) -> Result<Option<Box<dyn Read + Send>>> {
        match self.open_reader(name) {
            Ok(reader) => Ok(Some(reader)),
            Err(SourceError::NotFound(_)) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Write `content` as the whole artifact `name`, replacing any previous
    /// content.
    fn add_bytes(&self, name: &str, content: &[u8]) -> Result<()> {
        let mut writer = self.open_writer(name)?;
        writer.write_all(content)?;
        writer.flush()?;
        Ok(())
    }

    /// Stream `reader` to completion into artifact `name`. Returns the byte
    /// count written.
    fn add_from_reader(&self, name: &str, reader: &mut dyn Read) -> Result<u64> {
        let mut writer = self.open_writer(name)?;
        let bytes = std::io::copy(reader, &mut writer)?;
        writer.flush()?;
        Ok(bytes)
    }

    /// Copy every artifact of `other` into this source under the same
    /// logical names, across any pair of backends and layout modes. With
    /// `overwrite` unset, pre-existing destination names are skipped.
    fn copy_from(&self, other: &dyn FileSource, overwrite: bool) -> Result<CopyStats> {
        copy_source(other, self, overwrite)
    }
}
