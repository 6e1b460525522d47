//! Distributed-filesystem backend: maps canonical names onto a remote
//! namespace reached through a [`DfsClient`] handle.
//!
//! The concrete RPC client is a collaborator, not part of this crate; the
//! handle mirrors the capability set of a Hadoop-style `FileSystem`
//! (status, one-level listing, open, create, mkdirs, delete). The backend
//! layers the FileSource semantics on top so the conformance battery cannot
//! tell it apart from the local backend.

use std::io::{Read, Write};
use std::sync::Arc;

use tracing::debug;

use crate::errors::{Result, SourceError};
use crate::mapper::{self, LayoutMode, FLAT_DELIMITER};

use super::FileSource;

/// Status of one remote entry, as reported by the client.
#[derive(Debug, Clone)]
pub struct DfsStatus {
    /// Full remote path of the entry.
    pub path: String,
    /// Byte length; zero for directories.
    pub len: u64,
    pub is_dir: bool,
}

/// Client handle to a remote namespace. Implementations wrap the actual
/// transport; all paths are `/`-separated absolute strings.
pub trait DfsClient: Send + Sync {
    /// Status of `path`, or `None` if nothing exists there.
    fn get_status(&self, path: &str) -> Result<Option<DfsStatus>>;

    /// One-level listing of the directory at `path`, or `None` if `path`
    /// does not exist.
    fn list_status(&self, path: &str) -> Result<Option<Vec<DfsStatus>>>;

    /// Open `path` for reading.
    fn open(&self, path: &str) -> Result<Box<dyn Read + Send>>;

    /// Create (or replace) the file at `path` for writing, creating missing
    /// parent directories. Content becomes visible when the stream is
    /// flushed and dropped.
    fn create(&self, path: &str) -> Result<Box<dyn Write + Send>>;

    /// Create the directory at `path` and any missing ancestors. Idempotent
    /// and safe under concurrent callers.
    fn mkdirs(&self, path: &str) -> Result<()>;

    /// Delete `path`, recursively for directories. Returns whether anything
    /// was removed.
    fn delete(&self, path: &str, recursive: bool) -> Result<bool>;

    /// Identifier of the namespace for log lines, e.g. an authority URI.
    fn describe(&self) -> String;
}

/// FileSource over a remote namespace behind a [`DfsClient`].
#[derive(Clone)]
pub struct DfsFileSource {
    client: Arc<dyn DfsClient>,
    root: String,
    layout: LayoutMode,
}

impl DfsFileSource {
    /// Create a source rooted at `root` within the client's namespace.
    pub fn new(client: Arc<dyn DfsClient>, root: impl Into<String>, layout: LayoutMode) -> Self {
        let mut root = root.into();
        while root.len() > 1 && root.ends_with('/') {
            root.pop();
        }
        DfsFileSource {
            client,
            root,
            layout,
        }
    }

    pub fn layout(&self) -> LayoutMode {
        self.layout
    }

    fn remote_path(&self, name: &str) -> Result<String> {
        mapper::validate_name(name)?;
        let rel = match self.layout {
            LayoutMode::Flat => name.to_string(),
            LayoutMode::Hierarchical => name.replace(FLAT_DELIMITER, "/"),
        };
        Ok(format!("{}/{}", self.root, rel))
    }

    /// Canonical name for a remote path under the root.
    fn name_for_remote(&self, path: &str) -> Result<String> {
        let rel = path
            .strip_prefix(&self.root)
            .and_then(|r| r.strip_prefix('/'))
            .ok_or_else(|| {
                SourceError::invalid_key(path, "remote path is not under the source root")
            })?;
        let name = rel.replace('/', &FLAT_DELIMITER.to_string());
        mapper::validate_name(&name)?;
        Ok(name)
    }

    fn require_root(&self) -> Result<()> {
        match self.client.get_status(&self.root)? {
            Some(status) if status.is_dir => Ok(()),
            _ => Err(SourceError::NotFound(self.root.clone())),
        }
    }

    fn collect_names(&self, dir: &str, recurse: bool, names: &mut Vec<String>) -> Result<()> {
        let entries = self
            .client
            .list_status(dir)?
            .ok_or_else(|| SourceError::NotFound(dir.to_string()))?;
        for status in entries {
            if status.is_dir {
                if recurse {
                    self.collect_names(&status.path, true, names)?;
                }
                continue;
            }
            // Foreign entries that cannot be expressed as names are
            // invisible, same as the local backend.
            if let Ok(name) = self.name_for_remote(&status.path) {
                names.push(name);
            }
        }
        Ok(())
    }
}

impl FileSource for DfsFileSource {
    fn ensure_exists(&self) -> Result<()> {
        self.client.mkdirs(&self.root)
    }

    fn list_all_names(&self) -> Result<Vec<String>> {
        self.require_root()?;
        let mut names = Vec::new();
        let recurse = self.layout == LayoutMode::Hierarchical;
        let root = self.root.clone();
        self.collect_names(&root, recurse, &mut names)?;
        names.sort();
        Ok(names)
    }

    fn exists(&self, name: &str) -> Result<bool> {
        let path = self.remote_path(name)?;
        Ok(matches!(self.client.get_status(&path)?, Some(s) if !s.is_dir))
    }

    fn size(&self, name: &str) -> Result<u64> {
        let path = self.remote_path(name)?;
        match self.client.get_status(&path)? {
            Some(status) if !status.is_dir => Ok(status.len),
            _ => Err(SourceError::NotFound(name.to_string())),
        }
    }

    fn open_reader(&self, name: &str) -> Result<Box<dyn Read + Send>> {
        let path = self.remote_path(name)?;
        match self.client.get_status(&path)? {
            Some(status) if !status.is_dir => self.client.open(&path),
            _ => Err(SourceError::NotFound(name.to_string())),
        }
    }

    fn open_writer(&self, name: &str) -> Result<Box<dyn Write + Send>> {
        let path = self.remote_path(name)?;
        debug!(name, path, "opened remote writer");
        self.client.create(&path)
    }

    fn clear(&self) -> Result<()> {
        self.require_root()?;
        let entries = self
            .client
            .list_status(&self.root)?
            .ok_or_else(|| SourceError::NotFound(self.root.clone()))?;
        for status in entries {
            self.client.delete(&status.path, true)?;
        }
        debug!(root = %self.root, "cleared source");
        Ok(())
    }

    fn describe(&self) -> String {
        format!("dfs:{}:{} [{}]", self.client.describe(), self.root, self.layout)
    }
}
