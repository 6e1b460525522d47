//! In-process [`DfsClient`]: a shared in-memory namespace.
//!
//! Plays the role a test mini-cluster plays for a real distributed
//! filesystem: clones of one client share the same namespace, so several
//! sources (and several threads) can operate against it concurrently.

use std::collections::{BTreeMap, BTreeSet};
use std::io::{self, Cursor, Read, Write};
use std::sync::{Arc, Mutex, MutexGuard};

use crate::errors::{Result, SourceError};

use super::dfs::{DfsClient, DfsStatus};

#[derive(Debug, Default)]
struct Namespace {
    files: BTreeMap<String, Arc<Vec<u8>>>,
    dirs: BTreeSet<String>,
}

/// In-memory namespace handle. `Clone` shares the underlying namespace.
#[derive(Debug, Clone)]
pub struct MemDfsClient {
    authority: String,
    ns: Arc<Mutex<Namespace>>,
}

impl MemDfsClient {
    pub fn new(authority: impl Into<String>) -> Self {
        let mut ns = Namespace::default();
        ns.dirs.insert("/".to_string());
        MemDfsClient {
            authority: authority.into(),
            ns: Arc::new(Mutex::new(ns)),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Namespace> {
        // A panicked writer leaves the namespace consistent enough for
        // tests; recover rather than cascade the poison.
        self.ns.lock().unwrap_or_else(|e| e.into_inner())
    }
}

fn parent_of(path: &str) -> Option<&str> {
    let (dir, _) = path.rsplit_once('/')?;
    Some(if dir.is_empty() { "/" } else { dir })
}

fn check_path(path: &str) -> Result<()> {
    if !path.starts_with('/') || (path.len() > 1 && path.ends_with('/')) {
        return Err(SourceError::invalid_key(
            path,
            "remote paths must be absolute without a trailing slash",
        ));
    }
    Ok(())
}

fn insert_dirs(ns: &mut Namespace, path: &str) {
    let mut current = path;
    loop {
        if !ns.dirs.insert(current.to_string()) {
            break;
        }
        match parent_of(current) {
            Some(p) => current = p,
            None => break,
        }
    }
}

impl DfsClient for MemDfsClient {
    fn get_status(&self, path: &str) -> Result<Option<DfsStatus>> {
        check_path(path)?;
        let ns = self.lock();
        if let Some(bytes) = ns.files.get(path) {
            return Ok(Some(DfsStatus {
                path: path.to_string(),
                len: bytes.len() as u64,
                is_dir: false,
            }));
        }
        if ns.dirs.contains(path) {
            return Ok(Some(DfsStatus {
                path: path.to_string(),
                len: 0,
                is_dir: true,
            }));
        }
        Ok(None)
    }

    fn list_status(&self, path: &str) -> Result<Option<Vec<DfsStatus>>> {
        check_path(path)?;
        let ns = self.lock();
        if let Some(bytes) = ns.files.get(path) {
            return Ok(Some(vec![DfsStatus {
                path: path.to_string(),
                len: bytes.len() as u64,
                is_dir: false,
            }]));
        }
        if !ns.dirs.contains(path) {
            return Ok(None);
        }
        let mut entries = Vec::new();
        for dir in &ns.dirs {
            if parent_of(dir) == Some(path) {
                entries.push(DfsStatus {
                    path: dir.clone(),
                    len: 0,
                    is_dir: true,
                });
            }
        }
        for (file, bytes) in &ns.files {
            if parent_of(file) == Some(path) {
                entries.push(DfsStatus {
                    path: file.clone(),
                    len: bytes.len() as u64,
                    is_dir: false,
                });
            }
        }
        Ok(Some(entries))
    }

    fn open(&self, path: &str) -> Result<Box<dyn Read + Send>> {
        check_path(path)?;
        let ns = self.lock();
        match ns.files.get(path) {
            Some(bytes) => Ok(Box::new(Cursor::new(bytes.as_ref().clone()))),
            None => Err(SourceError::NotFound(path.to_string())),
        }
    }

    fn create(&self, path: &str) -> Result<Box<dyn Write + Send>> {
        check_path(path)?;
        Ok(Box::new(MemWriter {
            path: path.to_string(),
            buf: Vec::new(),
            ns: Arc::clone(&self.ns),
        }))
    }

    fn mkdirs(&self, path: &str) -> Result<()> {
        check_path(path)?;
        let mut ns = self.lock();
        if ns.files.contains_key(path) {
            return Err(SourceError::Io(io::Error::new(
                io::ErrorKind::AlreadyExists,
                format!("file exists at {path}"),
            )));
        }
        insert_dirs(&mut ns, path);
        Ok(())
    }

    fn delete(&self, path: &str, recursive: bool) -> Result<bool> {
        check_path(path)?;
        let mut ns = self.lock();
        if ns.files.remove(path).is_some() {
            return Ok(true);
        }
        if !ns.dirs.contains(path) {
            return Ok(false);
        }
        let prefix = format!("{path}/");
        let has_children = ns.files.keys().any(|f| f.starts_with(&prefix))
            || ns.dirs.iter().any(|d| d.starts_with(&prefix));
        if has_children && !recursive {
            return Err(SourceError::Io(io::Error::other(format!(
                "directory not empty: {path}"
            ))));
        }
        ns.files.retain(|f, _| !f.starts_with(&prefix));
        ns.dirs.retain(|d| d != path && !d.starts_with(&prefix));
        Ok(true)
    }

    fn describe(&self) -> String {
        format!("mem://{}", self.authority)
    }
}

/// Buffers writes and publishes the file into the namespace when dropped,
/// so a partially written artifact is never visible.
struct MemWriter {
    path: String,
    buf: Vec<u8>,
    ns: Arc<Mutex<Namespace>>,
}

impl Write for MemWriter {
    fn write(&mut self, data: &[u8]) -> io::Result<usize> {
        self.buf.extend_from_slice(data);
        Ok(data.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Drop for MemWriter {
    fn drop(&mut self) {
        let mut ns = self.ns.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(parent) = parent_of(&self.path) {
            insert_dirs(&mut ns, parent);
        }
        ns.files
            .insert(std::mem::take(&mut self.path), Arc::new(std::mem::take(&mut self.buf)));
    }
}
