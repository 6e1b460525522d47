//! Local-filesystem backend: maps canonical names directly onto a host
//! directory tree rooted at a base directory.
//!
//! Whole-artifact writes go through a temp file in the destination
//! directory followed by an atomic rename, so concurrent readers never
//! observe a torn artifact. Temp files carry a reserved dot prefix and are
//! invisible to enumeration.

use std::fs::{self, File, OpenOptions};
use std::io::{BufReader, BufWriter, ErrorKind, Read, Write};
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::errors::{io_to_source, Result, SourceError};
use crate::mapper::{self, LayoutMode, TEMP_PREFIX};

use super::FileSource;

/// 1 MiB buffers keep syscall counts low on large artifacts.
const BUF_SIZE: usize = 1024 * 1024;

/// FileSource over a local directory tree.
#[derive(Debug, Clone)]
pub struct LocalFileSource {
    root: PathBuf,
    layout: LayoutMode,
}

impl LocalFileSource {
    /// Create a source over `root` with the given layout. The root is not
    /// created here; call [`FileSource::ensure_exists`] first.
    pub fn new(root: impl Into<PathBuf>, layout: LayoutMode) -> Self {
        let root = root.into();
        // Resolve symlinks for stable log lines; keep the given path if the
        // root does not exist yet.
        let root = dunce::canonicalize(&root).unwrap_or(root);
        LocalFileSource { root, layout }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn layout(&self) -> LayoutMode {
        self.layout
    }

    fn abs_path(&self, name: &str) -> Result<PathBuf> {
        let rel = mapper::name_to_rel_path(name, self.layout)?;
        Ok(self.root.join(rel))
    }

    fn require_root(&self) -> Result<()> {
        if !self.root.is_dir() {
            return Err(SourceError::NotFound(self.root.display().to_string()));
        }
        Ok(())
    }
}

impl FileSource for LocalFileSource {
    fn ensure_exists(&self) -> Result<()> {
        match fs::create_dir_all(&self.root) {
            Ok(()) => Ok(()),
            // A racing creator can surface AlreadyExists; the end state is
            // still "root exists".
            Err(e) if e.kind() == ErrorKind::AlreadyExists && self.root.is_dir() => Ok(()),
            Err(e) => Err(SourceError::Io(e)),
        }
    }

    fn list_all_names(&self) -> Result<Vec<String>> {
        self.require_root()?;
        let max_depth = match self.layout {
            LayoutMode::Flat => 1,
            LayoutMode::Hierarchical => usize::MAX,
        };
        let mut names = Vec::new();
        for entry in WalkDir::new(&self.root).min_depth(1).max_depth(max_depth) {
            let entry = entry.map_err(|e| {
                SourceError::Io(e.into_io_error().unwrap_or_else(|| {
                    std::io::Error::other("filesystem walk failed")
                }))
            })?;
            if !entry.file_type().is_file() {
                continue;
            }
            if entry.file_name().to_string_lossy().starts_with('.') {
                // Reserved for in-flight temp files; never a valid name.
                continue;
            }
            let rel = entry
                .path()
                .strip_prefix(&self.root)
                .expect("walked entry is under the root");
            match mapper::rel_path_to_name(rel) {
                Ok(name) => names.push(name),
                Err(e) => {
                    warn!(path = %entry.path().display(), error = %e,
                        "skipping entry that does not map to a name");
                }
            }
        }
        names.sort();
        Ok(names)
    }

    fn exists(&self, name: &str) -> Result<bool> {
        Ok(self.abs_path(name)?.is_file())
    }

    fn size(&self, name: &str) -> Result<u64> {
        let path = self.abs_path(name)?;
        let meta = fs::metadata(&path).map_err(|e| io_to_source(e, name))?;
        if !meta.is_file() {
            return Err(SourceError::NotFound(name.to_string()));
        }
        Ok(meta.len())
    }

    fn open_reader(&self, name: &str) -> Result<Box<dyn Read + Send>> {
        let path = self.abs_path(name)?;
        if !path.is_file() {
            return Err(SourceError::NotFound(name.to_string()));
        }
        let file = File::open(&path).map_err(|e| io_to_source(e, name))?;
        Ok(Box::new(BufReader::with_capacity(BUF_SIZE, file)))
    }

    fn open_writer(&self, name: &str) -> Result<Box<dyn Write + Send>> {
        let path = self.abs_path(name)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let file = File::create(&path)?;
        debug!(name, path = %path.display(), "opened writer");
        Ok(Box::new(BufWriter::with_capacity(BUF_SIZE, file)))
    }

    fn add_bytes(&self, name: &str, content: &[u8]) -> Result<()> {
        let dest = self.abs_path(name)?;
        let dest_dir = dest
            .parent()
            .ok_or_else(|| SourceError::invalid_key(name, "name resolves to the root itself"))?;
        fs::create_dir_all(dest_dir)?;

        // Write to a temp file in the destination directory, fsync, then
        // rename into place so readers see the old or the new artifact,
        // never a partial one.
        let tmp = unique_temp_path(dest_dir);
        let result = (|| -> Result<()> {
            let mut f = OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(&tmp)?;
            f.write_all(content)?;
            f.sync_all()?;
            fs::rename(&tmp, &dest)?;
            Ok(())
        })();
        match &result {
            Ok(()) => {
                debug!(name, bytes = content.len(), dest = %dest.display(), "added artifact");
            }
            Err(_) => {
                // Best-effort cleanup of the temp file on failure.
                let _ = fs::remove_file(&tmp);
            }
        }
        result
    }

    fn clear(&self) -> Result<()> {
        self.require_root()?;
        for entry in fs::read_dir(&self.root)? {
            let entry = entry?;
            let path = entry.path();
            if entry.file_type()?.is_dir() {
                fs::remove_dir_all(&path)?;
            } else {
                fs::remove_file(&path)?;
            }
        }
        debug!(root = %self.root.display(), "cleared source");
        Ok(())
    }

    fn describe(&self) -> String {
        format!("local:{} [{}]", self.root.display(), self.layout)
    }
}

/// Allocate a unique temp path inside `dir`. Pattern:
/// ".fsource.<pid>.<nanos>[.<attempt>].tmp".
fn unique_temp_path(dir: &Path) -> PathBuf {
    let pid = std::process::id();
    let nanos = SystemTime::now()
        .duration_since(SystemTime::UNIX_EPOCH)
        .map(|d| d.subsec_nanos())
        .unwrap_or_default();
    let mut candidate = dir.join(format!("{TEMP_PREFIX}{pid}.{nanos}.tmp"));
    let mut attempt = 0u32;
    while candidate.exists() && attempt < 16 {
        attempt += 1;
        candidate = dir.join(format!("{TEMP_PREFIX}{pid}.{nanos}.{attempt}.tmp"));
    }
    candidate
}
