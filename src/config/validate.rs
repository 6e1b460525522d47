//! Config validation logic.
//! Verifies the configured root is usable before a source is built over it.

use anyhow::{bail, Result};
use std::path::PathBuf;
use tracing::debug;

use super::types::Config;

impl Config {
    /// Validate and normalize the configured root.
    ///
    /// - A root must be configured (file or CLI).
    /// - If the root exists it must be a directory; creation of a missing
    ///   root is left to `ensure_exists` on the source.
    ///
    /// Returns the normalized root path.
    pub fn validate(&self) -> Result<PathBuf> {
        let Some(root) = &self.root else {
            bail!("no root configured; pass --root or set <root> in the config file");
        };
        if root.as_os_str().is_empty() {
            bail!("configured root is empty");
        }
        if root.exists() && !root.is_dir() {
            bail!("configured root '{}' exists but is not a directory", root.display());
        }
        let normalized = dunce::canonicalize(root).unwrap_or_else(|_| root.clone());
        debug!(root = %normalized.display(), layout = %self.layout, "config validated");
        Ok(normalized)
    }
}
