//! Well-known file locations and path hygiene helpers.

use anyhow::{Context, Result};
use std::env;
use std::path::{Path, PathBuf};

use dirs::{config_dir, data_dir};

const CONFIG_FILE_NAME: &str = "config.xml";

/// Config file location.
///
/// Order:
///  - `FSOURCE_CONFIG` if set: used as-is, or joined with `config.xml` when
///    it names a directory; relative values resolve against the current dir.
///  - OS-appropriate per-user config dir: `<config_dir>/fsource/config.xml`.
pub fn default_config_path() -> Result<PathBuf> {
    if let Some(raw) = env::var_os("FSOURCE_CONFIG") {
        let mut p = PathBuf::from(raw);
        if p.is_relative() {
            let cwd = env::current_dir().context("determine current directory")?;
            p = cwd.join(p);
        }
        if p.is_dir() {
            p = p.join(CONFIG_FILE_NAME);
        }
        return Ok(p);
    }
    let base = config_dir().context("no per-user config directory on this platform")?;
    Ok(base.join("fsource").join(CONFIG_FILE_NAME))
}

/// Default log file under the per-user data dir.
pub fn default_log_path() -> Result<PathBuf> {
    let base = data_dir().context("no per-user data directory on this platform")?;
    Ok(base.join("fsource").join("fsource.log"))
}

/// Whether any existing ancestor of `path` is a symlink. Used to refuse
/// file logging through redirected directories.
pub fn path_has_symlink_ancestor(path: &Path) -> std::io::Result<bool> {
    let mut current = path.parent();
    while let Some(dir) = current {
        if dir.as_os_str().is_empty() {
            break;
        }
        match std::fs::symlink_metadata(dir) {
            Ok(meta) if meta.file_type().is_symlink() => return Ok(true),
            Ok(_) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => return Err(e),
        }
        current = dir.parent();
    }
    Ok(false)
}
