//! XML configuration support.
//! - Loads settings from config.xml (quick_xml).
//! - Creates a secure template if missing (unless FSOURCE_CONFIG is set).
//!
//! This module only reads/writes the config file; root validation happens
//! elsewhere. Unknown XML fields are a hard error so misconfigurations
//! surface early.

use anyhow::{bail, Context, Result};
use quick_xml::de::from_str as from_xml_str;
use serde::Deserialize;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::mapper::LayoutMode;

use super::paths::default_config_path;
use super::types::{Config, LogLevel};

/// Struct mirroring the XML config for deserialization.
#[derive(Debug, Deserialize)]
#[serde(rename = "config")]
#[serde(deny_unknown_fields)]
struct XmlConfig {
    root: Option<String>,
    layout: Option<String>,
    log_level: Option<String>,
    log_file: Option<String>,
}

/// Result of looking for a config file at startup.
#[derive(Debug)]
pub enum LoadResult {
    /// Config file found and parsed.
    Loaded(Config),
    /// No file existed at the default location; a template was written.
    CreatedTemplate(PathBuf),
    /// FSOURCE_CONFIG points somewhere with no file; nothing was created.
    NoConfig,
}

/// Locate and load the config file, writing a template at the default
/// location on first run.
pub fn load_or_init() -> Result<LoadResult> {
    let env_set = env::var_os("FSOURCE_CONFIG").is_some();
    let cfg_path = default_config_path()?;

    if !cfg_path.exists() {
        if env_set {
            return Ok(LoadResult::NoConfig);
        }
        create_template_config(&cfg_path)
            .with_context(|| format!("write template config to '{}'", cfg_path.display()))?;
        return Ok(LoadResult::CreatedTemplate(cfg_path));
    }

    let cfg = load_config_from_xml_path(&cfg_path)?;
    debug!(path = %cfg_path.display(), "loaded config");
    Ok(LoadResult::Loaded(cfg))
}

/// Read and parse a config file at an explicit path.
pub fn load_config_from_xml_path(path: &Path) -> Result<Config> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("read config file '{}'", path.display()))?;
    let parsed: XmlConfig = match from_xml_str(&content) {
        Ok(x) => x,
        Err(e) => {
            let msg = e.to_string();
            if msg.contains("unknown field") {
                bail!(
                    "unknown field in fsource config {}: {}",
                    path.display(),
                    msg
                );
            }
            bail!("failed to parse config '{}': {}", path.display(), msg);
        }
    };

    let layout = match parsed.layout {
        Some(raw) => LayoutMode::parse(raw.trim())
            .with_context(|| format!("invalid layout '{}' in '{}'", raw.trim(), path.display()))?,
        None => LayoutMode::default(),
    };
    let log_level = parsed
        .log_level
        .as_deref()
        .and_then(|s| LogLevel::parse(s.trim()))
        .unwrap_or_default();
    Ok(Config {
        root: parsed.root.map(|s| PathBuf::from(s.trim())),
        layout,
        log_level,
        log_file: parsed
            .log_file
            .map(|s| PathBuf::from(s.trim()))
            .filter(|p| !p.as_os_str().is_empty()),
    })
}

/// Create parent directory and write a small template config with
/// conservative permissions (dir 0o700, file 0o600 on Unix).
fn create_template_config(path: &Path) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            // Best-effort: ignore permission errors on unusual filesystems.
            let _ = fs::set_permissions(parent, fs::Permissions::from_mode(0o700));
        }
    }

    let content = "<config>\n  <root>/data/fsource</root>\n  <layout>flat</layout>\n  <log_level>normal</log_level>\n</config>\n";
    fs::write(path, content)?;
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let _ = fs::set_permissions(path, fs::Permissions::from_mode(0o600));
    }
    Ok(())
}
