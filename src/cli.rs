//! CLI definition and parsing.
//! Defines Args and provides parse() for command-line handling.
//!
//! CLI flags override config values (which are loaded from XML if present).

use clap::{Parser, Subcommand, ValueHint};
use std::path::PathBuf;

use crate::config::{Config, LogLevel};
use crate::mapper::LayoutMode;

/// Keyed artifact storage: list, read, write, clear and copy artifacts
/// under a configured root.
#[derive(Parser, Debug, Clone)]
#[command(author, version, about = "Keyed artifact storage over filesystem roots")]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Root directory to operate under (overrides the config file).
    #[arg(long, value_hint = ValueHint::DirPath, global = true)]
    pub root: Option<PathBuf>,

    /// Name layout under the root: flat or hierarchical.
    #[arg(long, global = true)]
    pub layout: Option<LayoutMode>,

    /// Enable debug logging (equivalent to `--log-level debug`).
    #[arg(short = 'd', long, global = true)]
    pub debug: bool,

    /// Set log level. One of: quiet, normal, info, debug.
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Emit logs in structured JSON (includes timestamp, level, and fields).
    #[arg(long, global = true)]
    pub json: bool,

    /// Print where fsource will look for the config file (or FSOURCE_CONFIG
    /// if set), then exit.
    #[arg(long)]
    pub print_config: bool,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// List every artifact name under the root.
    List,
    /// Write an artifact's bytes to stdout.
    Cat {
        /// Artifact name (canonical flat form, e.g. "us_2020").
        name: String,
    },
    /// Store a file (or stdin) as an artifact, replacing any previous one.
    Put {
        /// Artifact name (canonical flat form).
        name: String,
        /// Input file; stdin when omitted.
        #[arg(value_hint = ValueHint::FilePath)]
        file: Option<PathBuf>,
    },
    /// Remove every artifact under the root, keeping the root itself.
    Clear,
    /// Copy every artifact into another root, re-rendering the layout.
    Copy {
        /// Destination root directory.
        #[arg(value_hint = ValueHint::DirPath)]
        dest_root: PathBuf,
        /// Destination layout; defaults to the source layout.
        #[arg(long)]
        dest_layout: Option<LayoutMode>,
        /// Replace destination artifacts that already exist.
        #[arg(long)]
        overwrite: bool,
    },
}

impl Args {
    /// Effective log level derived from flags.
    /// Precedence: --debug > --log-level value > None (use config default).
    pub fn effective_log_level(&self) -> Option<LogLevel> {
        if self.debug {
            return Some(LogLevel::Debug);
        }
        self.log_level.as_deref().and_then(LogLevel::parse)
    }

    /// Apply CLI overrides to a loaded Config (in-place). No-ops for unset
    /// flags.
    pub fn apply_overrides(&self, cfg: &mut Config) {
        if let Some(root) = &self.root {
            cfg.root = Some(root.clone());
        }
        if let Some(layout) = self.layout {
            cfg.layout = layout;
        }
        if let Some(level) = self.effective_log_level() {
            cfg.log_level = level;
        }
    }
}

pub fn parse() -> Args {
    Args::parse()
}
