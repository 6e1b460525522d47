//! Configuration: XML file handling, validation, and default paths.
//!
//! A FileSource instance is fully determined by backend, root, and layout
//! mode; the config file supplies defaults for the CLI, which flags may
//! override. `FSOURCE_CONFIG` points at an alternate file.

mod paths;
mod types;
mod validate;
pub mod xml;

pub use paths::{default_config_path, default_log_path, path_has_symlink_ancestor};
pub use types::{Config, LogLevel};
pub use xml::{load_config_from_xml_path, load_or_init, LoadResult};
