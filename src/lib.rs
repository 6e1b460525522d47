//! Core library for `fsource`.
//!
//! Uniform keyed artifact storage for data pipelines: callers address
//! artifacts by structured multi-dimensional keys; a `FileSource` backend
//! translates the resulting names to locations on local disk or a remote
//! namespace and performs the I/O. Any two conforming backends are
//! interchangeable and composable through the cross-backend copier.

pub mod cli;
pub mod config;
pub mod errors;
pub mod keys;
pub mod mapper;
pub mod output;
pub mod shutdown;
pub mod source;

pub use config::{Config, LogLevel};
pub use errors::{Result, SourceError};
pub use keys::{DataKey, Dimension, KeyElement};
pub use mapper::{KeyMapper, LayoutMode, FLAT_DELIMITER};
pub use source::{
    copy_source, CopyStats, DfsClient, DfsFileSource, DfsStatus, FileSource, LocalFileSource,
    MemDfsClient,
};
