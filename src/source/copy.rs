//! Cross-backend copier: replicate every artifact of one FileSource into
//! another, independent of backend type or layout mode.
//!
//! Enumeration yields logical names, so the destination renders its own
//! locations; a hierarchical local tree copies into a flat remote namespace
//! without translation at the call site. Entries are copied in parallel.

use std::io;

use rayon::prelude::*;
use tracing::{debug, info, warn};

use crate::errors::Result;

use super::FileSource;

/// Outcome counters of one copy run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CopyStats {
    /// Entries written into the destination.
    pub copied: usize,
    /// Entries left untouched because they already existed and overwrite
    /// was not requested.
    pub skipped: usize,
    /// Total bytes written.
    pub bytes: u64,
}

enum Outcome {
    Copied(u64),
    Skipped,
}

/// Copy every artifact of `src` into `dest` under the same names.
///
/// The destination root is created if missing. With `overwrite` unset,
/// pre-existing destination entries are skipped, never replaced and never
/// an error.
pub fn copy_source<S, D>(src: &S, dest: &D, overwrite: bool) -> Result<CopyStats>
where
    S: FileSource + ?Sized,
    D: FileSource + ?Sized,
{
    dest.ensure_exists()?;
    let names = src.list_all_names()?;
    info!(
        from = %src.describe(),
        to = %dest.describe(),
        entries = names.len(),
        overwrite,
        "copying source"
    );

    let outcomes = names
        .par_iter()
        .map(|name| copy_one(src, dest, name, overwrite))
        .collect::<Result<Vec<_>>>()?;

    let mut stats = CopyStats::default();
    for outcome in outcomes {
        match outcome {
            Outcome::Copied(bytes) => {
                stats.copied += 1;
                stats.bytes += bytes;
            }
            Outcome::Skipped => stats.skipped += 1,
        }
    }
    info!(
        copied = stats.copied,
        skipped = stats.skipped,
        bytes = stats.bytes,
        "copy finished"
    );
    Ok(stats)
}

fn copy_one<S, D>(src: &S, dest: &D, name: &str, overwrite: bool) -> Result<Outcome>
where
    S: FileSource + ?Sized,
    D: FileSource + ?Sized,
{
    if !overwrite && dest.exists(name)? {
        warn!(name, "destination entry exists; skipping");
        return Ok(Outcome::Skipped);
    }
    let mut reader = src.open_reader(name)?;
    let mut writer = dest.open_writer(name)?;
    let bytes = io::copy(&mut reader, &mut writer)?;
    writer.flush()?;
    debug!(name, bytes, "copied entry");
    Ok(Outcome::Copied(bytes))
}
