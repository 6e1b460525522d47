//! Key-to-location mapping.
//!
//! A canonical *name* is the layout-independent identifier of an artifact:
//! the key's element values joined with [`FLAT_DELIMITER`] in declared
//! dimension order. Backends render a name into their own location —
//! verbatim under the root in flat layout, one nested directory per
//! dimension in hierarchical layout — so enumeration and cross-backend copy
//! exchange names, never backend paths.
//!
//! The mapping is pure, deterministic, and invertible: `key_for(name_for(k))`
//! recovers `k` for every well-formed key, and a location listed under a root
//! maps back to exactly one name.

use std::fmt;
use std::path::{Component, Path, PathBuf};
use std::str::FromStr;

use crate::errors::{Result, SourceError};
use crate::keys::{DataKey, Dimension, KeyElement};

/// Reserved delimiter joining element values into a flat name.
/// Element values must not contain it.
pub const FLAT_DELIMITER: char = '_';

/// Prefix of internal temporary files; names may not start with a dot so
/// enumeration can ignore in-flight writes.
pub(crate) const TEMP_PREFIX: &str = ".fsource.";

/// How a FileSource instance renders names under its root.
/// Fixed at construction; never changes for a live instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LayoutMode {
    /// Every artifact sits directly under the root, one name segment.
    #[default]
    Flat,
    /// One nested directory per dimension; the final segment is the file.
    Hierarchical,
}

impl LayoutMode {
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "flat" => Some(LayoutMode::Flat),
            "hier" | "hierarchical" | "nested" => Some(LayoutMode::Hierarchical),
            _ => None,
        }
    }
}

impl fmt::Display for LayoutMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            LayoutMode::Flat => "flat",
            LayoutMode::Hierarchical => "hierarchical",
        };
        f.write_str(s)
    }
}

impl FromStr for LayoutMode {
    type Err = String;
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| format!("invalid layout mode: '{s}'"))
    }
}

/// Converts structured keys to canonical names and back, against a fixed
/// dimension declaration order.
#[derive(Debug, Clone)]
pub struct KeyMapper {
    dimensions: Vec<Dimension>,
}

impl KeyMapper {
    /// Declare the dimension order. Duplicates and empty declarations are
    /// rejected up front so every later mapping is total.
    pub fn new(dimensions: impl IntoIterator<Item = Dimension>) -> Result<Self> {
        let dimensions: Vec<Dimension> = dimensions.into_iter().collect();
        if dimensions.is_empty() {
            return Err(SourceError::invalid_key(
                "",
                "a key mapper needs at least one dimension",
            ));
        }
        for (i, dim) in dimensions.iter().enumerate() {
            if dimensions[..i].contains(dim) {
                return Err(SourceError::invalid_key(
                    dim.name(),
                    "duplicate dimension in declaration",
                ));
            }
        }
        Ok(KeyMapper { dimensions })
    }

    pub fn dimensions(&self) -> &[Dimension] {
        &self.dimensions
    }

    /// Render a key as its canonical name: element values joined with the
    /// flat delimiter in declared dimension order.
    ///
    /// The key must carry exactly one element per declared dimension, and no
    /// element value may be empty or contain the delimiter or a path
    /// separator.
    pub fn name_for(&self, key: &DataKey) -> Result<String> {
        if key.len() != self.dimensions.len() {
            return Err(SourceError::invalid_key(
                key.to_string(),
                format!(
                    "key has {} element(s), mapper declares {} dimension(s)",
                    key.len(),
                    self.dimensions.len()
                ),
            ));
        }
        let mut parts = Vec::with_capacity(self.dimensions.len());
        for dim in &self.dimensions {
            let value = key.element(dim).ok_or_else(|| {
                SourceError::invalid_key(
                    key.to_string(),
                    format!("missing element for dimension '{dim}'"),
                )
            })?;
            validate_element_value(value)?;
            parts.push(value);
        }
        let sep = FLAT_DELIMITER.to_string();
        Ok(parts.join(sep.as_str()))
    }

    /// Recover the key a canonical name was rendered from.
    pub fn key_for(&self, name: &str) -> Result<DataKey> {
        validate_name(name)?;
        let parts: Vec<&str> = name.split(FLAT_DELIMITER).collect();
        if parts.len() != self.dimensions.len() {
            return Err(SourceError::invalid_key(
                name,
                format!(
                    "name has {} segment(s), mapper declares {} dimension(s)",
                    parts.len(),
                    self.dimensions.len()
                ),
            ));
        }
        DataKey::from_elements(
            self.dimensions
                .iter()
                .zip(parts)
                .map(|(dim, value)| KeyElement::new(dim.clone(), value)),
        )
    }
}

fn validate_element_value(value: &str) -> Result<()> {
    if value.is_empty() {
        return Err(SourceError::invalid_key(value, "empty element value"));
    }
    if value.contains(FLAT_DELIMITER) {
        return Err(SourceError::invalid_key(
            value,
            format!("element value contains reserved delimiter '{FLAT_DELIMITER}'"),
        ));
    }
    if value.contains('/') || value.contains('\\') {
        return Err(SourceError::invalid_key(
            value,
            "element value contains a path separator",
        ));
    }
    if value.starts_with('.') {
        return Err(SourceError::invalid_key(
            value,
            "element values starting with '.' are reserved",
        ));
    }
    Ok(())
}

/// Check a canonical name for use against any backend: non-empty, no path
/// separators, no empty delimiter segments, no reserved prefix, no
/// traversal components.
pub fn validate_name(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(SourceError::invalid_key(name, "empty name"));
    }
    if name.contains('/') || name.contains('\\') {
        return Err(SourceError::invalid_key(
            name,
            "name contains a path separator",
        ));
    }
    for segment in name.split(FLAT_DELIMITER) {
        if segment.is_empty() {
            return Err(SourceError::invalid_key(
                name,
                "name has an empty delimiter segment",
            ));
        }
        // Dot segments would escape or hide inside a hierarchical root and
        // collide with internal temp files; they are reserved.
        if segment.starts_with('.') {
            return Err(SourceError::invalid_key(
                name,
                "name segments starting with '.' are reserved",
            ));
        }
    }
    Ok(())
}

/// Render a validated name into the relative location a backend stores it
/// at. Internal only; the opaque location never crosses the contract
/// boundary.
pub(crate) fn name_to_rel_path(name: &str, layout: LayoutMode) -> Result<PathBuf> {
    validate_name(name)?;
    match layout {
        LayoutMode::Flat => Ok(PathBuf::from(name)),
        LayoutMode::Hierarchical => {
            let mut path = PathBuf::new();
            for segment in name.split(FLAT_DELIMITER) {
                path.push(segment);
            }
            Ok(path)
        }
    }
}

/// Recover the canonical name from a relative location found under a root.
/// Inverse of [`name_to_rel_path`] for every location either layout emits.
pub(crate) fn rel_path_to_name(rel: &Path) -> Result<String> {
    let mut segments = Vec::new();
    for comp in rel.components() {
        match comp {
            Component::Normal(os) => {
                let s = os.to_str().ok_or_else(|| {
                    SourceError::invalid_key(
                        rel.display().to_string(),
                        "location is not valid UTF-8",
                    )
                })?;
                segments.push(s);
            }
            _ => {
                return Err(SourceError::invalid_key(
                    rel.display().to_string(),
                    "location contains a non-plain path component",
                ));
            }
        }
    }
    let sep = FLAT_DELIMITER.to_string();
    let name = segments.join(sep.as_str());
    validate_name(&name)?;
    Ok(name)
}
