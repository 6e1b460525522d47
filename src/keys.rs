//! Structured keys: an ordered, complete mapping from named dimensions to
//! element values, identifying exactly one artifact in a FileSource.
//!
//! Keys are immutable value types. Two keys are equal iff their
//! dimension-to-element mappings are equal, regardless of the order the
//! elements were supplied in; ordering and hashing follow the same rule so
//! keys can serve as enumeration identifiers.

use std::collections::BTreeMap;
use std::fmt;

use crate::errors::{Result, SourceError};

/// A named axis of classification, e.g. "region" or "date".
/// Identity is the name alone.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Dimension(String);

impl Dimension {
    pub fn new(name: impl Into<String>) -> Self {
        Dimension(name.into())
    }

    pub fn name(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Dimension {
    fn from(name: &str) -> Self {
        Dimension::new(name)
    }
}

/// One atomic value within a dimension. Identity = (dimension, value).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct KeyElement {
    dimension: Dimension,
    value: String,
}

impl KeyElement {
    pub fn new(dimension: impl Into<Dimension>, value: impl Into<String>) -> Self {
        KeyElement {
            dimension: dimension.into(),
            value: value.into(),
        }
    }

    pub fn dimension(&self) -> &Dimension {
        &self.dimension
    }

    pub fn value(&self) -> &str {
        &self.value
    }
}

/// An immutable structured key: one element per dimension, no duplicates.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct DataKey {
    elements: BTreeMap<Dimension, String>,
}

impl DataKey {
    /// Build a key from elements. Duplicate dimensions are rejected.
    pub fn from_elements(elements: impl IntoIterator<Item = KeyElement>) -> Result<Self> {
        let mut map = BTreeMap::new();
        for el in elements {
            let KeyElement { dimension, value } = el;
            if map.contains_key(&dimension) {
                return Err(SourceError::invalid_key(
                    value,
                    format!("duplicate dimension '{dimension}'"),
                ));
            }
            map.insert(dimension, value);
        }
        Ok(DataKey { elements: map })
    }

    /// Convenience constructor from (dimension, value) string pairs.
    pub fn from_pairs<'a>(pairs: impl IntoIterator<Item = (&'a str, &'a str)>) -> Result<Self> {
        Self::from_elements(
            pairs
                .into_iter()
                .map(|(d, v)| KeyElement::new(d, v)),
        )
    }

    /// The element value stored for `dimension`, if any.
    pub fn element(&self, dimension: &Dimension) -> Option<&str> {
        self.elements.get(dimension).map(String::as_str)
    }

    /// Dimensions present in this key, in sorted order.
    pub fn dimensions(&self) -> impl Iterator<Item = &Dimension> {
        self.elements.keys()
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }
}

impl fmt::Display for DataKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        f.write_str("[")?;
        for (dim, val) in &self.elements {
            if !first {
                f.write_str(", ")?;
            }
            write!(f, "{dim}={val}")?;
            first = false;
        }
        f.write_str("]")
    }
}
