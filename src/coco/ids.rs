//! Newtype IDs for type-safe identification of document elements.
//!
//! Using newtypes prevents accidentally mixing up different kinds of IDs
//! (e.g., passing an image ID where a category ID is expected). IDs are
//! signed because exported documents occasionally carry negative
//! placeholder ids; the pipeline treats those like any other original id.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A unique identifier for an image in an annotation document.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ImageId(pub i64);

impl ImageId {
    /// Creates a new ImageId.
    #[inline]
    pub fn new(id: i64) -> Self {
        Self(id)
    }

    /// Returns the underlying i64 value.
    #[inline]
    pub fn as_i64(&self) -> i64 {
        self.0
    }
}

impl fmt::Debug for ImageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ImageId({})", self.0)
    }
}

impl fmt::Display for ImageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A unique identifier for a category in an annotation document.
///
/// Original category ids are not necessarily contiguous or zero-based;
/// [`crate::mapping::CategoryIndexMap`] is the bridge to dense indices.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CategoryId(pub i64);

impl CategoryId {
    /// Creates a new CategoryId.
    #[inline]
    pub fn new(id: i64) -> Self {
        Self(id)
    }

    /// Returns the underlying i64 value.
    #[inline]
    pub fn as_i64(&self) -> i64 {
        self.0
    }
}

impl fmt::Debug for CategoryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CategoryId({})", self.0)
    }
}

impl fmt::Display for CategoryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
