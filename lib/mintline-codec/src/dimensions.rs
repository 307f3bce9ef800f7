use std::fmt;

use indexmap::IndexMap;
use tracing::debug;

use crate::normalize::{normalize_dimension_key, normalize_dimension_value};

/// A hash map with stable insertion order, hashed with `foldhash`.
pub(crate) type FastIndexMap<K, V> = IndexMap<K, V, foldhash::quality::RandomState>;

/// A single dimension, as given by the caller.
///
/// Neither the key nor the value are normalized yet; that happens once the dimension is added to a [`DimensionList`].
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Dimension {
    key: String,
    value: String,
}

impl Dimension {
    /// Creates a new `Dimension`.
    pub fn new<K, V>(key: K, value: V) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }

    /// Returns the raw key.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Returns the raw value.
    pub fn value(&self) -> &str {
        &self.value
    }
}

/// An ordered set of normalized dimensions, unique by key.
///
/// Keys are normalized when a dimension is inserted, and dimensions whose key normalizes to an empty string are
/// dropped right away. Two dimensions are the same dimension if their keys normalize to the same string: inserting a
/// dimension that already exists replaces its value but keeps its original position.
///
/// Values are normalized on insertion too, but are not escaped. A value that normalizes to an empty string is kept, so
/// that it still replaces an earlier value for the same key; such dimensions are left out when the line is written.
#[derive(Clone, Default, Eq, PartialEq)]
pub struct DimensionList {
    dimensions: FastIndexMap<String, String>,
}

impl DimensionList {
    /// Creates an empty `DimensionList`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a dimension.
    ///
    /// If a dimension with the same normalized key already exists, its value is replaced.
    pub fn insert(&mut self, key: &str, value: &str) {
        let normalized_key = normalize_dimension_key(key);
        if normalized_key.is_empty() {
            debug!(key, "Dimension key is empty after normalization. Dropping dimension.");
            return;
        }

        let normalized_value = normalize_dimension_value(value).into_owned();
        self.dimensions.insert(normalized_key, normalized_value);
    }

    /// Inserts a dimension, returning the list.
    pub fn with_dimension(mut self, key: &str, value: &str) -> Self {
        self.insert(key, value);
        self
    }

    /// Merges the given lists into a single list.
    ///
    /// Lists later in the iterator take precedence: for each key, the value of the last list containing it wins, while
    /// the key keeps the position where it was first seen.
    pub fn merge<'a, I>(lists: I) -> Self
    where
        I: IntoIterator<Item = &'a DimensionList>,
    {
        let mut merged = Self::new();
        for list in lists {
            for (key, value) in &list.dimensions {
                merged.dimensions.insert(key.clone(), value.clone());
            }
        }
        merged
    }

    /// Returns the number of dimensions.
    pub fn len(&self) -> usize {
        self.dimensions.len()
    }

    /// Returns `true` if there are no dimensions.
    pub fn is_empty(&self) -> bool {
        self.dimensions.is_empty()
    }

    /// Gets the normalized value of the dimension with the given normalized key.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.dimensions.get(key).map(String::as_str)
    }

    /// Returns an iterator over the normalized dimensions, in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.dimensions.iter().map(|(key, value)| (key.as_str(), value.as_str()))
    }
}

impl fmt::Debug for DimensionList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl Extend<Dimension> for DimensionList {
    fn extend<T: IntoIterator<Item = Dimension>>(&mut self, iter: T) {
        for dimension in iter {
            self.insert(&dimension.key, &dimension.value);
        }
    }
}

impl FromIterator<Dimension> for DimensionList {
    fn from_iter<T: IntoIterator<Item = Dimension>>(iter: T) -> Self {
        let mut list = Self::new();
        list.extend(iter);
        list
    }
}

impl<K, V> FromIterator<(K, V)> for DimensionList
where
    K: AsRef<str>,
    V: AsRef<str>,
{
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut list = Self::new();
        for (key, value) in iter {
            list.insert(key.as_ref(), value.as_ref());
        }
        list
    }
}
