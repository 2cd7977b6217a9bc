//! Chain configuration values that dynamic size tags refer to.

use std::collections::HashMap;

use serde::{Deserialize, Deserializer};

use crate::errors::TagError;
use crate::expr;

/// Named spec values, such as `SYNC_COMMITTEE_SIZE` or
/// `MAX_VALIDATORS_PER_COMMITTEE`.
///
/// Deserializes from a flat map.  Values may be integers or decimal strings,
/// as chain config files write them; entries that are neither (fork versions,
/// addresses) are skipped since no size can refer to them.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SpecValues {
    values: HashMap<String, u64>,
}

impl SpecValues {
    /// Constructs an empty set of spec values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a value, builder style.
    pub fn with(mut self, name: impl Into<String>, value: u64) -> Self {
        self.insert(name, value);
        self
    }

    /// Inserts or replaces a value, returning the previous one.
    pub fn insert(&mut self, name: impl Into<String>, value: u64) -> Option<u64> {
        self.values.insert(name.into(), value)
    }

    /// Gets a value by name.
    pub fn get(&self, name: &str) -> Option<u64> {
        self.values.get(name).copied()
    }

    /// Returns the number of values.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns if there are no values.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Evaluates a size expression against these values.
    ///
    /// Returns `Ok(None)` if the expression names a value we don't have.
    pub fn resolve(&self, expr: &str) -> Result<Option<u64>, TagError> {
        expr::eval(expr, &|name| self.get(name))
    }
}

impl<K: Into<String>> FromIterator<(K, u64)> for SpecValues {
    fn from_iter<I: IntoIterator<Item = (K, u64)>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawSpecValue {
    Num(u64),
    Str(String),
    #[allow(dead_code, reason = "only matched to skip entries")]
    Other(serde::de::IgnoredAny),
}

impl<'de> Deserialize<'de> for SpecValues {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = HashMap::<String, RawSpecValue>::deserialize(deserializer)?;
        let values = raw
            .into_iter()
            .filter_map(|(name, value)| match value {
                RawSpecValue::Num(n) => Some((name, n)),
                RawSpecValue::Str(s) => s.parse().ok().map(|n| (name, n)),
                RawSpecValue::Other(_) => None,
            })
            .collect();
        Ok(Self { values })
    }
}
