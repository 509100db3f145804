//! Sentinel values excluded from result iteration.
//!
//! ## Global DEFAULT_SKIP
//!
//! `DEFAULT_SKIP` holds `null` and `false`. It is never mutated; derived
//! lists are built with [`SkipList::not`] and [`SkipList::add`].

use std::sync::{Arc, LazyLock};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::equality::deep_equals;

/// Skip list used when the caller does not provide one.
pub static DEFAULT_SKIP: LazyLock<SkipList> =
    LazyLock::new(|| SkipList::from_values([Value::Null, Value::Bool(false)]));

/// An ordered, persistent list of values that result sets leave out.
///
/// Cloning is cheap: clones share the same backing storage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SkipList {
    values: Arc<[Value]>,
}

impl Default for SkipList {
    fn default() -> Self {
        DEFAULT_SKIP.clone()
    }
}

impl SkipList {
    /// A list that skips nothing.
    pub fn none() -> Self {
        Self::from_values([])
    }

    pub fn from_values(values: impl IntoIterator<Item = Value>) -> Self {
        Self {
            values: values.into_iter().collect(),
        }
    }

    /// Returns a new list without any entry equal to `value`.
    pub fn not(&self, value: impl Into<Value>) -> Self {
        let value = value.into();
        let kept = self
            .values
            .iter()
            .filter(|entry| !deep_equals(entry, &value));
        Self::from_values(kept.cloned())
    }

    /// Returns a new list with `value` appended.
    pub fn add(&self, value: impl Into<Value>) -> Self {
        let appended = std::iter::once(value.into());
        Self::from_values(self.values.iter().cloned().chain(appended))
    }

    /// Membership by [`deep_equals`], so `1` and `1.0` are the same entry.
    pub fn contains(&self, value: &Value) -> bool {
        self.values.iter().any(|entry| deep_equals(entry, value))
    }

    pub fn values(&self) -> &[Value] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
