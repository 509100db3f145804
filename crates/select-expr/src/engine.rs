//! The matching-engine seam.
//!
//! Selector fragments (`.users > .person`, `:has(...)`, `:val(...)`) are
//! matched by an external engine. This crate only combines the results;
//! the engine is reached through [`Matcher`].

use serde_json::Value;

use crate::error::Result;

/// Per-node handle passed to iteration callbacks.
///
/// `update` and `remove` act on the matched location in the data tree.
/// `block` asks the engine to stop before the next element.
pub trait NodeContext {
    fn update(&mut self, value: Value);
    fn remove(&mut self);
    fn block(&mut self);
}

/// Options forwarded to the engine for every fragment it matches.
#[derive(Debug, Clone, Copy)]
pub struct MatchOptions<'a> {
    pub case_insensitive: bool,
    /// Context used when a fragment references the root marker.
    pub root: Option<&'a Value>,
    /// The data root has been wrapped as `{"object": <root>}`.
    pub self_scope: bool,
}

impl Default for MatchOptions<'_> {
    fn default() -> Self {
        Self {
            case_insensitive: true,
            root: None,
            self_scope: false,
        }
    }
}

/// An atomic selector-matching engine.
pub trait Matcher {
    /// Matches `selector` against `data`, calling `visit` once per match in
    /// document order.
    ///
    /// Implementations must check the block flag behind the context before
    /// visiting the next element. Failures for malformed fragments are
    /// reported as [`crate::SelectError::Engine`].
    fn select(
        &self,
        data: &mut Value,
        selector: &str,
        options: &MatchOptions<'_>,
        visit: &mut dyn FnMut(&Value, &mut dyn NodeContext),
    ) -> Result<()>;
}

impl<M: Matcher + ?Sized> Matcher for &M {
    fn select(
        &self,
        data: &mut Value,
        selector: &str,
        options: &MatchOptions<'_>,
        visit: &mut dyn FnMut(&Value, &mut dyn NodeContext),
    ) -> Result<()> {
        (**self).select(data, selector, options, visit)
    }
}

/// Context for values that are not backed by a location in any tree,
/// such as the `true` element of the canonical not-empty result.
///
/// Every call is a no-op: there is nothing to mutate and no further
/// element to block.
#[derive(Debug, Default, Clone, Copy)]
pub struct DetachedContext;

impl DetachedContext {
    pub fn new() -> Self {
        Self
    }
}

impl NodeContext for DetachedContext {
    fn update(&mut self, _value: Value) {}

    fn remove(&mut self) {}

    fn block(&mut self) {}
}
