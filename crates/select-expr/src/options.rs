//! Per-call options and their serializable configuration form.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::engine::MatchOptions;
use crate::skip::SkipList;

/// Options for a single `find` call.
#[derive(Debug, Clone)]
pub struct SelectOptions<'a> {
    /// Values left out of every result set.
    pub skip: SkipList,
    /// Forwarded to the engine; defaults to true.
    pub case_insensitive: bool,
    /// Context override for fragments that reference the root marker.
    pub root: Option<&'a Value>,
    /// Wrap the data root so that the root itself can be matched.
    pub self_scope: bool,
}

impl Default for SelectOptions<'_> {
    fn default() -> Self {
        Self {
            skip: SkipList::default(),
            case_insensitive: true,
            root: None,
            self_scope: false,
        }
    }
}

impl<'a> SelectOptions<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_skip(mut self, skip: SkipList) -> Self {
        self.skip = skip;
        self
    }

    pub fn with_root(mut self, root: &'a Value) -> Self {
        self.root = Some(root);
        self
    }

    pub fn with_self_scope(mut self, self_scope: bool) -> Self {
        self.self_scope = self_scope;
        self
    }

    pub fn case_sensitive(mut self) -> Self {
        self.case_insensitive = false;
        self
    }

    /// The subset of these options the engine sees.
    pub fn match_options(&self) -> MatchOptions<'a> {
        MatchOptions {
            case_insensitive: self.case_insensitive,
            root: self.root,
            self_scope: self.self_scope,
        }
    }
}

/// Serializable form of [`SelectOptions`], minus the borrowed root.
///
/// Missing fields take their defaults, so `{}` is the default
/// configuration and `{"skip": [null]}` keeps `false` in results.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectConfig {
    pub skip: SkipList,
    pub case_insensitive: bool,
    #[serde(rename = "self")]
    pub self_scope: bool,
}

impl Default for SelectConfig {
    fn default() -> Self {
        Self {
            skip: SkipList::default(),
            case_insensitive: true,
            self_scope: false,
        }
    }
}

impl SelectConfig {
    pub fn into_options<'a>(self) -> SelectOptions<'a> {
        SelectOptions {
            skip: self.skip,
            case_insensitive: self.case_insensitive,
            root: None,
            self_scope: self.self_scope,
        }
    }
}
