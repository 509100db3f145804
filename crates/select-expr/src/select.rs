//! Top-level entry point: expression text in, result set out.

use serde_json::Value;

use crate::engine::Matcher;
use crate::options::SelectOptions;
use crate::query::{evaluate, parse};
use crate::result::ResultSet;

/// Runs boolean selector expressions through a matching engine.
#[derive(Debug, Clone, Default)]
pub struct Selector<M> {
    matcher: M,
}

impl<M: Matcher> Selector<M> {
    pub fn new(matcher: M) -> Self {
        Self { matcher }
    }

    pub fn matcher(&self) -> &M {
        &self.matcher
    }

    /// See [`find`].
    pub fn find<'a>(
        &'a self,
        data: &'a mut Value,
        expression: &str,
        options: SelectOptions<'a>,
    ) -> ResultSet<'a> {
        find(&self.matcher, data, expression, options)
    }

    /// Whether `expression` selects anything in `data`.
    pub fn is_match(&self, data: &mut Value, expression: &str, options: SelectOptions<'_>) -> bool {
        !find(&self.matcher, data, expression, options).is_empty()
    }
}

/// Evaluates `expression` against `data`.
///
/// A plain selector yields a lazy result over the engine's matches. A
/// boolean expression is evaluated immediately and yields one of the
/// canonical results. Malformed text is logged and yields the empty result.
pub fn find<'a>(
    matcher: &'a dyn Matcher,
    data: &'a mut Value,
    expression: &str,
    options: SelectOptions<'a>,
) -> ResultSet<'a> {
    let parsed = match parse(expression) {
        Ok(parsed) => parsed,
        Err(error) => {
            log::error!("invalid selector expression {expression:?}: {error}");
            return ResultSet::empty();
        }
    };

    if let Some(selector) = parsed.as_literal() {
        return ResultSet::query(matcher, data, selector, options);
    }

    if evaluate(&parsed, matcher, data, &options) {
        ResultSet::not_empty()
    } else {
        ResultSet::empty()
    }
}
