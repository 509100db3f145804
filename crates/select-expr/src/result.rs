//! Result sets: lazy, filtered views over matching-engine output.
//!
//! A result set built from selector text runs the engine only when it is
//! iterated. Each element passes two filters before the consumer sees it:
//! - it must not be deep-equal to any element matched by an exclusion
//!   segment (`base - excluded - ...`);
//! - it must not be in the skip list.
//!
//! Boolean expressions collapse to one of two canonical result sets, so
//! every query answers through the same interface.

use std::fmt;

use serde_json::{Map, Value};

use crate::engine::{DetachedContext, MatchOptions, Matcher, NodeContext};
use crate::equality::deep_equals;
use crate::error::Result;
use crate::options::SelectOptions;

/// Separator of the difference operator.
pub const DIFFERENCE_SEPARATOR: &str = " - ";

/// Key under which the data root is wrapped when `self_scope` is set.
pub const SELF_KEY: &str = "object";

static TRUE: Value = Value::Bool(true);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResultKind {
    /// Canonical "false": no elements.
    Empty,
    /// Canonical "true": exactly one `true` element.
    NotEmpty,
    /// Backed by a selector query.
    Query,
}

/// How many elements [`ResultSet::collect`] should gather.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Collect {
    All,
    /// Stop the engine after the first element.
    First,
}

pub struct ResultSet<'a> {
    source: Source<'a>,
}

enum Source<'a> {
    Empty,
    NotEmpty,
    Query(Query<'a>),
}

struct Query<'a> {
    matcher: &'a dyn Matcher,
    data: &'a mut Value,
    base: String,
    exclusions: Vec<String>,
    options: SelectOptions<'a>,
}

impl<'a> ResultSet<'a> {
    /// The canonical empty result.
    pub fn empty() -> Self {
        Self {
            source: Source::Empty,
        }
    }

    /// The canonical non-empty result, holding a single `true`.
    pub fn not_empty() -> Self {
        Self {
            source: Source::NotEmpty,
        }
    }

    /// Builds a lazy result for `selector` against `data`.
    ///
    /// Text after the first ` - ` names exclusion segments; nothing is
    /// matched until the result is iterated.
    pub fn query(
        matcher: &'a dyn Matcher,
        data: &'a mut Value,
        selector: &str,
        options: SelectOptions<'a>,
    ) -> Self {
        let (base, exclusions) = split_difference(selector);
        if !exclusions.is_empty() {
            log::debug!("difference query base={base:?} exclusions={exclusions:?}");
        }
        Self {
            source: Source::Query(Query {
                matcher,
                data,
                base,
                exclusions,
                options,
            }),
        }
    }

    pub fn kind(&self) -> ResultKind {
        match self.source {
            Source::Empty => ResultKind::Empty,
            Source::NotEmpty => ResultKind::NotEmpty,
            Source::Query(_) => ResultKind::Query,
        }
    }

    /// Base selector text of a query result.
    pub fn selector(&self) -> Option<&str> {
        match &self.source {
            Source::Query(query) => Some(query.base.as_str()),
            _ => None,
        }
    }

    /// Visits every element that survives filtering, returning engine
    /// failures to the caller.
    ///
    /// Call `block()` on the context to stop after the current element.
    pub fn try_for_each<F>(&mut self, mut visit: F) -> Result<()>
    where
        F: FnMut(&Value, &mut dyn NodeContext),
    {
        match &mut self.source {
            Source::Empty => Ok(()),
            Source::NotEmpty => {
                let mut context = DetachedContext::new();
                visit(&TRUE, &mut context);
                Ok(())
            }
            Source::Query(query) => query.run(&mut visit),
        }
    }

    /// Like [`ResultSet::try_for_each`], but an engine failure is logged and
    /// ends the iteration.
    pub fn for_each<F>(&mut self, visit: F)
    where
        F: FnMut(&Value, &mut dyn NodeContext),
    {
        if let Err(error) = self.try_for_each(visit) {
            log::warn!("selector iteration stopped: {error}");
        }
    }

    /// Materializes the filtered elements. An engine failure yields no
    /// elements at all.
    pub fn collect(&mut self, mode: Collect) -> Vec<Value> {
        let mut nodes = Vec::new();
        let outcome = self.try_for_each(|value, context| {
            nodes.push(value.clone());
            if mode == Collect::First {
                context.block();
            }
        });

        if let Err(error) = outcome {
            log::warn!("selector treated as empty: {error}");
            return Vec::new();
        }
        if mode == Collect::First {
            nodes.truncate(1);
        }
        nodes
    }

    pub fn nodes(&mut self) -> Vec<Value> {
        self.collect(Collect::All)
    }

    pub fn is_empty(&mut self) -> bool {
        self.collect(Collect::First).is_empty()
    }

    pub fn first(&mut self) -> Option<Value> {
        self.collect(Collect::First).into_iter().next()
    }
}

impl fmt::Debug for ResultSet<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut debug = f.debug_struct("ResultSet");
        debug.field("kind", &self.kind());
        if let Source::Query(query) = &self.source {
            debug
                .field("base", &query.base)
                .field("exclusions", &query.exclusions)
                .field("skip", &query.options.skip);
        }
        debug.finish()
    }
}

impl Query<'_> {
    fn run(&mut self, visit: &mut dyn FnMut(&Value, &mut dyn NodeContext)) -> Result<()> {
        let options = self.options.match_options();

        let mut excluded = Vec::new();
        for segment in &self.exclusions {
            dispatch(
                self.matcher,
                self.data,
                segment,
                &options,
                &mut |value: &Value, _context: &mut dyn NodeContext| {
                    excluded.push(value.clone());
                },
            )?;
        }

        let skip = &self.options.skip;
        dispatch(
            self.matcher,
            self.data,
            &self.base,
            &options,
            &mut |value: &Value, context: &mut dyn NodeContext| {
                if excluded.iter().any(|other| deep_equals(value, other)) {
                    log::trace!("excluded by difference: {value}");
                    return;
                }
                if skip.contains(value) {
                    log::trace!("skipped: {value}");
                    return;
                }
                visit(value, context);
            },
        )
    }
}

/// Splits selector text into the base segment and its exclusion segments.
pub fn split_difference(selector: &str) -> (String, Vec<String>) {
    let padded = format!(" {selector} ");
    let mut segments = padded.split(DIFFERENCE_SEPARATOR).map(str::to_string);
    let base = segments.next().unwrap_or_default();
    (base, segments.collect())
}

/// Runs the engine, wrapping the data root first when `self_scope` is set.
fn dispatch(
    matcher: &dyn Matcher,
    data: &mut Value,
    selector: &str,
    options: &MatchOptions<'_>,
    visit: &mut dyn FnMut(&Value, &mut dyn NodeContext),
) -> Result<()> {
    if !options.self_scope {
        return matcher.select(data, selector, options, visit);
    }

    let mut wrapper = Map::new();
    wrapper.insert(SELF_KEY.to_string(), data.take());
    let mut wrapped = Value::Object(wrapper);
    let outcome = matcher.select(&mut wrapped, selector, options, visit);

    // a removed root leaves null behind
    *data = match wrapped {
        Value::Object(mut wrapper) => wrapper.remove(SELF_KEY).unwrap_or(Value::Null),
        other => other,
    };
    outcome
}
