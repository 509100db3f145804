//! Evaluation of parsed expressions against a data tree.

use serde_json::Value;

use crate::engine::Matcher;
use crate::options::SelectOptions;
use crate::result::ResultSet;

use super::expression::Expression;

/// Evaluates `expression` to a truth value.
///
/// A literal is true when its filtered result set is non-empty. `and` and
/// `or` short-circuit, so the right-hand literal is only matched when it
/// can change the outcome.
pub fn evaluate(
    expression: &Expression,
    matcher: &dyn Matcher,
    data: &mut Value,
    options: &SelectOptions<'_>,
) -> bool {
    match expression {
        Expression::Literal(text) => literal_matches(text, matcher, data, options),
        Expression::Not(inner) => !evaluate(inner, matcher, data, options),
        Expression::And(left, right) => {
            evaluate(left, matcher, data, options) && evaluate(right, matcher, data, options)
        }
        Expression::Or(left, right) => {
            evaluate(left, matcher, data, options) || evaluate(right, matcher, data, options)
        }
    }
}

fn literal_matches(
    text: &str,
    matcher: &dyn Matcher,
    data: &mut Value,
    options: &SelectOptions<'_>,
) -> bool {
    let matched = !ResultSet::query(matcher, data, text, options.clone()).is_empty();
    log::trace!("literal {:?} matched={matched}", text.trim());
    matched
}
