//! Boolean selector expressions over JSON data.
//!
//! This crate layers `not` / `and` / `or`, grouping parentheses and a
//! difference operator (`base - excluded`) on top of an external
//! selector-matching engine:
//! - Tokenizing and shift-reduce parsing of expression text
//! - Short-circuit evaluation through the [`Matcher`] seam
//! - Lazy, filtered result sets with skip lists and cooperative cancellation
//!
//! ```ignore
//! let selector = Selector::new(engine);
//! let expression = ".age:expr(x>30) and not .retired";
//! let mut result = selector.find(&mut data, expression, SelectOptions::default());
//! if !result.is_empty() { /* ... */ }
//! ```

pub mod cancel;
pub mod engine;
pub mod equality;
pub mod error;
pub mod options;
pub mod query;
pub mod result;
pub mod select;
pub mod skip;

#[cfg(test)]
mod test_support;

// Re-export main types
pub use cancel::BlockToken;
pub use engine::{DetachedContext, MatchOptions, Matcher, NodeContext};
pub use equality::deep_equals;
pub use error::{Result, SelectError};
pub use options::{SelectConfig, SelectOptions};
pub use query::{parse, Expression};
pub use result::{Collect, ResultKind, ResultSet};
pub use select::{find, Selector};
pub use skip::{SkipList, DEFAULT_SKIP};
