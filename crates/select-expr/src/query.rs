//! The boolean expression layer over selector fragments.
//!
//! This module provides:
//! - Tokenization of `not` / `and` / `or`, parentheses and quoted strings
//! - A shift-reduce parser producing an [`Expression`] tree
//! - Short-circuit evaluation of that tree through a [`crate::Matcher`]

mod evaluate;
mod expression;
mod lexer;
mod parser;

pub use evaluate::evaluate;
pub use expression::Expression;
pub use lexer::{Lexer, Token};
pub use parser::{parse, ExpressionParser, MAX_DEPTH};
