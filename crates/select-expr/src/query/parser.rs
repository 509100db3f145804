//! Shift-reduce parser for boolean selector expressions.
//!
//! Grammar (informal):
//!
//! ```text
//! EXP := '(' EXP ')' | LITERAL | 'not' EXP | EXP 'and' EXP | EXP 'or' EXP
//! ```
//!
//! A `(` directly after a literal that is still open belongs to the
//! selector grammar (`.person:has( .age )`): it and its `)` are folded back
//! into the literal text. A `(` at the start of an operand is a boolean
//! group.

use std::fmt;

use crate::error::{Result, SelectError};

use super::expression::Expression;
use super::lexer::{Lexer, Token};

/// Deepest expression tree the parser builds. Evaluation and drop recurse
/// once per level, so longer `and`/`or` chains are rejected as
/// [`SelectError::TooDeep`].
pub const MAX_DEPTH: usize = 512;

// ---------------------------------------------------------------------------
// Stack items
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Keyword {
    Not,
    And,
    Or,
    Open,
}

/// An operand position on the stack.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Slot {
    /// Waiting for its operand.
    Pending,
    /// Selector text that may still grow.
    Literal(String),
    /// A sealed expression: no more text or `(` may attach to it.
    Complete {
        expression: Expression,
        depth: usize,
    },
}

impl Slot {
    fn is_operand(&self) -> bool {
        !matches!(self, Slot::Pending)
    }

    fn depth(&self) -> usize {
        match self {
            Slot::Pending => 0,
            Slot::Literal(_) => 1,
            Slot::Complete { depth, .. } => *depth,
        }
    }

    fn into_operand(self) -> Option<(Expression, usize)> {
        let depth = self.depth();
        match self {
            Slot::Pending => None,
            Slot::Literal(text) => Some((Expression::Literal(text), depth)),
            Slot::Complete { expression, .. } => Some((expression, depth)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum StackItem {
    Keyword(Keyword),
    Slot(Slot),
}

impl fmt::Display for StackItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StackItem::Keyword(Keyword::Not) => write!(f, "not"),
            StackItem::Keyword(Keyword::And) => write!(f, "and"),
            StackItem::Keyword(Keyword::Or) => write!(f, "or"),
            StackItem::Keyword(Keyword::Open) => write!(f, "("),
            StackItem::Slot(Slot::Pending) => write!(f, "<operand>"),
            StackItem::Slot(Slot::Literal(text)) => write!(f, "{:?}", text.trim()),
            StackItem::Slot(Slot::Complete { expression, .. }) => write!(f, "{expression:?}"),
        }
    }
}

/// Which binary rules a reduction pass may apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Level {
    /// `not` and `and` only; an `or` to the left must wait for the rest of
    /// the and-chain.
    And,
    /// Every rule.
    Or,
}

/// Shape of the top of the stack, as far as shifting is concerned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Top {
    Pending,
    OpenLiteral,
    Sealed,
    Other,
}

// ---------------------------------------------------------------------------
// Parser
// ---------------------------------------------------------------------------

pub struct ExpressionParser<'a> {
    lexer: Lexer<'a>,
    stack: Vec<StackItem>,
}

impl<'a> ExpressionParser<'a> {
    /// Parses `input` into an expression tree.
    pub fn parse(input: &'a str) -> Result<Expression> {
        let mut parser = Self {
            lexer: Lexer::new(input),
            stack: vec![StackItem::Slot(Slot::Pending)],
        };

        while let Some(token) = parser.lexer.next() {
            let token = match token {
                Token::Quote(quote) => parser.lexer.scan_quoted(quote)?,
                other => other,
            };
            parser.shift(token)?;
        }

        let expression = parser.finish()?;
        log::debug!("parsed selector expression {input:?} into {expression:?}");
        Ok(expression)
    }

    fn top(&self) -> Top {
        match self.stack.last() {
            Some(StackItem::Slot(Slot::Pending)) => Top::Pending,
            Some(StackItem::Slot(Slot::Literal(_))) => Top::OpenLiteral,
            Some(StackItem::Slot(Slot::Complete { .. })) => Top::Sealed,
            _ => Top::Other,
        }
    }

    fn shift(&mut self, token: Token) -> Result<()> {
        let remaining = self.lexer.remaining();

        match (self.top(), token) {
            // not EXP, ( EXP ): the keyword goes below the waiting slot
            (Top::Pending, Token::Not) => self.insert_below_top(Keyword::Not),
            (Top::Pending, Token::LParen) => self.insert_below_top(Keyword::Open),
            (Top::Pending, Token::Literal(text)) => {
                self.stack.pop();
                self.stack.push(StackItem::Slot(Slot::Literal(text)));
            }
            (Top::Pending, token @ (Token::And | Token::Or | Token::RParen)) => {
                return Err(missing_operand(&token, remaining));
            }

            // LITERAL ( LITERAL ): parenthesis of the selector grammar
            (Top::OpenLiteral, Token::LParen) => {
                self.stack.push(StackItem::Keyword(Keyword::Open));
                self.stack.push(StackItem::Slot(Slot::Literal(String::new())));
            }
            (Top::OpenLiteral, Token::Literal(text)) => {
                if let Some(StackItem::Slot(Slot::Literal(current))) = self.stack.last_mut() {
                    current.push_str(&text);
                }
            }

            (Top::OpenLiteral | Top::Sealed, Token::And) => {
                self.reduce(Level::And)?;
                self.stack.push(StackItem::Keyword(Keyword::And));
                self.stack.push(StackItem::Slot(Slot::Pending));
            }
            (Top::OpenLiteral | Top::Sealed, Token::Or) => {
                self.reduce(Level::Or)?;
                self.stack.push(StackItem::Keyword(Keyword::Or));
                self.stack.push(StackItem::Slot(Slot::Pending));
            }
            (Top::OpenLiteral | Top::Sealed, Token::RParen) => self.close_group(remaining)?,

            (_, token) => return Err(unexpected(&token, remaining)),
        }

        Ok(())
    }

    fn insert_below_top(&mut self, keyword: Keyword) {
        let index = self.stack.len().saturating_sub(1);
        self.stack.insert(index, StackItem::Keyword(keyword));
    }

    fn reduce(&mut self, level: Level) -> Result<()> {
        while reduce_not(&mut self.stack)
            || reduce_and(&mut self.stack)
            || (level == Level::Or && reduce_or(&mut self.stack))
        {
            self.check_depth()?;
        }
        Ok(())
    }

    // every rule leaves its result on top
    fn check_depth(&self) -> Result<()> {
        if let Some(StackItem::Slot(slot)) = self.stack.last() {
            if slot.depth() > MAX_DEPTH {
                return Err(SelectError::TooDeep {
                    limit: MAX_DEPTH,
                    remaining: self.lexer.remaining().to_string(),
                });
            }
        }
        Ok(())
    }

    fn close_group(&mut self, remaining: &str) -> Result<()> {
        self.reduce(Level::Or)?;

        match self.stack.as_slice() {
            [
                ..,
                StackItem::Slot(Slot::Literal(_)),
                StackItem::Keyword(Keyword::Open),
                StackItem::Slot(Slot::Literal(_)),
            ] => {
                fold_selector_parens(&mut self.stack);
                Ok(())
            }
            [
                ..,
                StackItem::Slot(Slot::Literal(_)),
                StackItem::Keyword(Keyword::Open),
                StackItem::Slot(_),
            ] => Err(unexpected(&Token::RParen, remaining)),
            [.., StackItem::Keyword(Keyword::Open), StackItem::Slot(Slot::Pending)] => {
                Err(missing_operand(&Token::RParen, remaining))
            }
            [.., StackItem::Keyword(Keyword::Open), StackItem::Slot(_)] => {
                unwrap_group(&mut self.stack);
                Ok(())
            }
            _ => Err(unexpected(&Token::RParen, remaining)),
        }
    }

    fn finish(mut self) -> Result<Expression> {
        self.reduce(Level::Or)?;

        let complete = matches!(
            self.stack.as_slice(),
            [StackItem::Slot(slot)] if slot.is_operand()
        );
        if complete {
            if let Some((expression, _)) = pop_operand(&mut self.stack) {
                return Ok(expression);
            }
        }

        let stack = self
            .stack
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(" ");
        Err(SelectError::IncompleteExpression {
            stack: format!("[{stack}]"),
        })
    }
}

/// Parses `input` into an expression tree.
pub fn parse(input: &str) -> Result<Expression> {
    ExpressionParser::parse(input)
}

// ---------------------------------------------------------------------------
// Reduction rules
// ---------------------------------------------------------------------------

fn pop_operand(stack: &mut Vec<StackItem>) -> Option<(Expression, usize)> {
    match stack.pop() {
        Some(StackItem::Slot(slot)) => slot.into_operand(),
        _ => None,
    }
}

fn push_complete(stack: &mut Vec<StackItem>, expression: Expression, depth: usize) {
    stack.push(StackItem::Slot(Slot::Complete { expression, depth }));
}

/// `not E` -> `Not(E)`, and `not Not(E)` -> `E`.
fn reduce_not(stack: &mut Vec<StackItem>) -> bool {
    if !matches!(
        stack.as_slice(),
        [.., StackItem::Keyword(Keyword::Not), StackItem::Slot(operand)] if operand.is_operand()
    ) {
        return false;
    }
    let Some((operand, depth)) = pop_operand(stack) else {
        return false;
    };
    stack.pop();
    let depth = if matches!(operand, Expression::Not(_)) {
        depth - 1
    } else {
        depth + 1
    };
    push_complete(stack, operand.negate(), depth);
    true
}

/// `E1 and E2` -> `And(E1, E2)`.
fn reduce_and(stack: &mut Vec<StackItem>) -> bool {
    reduce_binary(stack, Keyword::And, Expression::and)
}

/// `E1 or E2` -> `Or(E1, E2)`.
fn reduce_or(stack: &mut Vec<StackItem>) -> bool {
    reduce_binary(stack, Keyword::Or, Expression::or)
}

fn reduce_binary(
    stack: &mut Vec<StackItem>,
    keyword: Keyword,
    build: fn(Expression, Expression) -> Expression,
) -> bool {
    if !matches!(
        stack.as_slice(),
        [.., StackItem::Slot(left), StackItem::Keyword(op), StackItem::Slot(right)]
            if *op == keyword && left.is_operand() && right.is_operand()
    ) {
        return false;
    }
    let Some((right, right_depth)) = pop_operand(stack) else {
        return false;
    };
    stack.pop();
    let Some((left, left_depth)) = pop_operand(stack) else {
        return false;
    };
    let depth = left_depth.max(right_depth) + 1;
    push_complete(stack, build(left, right), depth);
    true
}

/// `LITERAL ( LITERAL )` -> `LITERAL`. The space after `)` separates the
/// parenthesised part from whatever selector text follows.
fn fold_selector_parens(stack: &mut Vec<StackItem>) {
    let Some(StackItem::Slot(Slot::Literal(inner))) = stack.pop() else {
        return;
    };
    stack.pop();
    if let Some(StackItem::Slot(Slot::Literal(outer))) = stack.last_mut() {
        outer.push_str("( ");
        outer.push_str(&inner);
        outer.push_str(" ) ");
    }
}

/// `( E )` -> `E`, sealed.
fn unwrap_group(stack: &mut Vec<StackItem>) {
    let Some((inner, depth)) = pop_operand(stack) else {
        return;
    };
    stack.pop();
    push_complete(stack, inner, depth);
}

fn unexpected(token: &Token, remaining: &str) -> SelectError {
    SelectError::UnexpectedToken {
        token: token.to_string(),
        remaining: remaining.to_string(),
    }
}

fn missing_operand(token: &Token, remaining: &str) -> SelectError {
    SelectError::MissingOperand {
        token: token.to_string(),
        remaining: remaining.to_string(),
    }
}
