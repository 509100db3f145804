//! A small path-matching engine for tests.
//!
//! Understands `.key` steps separated by whitespace (descendant), `,`
//! unions, `:val("s")`, `:expr(x<op>n)` and a `:root` marker that switches
//! to `MatchOptions::root`. Every selector it is asked to match is recorded,
//! and every element it hands out is counted.

use std::cell::{Cell, RefCell};

use serde_json::Value;

use crate::cancel::BlockToken;
use crate::engine::{MatchOptions, Matcher, NodeContext};
use crate::error::{Result, SelectError};

#[derive(Debug)]
pub(crate) struct PathMatcher {
    calls: RefCell<Vec<String>>,
    visited: Cell<usize>,
    batch: usize,
}

impl PathMatcher {
    pub(crate) fn new() -> Self {
        Self {
            calls: RefCell::new(Vec::new()),
            visited: Cell::new(0),
            batch: 1,
        }
    }

    /// Only look at the block flag every `batch` elements.
    pub(crate) fn with_batch(mut self, batch: usize) -> Self {
        self.batch = batch.max(1);
        self
    }

    /// Trimmed selectors received so far, in call order.
    pub(crate) fn calls(&self) -> Vec<String> {
        self.calls.borrow().clone()
    }

    /// Elements handed to callbacks so far.
    pub(crate) fn visited(&self) -> usize {
        self.visited.get()
    }
}

impl Matcher for PathMatcher {
    fn select(
        &self,
        data: &mut Value,
        selector: &str,
        options: &MatchOptions<'_>,
        visit: &mut dyn FnMut(&Value, &mut dyn NodeContext),
    ) -> Result<()> {
        self.calls.borrow_mut().push(selector.trim().to_string());

        if selector.contains(":root") {
            if let Some(root) = options.root {
                let mut scratch = root.clone();
                let selector = selector.replace(":root", "");
                return self.visit_matches(&mut scratch, &selector, options, visit);
            }
        }
        self.visit_matches(data, selector, options, visit)
    }
}

impl PathMatcher {
    fn visit_matches(
        &self,
        data: &mut Value,
        selector: &str,
        options: &MatchOptions<'_>,
        visit: &mut dyn FnMut(&Value, &mut dyn NodeContext),
    ) -> Result<()> {
        let mut pointers = Vec::new();
        for alternative in selector.split(',') {
            let steps = parse_steps(alternative)?;
            for pointer in match_steps(data, &steps, options.case_insensitive) {
                if !pointers.contains(&pointer) {
                    pointers.push(pointer);
                }
            }
        }

        let token = BlockToken::new();
        for (index, pointer) in pointers.iter().enumerate() {
            if index % self.batch == 0 && token.is_active().is_none() {
                break;
            }
            let Some(value) = data.pointer(pointer).cloned() else {
                continue;
            };
            self.visited.set(self.visited.get() + 1);

            let mut context = StubContext {
                token: token.clone(),
                mutation: None,
            };
            visit(&value, &mut context);

            match context.mutation {
                Some(Mutation::Update(next)) => {
                    if let Some(slot) = data.pointer_mut(pointer) {
                        *slot = next;
                    }
                }
                Some(Mutation::Remove) => remove_at(data, pointer),
                None => {}
            }
        }
        Ok(())
    }
}

enum Mutation {
    Update(Value),
    Remove,
}

struct StubContext {
    token: BlockToken,
    mutation: Option<Mutation>,
}

impl NodeContext for StubContext {
    fn update(&mut self, value: Value) {
        self.mutation = Some(Mutation::Update(value));
    }

    fn remove(&mut self) {
        self.mutation = Some(Mutation::Remove);
    }

    fn block(&mut self) {
        self.token.block();
    }
}

// ---------------------------------------------------------------------------
// Selector steps
// ---------------------------------------------------------------------------

#[derive(Debug)]
struct Step {
    key: String,
    filter: Option<Filter>,
}

#[derive(Debug)]
enum Filter {
    Val(String),
    Expr(String, Value),
}

impl Filter {
    fn matches(&self, value: &Value) -> bool {
        match self {
            Filter::Val(expected) => value.as_str() == Some(expected.as_str()),
            Filter::Expr(op, operand) => compare(value, op, operand),
        }
    }
}

fn compare(value: &Value, op: &str, operand: &Value) -> bool {
    if let (Some(x), Some(y)) = (value.as_f64(), operand.as_f64()) {
        return match op {
            "=" => x == y,
            "!=" => x != y,
            "<" => x < y,
            "<=" => x <= y,
            ">" => x > y,
            ">=" => x >= y,
            _ => false,
        };
    }
    if let (Some(x), Some(y)) = (value.as_str(), operand.as_str()) {
        return match op {
            "=" => x == y,
            "!=" => x != y,
            _ => false,
        };
    }
    false
}

fn parse_steps(selector: &str) -> Result<Vec<Step>> {
    let mut steps = Vec::new();
    let mut rest = selector.trim();

    while !rest.is_empty() {
        let Some(after_dot) = rest.strip_prefix('.') else {
            let message = format!("expected .key at {rest:?}");
            return Err(SelectError::engine(selector, message));
        };
        let key_len = after_dot
            .find(|ch: char| !(ch.is_alphanumeric() || ch == '_'))
            .unwrap_or(after_dot.len());
        let key = after_dot[..key_len].to_string();
        rest = &after_dot[key_len..];

        let mut filter = None;
        if let Some(after_colon) = rest.strip_prefix(':') {
            let (Some(open), Some(close)) = (after_colon.find('('), after_colon.rfind(')')) else {
                let message = "pseudo-class without argument";
                return Err(SelectError::engine(selector, message));
            };
            let name = after_colon[..open].trim();
            let argument = after_colon[open + 1..close].trim();
            filter = Some(match name {
                "val" => Filter::Val(argument.trim_matches('"').to_string()),
                "expr" => parse_expr(selector, argument)?,
                other => {
                    let message = format!("unsupported pseudo-class :{other}");
                    return Err(SelectError::engine(selector, message));
                }
            });
            rest = &after_colon[close + 1..];
        }

        steps.push(Step { key, filter });
        rest = rest.trim_start();
    }

    Ok(steps)
}

fn parse_expr(selector: &str, argument: &str) -> Result<Filter> {
    let Some(rhs) = argument.strip_prefix('x') else {
        let message = "expression must start with x";
        return Err(SelectError::engine(selector, message));
    };
    let rhs = rhs.trim_start();
    for op in ["<=", ">=", "!=", "=", "<", ">"] {
        if let Some(operand) = rhs.strip_prefix(op) {
            let operand = operand.trim();
            let value = if let Some(text) = operand.strip_prefix('"') {
                Value::String(text.trim_end_matches('"').to_string())
            } else {
                serde_json::from_str::<Value>(operand)
                    .map_err(|error| SelectError::engine(selector, error.to_string()))?
            };
            return Ok(Filter::Expr(op.to_string(), value));
        }
    }
    Err(SelectError::engine(selector, "missing comparison operator"))
}

// ---------------------------------------------------------------------------
// Tree walking
// ---------------------------------------------------------------------------

fn match_steps(data: &Value, steps: &[Step], case_insensitive: bool) -> Vec<String> {
    if steps.is_empty() {
        return Vec::new();
    }

    let mut current = vec![String::new()];
    for step in steps {
        let mut next = Vec::new();
        for pointer in &current {
            if let Some(node) = data.pointer(pointer) {
                collect_descendants(node, pointer, step, case_insensitive, &mut next);
            }
        }
        next.dedup();
        current = next;
    }
    current
}

fn collect_descendants(
    node: &Value,
    pointer: &str,
    step: &Step,
    case_insensitive: bool,
    out: &mut Vec<String>,
) {
    match node {
        Value::Object(map) => {
            for (key, child) in map {
                let child_pointer = format!("{pointer}/{}", escape(key));
                let key_matches = if case_insensitive {
                    key.eq_ignore_ascii_case(&step.key)
                } else {
                    *key == step.key
                };
                if key_matches && step.filter.as_ref().map_or(true, |f| f.matches(child)) {
                    out.push(child_pointer.clone());
                }
                collect_descendants(child, &child_pointer, step, case_insensitive, out);
            }
        }
        Value::Array(items) => {
            for (index, child) in items.iter().enumerate() {
                let child_pointer = format!("{pointer}/{index}");
                collect_descendants(child, &child_pointer, step, case_insensitive, out);
            }
        }
        _ => {}
    }
}

fn escape(key: &str) -> String {
    key.replace('~', "~0").replace('/', "~1")
}

fn remove_at(data: &mut Value, pointer: &str) {
    let Some((parent, last)) = pointer.rsplit_once('/') else {
        return;
    };
    let key = last.replace("~1", "/").replace("~0", "~");
    match data.pointer_mut(parent) {
        Some(Value::Object(map)) => {
            map.remove(&key);
        }
        Some(Value::Array(items)) => {
            if let Ok(index) = key.parse::<usize>() {
                if index < items.len() {
                    items.remove(index);
                }
            }
        }
        _ => {}
    }
}
