//! Result tuples returned by the external operation.
//!
//! A run result is an ordered list of textual fields. Nested groups such as
//! coefficient arrays stay intact as single fields, so `(1, [0, 1], 2)` has
//! three fields.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{PolytallyError, Result};

/// Default position of the discriminant field (the tuple's `Item14`).
pub const DEFAULT_DISCRIMINANT_INDEX: usize = 13;

/// One result tuple produced by a run of the external operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunResult {
    fields: Vec<String>,
}

impl RunResult {
    /// Build a result from already-split fields.
    pub fn new(fields: Vec<String>) -> Self {
        Self { fields }
    }

    /// Parse a printed tuple `(a, b, ...)` or a JSON array.
    pub fn parse(text: &str) -> Result<Self> {
        let text = text.trim();
        if text.starts_with('(') {
            parse_tuple(text)
        } else if text.starts_with('[') {
            parse_json_array(text)
        } else {
            Err(PolytallyError::MalformedResult(format!(
                "expected a tuple or JSON array, got: {}",
                text
            )))
        }
    }

    /// All fields in order
    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    /// Number of fields in the tuple
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Whether the tuple has no fields
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Read the integer discriminant at `index`.
    pub fn discriminant(&self, index: usize) -> Result<i64> {
        let field = self.fields.get(index).ok_or_else(|| {
            PolytallyError::MalformedResult(format!(
                "no discriminant at field {} (tuple has {} fields)",
                index,
                self.fields.len()
            ))
        })?;

        field.trim().parse::<i64>().map_err(|_| {
            PolytallyError::MalformedResult(format!("discriminant field {} is not an integer: {}", index, field))
        })
    }
}

impl fmt::Display for RunResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({})", self.fields.join(", "))
    }
}

fn parse_tuple(text: &str) -> Result<RunResult> {
    let inner = text
        .strip_prefix('(')
        .and_then(|rest| rest.strip_suffix(')'))
        .ok_or_else(|| PolytallyError::MalformedResult(format!("unterminated tuple: {}", text)))?;

    if inner.trim().is_empty() {
        return Ok(RunResult::new(Vec::new()));
    }

    let mut fields = Vec::new();
    let mut current = String::new();
    let mut depth: usize = 0;
    let mut in_string = false;
    let mut escaped = false;

    for c in inner.chars() {
        match c {
            _ if escaped => {
                escaped = false;
                current.push(c);
            }
            '\\' if in_string => {
                escaped = true;
                current.push(c);
            }
            '"' => {
                in_string = !in_string;
                current.push(c);
            }
            _ if in_string => current.push(c),
            '(' | '[' | '{' => {
                depth += 1;
                current.push(c);
            }
            ')' | ']' | '}' => {
                depth = depth.checked_sub(1).ok_or_else(|| {
                    PolytallyError::MalformedResult(format!("unbalanced '{}' in: {}", c, text))
                })?;
                current.push(c);
            }
            ',' if depth == 0 => {
                fields.push(take_field(&mut current, text)?);
            }
            _ => current.push(c),
        }
    }

    if depth != 0 || in_string {
        return Err(PolytallyError::MalformedResult(format!("unbalanced group in: {}", text)));
    }
    fields.push(take_field(&mut current, text)?);

    Ok(RunResult::new(fields))
}

fn take_field(current: &mut String, text: &str) -> Result<String> {
    let field = current.trim().to_string();
    current.clear();
    if field.is_empty() {
        return Err(PolytallyError::MalformedResult(format!("empty field in: {}", text)));
    }
    Ok(field)
}

fn parse_json_array(text: &str) -> Result<RunResult> {
    let values: Vec<Value> = serde_json::from_str(text)
        .map_err(|e| PolytallyError::MalformedResult(format!("invalid JSON array: {}", e)))?;

    let fields = values
        .into_iter()
        .map(|v| match v {
            Value::String(s) => s,
            other => other.to_string(),
        })
        .collect();

    Ok(RunResult::new(fields))
}
