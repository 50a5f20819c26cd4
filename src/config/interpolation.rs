//! Variable interpolation for preset values.
//!
//! Preset files reference run-time values with `${variable}` syntax.
//!
//! # Syntax
//!
//! - `${options.name}` - replaced with the variable's value
//! - `$${escaped}` - produces literal `${escaped}` in output
//!
//! Variable lookup is delegated to a [`Variables`] implementation; the run
//! [`Context`](crate::context::Context) is the main one.

use crate::error::{PresetError, Result};
use std::collections::HashMap;

/// A segment of an interpolated string.
#[derive(Debug, Clone, PartialEq)]
pub enum Segment {
    /// Literal text
    Literal(String),
    /// Variable reference: ${name}
    Variable(String),
}

/// Source of values for `${...}` references.
pub trait Variables {
    /// Look up a variable by its (possibly dotted) name.
    fn lookup(&self, name: &str) -> Option<String>;
}

impl Variables for HashMap<String, String> {
    fn lookup(&self, name: &str) -> Option<String> {
        self.get(name).cloned()
    }
}

/// Parse a string containing `${var}` interpolations.
pub fn parse_interpolation(input: &str) -> Vec<Segment> {
    let mut segments = Vec::new();
    let mut chars = input.chars().peekable();
    let mut literal = String::new();

    while let Some(c) = chars.next() {
        if c != '$' {
            literal.push(c);
            continue;
        }

        match chars.peek() {
            Some('$') => {
                chars.next();
                if chars.peek() == Some(&'{') {
                    // $${...} stays literal, braces included
                    chars.next();
                    literal.push_str("${");
                    for c in chars.by_ref() {
                        literal.push(c);
                        if c == '}' {
                            break;
                        }
                    }
                } else {
                    literal.push('$');
                }
            }
            Some('{') => {
                chars.next();
                if !literal.is_empty() {
                    segments.push(Segment::Literal(std::mem::take(&mut literal)));
                }

                let mut name = String::new();
                for c in chars.by_ref() {
                    if c == '}' {
                        break;
                    }
                    name.push(c);
                }
                segments.push(Segment::Variable(name.trim().to_string()));
            }
            _ => literal.push(c),
        }
    }

    if !literal.is_empty() {
        segments.push(Segment::Literal(literal));
    }

    segments
}

/// Check if a string contains any interpolation.
pub fn has_interpolation(input: &str) -> bool {
    parse_interpolation(input)
        .iter()
        .any(|seg| matches!(seg, Segment::Variable(_)))
}

/// Resolve all variables in an interpolated string.
///
/// # Errors
///
/// Returns `Interpolation` if any variable is not known to `vars`.
pub fn resolve_string(input: &str, vars: &dyn Variables) -> Result<String> {
    if !input.contains('$') {
        return Ok(input.to_string());
    }

    let mut result = String::with_capacity(input.len());
    for segment in parse_interpolation(input) {
        match segment {
            Segment::Literal(text) => result.push_str(&text),
            Segment::Variable(name) => {
                let value = vars
                    .lookup(&name)
                    .ok_or_else(|| PresetError::Interpolation {
                        input: input.to_string(),
                        message: format!("unknown variable ${{{}}}", name),
                    })?;
                result.push_str(&value);
            }
        }
    }

    Ok(result)
}

/// Resolve every string inside a JSON value, recursively.
///
/// Object keys are left untouched.
pub fn resolve_value(value: &serde_json::Value, vars: &dyn Variables) -> Result<serde_json::Value> {
    use serde_json::Value;

    Ok(match value {
        Value::String(s) => Value::String(resolve_string(s, vars)?),
        Value::Array(items) => Value::Array(
            items
                .iter()
                .map(|item| resolve_value(item, vars))
                .collect::<Result<_>>()?,
        ),
        Value::Object(map) => {
            let mut out = serde_json::Map::with_capacity(map.len());
            for (key, item) in map {
                out.insert(key.clone(), resolve_value(item, vars)?);
            }
            Value::Object(out)
        }
        other => other.clone(),
    })
}
