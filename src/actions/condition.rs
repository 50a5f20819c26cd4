//! Evaluation of action guards (`if`).
//!
//! A string guard is split on its operator before interpolation, so values
//! that happen to contain `==` cannot change the shape of the expression.
//!
//! ```text
//! "${options.typescript}"            truthiness
//! "!${options.typescript}"           negated truthiness
//! "${prompts.db} == postgres"        equality
//! "${prompts.db} != 'none'"          inequality, quotes are stripped
//! ```

use crate::actions::types::Condition;
use crate::config::{resolve_string, Variables};
use crate::context::{is_truthy, Context};
use crate::error::Result;

/// True when every condition holds. An empty list holds.
pub fn evaluate(conditions: &[Condition], context: &Context) -> Result<bool> {
    for condition in conditions {
        let holds = match condition {
            Condition::Literal(value) => *value,
            Condition::Expression(expression) => evaluate_expression(expression, context)?,
            Condition::Predicate(predicate) => predicate.test(context),
        };
        if !holds {
            return Ok(false);
        }
    }
    Ok(true)
}

/// Evaluate one string expression against `vars`.
///
/// # Errors
///
/// Returns `Interpolation` when the expression references an unknown variable.
pub fn evaluate_expression(expression: &str, vars: &dyn Variables) -> Result<bool> {
    let expression = expression.trim();

    if let Some((lhs, rhs)) = expression.split_once("!=") {
        return Ok(operand(lhs, vars)? != operand(rhs, vars)?);
    }
    if let Some((lhs, rhs)) = expression.split_once("==") {
        return Ok(operand(lhs, vars)? == operand(rhs, vars)?);
    }
    if let Some(rest) = expression.strip_prefix('!') {
        return Ok(!is_truthy(&operand(rest, vars)?));
    }

    Ok(is_truthy(&operand(expression, vars)?))
}

fn operand(raw: &str, vars: &dyn Variables) -> Result<String> {
    let raw = raw.trim();
    let unquoted = ['"', '\'']
        .iter()
        .find_map(|q| raw.strip_prefix(*q).and_then(|s| s.strip_suffix(*q)))
        .unwrap_or(raw);

    resolve_string(unquoted, vars)
}
