//! Literal resolution.
//!
//! A literal is a 64-bit float when it contains a dot, otherwise a 32-bit
//! integer, otherwise a double-quoted string. Nothing else is accepted.

use crate::expression::{ExpressionError, ExpressionResult};
use crate::value::Value;

pub fn parse_literal(text: &str) -> ExpressionResult<Value> {
    if text.contains('.') {
        if let Ok(number) = text.parse::<f64>() {
            return Ok(Value::Float64(number));
        }
    }

    if let Ok(number) = text.parse::<i32>() {
        return Ok(Value::Int32(number));
    }

    // one layer of quotes, no escapes
    if text.len() >= 2 && text.starts_with('"') && text.ends_with('"') {
        return Ok(Value::String(text[1..text.len() - 1].to_string()));
    }

    Err(ExpressionError::InvalidLiteral {
        text: text.to_string(),
    })
}

/// Whether `text` has the shape of a name rather than of a malformed literal
pub fn is_identifier(text: &str) -> bool {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) if first.is_alphabetic() || first == '_' => {
            chars.all(|c| c.is_alphanumeric() || c == '_')
        }
        _ => false,
    }
}
