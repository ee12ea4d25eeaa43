//! Operation resolution: which kind of operation a syntax node denotes.

use crate::expression::functions::{self, FunctionMetadata};
use crate::expression::operator::{BinaryOperator, UnaryOperator};
use crate::expression::{ExpressionError, ExpressionResult};
use crate::syntax::Category;

/// Registered function behind the `^` operator
pub const POWER_FUNCTION: &str = "POW";

/// The behavioural shape of an operator or function occurrence
#[derive(Debug, Clone, Copy)]
pub enum OperationShape {
    Unary(UnaryOperator),
    /// Participates in numeric promotion
    Binary(BinaryOperator),
    /// A binary operator spelling mapped onto a two-argument call (`x ^ 2`)
    NamedBinaryCall(&'static FunctionMetadata),
    UnaryCall(&'static FunctionMetadata),
    MultiArgCall(&'static FunctionMetadata),
    /// Arguments are packed into one list of the declared element type
    VariadicCall(&'static FunctionMetadata),
}

/// Resolve a node name and category to an operation shape
pub fn resolve(name: &str, category: Category) -> ExpressionResult<OperationShape> {
    // `+`/`-` in infix position fall through to the binary table
    if category != Category::OpAdditive {
        if let Some(op) = UnaryOperator::from_symbol(name) {
            return Ok(OperationShape::Unary(op));
        }
    }

    if let Some(op) = BinaryOperator::from_symbol(name) {
        return Ok(OperationShape::Binary(op));
    }

    let (function_name, operator_style) = if name == "^" {
        (POWER_FUNCTION, true)
    } else {
        (name, false)
    };

    let function = functions::lookup(function_name).ok_or_else(|| {
        ExpressionError::UnsupportedOperator {
            name: name.to_string(),
        }
    })?;

    let shape = if operator_style {
        OperationShape::NamedBinaryCall(function)
    } else if function.variadic {
        OperationShape::VariadicCall(function)
    } else if function.parameter_types.len() == 1 {
        OperationShape::UnaryCall(function)
    } else {
        OperationShape::MultiArgCall(function)
    };
    Ok(shape)
}
