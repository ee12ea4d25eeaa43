//! Expression evaluation implementation.

use crate::expression::{
    BinaryOperator, Expression, ExpressionError, ExpressionResult, ParameterRef, UnaryOperator,
};
use crate::value::{DataType, Value};
use std::cmp::Ordering;
use std::sync::Arc;

/// Apply `$body` to two integers of the same variant. Yields `None` when the
/// operands are not a matching integer pair.
macro_rules! integer_binary {
    ($left:expr, $right:expr, |$a:ident, $b:ident| $body:expr) => {
        match ($left, $right) {
            (Value::UInt8($a), Value::UInt8($b)) => Some($body.map(Value::UInt8)),
            (Value::UInt16($a), Value::UInt16($b)) => Some($body.map(Value::UInt16)),
            (Value::Int16($a), Value::Int16($b)) => Some($body.map(Value::Int16)),
            (Value::UInt32($a), Value::UInt32($b)) => Some($body.map(Value::UInt32)),
            (Value::Int32($a), Value::Int32($b)) => Some($body.map(Value::Int32)),
            (Value::UInt64($a), Value::UInt64($b)) => Some($body.map(Value::UInt64)),
            (Value::Int64($a), Value::Int64($b)) => Some($body.map(Value::Int64)),
            _ => None,
        }
    };
}

macro_rules! integer_unary {
    ($operand:expr, |$a:ident| $body:expr) => {
        match $operand {
            Value::UInt8($a) => Some(Value::UInt8($body)),
            Value::UInt16($a) => Some(Value::UInt16($body)),
            Value::Int16($a) => Some(Value::Int16($body)),
            Value::UInt32($a) => Some(Value::UInt32($body)),
            Value::Int32($a) => Some(Value::Int32($body)),
            Value::UInt64($a) => Some(Value::UInt64($body)),
            Value::Int64($a) => Some(Value::Int64($body)),
            _ => None,
        }
    };
}

macro_rules! float_binary {
    ($left:expr, $right:expr, |$a:ident, $b:ident| $body:expr) => {
        match ($left, $right) {
            (Value::Float32($a), Value::Float32($b)) => Some(Value::Float32($body)),
            (Value::Float64($a), Value::Float64($b)) => Some(Value::Float64($body)),
            _ => None,
        }
    };
}

/// Tree-walking evaluator over one positional argument list
pub struct ExpressionEvaluator<'a> {
    /// Argument values, indexed by parameter position
    arguments: &'a [Value],
}

impl<'a> ExpressionEvaluator<'a> {
    pub fn new(arguments: &'a [Value]) -> Self {
        Self { arguments }
    }

    /// Evaluate an expression and return the result
    pub fn evaluate(&self, expr: &Expression) -> ExpressionResult<Value> {
        match expr {
            Expression::Literal(value) => Ok(value.clone()),

            Expression::Parameter(parameter) => self.evaluate_parameter(parameter),

            Expression::Convert { operand, target } => self.evaluate(operand)?.cast(*target),

            Expression::UnaryOp { op, operand, .. } => {
                let operand_val = self.evaluate(operand)?;
                evaluate_unary_op(*op, operand_val)
            }

            // short-circuit: the right operand is only evaluated when needed
            Expression::BinaryOp {
                op: op @ (BinaryOperator::And | BinaryOperator::Or),
                left,
                right,
                ..
            } => {
                let decisive = *op == BinaryOperator::Or;
                match self.evaluate(left)? {
                    Value::Boolean(b) if b == decisive => Ok(Value::Boolean(b)),
                    Value::Boolean(_) => match self.evaluate(right)? {
                        Value::Boolean(b) => Ok(Value::Boolean(b)),
                        other => Err(invalid_operands(
                            *op,
                            DataType::Boolean,
                            Some(other.data_type()),
                        )),
                    },
                    other => Err(invalid_operands(*op, other.data_type(), None)),
                }
            }

            Expression::BinaryOp {
                op, left, right, ..
            } => {
                let left_val = self.evaluate(left)?;
                let right_val = self.evaluate(right)?;
                evaluate_binary_op(*op, left_val, right_val)
            }

            Expression::Call {
                function,
                arguments,
                ..
            } => {
                let values = arguments
                    .iter()
                    .map(|argument| self.evaluate(argument))
                    .collect::<ExpressionResult<Vec<_>>>()?;
                function.invoke(&values)
            }
        }
    }

    fn evaluate_parameter(&self, parameter: &ParameterRef) -> ExpressionResult<Value> {
        let value = self.arguments.get(parameter.position).ok_or_else(|| {
            ExpressionError::MissingArgument {
                name: parameter.name.clone(),
            }
        })?;
        if value.data_type() != parameter.data_type {
            return Err(ExpressionError::ArgumentType {
                name: parameter.name.clone(),
                expected: parameter.data_type,
                actual: value.data_type(),
            });
        }
        Ok(value.clone())
    }
}

fn invalid_operands(
    op: BinaryOperator,
    left_type: DataType,
    right_type: Option<DataType>,
) -> ExpressionError {
    ExpressionError::InvalidOperandTypes {
        operator: op.as_str().to_string(),
        left_type,
        right_type,
    }
}

/// Evaluate a binary operation on two already evaluated operands
fn evaluate_binary_op(op: BinaryOperator, left: Value, right: Value) -> ExpressionResult<Value> {
    let result = match op {
        BinaryOperator::Add => integer_binary!(&left, &right, |a, b| Ok(a.wrapping_add(*b)))
            .or_else(|| float_binary!(&left, &right, |a, b| a + b).map(Ok))
            .or_else(|| decimal_binary(op, &left, &right)),

        BinaryOperator::Sub => integer_binary!(&left, &right, |a, b| Ok(a.wrapping_sub(*b)))
            .or_else(|| float_binary!(&left, &right, |a, b| a - b).map(Ok))
            .or_else(|| decimal_binary(op, &left, &right)),

        BinaryOperator::Mul => integer_binary!(&left, &right, |a, b| Ok(a.wrapping_mul(*b)))
            .or_else(|| float_binary!(&left, &right, |a, b| a * b).map(Ok))
            .or_else(|| decimal_binary(op, &left, &right)),

        BinaryOperator::Div => integer_binary!(&left, &right, |a, b| {
            if *b == 0 {
                Err(ExpressionError::DivisionByZero)
            } else {
                Ok(a.wrapping_div(*b))
            }
        })
        .or_else(|| float_binary!(&left, &right, |a, b| a / b).map(Ok))
        .or_else(|| decimal_binary(op, &left, &right)),

        BinaryOperator::Rem => integer_binary!(&left, &right, |a, b| {
            if *b == 0 {
                Err(ExpressionError::DivisionByZero)
            } else {
                Ok(a.wrapping_rem(*b))
            }
        })
        .or_else(|| float_binary!(&left, &right, |a, b| a % b).map(Ok))
        .or_else(|| decimal_binary(op, &left, &right)),

        BinaryOperator::Shl | BinaryOperator::Shr => shift_count(&right).and_then(|count| {
            let shifted = if op == BinaryOperator::Shl {
                integer_unary!(&left, |a| a.wrapping_shl(count))
            } else {
                integer_unary!(&left, |a| a.wrapping_shr(count))
            };
            shifted.map(Ok)
        }),

        BinaryOperator::BitAnd => match (&left, &right) {
            (Value::Boolean(a), Value::Boolean(b)) => Some(Ok(Value::Boolean(*a & *b))),
            _ => integer_binary!(&left, &right, |a, b| Ok(*a & *b)),
        },

        BinaryOperator::BitOr => match (&left, &right) {
            (Value::Boolean(a), Value::Boolean(b)) => Some(Ok(Value::Boolean(*a | *b))),
            _ => integer_binary!(&left, &right, |a, b| Ok(*a | *b)),
        },

        BinaryOperator::Eq => Some(Ok(Value::Boolean(left == right))),
        BinaryOperator::Ne => Some(Ok(Value::Boolean(left != right))),

        BinaryOperator::Lt => compare_values(&left, &right, |ord| ord == Ordering::Less),
        BinaryOperator::Le => compare_values(&left, &right, |ord| ord != Ordering::Greater),
        BinaryOperator::Gt => compare_values(&left, &right, |ord| ord == Ordering::Greater),
        BinaryOperator::Ge => compare_values(&left, &right, |ord| ord != Ordering::Less),

        // non short-circuit form, reached only when called directly
        BinaryOperator::And | BinaryOperator::Or => match (&left, &right) {
            (Value::Boolean(a), Value::Boolean(b)) => Some(Ok(Value::Boolean(
                if op == BinaryOperator::And {
                    *a && *b
                } else {
                    *a || *b
                },
            ))),
            _ => None,
        },
    };

    result.unwrap_or_else(|| {
        Err(invalid_operands(
            op,
            left.data_type(),
            Some(right.data_type()),
        ))
    })
}

fn decimal_binary(
    op: BinaryOperator,
    left: &Value,
    right: &Value,
) -> Option<ExpressionResult<Value>> {
    let (Value::Decimal(a), Value::Decimal(b)) = (left, right) else {
        return None;
    };
    if matches!(op, BinaryOperator::Div | BinaryOperator::Rem) && b.is_zero() {
        return Some(Err(ExpressionError::DivisionByZero));
    }
    let result = match op {
        BinaryOperator::Add => a.checked_add(*b),
        BinaryOperator::Sub => a.checked_sub(*b),
        BinaryOperator::Mul => a.checked_mul(*b),
        BinaryOperator::Div => a.checked_div(*b),
        BinaryOperator::Rem => a.checked_rem(*b),
        _ => return None,
    };
    Some(
        result
            .map(Value::Decimal)
            .ok_or_else(|| ExpressionError::Overflow {
                context: format!("{} {} {}", a, op.as_str(), b),
            }),
    )
}

/// Shift count of an integer operand; the shift itself masks it to the width
/// of the shifted value
fn shift_count(value: &Value) -> Option<u32> {
    match value.cast(DataType::Int64) {
        Ok(Value::Int64(count)) if value.data_type().is_integer() => Some(count as u32),
        _ => None,
    }
}

/// Order two values of the same type. Unordered pairs (NaN) compare false.
fn compare_values<F>(left: &Value, right: &Value, cmp_fn: F) -> Option<ExpressionResult<Value>>
where
    F: FnOnce(Ordering) -> bool,
{
    if left.data_type() != right.data_type() {
        return None;
    }
    let result = left.partial_cmp(right).is_some_and(cmp_fn);
    Some(Ok(Value::Boolean(result)))
}

/// Evaluate a unary operation
fn evaluate_unary_op(op: UnaryOperator, operand: Value) -> ExpressionResult<Value> {
    let result = match op {
        UnaryOperator::Plus => operand.data_type().is_numeric().then(|| operand.clone()),

        UnaryOperator::Negate => match &operand {
            Value::Int16(n) => Some(Value::Int16(n.wrapping_neg())),
            Value::Int32(n) => Some(Value::Int32(n.wrapping_neg())),
            Value::Int64(n) => Some(Value::Int64(n.wrapping_neg())),
            Value::Float32(n) => Some(Value::Float32(-n)),
            Value::Float64(n) => Some(Value::Float64(-n)),
            Value::Decimal(n) => Some(Value::Decimal(-*n)),
            _ => None,
        },

        UnaryOperator::Not => match &operand {
            Value::Boolean(b) => Some(Value::Boolean(!b)),
            _ => None,
        },

        UnaryOperator::OnesComplement => integer_unary!(&operand, |a| !a),
    };

    result.ok_or_else(|| ExpressionError::InvalidOperandTypes {
        operator: op.as_str().to_string(),
        left_type: operand.data_type(),
        right_type: None,
    })
}

/// Helper function to evaluate an expression against positional arguments
pub fn evaluate_expression(expr: &Expression, arguments: &[Value]) -> ExpressionResult<Value> {
    ExpressionEvaluator::new(arguments).evaluate(expr)
}

/// Type alias for predicate functions
pub type Predicate = Box<dyn Fn(&[Value]) -> bool + Send + Sync + 'static>;

/// Create a predicate function from a boolean expression
pub fn expression_to_predicate(expr: Arc<Expression>) -> Predicate {
    Box::new(move |values| match evaluate_expression(&expr, values) {
        Ok(Value::Boolean(b)) => b,
        Ok(_) => false,
        Err(e) => {
            log::trace!("predicate {} failed: {}", expr, e);
            false
        }
    })
}
