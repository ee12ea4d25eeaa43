//! Expression tree definitions.

use crate::expression::functions::FunctionMetadata;
use crate::expression::operator::{BinaryOperator, UnaryOperator};
use crate::expression::{ExpressionError, ExpressionResult};
use crate::value::{DataType, Value};
use serde::Serialize;
use std::fmt;

/// Reference to an input parameter of a parsed expression
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct ParameterRef {
    pub name: String,
    pub data_type: DataType,
    /// Position of the parameter in the callable's argument list
    pub position: usize,
}

/// Expression tree node. Every node has a statically known type.
#[derive(Debug, Clone)]
pub enum Expression {
    /// Literal constant value
    Literal(Value),

    /// Input parameter
    Parameter(ParameterRef),

    /// Explicit numeric conversion
    Convert {
        operand: Box<Expression>,
        target: DataType,
    },

    UnaryOp {
        op: UnaryOperator,
        operand: Box<Expression>,
        data_type: DataType,
    },

    BinaryOp {
        op: BinaryOperator,
        left: Box<Expression>,
        right: Box<Expression>,
        data_type: DataType,
    },

    /// Call of a registered function. When `packed` is set the arguments are
    /// handed over as one variadic list.
    Call {
        function: &'static FunctionMetadata,
        arguments: Vec<Expression>,
        packed: bool,
    },
}

impl Expression {
    /// Create a literal expression
    pub fn literal(value: impl Into<Value>) -> Self {
        Expression::Literal(value.into())
    }

    /// Create a parameter reference expression
    pub fn parameter(parameter: ParameterRef) -> Self {
        Expression::Parameter(parameter)
    }

    /// Convert `operand` to `target`; an operand already of that type is
    /// returned untouched
    pub fn convert(operand: Expression, target: DataType) -> ExpressionResult<Self> {
        let source = operand.data_type();
        if source == target {
            return Ok(operand);
        }
        if !source.can_convert_to(target) {
            return Err(ExpressionError::InvalidConversion {
                from: source,
                to: target,
            });
        }
        Ok(Expression::Convert {
            operand: Box::new(operand),
            target,
        })
    }

    /// Create a unary operation expression, checking the operand type
    pub fn unary_op(op: UnaryOperator, operand: Expression) -> ExpressionResult<Self> {
        let operand_type = operand.data_type();
        let data_type = op
            .output_type(operand_type)
            .ok_or_else(|| ExpressionError::InvalidOperandTypes {
                operator: op.as_str().to_string(),
                left_type: operand_type,
                right_type: None,
            })?;
        Ok(Expression::UnaryOp {
            op,
            operand: Box::new(operand),
            data_type,
        })
    }

    /// Create a binary operation expression, checking both operand types
    pub fn binary_op(
        op: BinaryOperator,
        left: Expression,
        right: Expression,
    ) -> ExpressionResult<Self> {
        let left_type = left.data_type();
        let right_type = right.data_type();
        let data_type = op.output_type(left_type, right_type).ok_or_else(|| {
            ExpressionError::InvalidOperandTypes {
                operator: op.as_str().to_string(),
                left_type,
                right_type: Some(right_type),
            }
        })?;
        Ok(Expression::BinaryOp {
            op,
            left: Box::new(left),
            right: Box::new(right),
            data_type,
        })
    }

    /// Create a call; arguments must already have the declared parameter types
    pub fn call(
        function: &'static FunctionMetadata,
        arguments: Vec<Expression>,
        packed: bool,
    ) -> Self {
        Expression::Call {
            function,
            arguments,
            packed,
        }
    }

    pub fn data_type(&self) -> DataType {
        match self {
            Expression::Literal(value) => value.data_type(),
            Expression::Parameter(parameter) => parameter.data_type,
            Expression::Convert { target, .. } => *target,
            Expression::UnaryOp { data_type, .. } => *data_type,
            Expression::BinaryOp { data_type, .. } => *data_type,
            Expression::Call { function, .. } => function.return_type,
        }
    }

    /// Check if this expression is a constant (contains no parameter references)
    pub fn is_constant(&self) -> bool {
        match self {
            Expression::Literal(_) => true,
            Expression::Parameter(_) => false,
            Expression::Convert { operand, .. } => operand.is_constant(),
            Expression::UnaryOp { operand, .. } => operand.is_constant(),
            Expression::BinaryOp { left, right, .. } => left.is_constant() && right.is_constant(),
            Expression::Call { arguments, .. } => arguments.iter().all(|arg| arg.is_constant()),
        }
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expression::Literal(value) => write!(f, "{}", value),
            Expression::Parameter(parameter) => write!(f, "{}", parameter.name),
            Expression::Convert { operand, target } => {
                write!(f, "Convert({}, {})", operand, target)
            }
            Expression::UnaryOp { op, operand, .. } => write!(f, "{}{}", op.as_str(), operand),
            Expression::BinaryOp {
                op, left, right, ..
            } => write!(f, "({} {} {})", left, op.as_str(), right),
            Expression::Call {
                function,
                arguments,
                packed,
            } => {
                write!(f, "{}(", function.name)?;
                if *packed {
                    write!(f, "[")?;
                }
                for (i, argument) in arguments.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", argument)?;
                }
                if *packed {
                    write!(f, "]")?;
                }
                write!(f, ")")
            }
        }
    }
}
