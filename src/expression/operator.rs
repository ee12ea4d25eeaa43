//! Operator definitions for expressions.

use crate::value::DataType;

/// Binary operators supported in expressions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryOperator {
    // Arithmetic
    Add,
    Sub,
    Mul,
    Div,
    Rem,

    // Shift
    Shl,
    Shr,

    // Comparison
    Lt,
    Le,
    Gt,
    Ge,
    Eq,
    Ne,

    // Bitwise (logical, non short-circuit, on booleans)
    BitAnd,
    BitOr,

    // Short-circuit logical
    And,
    Or,
}

impl BinaryOperator {
    /// Map a symbol onto its operator. `^` is not XOR here and maps to nothing.
    pub fn from_symbol(symbol: &str) -> Option<Self> {
        let op = match symbol {
            "+" => BinaryOperator::Add,
            "-" => BinaryOperator::Sub,
            "*" => BinaryOperator::Mul,
            "/" => BinaryOperator::Div,
            "%" => BinaryOperator::Rem,
            "<<" => BinaryOperator::Shl,
            ">>" => BinaryOperator::Shr,
            "<" => BinaryOperator::Lt,
            "<=" => BinaryOperator::Le,
            ">" => BinaryOperator::Gt,
            ">=" => BinaryOperator::Ge,
            "==" => BinaryOperator::Eq,
            "!=" => BinaryOperator::Ne,
            "&" => BinaryOperator::BitAnd,
            "|" => BinaryOperator::BitOr,
            "&&" => BinaryOperator::And,
            "||" => BinaryOperator::Or,
            _ => return None,
        };
        Some(op)
    }

    /// Get the output type of this operator given input types
    pub fn output_type(&self, left: DataType, right: DataType) -> Option<DataType> {
        match self {
            BinaryOperator::Add
            | BinaryOperator::Sub
            | BinaryOperator::Mul
            | BinaryOperator::Div
            | BinaryOperator::Rem => {
                if left == right && left.is_numeric() {
                    Some(left)
                } else {
                    None
                }
            }

            BinaryOperator::Shl | BinaryOperator::Shr => {
                if left.is_integer() && right.is_integer() {
                    Some(left)
                } else {
                    None
                }
            }

            BinaryOperator::Lt | BinaryOperator::Le | BinaryOperator::Gt | BinaryOperator::Ge => {
                if left == right && (left.is_numeric() || left == DataType::String) {
                    Some(DataType::Boolean)
                } else {
                    None
                }
            }

            // Same type is always comparable for equality
            BinaryOperator::Eq | BinaryOperator::Ne => {
                if left == right {
                    Some(DataType::Boolean)
                } else {
                    None
                }
            }

            BinaryOperator::BitAnd | BinaryOperator::BitOr => {
                if left == right && (left.is_integer() || left == DataType::Boolean) {
                    Some(left)
                } else {
                    None
                }
            }

            BinaryOperator::And | BinaryOperator::Or => match (left, right) {
                (DataType::Boolean, DataType::Boolean) => Some(DataType::Boolean),
                _ => None,
            },
        }
    }

    /// Get the display string for this operator
    pub fn as_str(&self) -> &'static str {
        match self {
            BinaryOperator::Add => "+",
            BinaryOperator::Sub => "-",
            BinaryOperator::Mul => "*",
            BinaryOperator::Div => "/",
            BinaryOperator::Rem => "%",
            BinaryOperator::Shl => "<<",
            BinaryOperator::Shr => ">>",
            BinaryOperator::Lt => "<",
            BinaryOperator::Le => "<=",
            BinaryOperator::Gt => ">",
            BinaryOperator::Ge => ">=",
            BinaryOperator::Eq => "==",
            BinaryOperator::Ne => "!=",
            BinaryOperator::BitAnd => "&",
            BinaryOperator::BitOr => "|",
            BinaryOperator::And => "&&",
            BinaryOperator::Or => "||",
        }
    }
}

/// Unary operators supported in expressions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnaryOperator {
    Plus,
    Negate,
    Not,
    OnesComplement,
}

impl UnaryOperator {
    pub fn from_symbol(symbol: &str) -> Option<Self> {
        match symbol {
            "+" => Some(UnaryOperator::Plus),
            "-" => Some(UnaryOperator::Negate),
            "!" => Some(UnaryOperator::Not),
            "~" => Some(UnaryOperator::OnesComplement),
            _ => None,
        }
    }

    /// Get the output type of this operator given input type
    pub fn output_type(&self, operand: DataType) -> Option<DataType> {
        let accepted = match self {
            UnaryOperator::Plus => operand.is_numeric(),
            UnaryOperator::Negate => operand.is_signed(),
            UnaryOperator::Not => operand == DataType::Boolean,
            UnaryOperator::OnesComplement => operand.is_integer(),
        };
        accepted.then_some(operand)
    }

    /// Get the display string for this operator
    pub fn as_str(&self) -> &'static str {
        match self {
            UnaryOperator::Plus => "+",
            UnaryOperator::Negate => "-",
            UnaryOperator::Not => "!",
            UnaryOperator::OnesComplement => "~",
        }
    }
}
