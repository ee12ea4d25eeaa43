//! Error types for parsing, building and evaluating expressions.

use crate::syntax::Category;
use crate::value::DataType;
use thiserror::Error;

/// Errors that can occur while turning text into an expression or evaluating it
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ExpressionError {
    /// Unbalanced grouping
    #[error("Parenthesis error: {reason}")]
    ParenthesisMismatch { reason: String },

    #[error("Invalid literal: {text}")]
    InvalidLiteral { text: String },

    #[error("An undeclared parameter was found: {name}")]
    UndeclaredParameter { name: String },

    #[error("Unsupported operator or function: {name}")]
    UnsupportedOperator { name: String },

    #[error("A unary expression was expected for operator {operator}")]
    MalformedUnary { operator: String },

    #[error("A binary expression was expected for operator {operator}")]
    MalformedBinary { operator: String },

    /// A leaf or group has neighbours that no operator connects
    #[error("Unexpected operand near {token}")]
    UnexpectedOperand { token: String },

    #[error("Empty expression in {context}")]
    EmptyExpression { context: String },

    #[error("The call {function} expects {expected} argument(s), got {actual}")]
    CallArityMismatch {
        function: String,
        expected: usize,
        actual: usize,
    },

    /// Internal contract violation: a syntax node was categorized twice
    #[error("Cannot change the category of node '{node}' once set (already {existing:?})")]
    CategoryReassignment { node: String, existing: Category },

    #[error("No conversion exists from {from} to {to}")]
    InvalidConversion { from: DataType, to: DataType },

    #[error("Invalid operand types for operator {operator}: left={left_type:?}, right={right_type:?}")]
    InvalidOperandTypes {
        operator: String,
        left_type: DataType,
        right_type: Option<DataType>,
    },

    #[error("Division by zero")]
    DivisionByZero,

    #[error("Arithmetic overflow in {context}")]
    Overflow { context: String },

    #[error("Expected {expected} argument(s), got {actual}")]
    ArgumentCount { expected: usize, actual: usize },

    #[error("Argument {name} expects {expected}, got {actual}")]
    ArgumentType {
        name: String,
        expected: DataType,
        actual: DataType,
    },

    #[error("Missing value for parameter {name}")]
    MissingArgument { name: String },

    #[error("Signature mismatch: expression is fn({expected_parameters:?}) -> {expected_output}, requested fn({requested_parameters:?}) -> {requested_output}")]
    SignatureMismatch {
        expected_parameters: Vec<DataType>,
        expected_output: DataType,
        requested_parameters: Vec<DataType>,
        requested_output: DataType,
    },

    #[error("Unknown data type: {name}")]
    UnknownType { name: String },

    #[error("Cannot parse '{text}' as {data_type}")]
    InvalidValue { text: String, data_type: DataType },

    #[error("Expression evaluation error: {message}")]
    EvaluationError { message: String },
}

/// Result type for expression operations
pub type ExpressionResult<T> = Result<T, ExpressionError>;
