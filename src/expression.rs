//! Typed expression trees.
//!
//! This module provides:
//! - The expression tree and its operators
//! - Numeric promotion and operation resolution
//! - Building a tree from a categorized syntax forest
//! - Evaluation against positional arguments
//! - The registry of callable functions

pub mod builder;
pub mod error;
pub mod eval;
pub mod expr;
pub mod functions;
pub mod literal;
pub mod operation;
pub mod operator;
pub mod promotion;

pub use builder::ExpressionBuilder;
pub use error::{ExpressionError, ExpressionResult};
pub use eval::{evaluate_expression, expression_to_predicate, ExpressionEvaluator, Predicate};
pub use expr::{Expression, ParameterRef};
pub use functions::{supported_functions, FunctionMetadata};
pub use operator::{BinaryOperator, UnaryOperator};
