pub mod expression;
pub mod parser;
pub mod syntax;
pub mod value;

pub use expression::{Expression, ExpressionError, ExpressionResult, ParameterRef};
pub use parser::{
    parse, parse_as, CompiledFunction, ExpressionParser, Parameter, ParseResult, TypedFunction,
};
pub use value::{DataType, Value};
