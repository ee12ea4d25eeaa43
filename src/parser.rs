//! Parse entry point and compiled results.
//!
//! [`ExpressionParser`] runs the fixed pipeline tokenize, merge operators,
//! categorize, build. The [`ParseResult`] it returns owns the typed tree and
//! hands out callables over it as often as asked.

use crate::expression::{
    expression_to_predicate, Expression, ExpressionBuilder, ExpressionError, ExpressionEvaluator,
    ExpressionResult, ParameterRef, Predicate,
};
use crate::syntax::{categorize, merge_operators, Tokenizer};
use crate::value::{Arguments, DataType, NativeType, Value};
use serde::{Deserialize, Serialize};
use std::marker::PhantomData;
use std::sync::Arc;

/// A parameter the expression text may refer to by name
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Parameter {
    pub name: String,
    pub data_type: DataType,
}

impl Parameter {
    pub fn new(name: impl Into<String>, data_type: DataType) -> Self {
        Self {
            name: name.into(),
            data_type,
        }
    }

    /// Declare a parameter whose type is that of the Rust type `T`
    pub fn of<T: NativeType>(name: impl Into<String>) -> Self {
        Self::new(name, T::DATA_TYPE)
    }
}

/// Parser over a fixed set of declared parameters
#[derive(Debug, Clone, Default)]
pub struct ExpressionParser {
    parameters: Vec<Parameter>,
    output_type: Option<DataType>,
}

impl ExpressionParser {
    pub fn new(parameters: impl IntoIterator<Item = Parameter>) -> Self {
        Self {
            parameters: parameters.into_iter().collect(),
            output_type: None,
        }
    }

    /// Force the result type; every operand group is converted to it as it is built
    pub fn with_output_type(mut self, output_type: DataType) -> Self {
        self.output_type = Some(output_type);
        self
    }

    pub fn parameters(&self) -> &[Parameter] {
        &self.parameters
    }

    /// Parse `text` into a compiled result
    pub fn parse(&self, text: &str) -> ExpressionResult<ParseResult> {
        let mut tree = Tokenizer::new().tokenize(text)?;
        merge_operators(&mut tree);

        let names: Vec<&str> = self.parameters.iter().map(|p| p.name.as_str()).collect();
        categorize(&mut tree, &names)?;

        let mut builder = ExpressionBuilder::new(&self.parameters, self.output_type);
        let expression = builder.build(&tree)?;
        log::debug!("built '{}' as {}: {}", text, expression.data_type(), expression);

        Ok(ParseResult {
            expression: Arc::new(expression),
            parameters: builder.into_parameters(),
        })
    }
}

/// Parse `text` against the declared parameters
pub fn parse(text: &str, parameters: &[Parameter]) -> ExpressionResult<ParseResult> {
    ExpressionParser::new(parameters.iter().cloned()).parse(text)
}

/// Parse `text` and convert its result to `output_type`
pub fn parse_as(
    text: &str,
    output_type: DataType,
    parameters: &[Parameter],
) -> ExpressionResult<ParseResult> {
    ExpressionParser::new(parameters.iter().cloned())
        .with_output_type(output_type)
        .parse(text)
}

/// An immutable parsed expression with the parameters it references, in
/// first-seen order
#[derive(Debug, Clone)]
pub struct ParseResult {
    expression: Arc<Expression>,
    parameters: Vec<ParameterRef>,
}

impl ParseResult {
    pub fn expression(&self) -> &Expression {
        &self.expression
    }

    /// The callable's argument list
    pub fn parameters(&self) -> &[ParameterRef] {
        &self.parameters
    }

    pub fn output_type(&self) -> DataType {
        self.expression.data_type()
    }

    fn parameter_types(&self) -> Vec<DataType> {
        self.parameters.iter().map(|p| p.data_type).collect()
    }

    /// A dynamically typed callable
    pub fn compile(&self) -> CompiledFunction {
        CompiledFunction {
            expression: Arc::clone(&self.expression),
            parameters: self.parameters.clone(),
        }
    }

    /// A callable with a static signature. `A` is a tuple matching the
    /// parameter list, `R` the result type.
    pub fn compile_typed<A: Arguments, R: NativeType>(
        &self,
    ) -> ExpressionResult<TypedFunction<A, R>> {
        let expected_parameters = self.parameter_types();
        let requested_parameters = A::data_types();
        if expected_parameters != requested_parameters || self.output_type() != R::DATA_TYPE {
            return Err(ExpressionError::SignatureMismatch {
                expected_parameters,
                expected_output: self.output_type(),
                requested_parameters,
                requested_output: R::DATA_TYPE,
            });
        }
        Ok(TypedFunction {
            function: self.compile(),
            signature: PhantomData,
        })
    }

    /// A predicate over positional arguments. Evaluation failures yield
    /// `false`.
    pub fn compile_predicate(&self) -> ExpressionResult<Predicate> {
        if self.output_type() != DataType::Boolean {
            return Err(ExpressionError::SignatureMismatch {
                expected_parameters: self.parameter_types(),
                expected_output: self.output_type(),
                requested_parameters: self.parameter_types(),
                requested_output: DataType::Boolean,
            });
        }
        Ok(expression_to_predicate(Arc::clone(&self.expression)))
    }
}

/// Callable checking its arguments against the parameter list on every call
#[derive(Debug, Clone)]
pub struct CompiledFunction {
    expression: Arc<Expression>,
    parameters: Vec<ParameterRef>,
}

impl CompiledFunction {
    pub fn parameters(&self) -> &[ParameterRef] {
        &self.parameters
    }

    /// Call with positional arguments
    pub fn call(&self, arguments: &[Value]) -> ExpressionResult<Value> {
        if arguments.len() != self.parameters.len() {
            return Err(ExpressionError::ArgumentCount {
                expected: self.parameters.len(),
                actual: arguments.len(),
            });
        }
        for (parameter, argument) in self.parameters.iter().zip(arguments) {
            if argument.data_type() != parameter.data_type {
                return Err(ExpressionError::ArgumentType {
                    name: parameter.name.clone(),
                    expected: parameter.data_type,
                    actual: argument.data_type(),
                });
            }
        }
        self.evaluate(arguments)
    }

    /// Call with arguments bound by name. Names the expression does not use
    /// are ignored.
    pub fn call_named(&self, arguments: &[(&str, Value)]) -> ExpressionResult<Value> {
        let ordered = self
            .parameters
            .iter()
            .map(|parameter| {
                arguments
                    .iter()
                    .find(|(name, _)| *name == parameter.name)
                    .map(|(_, value)| value.clone())
                    .ok_or_else(|| ExpressionError::MissingArgument {
                        name: parameter.name.clone(),
                    })
            })
            .collect::<ExpressionResult<Vec<_>>>()?;
        self.call(&ordered)
    }

    fn evaluate(&self, arguments: &[Value]) -> ExpressionResult<Value> {
        ExpressionEvaluator::new(arguments).evaluate(&self.expression)
    }
}

/// Callable whose signature was checked once when it was compiled
pub struct TypedFunction<A, R> {
    function: CompiledFunction,
    signature: PhantomData<fn(A) -> R>,
}

impl<A: Arguments, R: NativeType> TypedFunction<A, R> {
    pub fn call(&self, arguments: A) -> ExpressionResult<R> {
        let value = self.function.evaluate(&arguments.into_values())?;
        let actual = value.data_type();
        R::from_value(value).ok_or_else(|| ExpressionError::EvaluationError {
            message: format!("expected a {} result, got {}", R::DATA_TYPE, actual),
        })
    }

    pub fn parameters(&self) -> &[ParameterRef] {
        self.function.parameters()
    }
}

impl<A, R> Clone for TypedFunction<A, R> {
    fn clone(&self) -> Self {
        Self {
            function: self.function.clone(),
            signature: PhantomData,
        }
    }
}
