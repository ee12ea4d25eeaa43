//! Function registry.
//!
//! A process-wide table of the functions callable as `NAME(arg, ...)`. It is
//! built on first use and never modified afterwards.

use crate::expression::{ExpressionError, ExpressionResult};
use crate::value::{DataType, Value};
use std::collections::HashMap;
use std::sync::LazyLock;

/// Native implementation of a registered function
pub type NativeFunction = fn(&[Value]) -> ExpressionResult<Value>;

/// Signature and implementation of a registered function
#[derive(Debug)]
pub struct FunctionMetadata {
    pub name: &'static str,
    pub return_type: DataType,
    /// Declared parameter types. For a variadic function the single entry is
    /// the element type of the packed argument list.
    pub parameter_types: &'static [DataType],
    pub variadic: bool,
    implementation: NativeFunction,
}

impl FunctionMetadata {
    /// Type an argument at `index` must be converted to
    pub fn parameter_type(&self, index: usize) -> Option<DataType> {
        if self.variadic {
            self.parameter_types.last().copied()
        } else {
            self.parameter_types.get(index).copied()
        }
    }

    pub fn invoke(&self, arguments: &[Value]) -> ExpressionResult<Value> {
        (self.implementation)(arguments)
    }
}

static REGISTRY: LazyLock<HashMap<&'static str, FunctionMetadata>> = LazyLock::new(|| {
    let functions = [
        FunctionMetadata {
            name: "POW",
            return_type: DataType::Float64,
            parameter_types: &[DataType::Float64, DataType::Float64],
            variadic: false,
            implementation: pow,
        },
        FunctionMetadata {
            name: "SUM",
            return_type: DataType::Float64,
            parameter_types: &[DataType::Float64],
            variadic: true,
            implementation: sum,
        },
        FunctionMetadata {
            name: "AVG",
            return_type: DataType::Float64,
            parameter_types: &[DataType::Float64],
            variadic: true,
            implementation: avg,
        },
        FunctionMetadata {
            name: "MIN",
            return_type: DataType::Float64,
            parameter_types: &[DataType::Float64],
            variadic: true,
            implementation: min,
        },
        FunctionMetadata {
            name: "MAX",
            return_type: DataType::Float64,
            parameter_types: &[DataType::Float64],
            variadic: true,
            implementation: max,
        },
        FunctionMetadata {
            name: "ABS",
            return_type: DataType::Float64,
            parameter_types: &[DataType::Float64],
            variadic: false,
            implementation: abs,
        },
        FunctionMetadata {
            name: "SQRT",
            return_type: DataType::Float64,
            parameter_types: &[DataType::Float64],
            variadic: false,
            implementation: sqrt,
        },
    ];
    functions.into_iter().map(|f| (f.name, f)).collect()
});

/// Look a function up by its exact name
pub fn lookup(name: &str) -> Option<&'static FunctionMetadata> {
    REGISTRY.get(name)
}

/// Names of all registered functions, sorted
pub fn supported_functions() -> Vec<&'static str> {
    let mut names: Vec<&'static str> = REGISTRY.keys().copied().collect();
    names.sort_unstable();
    names
}

fn floats(arguments: &[Value]) -> ExpressionResult<Vec<f64>> {
    arguments
        .iter()
        .map(|value| match value {
            Value::Float64(v) => Ok(*v),
            other => Err(ExpressionError::EvaluationError {
                message: format!("expected a Float64 argument, got {:?}", other.data_type()),
            }),
        })
        .collect()
}

fn non_empty(name: &str, items: Vec<f64>) -> ExpressionResult<Vec<f64>> {
    if items.is_empty() {
        return Err(ExpressionError::EvaluationError {
            message: format!("{} of an empty argument list", name),
        });
    }
    Ok(items)
}

fn pow(arguments: &[Value]) -> ExpressionResult<Value> {
    match floats(arguments)?.as_slice() {
        [x, y] => Ok(Value::Float64(x.powf(*y))),
        other => Err(ExpressionError::CallArityMismatch {
            function: "POW".to_string(),
            expected: 2,
            actual: other.len(),
        }),
    }
}

fn sum(arguments: &[Value]) -> ExpressionResult<Value> {
    Ok(Value::Float64(floats(arguments)?.iter().sum()))
}

fn avg(arguments: &[Value]) -> ExpressionResult<Value> {
    let items = non_empty("AVG", floats(arguments)?)?;
    Ok(Value::Float64(items.iter().sum::<f64>() / items.len() as f64))
}

fn min(arguments: &[Value]) -> ExpressionResult<Value> {
    let items = non_empty("MIN", floats(arguments)?)?;
    Ok(Value::Float64(items.into_iter().fold(f64::INFINITY, f64::min)))
}

fn max(arguments: &[Value]) -> ExpressionResult<Value> {
    let items = non_empty("MAX", floats(arguments)?)?;
    Ok(Value::Float64(items.into_iter().fold(f64::NEG_INFINITY, f64::max)))
}

fn abs(arguments: &[Value]) -> ExpressionResult<Value> {
    match floats(arguments)?.as_slice() {
        [x] => Ok(Value::Float64(x.abs())),
        other => Err(ExpressionError::CallArityMismatch {
            function: "ABS".to_string(),
            expected: 1,
            actual: other.len(),
        }),
    }
}

fn sqrt(arguments: &[Value]) -> ExpressionResult<Value> {
    match floats(arguments)?.as_slice() {
        [x] => Ok(Value::Float64(x.sqrt())),
        other => Err(ExpressionError::CallArityMismatch {
            function: "SQRT".to_string(),
            expected: 1,
            actual: other.len(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn call(name: &str, args: &[f64]) -> ExpressionResult<Value> {
        let values: Vec<Value> = args.iter().map(|v| Value::Float64(*v)).collect();
        lookup(name).unwrap().invoke(&values)
    }

    #[test]
    fn test_registry_contents() {
        assert_eq!(
            supported_functions(),
            vec!["ABS", "AVG", "MAX", "MIN", "POW", "SQRT", "SUM"]
        );
        assert!(lookup("pow").is_none());
        assert!(lookup("FOO").is_none());

        let pow = lookup("POW").unwrap();
        assert!(!pow.variadic);
        assert_eq!(pow.parameter_types.len(), 2);
        assert_eq!(pow.return_type, DataType::Float64);

        let sum = lookup("SUM").unwrap();
        assert!(sum.variadic);
        assert_eq!(sum.parameter_type(7), Some(DataType::Float64));
        assert_eq!(pow.parameter_type(2), None);
    }

    #[test]
    fn test_function_results() {
        assert_eq!(call("POW", &[2.0, 3.0]).unwrap(), Value::Float64(8.0));
        assert_eq!(call("SUM", &[1.0, 2.5]).unwrap(), Value::Float64(3.5));
        assert_eq!(call("SUM", &[]).unwrap(), Value::Float64(0.0));
        assert_eq!(call("AVG", &[1.0, 2.0, 6.0]).unwrap(), Value::Float64(3.0));
        assert_eq!(call("MIN", &[4.0, -1.0, 2.0]).unwrap(), Value::Float64(-1.0));
        assert_eq!(call("MAX", &[4.0, -1.0, 2.0]).unwrap(), Value::Float64(4.0));
        assert_eq!(call("ABS", &[-2.5]).unwrap(), Value::Float64(2.5));
        assert_eq!(call("SQRT", &[9.0]).unwrap(), Value::Float64(3.0));
    }

    #[test]
    fn test_function_errors() {
        assert!(matches!(
            call("AVG", &[]),
            Err(ExpressionError::EvaluationError { .. })
        ));
        assert!(matches!(
            call("POW", &[1.0]),
            Err(ExpressionError::CallArityMismatch { .. })
        ));
        assert!(matches!(
            lookup("SUM").unwrap().invoke(&[Value::Int32(1)]),
            Err(ExpressionError::EvaluationError { .. })
        ));
    }
}
