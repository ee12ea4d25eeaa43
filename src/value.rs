//! Semantic types and runtime values.

use crate::expression::{ExpressionError, ExpressionResult};
use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

/// Data types an expression, a parameter or a literal can have
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DataType {
    Boolean,
    UInt8,
    UInt16,
    Int16,
    UInt32,
    Int32,
    UInt64,
    Int64,
    Float32,
    Float64,
    Decimal,
    String,
}

impl DataType {
    pub fn is_integer(&self) -> bool {
        matches!(
            self,
            DataType::UInt8
                | DataType::UInt16
                | DataType::Int16
                | DataType::UInt32
                | DataType::Int32
                | DataType::UInt64
                | DataType::Int64
        )
    }

    pub fn is_float(&self) -> bool {
        matches!(self, DataType::Float32 | DataType::Float64)
    }

    pub fn is_numeric(&self) -> bool {
        self.is_integer() || self.is_float() || *self == DataType::Decimal
    }

    /// Signed integers, floats and decimals can be negated
    pub fn is_signed(&self) -> bool {
        matches!(
            self,
            DataType::Int16
                | DataType::Int32
                | DataType::Int64
                | DataType::Float32
                | DataType::Float64
                | DataType::Decimal
        )
    }

    /// Check whether an explicit conversion from this type to `target` exists
    pub fn can_convert_to(&self, target: DataType) -> bool {
        *self == target || (self.is_numeric() && target.is_numeric())
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

impl FromStr for DataType {
    type Err = ExpressionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "bool" | "boolean" => Ok(DataType::Boolean),
            "u8" | "uint8" | "byte" => Ok(DataType::UInt8),
            "u16" | "uint16" => Ok(DataType::UInt16),
            "i16" | "int16" | "short" => Ok(DataType::Int16),
            "u32" | "uint32" => Ok(DataType::UInt32),
            "i32" | "int32" | "int" => Ok(DataType::Int32),
            "u64" | "uint64" => Ok(DataType::UInt64),
            "i64" | "int64" | "long" => Ok(DataType::Int64),
            "f32" | "float32" | "float" | "single" => Ok(DataType::Float32),
            "f64" | "float64" | "double" => Ok(DataType::Float64),
            "decimal" => Ok(DataType::Decimal),
            "str" | "string" => Ok(DataType::String),
            _ => Err(ExpressionError::UnknownType {
                name: s.to_string(),
            }),
        }
    }
}

/// A runtime value, one variant per [`DataType`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    Boolean(bool),
    UInt8(u8),
    UInt16(u16),
    Int16(i16),
    UInt32(u32),
    Int32(i32),
    UInt64(u64),
    Int64(i64),
    Float32(f32),
    Float64(f64),
    Decimal(Decimal),
    String(String),
}

/// Numeric view of a value used while converting between types
enum Numeric {
    Integer(i128),
    Float(f64),
    Decimal(Decimal),
}

impl Value {
    /// Get the data type of this value
    pub fn data_type(&self) -> DataType {
        match self {
            Value::Boolean(_) => DataType::Boolean,
            Value::UInt8(_) => DataType::UInt8,
            Value::UInt16(_) => DataType::UInt16,
            Value::Int16(_) => DataType::Int16,
            Value::UInt32(_) => DataType::UInt32,
            Value::Int32(_) => DataType::Int32,
            Value::UInt64(_) => DataType::UInt64,
            Value::Int64(_) => DataType::Int64,
            Value::Float32(_) => DataType::Float32,
            Value::Float64(_) => DataType::Float64,
            Value::Decimal(_) => DataType::Decimal,
            Value::String(_) => DataType::String,
        }
    }

    fn as_numeric(&self) -> Option<Numeric> {
        match self {
            Value::UInt8(v) => Some(Numeric::Integer(*v as i128)),
            Value::UInt16(v) => Some(Numeric::Integer(*v as i128)),
            Value::Int16(v) => Some(Numeric::Integer(*v as i128)),
            Value::UInt32(v) => Some(Numeric::Integer(*v as i128)),
            Value::Int32(v) => Some(Numeric::Integer(*v as i128)),
            Value::UInt64(v) => Some(Numeric::Integer(*v as i128)),
            Value::Int64(v) => Some(Numeric::Integer(*v as i128)),
            Value::Float32(v) => Some(Numeric::Float(*v as f64)),
            Value::Float64(v) => Some(Numeric::Float(*v)),
            Value::Decimal(v) => Some(Numeric::Decimal(*v)),
            Value::Boolean(_) | Value::String(_) => None,
        }
    }

    /// Explicitly convert this value to `target`.
    ///
    /// Integer narrowing wraps. Float to integer truncates toward zero and
    /// saturates. Decimal conversions fail when the result is out of range.
    pub fn cast(&self, target: DataType) -> ExpressionResult<Value> {
        let source = self.data_type();
        if source == target {
            return Ok(self.clone());
        }

        let invalid = || ExpressionError::InvalidConversion {
            from: source,
            to: target,
        };
        if !target.is_numeric() {
            return Err(invalid());
        }
        let numeric = self.as_numeric().ok_or_else(invalid)?;

        let value = match target {
            DataType::UInt8 => Value::UInt8(numeric.to_integer(target)? as u8),
            DataType::UInt16 => Value::UInt16(numeric.to_integer(target)? as u16),
            DataType::Int16 => Value::Int16(numeric.to_integer(target)? as i16),
            DataType::UInt32 => Value::UInt32(numeric.to_integer(target)? as u32),
            DataType::Int32 => Value::Int32(numeric.to_integer(target)? as i32),
            DataType::UInt64 => Value::UInt64(numeric.to_integer(target)? as u64),
            DataType::Int64 => Value::Int64(numeric.to_integer(target)? as i64),
            DataType::Float32 => Value::Float32(numeric.to_f64(target)? as f32),
            DataType::Float64 => Value::Float64(numeric.to_f64(target)?),
            DataType::Decimal => Value::Decimal(numeric.to_decimal()?),
            DataType::Boolean | DataType::String => return Err(invalid()),
        };
        Ok(value)
    }

    /// Parse the textual form of a value of the given type
    pub fn parse_as(text: &str, data_type: DataType) -> ExpressionResult<Value> {
        let text = text.trim();
        let invalid = || ExpressionError::InvalidValue {
            text: text.to_string(),
            data_type,
        };
        let value = match data_type {
            DataType::Boolean => Value::Boolean(text.parse().map_err(|_| invalid())?),
            DataType::UInt8 => Value::UInt8(text.parse().map_err(|_| invalid())?),
            DataType::UInt16 => Value::UInt16(text.parse().map_err(|_| invalid())?),
            DataType::Int16 => Value::Int16(text.parse().map_err(|_| invalid())?),
            DataType::UInt32 => Value::UInt32(text.parse().map_err(|_| invalid())?),
            DataType::Int32 => Value::Int32(text.parse().map_err(|_| invalid())?),
            DataType::UInt64 => Value::UInt64(text.parse().map_err(|_| invalid())?),
            DataType::Int64 => Value::Int64(text.parse().map_err(|_| invalid())?),
            DataType::Float32 => Value::Float32(text.parse().map_err(|_| invalid())?),
            DataType::Float64 => Value::Float64(text.parse().map_err(|_| invalid())?),
            DataType::Decimal => Value::Decimal(text.parse().map_err(|_| invalid())?),
            DataType::String => Value::String(text.to_string()),
        };
        Ok(value)
    }
}

impl Numeric {
    fn to_integer(&self, target: DataType) -> ExpressionResult<i128> {
        match self {
            Numeric::Integer(v) => Ok(*v),
            // `as` maps NaN to zero; the clamp saturates at the target's range
            Numeric::Float(v) => {
                let truncated = v.trunc() as i128;
                Ok(match integer_bounds(target) {
                    Some((min, max)) => truncated.clamp(min, max),
                    None => truncated,
                })
            }
            Numeric::Decimal(v) => {
                let overflow = || ExpressionError::Overflow {
                    context: format!("conversion of {} to {}", v, target),
                };
                let truncated = v.trunc().to_i128().ok_or_else(overflow)?;
                if fits_integer(truncated, target) {
                    Ok(truncated)
                } else {
                    Err(overflow())
                }
            }
        }
    }

    fn to_f64(&self, target: DataType) -> ExpressionResult<f64> {
        match self {
            Numeric::Integer(v) => Ok(*v as f64),
            Numeric::Float(v) => Ok(*v),
            Numeric::Decimal(v) => v.to_f64().ok_or_else(|| ExpressionError::Overflow {
                context: format!("conversion of {} to {}", v, target),
            }),
        }
    }

    fn to_decimal(&self) -> ExpressionResult<Decimal> {
        let converted = match self {
            Numeric::Integer(v) => Decimal::from_i128(*v),
            Numeric::Float(v) => Decimal::from_f64(*v),
            Numeric::Decimal(v) => Some(*v),
        };
        converted.ok_or_else(|| ExpressionError::Overflow {
            context: "conversion to Decimal".to_string(),
        })
    }
}

fn integer_bounds(target: DataType) -> Option<(i128, i128)> {
    let bounds = match target {
        DataType::UInt8 => (u8::MIN as i128, u8::MAX as i128),
        DataType::UInt16 => (u16::MIN as i128, u16::MAX as i128),
        DataType::Int16 => (i16::MIN as i128, i16::MAX as i128),
        DataType::UInt32 => (u32::MIN as i128, u32::MAX as i128),
        DataType::Int32 => (i32::MIN as i128, i32::MAX as i128),
        DataType::UInt64 => (u64::MIN as i128, u64::MAX as i128),
        DataType::Int64 => (i64::MIN as i128, i64::MAX as i128),
        _ => return None,
    };
    Some(bounds)
}

fn fits_integer(value: i128, target: DataType) -> bool {
    integer_bounds(target).is_some_and(|(min, max)| (min..=max).contains(&value))
}

impl PartialOrd for Value {
    /// Values of different types are unordered
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        match (self, other) {
            (Value::Boolean(a), Value::Boolean(b)) => a.partial_cmp(b),
            (Value::UInt8(a), Value::UInt8(b)) => a.partial_cmp(b),
            (Value::UInt16(a), Value::UInt16(b)) => a.partial_cmp(b),
            (Value::Int16(a), Value::Int16(b)) => a.partial_cmp(b),
            (Value::UInt32(a), Value::UInt32(b)) => a.partial_cmp(b),
            (Value::Int32(a), Value::Int32(b)) => a.partial_cmp(b),
            (Value::UInt64(a), Value::UInt64(b)) => a.partial_cmp(b),
            (Value::Int64(a), Value::Int64(b)) => a.partial_cmp(b),
            (Value::Float32(a), Value::Float32(b)) => a.partial_cmp(b),
            (Value::Float64(a), Value::Float64(b)) => a.partial_cmp(b),
            (Value::Decimal(a), Value::Decimal(b)) => a.partial_cmp(b),
            (Value::String(a), Value::String(b)) => a.partial_cmp(b),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Boolean(v) => write!(f, "{}", v),
            Value::UInt8(v) => write!(f, "{}", v),
            Value::UInt16(v) => write!(f, "{}", v),
            Value::Int16(v) => write!(f, "{}", v),
            Value::UInt32(v) => write!(f, "{}", v),
            Value::Int32(v) => write!(f, "{}", v),
            Value::UInt64(v) => write!(f, "{}", v),
            Value::Int64(v) => write!(f, "{}", v),
            Value::Float32(v) => write!(f, "{}", v),
            Value::Float64(v) => write!(f, "{}", v),
            Value::Decimal(v) => write!(f, "{}", v),
            Value::String(v) => write!(f, "\"{}\"", v),
        }
    }
}

/// Rust types that map one-to-one onto a [`DataType`]
pub trait NativeType: Sized {
    const DATA_TYPE: DataType;

    fn into_value(self) -> Value;

    fn from_value(value: Value) -> Option<Self>;
}

macro_rules! native_type {
    ($ty:ty, $variant:ident) => {
        impl NativeType for $ty {
            const DATA_TYPE: DataType = DataType::$variant;

            fn into_value(self) -> Value {
                Value::$variant(self)
            }

            fn from_value(value: Value) -> Option<Self> {
                match value {
                    Value::$variant(v) => Some(v),
                    _ => None,
                }
            }
        }

        impl From<$ty> for Value {
            fn from(value: $ty) -> Self {
                Value::$variant(value)
            }
        }
    };
}

native_type!(bool, Boolean);
native_type!(u8, UInt8);
native_type!(u16, UInt16);
native_type!(i16, Int16);
native_type!(u32, UInt32);
native_type!(i32, Int32);
native_type!(u64, UInt64);
native_type!(i64, Int64);
native_type!(f32, Float32);
native_type!(f64, Float64);
native_type!(Decimal, Decimal);
native_type!(String, String);

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(value.to_string())
    }
}

/// An ordered argument list whose types are known at compile time
pub trait Arguments {
    fn data_types() -> Vec<DataType>;

    fn into_values(self) -> Vec<Value>;
}

impl Arguments for () {
    fn data_types() -> Vec<DataType> {
        Vec::new()
    }

    fn into_values(self) -> Vec<Value> {
        Vec::new()
    }
}

macro_rules! arguments_tuple {
    ($($name:ident),+) => {
        impl<$($name: NativeType),+> Arguments for ($($name,)+) {
            fn data_types() -> Vec<DataType> {
                vec![$($name::DATA_TYPE),+]
            }

            #[allow(non_snake_case)]
            fn into_values(self) -> Vec<Value> {
                let ($($name,)+) = self;
                vec![$($name.into_value()),+]
            }
        }
    };
}

arguments_tuple!(A);
arguments_tuple!(A, B);
arguments_tuple!(A, B, C);
arguments_tuple!(A, B, C, D);
arguments_tuple!(A, B, C, D, E);
arguments_tuple!(A, B, C, D, E, F);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_data_type_classification() {
        assert!(DataType::UInt8.is_integer());
        assert!(DataType::Int64.is_integer());
        assert!(!DataType::Float32.is_integer());
        assert!(DataType::Float64.is_float());
        assert!(DataType::Decimal.is_numeric());
        assert!(!DataType::String.is_numeric());
        assert!(!DataType::Boolean.is_numeric());
        assert!(DataType::Int16.is_signed());
        assert!(!DataType::UInt32.is_signed());
    }

    #[test]
    fn test_can_convert_to() {
        assert!(DataType::Int32.can_convert_to(DataType::Float64));
        assert!(DataType::Decimal.can_convert_to(DataType::UInt8));
        assert!(DataType::String.can_convert_to(DataType::String));
        assert!(!DataType::String.can_convert_to(DataType::Float64));
        assert!(!DataType::Int32.can_convert_to(DataType::Boolean));
    }

    #[test]
    fn test_data_type_from_str() {
        assert_eq!("i32".parse::<DataType>().unwrap(), DataType::Int32);
        assert_eq!("Double".parse::<DataType>().unwrap(), DataType::Float64);
        assert_eq!("float".parse::<DataType>().unwrap(), DataType::Float32);
        assert_eq!("STRING".parse::<DataType>().unwrap(), DataType::String);
        assert!(matches!(
            "complex".parse::<DataType>(),
            Err(ExpressionError::UnknownType { .. })
        ));
    }

    #[test]
    fn test_integer_casts_wrap() {
        assert_eq!(
            Value::Int32(300).cast(DataType::UInt8).unwrap(),
            Value::UInt8(44)
        );
        assert_eq!(
            Value::Int32(-1).cast(DataType::UInt64).unwrap(),
            Value::UInt64(u64::MAX)
        );
        assert_eq!(
            Value::UInt8(7).cast(DataType::Int64).unwrap(),
            Value::Int64(7)
        );
    }

    #[test]
    fn test_float_casts() {
        assert_eq!(
            Value::Float64(-2.9).cast(DataType::Int32).unwrap(),
            Value::Int32(-2)
        );
        assert_eq!(
            Value::Int32(3).cast(DataType::Float32).unwrap(),
            Value::Float32(3.0)
        );
        assert_eq!(
            Value::Float32(1.5).cast(DataType::Float64).unwrap(),
            Value::Float64(1.5)
        );
    }

    #[test]
    fn test_float_to_integer_saturates() {
        assert_eq!(
            Value::Float64(300.0).cast(DataType::UInt8).unwrap(),
            Value::UInt8(255)
        );
        assert_eq!(
            Value::Float64(-5.5).cast(DataType::UInt16).unwrap(),
            Value::UInt16(0)
        );
        assert_eq!(
            Value::Float32(-40000.0).cast(DataType::Int16).unwrap(),
            Value::Int16(i16::MIN)
        );
        assert_eq!(
            Value::Float64(f64::INFINITY).cast(DataType::Int64).unwrap(),
            Value::Int64(i64::MAX)
        );
        assert_eq!(
            Value::Float64(f64::NAN).cast(DataType::Int32).unwrap(),
            Value::Int32(0)
        );
    }

    #[test]
    fn test_decimal_casts() {
        let d = Value::Decimal(Decimal::new(1250, 2));
        assert_eq!(d.cast(DataType::Int32).unwrap(), Value::Int32(12));
        assert_eq!(d.cast(DataType::Float64).unwrap(), Value::Float64(12.5));
        assert_eq!(
            Value::Int32(5).cast(DataType::Decimal).unwrap(),
            Value::Decimal(Decimal::new(5, 0))
        );
        assert!(matches!(
            Value::Decimal(Decimal::new(1000, 0)).cast(DataType::UInt8),
            Err(ExpressionError::Overflow { .. })
        ));
        assert!(matches!(
            Value::Float64(f64::NAN).cast(DataType::Decimal),
            Err(ExpressionError::Overflow { .. })
        ));
    }

    #[test]
    fn test_invalid_casts() {
        assert!(matches!(
            Value::String("1".to_string()).cast(DataType::Int32),
            Err(ExpressionError::InvalidConversion { .. })
        ));
        assert!(matches!(
            Value::Int32(1).cast(DataType::Boolean),
            Err(ExpressionError::InvalidConversion { .. })
        ));
        assert_eq!(
            Value::Boolean(true).cast(DataType::Boolean).unwrap(),
            Value::Boolean(true)
        );
    }

    #[test]
    fn test_parse_as() {
        assert_eq!(
            Value::parse_as("42", DataType::Int64).unwrap(),
            Value::Int64(42)
        );
        assert_eq!(
            Value::parse_as(" 2.5 ", DataType::Float64).unwrap(),
            Value::Float64(2.5)
        );
        assert_eq!(
            Value::parse_as("true", DataType::Boolean).unwrap(),
            Value::Boolean(true)
        );
        assert!(matches!(
            Value::parse_as("x", DataType::Int32),
            Err(ExpressionError::InvalidValue { .. })
        ));
    }

    #[test]
    fn test_partial_cmp() {
        assert!(Value::Int32(1) < Value::Int32(2));
        assert!(Value::String("abc".into()) < Value::String("abd".into()));
        assert_eq!(Value::Int32(1).partial_cmp(&Value::Int64(1)), None);
        assert_eq!(
            Value::Float64(f64::NAN).partial_cmp(&Value::Float64(1.0)),
            None
        );
    }

    #[test]
    fn test_native_types() {
        assert_eq!(i32::DATA_TYPE, DataType::Int32);
        assert_eq!(2.5f64.into_value(), Value::Float64(2.5));
        assert_eq!(f32::from_value(Value::Float32(1.0)), Some(1.0));
        assert_eq!(f32::from_value(Value::Float64(1.0)), None);
        assert_eq!(<(i32, String)>::data_types(), vec![DataType::Int32, DataType::String]);
        assert_eq!(
            (1u8, true).into_values(),
            vec![Value::UInt8(1), Value::Boolean(true)]
        );
        assert!(<()>::data_types().is_empty());
    }
}
