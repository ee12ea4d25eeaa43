//! Numeric type promotion.
//!
//! Operands of a binary operation must share one type. Each numeric type sits
//! on exactly one ladder (integer, floating, decimal); the operands are lifted
//! to a common type chosen from the highest rung reached on each ladder.

use crate::expression::{Expression, ExpressionResult};
use crate::value::DataType;

/// Rank of an integer type, lowest first
fn integer_rank(data_type: DataType) -> Option<u8> {
    let rank = match data_type {
        DataType::UInt8 => 1,
        DataType::UInt16 => 2,
        DataType::Int16 => 3,
        DataType::UInt32 => 4,
        DataType::Int32 => 5,
        DataType::UInt64 => 6,
        DataType::Int64 => 7,
        _ => return None,
    };
    Some(rank)
}

fn float_rank(data_type: DataType) -> Option<u8> {
    match data_type {
        DataType::Float32 => Some(1),
        DataType::Float64 => Some(2),
        _ => None,
    }
}

/// Highest rung reached on one ladder and the type that reached it
#[derive(Default)]
struct Ladder {
    highest: Option<(u8, DataType)>,
}

impl Ladder {
    fn climb(&mut self, rank: u8, data_type: DataType) {
        match self.highest {
            Some((current, _)) if current >= rank => {}
            _ => self.highest = Some((rank, data_type)),
        }
    }

    fn top(&self) -> Option<DataType> {
        self.highest.map(|(_, data_type)| data_type)
    }
}

/// Pick the common type the operands should be converted to, or `None` when
/// nothing needs to change or some operand is not numeric
pub fn common_type(types: &[DataType]) -> Option<DataType> {
    let mut integers = Ladder::default();
    let mut floats = Ladder::default();
    let mut decimal = false;

    for &data_type in types {
        if let Some(rank) = integer_rank(data_type) {
            integers.climb(rank, data_type);
        } else if let Some(rank) = float_rank(data_type) {
            floats.climb(rank, data_type);
        } else if data_type == DataType::Decimal {
            decimal = true;
        } else {
            log::debug!("promotion skipped: {} is not a number", data_type);
            return None;
        }
    }

    let first = types.first()?;
    if types.iter().all(|t| t == first) {
        return None;
    }

    if decimal {
        // decimal and binary floating point meet at Float64
        return if floats.top().is_some() {
            Some(DataType::Float64)
        } else {
            Some(DataType::Decimal)
        };
    }
    floats.top().or_else(|| integers.top())
}

/// Convert every operand to the common numeric type of the group.
///
/// Operands already of that type are left as they are. When any operand is
/// not numeric the group is returned unchanged and the operator decides.
pub fn promote(operands: Vec<Expression>) -> ExpressionResult<Vec<Expression>> {
    let types: Vec<DataType> = operands.iter().map(Expression::data_type).collect();
    match common_type(&types) {
        Some(target) => operands
            .into_iter()
            .map(|operand| Expression::convert(operand, target))
            .collect(),
        None => Ok(operands),
    }
}

/// [`promote`] for the two operands of a binary operation
pub fn promote_pair(
    left: Expression,
    right: Expression,
) -> ExpressionResult<(Expression, Expression)> {
    match common_type(&[left.data_type(), right.data_type()]) {
        Some(target) => Ok((
            Expression::convert(left, target)?,
            Expression::convert(right, target)?,
        )),
        None => Ok((left, right)),
    }
}
