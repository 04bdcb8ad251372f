use quiver_error::{QuiverError, Result};

use super::check_lengths;
use crate::arrays::vector::{BooleanVector, Vector};

/// Zip two same-typed vectors through a comparison, producing a boolean
/// selection vector.
macro_rules! compare_op {
    ($left:expr, $right:expr, $op:expr, $name:literal) => {{
        check_lengths($left, $right)?;
        match ($left, $right) {
            (Vector::Number(a), Vector::Number(b)) => {
                Ok(a.iter().zip(b.iter()).map($op).collect())
            }
            (Vector::Utf8(a), Vector::Utf8(b)) => Ok(a.iter().zip(b.iter()).map($op).collect()),
            (Vector::Boolean(a), Vector::Boolean(b)) => {
                Ok(a.iter().zip(b.iter()).map($op).collect())
            }
            (left, right) => Err(QuiverError::sql(format!(
                concat!("Cannot apply '", $name, "' to types {} and {}"),
                left.datatype(),
                right.datatype(),
            ))),
        }
    }};
}

/// Element-wise equality.
pub fn eq(left: &Vector, right: &Vector) -> Result<BooleanVector> {
    compare_op!(left, right, |(a, b)| a == b, "=")
}

/// Element-wise less-than.
pub fn lt(left: &Vector, right: &Vector) -> Result<BooleanVector> {
    compare_op!(left, right, |(a, b)| a < b, "<")
}
