use quiver_error::{QuiverError, Result};

use super::check_lengths;
use crate::arrays::vector::{BooleanVector, Vector};

fn boolean_op(
    left: &Vector,
    right: &Vector,
    op: fn(bool, bool) -> bool,
    name: &str,
) -> Result<BooleanVector> {
    check_lengths(left, right)?;
    match (left, right) {
        (Vector::Boolean(a), Vector::Boolean(b)) => {
            Ok(a.iter().zip(b.iter()).map(|(a, b)| op(*a, *b)).collect())
        }
        (left, right) => Err(QuiverError::sql(format!(
            "Cannot apply '{name}' to types {} and {}",
            left.datatype(),
            right.datatype(),
        ))),
    }
}

/// Element-wise logical AND over boolean vectors.
pub fn and(left: &Vector, right: &Vector) -> Result<BooleanVector> {
    boolean_op(left, right, |a, b| a && b, "AND")
}

/// Element-wise logical OR over boolean vectors.
pub fn or(left: &Vector, right: &Vector) -> Result<BooleanVector> {
    boolean_op(left, right, |a, b| a || b, "OR")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bools(values: impl IntoIterator<Item = bool>) -> Vector {
        Vector::Boolean(BooleanVector::from_values(values))
    }

    #[test]
    fn and_or_truth_tables() {
        let left = bools([true, true, false, false]);
        let right = bools([true, false, true, false]);

        let anded = and(&left, &right).unwrap();
        assert_eq!(
            vec![&true, &false, &false, &false],
            anded.iter().collect::<Vec<_>>(),
        );

        let ored = or(&left, &right).unwrap();
        assert_eq!(
            vec![&true, &true, &true, &false],
            ored.iter().collect::<Vec<_>>(),
        );
    }

    #[test]
    fn non_boolean_inputs_error() {
        use crate::arrays::vector::NumberVector;
        let left = bools([true]);
        let right = Vector::Number(NumberVector::from_values([1.0]));
        let err = and(&left, &right).unwrap_err();
        assert!(err.to_string().contains("AND"), "{err}");
    }
}
