use quiver_error::{QuiverError, Result};

use super::check_lengths;
use crate::arrays::vector::{NumberVector, Vector};

/// Element-wise addition over number vectors.
pub fn add(left: &Vector, right: &Vector) -> Result<NumberVector> {
    check_lengths(left, right)?;
    match (left, right) {
        (Vector::Number(a), Vector::Number(b)) => {
            Ok(a.iter().zip(b.iter()).map(|(a, b)| a + b).collect())
        }
        (left, right) => Err(QuiverError::sql(format!(
            "Cannot apply '+' to types {} and {}",
            left.datatype(),
            right.datatype(),
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arrays::vector::Utf8Vector;

    #[test]
    fn add_numbers() {
        let left = Vector::Number(NumberVector::from_values([1.0, 2.0]));
        let right = Vector::Number(NumberVector::literal(10.0, 2));
        let summed = add(&left, &right).unwrap();
        assert_eq!(vec![&11.0, &12.0], summed.iter().collect::<Vec<_>>());
    }

    #[test]
    fn add_strings_errors() {
        let left = Vector::Utf8(Utf8Vector::from_values(["a".to_string()]));
        let right = Vector::Number(NumberVector::from_values([1.0]));
        let err = add(&left, &right).unwrap_err();
        assert!(err.to_string().contains("'+'"), "{err}");
    }
}
