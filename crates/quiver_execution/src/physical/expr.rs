use std::fmt;

use quiver_error::{QuiverError, Result};

use crate::arrays::batch::RecordBatch;
use crate::arrays::compute::{arith, cmp, logic};
use crate::arrays::scalar::ScalarValue;
use crate::arrays::vector::{BooleanVector, NumberVector, Utf8Vector, Vector};

/// A compiled, columnar-evaluable expression.
///
/// Column references are positional. Name resolution happened once during
/// query planning and is never repeated per batch.
#[derive(Debug, Clone, PartialEq)]
pub enum PhysicalExpression {
    /// The batch's vector at a fixed position.
    Column(usize),
    /// A constant, broadcast to the batch's row count.
    Literal(ScalarValue),
    Binary {
        op: PhysicalBinaryOp,
        left: Box<PhysicalExpression>,
        right: Box<PhysicalExpression>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PhysicalBinaryOp {
    Add,
    Eq,
    Lt,
    And,
    Or,
}

impl fmt::Display for PhysicalBinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Add => "+",
            Self::Eq => "=",
            Self::Lt => "<",
            Self::And => "AND",
            Self::Or => "OR",
        };
        write!(f, "{s}")
    }
}

impl PhysicalExpression {
    pub fn binary(op: PhysicalBinaryOp, left: PhysicalExpression, right: PhysicalExpression) -> Self {
        PhysicalExpression::Binary {
            op,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    /// Evaluate against a batch, producing a vector sized to the batch's row
    /// count.
    pub fn eval(&self, batch: &RecordBatch) -> Result<Vector> {
        match self {
            Self::Column(idx) => batch.column(*idx).cloned().ok_or_else(|| {
                QuiverError::illegal_state(format!(
                    "Column index {idx} out of bounds for batch with {} columns",
                    batch.num_columns(),
                ))
            }),
            Self::Literal(value) => {
                let len = batch.num_rows();
                match value {
                    ScalarValue::Utf8(v) => Ok(Vector::Utf8(Utf8Vector::literal(v.clone(), len))),
                    ScalarValue::Number(v) => Ok(Vector::Number(NumberVector::literal(*v, len))),
                    ScalarValue::Boolean(v) => {
                        Ok(Vector::Boolean(BooleanVector::literal(*v, len)))
                    }
                    ScalarValue::Null => Err(QuiverError::not_implemented(
                        "null literal evaluation",
                    )),
                }
            }
            Self::Binary { op, left, right } => {
                let left = left.eval(batch)?;
                let right = right.eval(batch)?;
                match op {
                    PhysicalBinaryOp::Add => Ok(Vector::Number(arith::add(&left, &right)?)),
                    PhysicalBinaryOp::Eq => Ok(Vector::Boolean(cmp::eq(&left, &right)?)),
                    PhysicalBinaryOp::Lt => Ok(Vector::Boolean(cmp::lt(&left, &right)?)),
                    PhysicalBinaryOp::And => Ok(Vector::Boolean(logic::and(&left, &right)?)),
                    PhysicalBinaryOp::Or => Ok(Vector::Boolean(logic::or(&left, &right)?)),
                }
            }
        }
    }
}

impl fmt::Display for PhysicalExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Column(idx) => write!(f, "@{idx}"),
            Self::Literal(value) => write!(f, "{value}"),
            Self::Binary { op, left, right } => write!(f, "{left} {op} {right}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arrays::datatype::DataType;
    use crate::arrays::field::{Field, Schema};

    fn orders_batch() -> RecordBatch {
        RecordBatch::try_new(
            Schema::new([
                Field::new("buyer_name", DataType::String),
                Field::new("amount", DataType::Number),
            ]),
            vec![
                Vector::Utf8(Utf8Vector::from_values([
                    "Automatad Inc.".to_string(),
                    "Acme".to_string(),
                    "Automatad Inc.".to_string(),
                ])),
                Vector::Number(NumberVector::from_values([10.0, 20.0, 30.0])),
            ],
        )
        .unwrap()
    }

    #[test]
    fn column_returns_positional_vector() {
        let batch = orders_batch();
        let vector = PhysicalExpression::Column(1).eval(&batch).unwrap();
        assert_eq!(
            Vector::Number(NumberVector::from_values([10.0, 20.0, 30.0])),
            vector,
        );
    }

    #[test]
    fn column_out_of_bounds_is_internal_error() {
        let batch = orders_batch();
        let err = PhysicalExpression::Column(5).eval(&batch).unwrap_err();
        assert!(err.to_string().contains("out of bounds"), "{err}");
    }

    #[test]
    fn literal_broadcasts_to_row_count() {
        let batch = orders_batch();
        let vector = PhysicalExpression::Literal(ScalarValue::Number(1.5))
            .eval(&batch)
            .unwrap();
        assert_eq!(3, vector.len());
        assert_eq!(Some(ScalarValue::Number(1.5)), vector.scalar(2));
    }

    #[test]
    fn eq_on_string_column() {
        let batch = orders_batch();
        let expr = PhysicalExpression::binary(
            PhysicalBinaryOp::Eq,
            PhysicalExpression::Column(0),
            PhysicalExpression::Literal(ScalarValue::Utf8("Automatad Inc.".to_string())),
        );
        let vector = expr.eval(&batch).unwrap();
        assert_eq!(
            Vector::Boolean(BooleanVector::from_values([true, false, true])),
            vector,
        );
    }

    #[test]
    fn add_on_number_column() {
        let batch = orders_batch();
        let expr = PhysicalExpression::binary(
            PhysicalBinaryOp::Add,
            PhysicalExpression::Column(1),
            PhysicalExpression::Literal(ScalarValue::Number(1.0)),
        );
        let vector = expr.eval(&batch).unwrap();
        assert_eq!(
            Vector::Number(NumberVector::from_values([11.0, 21.0, 31.0])),
            vector,
        );
    }

    #[test]
    fn lt_and_or_combination() {
        let batch = orders_batch();
        let lt = PhysicalExpression::binary(
            PhysicalBinaryOp::Lt,
            PhysicalExpression::Column(1),
            PhysicalExpression::Literal(ScalarValue::Number(15.0)),
        );
        let eq = PhysicalExpression::binary(
            PhysicalBinaryOp::Eq,
            PhysicalExpression::Column(1),
            PhysicalExpression::Literal(ScalarValue::Number(30.0)),
        );
        let or = PhysicalExpression::binary(PhysicalBinaryOp::Or, lt, eq);
        let vector = or.eval(&batch).unwrap();
        assert_eq!(
            Vector::Boolean(BooleanVector::from_values([true, false, true])),
            vector,
        );
    }

    #[test]
    fn type_mismatch_is_evaluation_failure() {
        let batch = orders_batch();
        let expr = PhysicalExpression::binary(
            PhysicalBinaryOp::Add,
            PhysicalExpression::Column(0),
            PhysicalExpression::Column(1),
        );
        let err = expr.eval(&batch).unwrap_err();
        assert!(err.to_string().contains("Cannot apply"), "{err}");
    }

    #[test]
    fn display_renders_positionally() {
        let expr = PhysicalExpression::binary(
            PhysicalBinaryOp::Eq,
            PhysicalExpression::Column(0),
            PhysicalExpression::Literal(ScalarValue::Utf8("x".to_string())),
        );
        assert_eq!("@0 = x", expr.to_string());
    }
}
