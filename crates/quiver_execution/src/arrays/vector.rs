use std::sync::Arc;

use super::datatype::DataType;
use super::scalar::ScalarValue;

/// An immutable, fixed-length, single-typed column of values.
#[derive(Debug, Clone, PartialEq)]
pub enum Vector {
    Utf8(Utf8Vector),
    Number(NumberVector),
    Boolean(BooleanVector),
}

pub type Utf8Vector = PrimitiveVector<String>;
pub type NumberVector = PrimitiveVector<f64>;
pub type BooleanVector = PrimitiveVector<bool>;

impl Vector {
    pub fn datatype(&self) -> DataType {
        match self {
            Self::Utf8(_) => DataType::String,
            Self::Number(_) => DataType::Number,
            Self::Boolean(_) => DataType::Boolean,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Self::Utf8(v) => v.len(),
            Self::Number(v) => v.len(),
            Self::Boolean(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Get the value at `idx` as a scalar.
    pub fn scalar(&self, idx: usize) -> Option<ScalarValue> {
        match self {
            Self::Utf8(v) => v.get(idx).map(|s| ScalarValue::Utf8(s.clone())),
            Self::Number(v) => v.get(idx).copied().map(ScalarValue::Number),
            Self::Boolean(v) => v.get(idx).copied().map(ScalarValue::Boolean),
        }
    }
}

impl From<Utf8Vector> for Vector {
    fn from(value: Utf8Vector) -> Self {
        Vector::Utf8(value)
    }
}

impl From<NumberVector> for Vector {
    fn from(value: NumberVector) -> Self {
        Vector::Number(value)
    }
}

impl From<BooleanVector> for Vector {
    fn from(value: BooleanVector) -> Self {
        Vector::Boolean(value)
    }
}

/// Storage for a typed vector.
///
/// `Literal` broadcasts a single value to a requested length without
/// materializing repeated storage, used for SQL literals inside expressions.
#[derive(Debug, Clone, PartialEq)]
enum VectorStorage<T> {
    Values(Arc<[T]>),
    Literal { value: T, len: usize },
}

#[derive(Debug, Clone, PartialEq)]
pub struct PrimitiveVector<T> {
    storage: VectorStorage<T>,
}

impl<T> PrimitiveVector<T> {
    pub fn from_values(values: impl IntoIterator<Item = T>) -> Self {
        PrimitiveVector {
            storage: VectorStorage::Values(values.into_iter().collect()),
        }
    }

    /// Create a vector logically containing `value` repeated `len` times.
    pub fn literal(value: T, len: usize) -> Self {
        PrimitiveVector {
            storage: VectorStorage::Literal { value, len },
        }
    }

    pub fn len(&self) -> usize {
        match &self.storage {
            VectorStorage::Values(values) => values.len(),
            VectorStorage::Literal { len, .. } => *len,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn get(&self, idx: usize) -> Option<&T> {
        match &self.storage {
            VectorStorage::Values(values) => values.get(idx),
            VectorStorage::Literal { value, len } => (idx < *len).then_some(value),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> + '_ {
        (0..self.len()).filter_map(move |idx| self.get(idx))
    }
}

impl<T> FromIterator<T> for PrimitiveVector<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self::from_values(iter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn literal_broadcasts_without_materializing() {
        let v = NumberVector::literal(4.5, 3);
        assert_eq!(3, v.len());
        assert_eq!(Some(&4.5), v.get(0));
        assert_eq!(Some(&4.5), v.get(2));
        assert_eq!(None, v.get(3));
    }

    #[test]
    fn materialized_get_in_bounds() {
        let v = Utf8Vector::from_values(["mario".to_string(), "wario".to_string()]);
        assert_eq!(Some("mario"), v.get(0).map(|s| s.as_str()));
        assert_eq!(None, v.get(2));
    }

    #[test]
    fn vector_scalar_access() {
        let v = Vector::Boolean(BooleanVector::from_values([true, false]));
        assert_eq!(DataType::Boolean, v.datatype());
        assert_eq!(Some(ScalarValue::Boolean(false)), v.scalar(1));
    }

    #[test]
    fn iter_covers_both_storages() {
        let lit = NumberVector::literal(1.0, 2);
        assert_eq!(vec![&1.0, &1.0], lit.iter().collect::<Vec<_>>());

        let vals = NumberVector::from_values([1.0, 2.0]);
        assert_eq!(vec![&1.0, &2.0], vals.iter().collect::<Vec<_>>());
    }
}
